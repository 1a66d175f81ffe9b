use std::collections::HashMap;

use serde::Deserialize;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryEntry {
    #[serde(alias = "ID")]
    pub id: u64,
    pub name: String,
}

/// Category id to name mapping.
///
/// The sync keeps two of these: the directory fetched from the blog and the
/// fallback table from configuration. Lookups go to the fetched one first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTable {
    names: HashMap<u64, String>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// WordPress creates "Uncategorized" with id 1 on every site.
    pub fn builtin() -> Self {
        CategoryTable::from_entries(vec![CategoryEntry { id: 1, name: "Uncategorized".to_string() }])
    }

    pub fn from_entries<I: IntoIterator<Item = CategoryEntry>>(entries: I) -> Self {
        let names = entries.into_iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .map(|entry| (entry.id, entry.name))
            .collect();
        CategoryTable { names }
    }

    pub fn get(&self, id: u64) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves ids against `primary`, then `fallback`. Unknown ids are skipped,
/// repeated names are kept once, source order is preserved.
pub fn resolve_names(ids: &[u64], primary: &CategoryTable, fallback: &CategoryTable) -> Vec<String> {
    let mut names: Vec<String> = vec![];
    for id in ids {
        let name = primary.get(*id).or_else(|| fallback.get(*id));
        if let Some(name) = name {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

pub fn primary_category(names: &[String]) -> String {
    names.first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}
