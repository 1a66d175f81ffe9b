use std::collections::HashMap;

use crate::content::ContentType;
use crate::store::ContentFilter;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Query string of the public listing endpoint.
#[derive(PartialEq, Debug)]
pub struct ContentQuery {
    items: HashMap<String, String>,
}

impl ContentQuery {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        ContentQuery {
            items,
        }
    }

    /// `None` when no page was asked for. Unparseable or zero pages mean page 1.
    pub fn page(&self) -> Option<u32> {
        let val = self.non_blank("page")?;
        match val.parse() {
            Ok(0) | Err(_) => Some(1),
            Ok(page) => Some(page),
        }
    }

    /// `Err` carries the unknown type name.
    pub fn content_type(&self) -> Result<Option<ContentType>, String> {
        match self.non_blank("content_type") {
            None => Ok(None),
            Some(val) => val.parse().map(Some),
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.non_blank("category").filter(|c| *c != ALL_CATEGORIES)
    }

    /// Published items of the requested type and category.
    pub fn to_filter(&self) -> Result<ContentFilter, String> {
        Ok(ContentFilter {
            content_type: self.content_type()?,
            category: self.category().map(|c| c.to_string()),
            ..ContentFilter::published()
        })
    }

    fn non_blank(&self, key: &str) -> Option<&str> {
        self.items.get(key)
            .map(|val| val.trim())
            .filter(|val| !val.is_empty())
    }
}
