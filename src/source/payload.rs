use serde::Deserialize;
use serde_json::{Map, Value};

/// How a given endpoint wraps its collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// `[entry, entry, ...]`
    #[default]
    Array,
    /// `{"12": entry, "13": entry}`, either at the top level or under the
    /// container key (`{"found": 2, "posts": ...}`). A container holding a
    /// plain array is accepted too.
    Keyed,
    /// The `_envelope` wrapper: `{"status": 200, "headers": {...}, "body": [...]}`
    Envelope,
}

impl PayloadShape {
    /// Entries of the collection in source order, or `None` when the payload
    /// does not have this shape.
    pub fn entries(&self, payload: Value, container: &str) -> Option<Vec<Value>> {
        match self {
            PayloadShape::Array => match payload {
                Value::Array(items) => Some(items),
                _ => None,
            },
            PayloadShape::Keyed => {
                let Value::Object(mut map) = payload else {
                    return None;
                };
                match map.remove(container) {
                    Some(Value::Array(items)) => Some(items),
                    Some(Value::Object(inner)) => numeric_entries(inner),
                    Some(_) => None,
                    None => numeric_entries(map),
                }
            }
            PayloadShape::Envelope => {
                let Value::Object(mut map) = payload else {
                    return None;
                };
                let status = map.get("status").and_then(|s| s.as_u64()).unwrap_or(200);
                if !(200..300).contains(&status) {
                    return None;
                }
                match map.remove("body") {
                    Some(Value::Array(items)) => Some(items),
                    Some(Value::Object(inner)) => numeric_entries(inner),
                    _ => None,
                }
            }
        }
    }
}

/// Entries under numeric-string keys, ordered by their numeric value.
/// Other keys are ignored; `None` when there is no numeric key at all.
fn numeric_entries(map: Map<String, Value>) -> Option<Vec<Value>> {
    if map.is_empty() {
        return Some(vec![]);
    }

    let mut keyed: Vec<(u64, Value)> = map.into_iter()
        .filter_map(|(key, value)| key.parse::<u64>().ok().map(|n| (n, value)))
        .collect();
    if keyed.is_empty() {
        return None;
    }

    keyed.sort_by(|a, b| {
        let (ka, _) = a;
        let (kb, _) = b;
        ka.cmp(kb)
    });
    Some(keyed.into_iter().map(|(_k, v)| v).collect())
}
