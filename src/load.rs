//! Bulk loading of serialized key-value documents.
//!
//! The loader parses a JSON object and inserts one entry per member, in
//! document order.  The map makes no assumption relating insertion order to
//! key order, and each insertion is independently atomic with respect to
//! tree shape, so a well-formed document always yields a fully-loaded map.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::ScapegoatMap;

/// Loads a key-value document from a reader.
///
/// # Errors
/// Returns a [`LoadError`] when the document cannot be read or parsed, or
/// when its top-level value is not an object.
pub fn load_document<R: Read>(reader: R) -> Result<ScapegoatMap<String, Value>, LoadError> {
    build(serde_json::from_reader(reader)?)
}

/// Loads a key-value document from a string.
///
/// # Examples
/// ```
/// let m = scapegoat_collections::load_str(r#"{"b": 1, "a": 2}"#).unwrap();
/// assert_eq!(m.len(), 2);
/// assert!(m.keys().map(String::as_str).eq(["a", "b"]));
/// ```
pub fn load_str(text: &str) -> Result<ScapegoatMap<String, Value>, LoadError> {
    build(serde_json::from_str(text)?)
}

/// Loads a key-value document from a file.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<ScapegoatMap<String, Value>, LoadError> {
    let file = File::open(path)?;
    load_document(BufReader::new(file))
}

fn build(doc: Value) -> Result<ScapegoatMap<String, Value>, LoadError> {
    let Value::Object(entries) = doc else {
        return Err(LoadError::NotAnObject);
    };

    // serde_json's preserve_order feature keeps the member order of the
    // document, so insertion happens in document order, not key order.
    let mut map = ScapegoatMap::new();
    for (key, value) in entries {
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loads_entries_in_document_order() {
        let map = load_str(r#"{"m": 1, "a": 2, "z": 3}"#).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.keys().map(String::as_str).eq(["a", "m", "z"]));
        assert_eq!(map.get(&"m".to_string()), Some(&Value::from(1)));
        assert_eq!(map.get(&"z".to_string()), Some(&Value::from(3)));
    }

    #[test]
    fn nested_values_are_preserved() {
        let map = load_str(r#"{"ep": {"title": "t", "n": 16}}"#).unwrap();
        let ep = map.get(&"ep".to_string()).unwrap();
        assert_eq!(ep["title"], Value::from("t"));
        assert_eq!(ep["n"], Value::from(16));
    }

    #[test]
    fn duplicate_members_keep_the_last_value() {
        let map = load_str(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"a".to_string()), Some(&Value::from(2)));
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(matches!(load_str("[1, 2]"), Err(LoadError::NotAnObject)));
        assert!(matches!(load_str("42"), Err(LoadError::NotAnObject)));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(load_str("{"), Err(LoadError::Parse(_))));
        assert!(matches!(load_str(""), Err(LoadError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_path("/nonexistent/kv.json"),
            Err(LoadError::Io(_))
        ));
    }
}
