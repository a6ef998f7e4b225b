//! Field addressing shared by store implementations.

use serde_json::Value;

use super::store_model::Selector;
use crate::constants::ID_FIELD;
use crate::errors::{Error, ValidationError};
use crate::Result;

/// Resolves a dotted path (`relationships.account.data._id`) inside a document.
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// True when every unique key is present in `record` and equal in the stored
/// document. `_id` compares against the document identity.
///
/// A record lacking any key never matches, so it is inserted.
pub fn matches_unique_keys(doc_id: &str, body: &Value, record: &Value, unique_keys: &[&str]) -> bool {
    if unique_keys.is_empty() {
        return false;
    }
    unique_keys.iter().all(|key| {
        let Some(expected) = value_at_path(record, key) else {
            return false;
        };
        if expected.is_null() {
            return false;
        }
        if *key == ID_FIELD {
            return expected.as_str() == Some(doc_id);
        }
        value_at_path(body, key) == Some(expected)
    })
}

pub fn matches_selector(doc_id: &str, body: &Value, selector: &Selector) -> bool {
    selector.iter().all(|(path, expected)| {
        if path == ID_FIELD {
            return expected.as_str() == Some(doc_id);
        }
        value_at_path(body, path) == Some(expected)
    })
}

/// Record body without its `_id`, as persisted.
pub fn strip_id(mut record: Value) -> Value {
    if let Some(obj) = record.as_object_mut() {
        obj.remove(ID_FIELD);
    }
    record
}

/// Persisted body with its identity put back.
pub fn with_id(mut body: Value, id: &str) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    }
    body
}

/// Rejects selectors that use fields outside the declared index.
pub fn validate_selector(index_fields: &[&str], selector: &Selector) -> Result<()> {
    if let Some(field) = selector
        .keys()
        .find(|k| !index_fields.contains(&k.as_str()))
    {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "selector field '{}' is not part of the index [{}]",
            field,
            index_fields.join(", ")
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::selector;
    use serde_json::json;

    fn history() -> Value {
        json!({
            "year": 2024,
            "relationships": {"account": {"data": {"_id": "acc-1", "_type": "bank.accounts"}}}
        })
    }

    #[test]
    fn test_value_at_path() {
        let doc = history();
        assert_eq!(value_at_path(&doc, "year"), Some(&json!(2024)));
        assert_eq!(
            value_at_path(&doc, "relationships.account.data._id"),
            Some(&json!("acc-1"))
        );
        assert_eq!(value_at_path(&doc, "relationships.missing._id"), None);
        assert_eq!(value_at_path(&doc, "year.nested"), None);
    }

    #[test]
    fn test_unique_key_match() {
        let body = json!({"number": "123", "label": "old"});
        assert!(matches_unique_keys("d1", &body, &json!({"number": "123"}), &["number"]));
        assert!(!matches_unique_keys("d1", &body, &json!({"number": "999"}), &["number"]));
        assert!(!matches_unique_keys("d1", &body, &json!({"label": "old"}), &["number"]));
        assert!(!matches_unique_keys("d1", &body, &json!({"number": "123"}), &[]));
    }

    #[test]
    fn test_id_key_matches_identity() {
        let body = json!({"year": 2024});
        assert!(matches_unique_keys("d1", &body, &json!({"_id": "d1"}), &["_id"]));
        assert!(!matches_unique_keys("d2", &body, &json!({"_id": "d1"}), &["_id"]));
        assert!(!matches_unique_keys("d1", &body, &json!({"year": 2024}), &["_id"]));
    }

    #[test]
    fn test_selector_validation() {
        let index = ["year", "relationships.account.data._id"];
        let ok = selector([("year", json!(2024))]);
        assert!(validate_selector(&index, &ok).is_ok());

        let bad = selector([("balances", json!({}))]);
        assert!(validate_selector(&index, &bad).is_err());
    }

    #[test]
    fn test_selector_match() {
        let doc = history();
        let s = selector([
            ("year", json!(2024)),
            ("relationships.account.data._id", json!("acc-1")),
        ]);
        assert!(matches_selector("h1", &doc, &s));
        let s = selector([("year", json!(2023))]);
        assert!(!matches_selector("h1", &doc, &s));
    }
}
