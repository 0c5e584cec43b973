// Response envelope handling - `{ok, data}` or a bare payload
use crate::application::parking_repository::{CollectionKind, FetchError};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn rejection(map: &serde_json::Map<String, Value>) -> Option<FetchError> {
    if map.get("ok") != Some(&Value::Bool(false)) {
        return None;
    }
    let message = map
        .get("error")
        .or_else(|| map.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("ok=false")
        .to_string();
    Some(FetchError::Rejected(message))
}

/// Pull the record list out of a collection response. Shapes other than a
/// bare array or an object with a `data` array yield an empty list.
pub fn unwrap_collection(kind: CollectionKind, body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(err) = rejection(&map) {
                return Err(err);
            }
            match map.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                _ => {
                    tracing::warn!("Unexpected {} response shape, treating as empty", kind);
                    Ok(Vec::new())
                }
            }
        }
        _ => {
            tracing::warn!("Unexpected {} response shape, treating as empty", kind);
            Ok(Vec::new())
        }
    }
}

/// Pull a single object out of `{ok, data: {...}}`, or return a bare object.
pub fn unwrap_object(body: Value) -> Result<Value, FetchError> {
    match body {
        Value::Object(mut map) => {
            if let Some(err) = rejection(&map) {
                return Err(err);
            }
            match map.remove("data") {
                Some(data @ Value::Object(_)) => Ok(data),
                Some(other) => {
                    map.insert("data".to_string(), other);
                    Ok(Value::Object(map))
                }
                None => Ok(Value::Object(map)),
            }
        }
        other => Err(FetchError::Decode(format!("expected an object, got {other}"))),
    }
}

/// Decode each record on its own; records that don't fit are dropped.
pub fn decode_records<T: DeserializeOwned>(kind: CollectionKind, items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            "Skipped {} of {} {} records that could not be decoded",
            total - records.len(),
            total,
            kind
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::User;
    use serde_json::json;

    #[test]
    fn test_unwrap_collection_shapes() {
        let kind = CollectionKind::Users;
        assert_eq!(unwrap_collection(kind, json!([1, 2])).unwrap().len(), 2);
        assert_eq!(
            unwrap_collection(kind, json!({"ok": true, "data": [1, 2, 3]})).unwrap().len(),
            3
        );
        assert_eq!(unwrap_collection(kind, json!({"data": []})).unwrap().len(), 0);
        assert!(unwrap_collection(kind, json!({"ok": true, "data": {"users": []}})).unwrap().is_empty());
        assert!(unwrap_collection(kind, json!("nope")).unwrap().is_empty());
        assert!(unwrap_collection(kind, json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_unwrap_collection_rejected() {
        let err = unwrap_collection(
            CollectionKind::Reservations,
            json!({"ok": false, "error": "forbidden"}),
        )
        .unwrap_err();
        assert_eq!(err, FetchError::Rejected("forbidden".to_string()));
    }

    #[test]
    fn test_unwrap_object() {
        let inner = json!({"grossRevenue": 10.0});
        assert_eq!(unwrap_object(json!({"ok": true, "data": inner.clone()})).unwrap(), inner);
        assert_eq!(unwrap_object(inner.clone()).unwrap(), inner);
        assert!(unwrap_object(json!([1])).is_err());
        assert!(matches!(
            unwrap_object(json!({"ok": false, "message": "down"})),
            Err(FetchError::Rejected(m)) if m == "down"
        ));
    }

    #[test]
    fn test_decode_records_skips_malformed() {
        let items = vec![
            json!({"id": "u1"}),
            json!({"email": "missing-id@example.com"}),
            json!({"_id": "u2", "role": "admin"}),
        ];
        let users: Vec<User> = decode_records(CollectionKind::Users, items);
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[test]
    fn test_decode_records_with_both_id_keys() {
        let items = vec![json!({"_id": "u1", "id": "u1"}), json!({"_id": "u2", "id": "u2"})];
        let users: Vec<User> = decode_records(CollectionKind::Users, items);
        assert_eq!(users.len(), 2);
    }
}
