//! CQL type inference over the dynamic value universe.
//!
//! Three pure functions cover the whole surface:
//!
//! - [`classify`] - map a value to its [`NativeType`] tag
//! - [`type_name`] - produce the schema type string (`int`, `list<varchar>`,
//!   `map<uuid, bigint>`, ...)
//! - [`wire_value`] - produce the wire-ready value, JSON-encoding anything
//!   in the custom bucket to varchar text
//!
//! Values in the custom bucket are stored as JSON text, so a `list<T>` of
//! custom elements becomes a list of JSON strings and its schema type is
//! `list<varchar>`. Maps get no such fallback: generic key serialization is
//! not well defined, so a map with a custom component is an error.

use crate::native::NativeType;
use record_core::{MappingError, Value};
use thiserror::Error;

/// Error during type inference or wire-value preparation.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A map component falls in the custom bucket; maps cannot degrade to
    /// the JSON-text fallback.
    #[error("unsupported map component types: map<{key:?}, {value:?}> has no native representation")]
    UnsupportedMap {
        /// Classification of the map's keys.
        key: NativeType,
        /// Classification of the map's values.
        value: NativeType,
    },

    /// JSON encoding of a custom value failed.
    #[error("failed to JSON-encode custom value: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The value has no JSON representation (e.g. a non-scalar map key).
    #[error("value has no JSON representation: {0}")]
    Unrepresentable(#[from] MappingError),
}

/// Classify a value into its native column type.
///
/// Blobs are matched before any list handling: a byte sequence is a scalar,
/// never a generic list. Lists classify by their element (first element
/// under the homogeneity assumption; an empty list has no observable
/// element type and classifies `Custom`). Maps carry two component types
/// and no single scalar tag, so they classify `Custom` here; [`type_name`]
/// and [`wire_value`] handle their components explicitly. Custom payloads
/// that are JSON scalars fall back to classification by JSON kind, the
/// equivalent of matching an unlisted type by its underlying kind.
pub fn classify(value: &Value) -> NativeType {
    match value {
        Value::Blob(_) => NativeType::Blob,
        Value::Int(_) => NativeType::Int,
        Value::BigInt(_) => NativeType::BigInt,
        Value::Varchar(_) => NativeType::Varchar,
        Value::Float(_) => NativeType::Float,
        Value::Double(_) => NativeType::Double,
        Value::Boolean(_) => NativeType::Boolean,
        Value::Timestamp(_) => NativeType::Timestamp,
        Value::Uuid(_) => NativeType::Uuid,
        Value::Counter(_) => NativeType::Counter,
        Value::List(items) => items.first().map_or(NativeType::Custom, classify),
        Value::Map(_) | Value::Null => NativeType::Custom,
        Value::Custom(json) => classify_json(json),
    }
}

/// Kind-level fallback classification for opaque JSON payloads.
fn classify_json(json: &serde_json::Value) -> NativeType {
    match json {
        serde_json::Value::Bool(_) => NativeType::Boolean,
        serde_json::Value::String(_) => NativeType::Varchar,
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => NativeType::Int,
            Some(_) => NativeType::BigInt,
            None => NativeType::Double,
        },
        _ => NativeType::Custom,
    }
}

/// Produce the schema type string for a value.
///
/// `Custom` classifications are rewritten to `varchar` (the JSON-text
/// fallback) for scalars and list elements. Maps fail when either
/// component classifies `Custom`.
pub fn type_name(value: &Value) -> Result<String, TypeError> {
    match value {
        Value::Blob(_) => Ok("blob".to_string()),
        Value::List(items) => {
            let elem = items.first().map_or(NativeType::Custom, classify);
            Ok(format!("list<{}>", column_name(elem)))
        }
        Value::Map(pairs) => {
            let (key, val) = map_component_types(pairs);
            if !key.is_native() || !val.is_native() {
                return Err(TypeError::UnsupportedMap { key, value: val });
            }
            Ok(format!(
                "map<{}, {}>",
                column_name(key),
                column_name(val)
            ))
        }
        other => Ok(column_name(classify(other)).to_string()),
    }
}

/// Prepare a value for the wire.
///
/// Scalars in the custom bucket become JSON text; lists of custom elements
/// become lists of JSON texts (any single element failure aborts); native
/// lists, native-component maps and everything else pass through
/// unchanged. Null stays null.
pub fn wire_value(value: Value) -> Result<Value, TypeError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Blob(_) => Ok(value),
        Value::List(items) => {
            if items.first().map_or(NativeType::Custom, classify).is_native() {
                return Ok(Value::List(items));
            }
            let count = items.len();
            let encoded = items
                .into_iter()
                .map(|item| encode_custom(&item).map(Value::Varchar))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::trace!(count, "encoded custom list elements as JSON text");
            Ok(Value::List(encoded))
        }
        Value::Map(pairs) => {
            let (key, val) = map_component_types(&pairs);
            if !key.is_native() || !val.is_native() {
                return Err(TypeError::UnsupportedMap { key, value: val });
            }
            Ok(Value::Map(pairs))
        }
        Value::Custom(json) => match classify_json(&json) {
            NativeType::Custom => Ok(Value::Varchar(serde_json::to_string(&json)?)),
            // A JSON-scalar payload classifies as a native type; hand the
            // store the matching native value rather than opaque text.
            _ => Ok(native_from_json(json)?),
        },
        other => Ok(other),
    }
}

/// Component classifications of a map, from its first pair.
///
/// An empty map exposes no component types and reports both as `Custom`,
/// which the callers turn into the unsupported-map error.
fn map_component_types(pairs: &[(Value, Value)]) -> (NativeType, NativeType) {
    pairs
        .first()
        .map_or((NativeType::Custom, NativeType::Custom), |(k, v)| {
            (classify(k), classify(v))
        })
}

/// Schema name with the custom-to-varchar rewrite applied.
fn column_name(t: NativeType) -> &'static str {
    t.schema_name().unwrap_or("varchar")
}

/// JSON-encode one custom-bucket value to its wire text.
fn encode_custom(value: &Value) -> Result<String, TypeError> {
    match value {
        Value::Custom(json) => Ok(serde_json::to_string(json)?),
        other => {
            let json = other.to_json()?;
            Ok(serde_json::to_string(&json)?)
        }
    }
}

/// Lift a JSON scalar payload into the matching native value.
fn native_from_json(json: serde_json::Value) -> Result<Value, TypeError> {
    Ok(match json {
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::String(s) => Value::Varchar(s),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(i) => Value::Int(i),
                Err(_) => Value::BigInt(i),
            },
            None => match n.as_f64() {
                Some(f) => Value::Double(f),
                None => Value::Varchar(n.to_string()),
            },
        },
        other => Value::Varchar(serde_json::to_string(&other)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize)]
    struct Opaque {
        a: i32,
    }

    fn opaque(a: i32) -> Value {
        Value::custom(&Opaque { a }).unwrap()
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify(&Value::Int(42)), NativeType::Int);
        assert_eq!(classify(&Value::BigInt(42)), NativeType::BigInt);
        assert_eq!(classify(&Value::Varchar("x".into())), NativeType::Varchar);
        assert_eq!(classify(&Value::Float(1.0)), NativeType::Float);
        assert_eq!(classify(&Value::Double(3.14)), NativeType::Double);
        assert_eq!(classify(&Value::Boolean(true)), NativeType::Boolean);
        assert_eq!(classify(&Value::Timestamp(Utc::now())), NativeType::Timestamp);
        assert_eq!(classify(&Value::Uuid(Uuid::new_v4())), NativeType::Uuid);
        assert_eq!(classify(&Value::Blob(vec![1, 2])), NativeType::Blob);
        assert_eq!(
            classify(&Value::Counter(record_core::Counter(1))),
            NativeType::Counter
        );
        assert_eq!(classify(&opaque(1)), NativeType::Custom);
    }

    #[test]
    fn test_json_kind_fallback() {
        // JSON-scalar payloads classify by their underlying kind.
        assert_eq!(classify(&Value::Custom(serde_json::json!(5))), NativeType::Int);
        assert_eq!(
            classify(&Value::Custom(serde_json::json!(1_i64 << 40))),
            NativeType::BigInt
        );
        assert_eq!(
            classify(&Value::Custom(serde_json::json!(2.5))),
            NativeType::Double
        );
        assert_eq!(
            classify(&Value::Custom(serde_json::json!("s"))),
            NativeType::Varchar
        );
        assert_eq!(
            classify(&Value::Custom(serde_json::json!(true))),
            NativeType::Boolean
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&Value::Int(1)).unwrap(), "int");
        assert_eq!(type_name(&Value::Blob(vec![1])).unwrap(), "blob");
        assert_eq!(
            type_name(&Value::List(vec![Value::BigInt(1)])).unwrap(),
            "list<bigint>"
        );
        // Custom scalars and custom list elements fall back to varchar.
        assert_eq!(type_name(&opaque(1)).unwrap(), "varchar");
        assert_eq!(
            type_name(&Value::List(vec![opaque(1), opaque(2)])).unwrap(),
            "list<varchar>"
        );
        assert_eq!(
            type_name(&Value::Map(vec![(
                Value::Uuid(Uuid::new_v4()),
                Value::BigInt(1)
            )]))
            .unwrap(),
            "map<uuid, bigint>"
        );
    }

    #[test]
    fn test_map_with_custom_component_is_rejected() {
        let map = Value::Map(vec![(opaque(1), Value::Int(1))]);
        assert!(matches!(
            type_name(&map),
            Err(TypeError::UnsupportedMap { .. })
        ));
        assert!(matches!(
            wire_value(map),
            Err(TypeError::UnsupportedMap { .. })
        ));
    }

    #[test]
    fn test_wire_value_passthrough() {
        assert_eq!(wire_value(Value::Null).unwrap(), Value::Null);
        assert_eq!(wire_value(Value::Int(5)).unwrap(), Value::Int(5));
        assert_eq!(
            wire_value(Value::Blob(vec![9])).unwrap(),
            Value::Blob(vec![9])
        );

        let native_list = Value::List(vec![Value::Varchar("a".into())]);
        assert_eq!(wire_value(native_list.clone()).unwrap(), native_list);

        let native_map = Value::Map(vec![(Value::Varchar("k".into()), Value::Int(1))]);
        assert_eq!(wire_value(native_map.clone()).unwrap(), native_map);
    }

    #[test]
    fn test_wire_value_custom_scalar_becomes_json_text() {
        let wired = wire_value(opaque(7)).unwrap();
        assert_eq!(wired, Value::Varchar(r#"{"a":7}"#.to_string()));
    }

    #[test]
    fn test_wire_value_custom_list_becomes_json_texts() {
        let source = Value::List(vec![opaque(1), opaque(2), opaque(3)]);
        let wired = wire_value(source).unwrap();
        let items = wired.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Value::Varchar(r#"{"a":1}"#.to_string()));
        assert_eq!(items[2], Value::Varchar(r#"{"a":3}"#.to_string()));
    }

    #[test]
    fn test_wire_value_normalizes_json_scalar_payloads() {
        assert_eq!(
            wire_value(Value::Custom(serde_json::json!(5))).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            wire_value(Value::Custom(serde_json::json!("text"))).unwrap(),
            Value::Varchar("text".to_string())
        );
    }

    #[test]
    fn test_empty_collections() {
        // An empty list has no observable element type; it still gets the
        // varchar fallback name and passes the wire untouched.
        assert_eq!(type_name(&Value::List(vec![])).unwrap(), "list<varchar>");
        assert_eq!(
            wire_value(Value::List(vec![])).unwrap(),
            Value::List(vec![])
        );
        // An empty map exposes neither component type.
        assert!(matches!(
            type_name(&Value::Map(vec![])),
            Err(TypeError::UnsupportedMap { .. })
        ));
    }
}
