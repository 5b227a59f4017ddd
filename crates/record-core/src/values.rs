//! The dynamic value universe shared between record shapes and store clients.
//!
//! [`Value`] is a closed tagged union covering exactly the column types the
//! store can hold natively, plus one opaque [`Value::Custom`] fallback that
//! carries an already-JSON-shaped payload. Application types outside the
//! native set enter the universe through [`Value::custom`] and leave it
//! through [`Value::decode`].

use crate::error::MappingError;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Marker type for counter columns.
///
/// Counters share their representation with `bigint` but are declared with a
/// distinct column type, so they get their own wrapper here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Counter(pub i64);

impl From<i64> for Counter {
    fn from(n: i64) -> Self {
        Self(n)
    }
}

/// Declared type of a record field.
///
/// This is the compile-time projection of the [`Value`] universe: record
/// shapes declare one `FieldKind` per field, and the mapping translator
/// coerces incoming values against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    BigInt,
    Varchar,
    Float,
    Double,
    Boolean,
    Timestamp,
    Uuid,
    Blob,
    Counter,
    List(Box<FieldKind>),
    Map(Box<FieldKind>, Box<FieldKind>),
    /// A field outside the native set, stored as a JSON payload.
    Custom,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::BigInt => write!(f, "bigint"),
            Self::Varchar => write!(f, "varchar"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Boolean => write!(f, "boolean"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Uuid => write!(f, "uuid"),
            Self::Blob => write!(f, "blob"),
            Self::Counter => write!(f, "counter"),
            Self::List(elem) => write!(f, "list<{elem}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Dynamic value exchanged between records and the store client.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent/unset value.
    Null,

    /// 32-bit signed integer.
    Int(i32),

    /// 64-bit signed integer.
    BigInt(i64),

    /// UTF-8 text.
    Varchar(String),

    /// 32-bit IEEE 754 floating point.
    Float(f32),

    /// 64-bit IEEE 754 floating point.
    Double(f64),

    /// Boolean value.
    Boolean(bool),

    /// Date/time with timezone.
    Timestamp(DateTime<Utc>),

    /// UUID (128-bit).
    Uuid(Uuid),

    /// Binary data. Blobs are scalars, never generic lists of bytes.
    Blob(Vec<u8>),

    /// Counter column value.
    Counter(Counter),

    /// Homogeneous list of values.
    List(Vec<Value>),

    /// Key/value pairs. `Value` holds floats and therefore is not `Eq`/`Hash`,
    /// so maps are pair lists rather than hash maps.
    Map(Vec<(Value, Value)>),

    /// Opaque fallback for types outside the native set.
    Custom(serde_json::Value),
}

impl Value {
    /// Wrap an arbitrary serializable value as the opaque custom fallback.
    pub fn custom<T: Serialize>(value: &T) -> Result<Self, MappingError> {
        Ok(Self::Custom(serde_json::to_value(value)?))
    }

    /// Decode this value back into a concrete type via its JSON shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, MappingError> {
        let json = match self {
            Self::Custom(json) => json.clone(),
            other => other.to_json()?,
        };
        serde_json::from_value(json).map_err(MappingError::from)
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an i64. Widens `Int` and unwraps `Counter`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::BigInt(i) => Some(*i),
            Self::Int(i) => Some(i64::from(*i)),
            Self::Counter(Counter(i)) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            Self::Float(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Varchar(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get this value as a UUID.
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Try to get this value as a timestamp.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(dt) => Some(dt),
            _ => None,
        }
    }

    /// Try to get this value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as map pairs.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The [`FieldKind`] projection of this value, or `None` for null.
    ///
    /// Lists and maps take their element kinds from the first element under
    /// the homogeneity assumption; an empty collection reports `Custom`
    /// elements because nothing observable constrains them.
    pub fn kind(&self) -> Option<FieldKind> {
        let kind = match self {
            Self::Null => return None,
            Self::Int(_) => FieldKind::Int,
            Self::BigInt(_) => FieldKind::BigInt,
            Self::Varchar(_) => FieldKind::Varchar,
            Self::Float(_) => FieldKind::Float,
            Self::Double(_) => FieldKind::Double,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Timestamp(_) => FieldKind::Timestamp,
            Self::Uuid(_) => FieldKind::Uuid,
            Self::Blob(_) => FieldKind::Blob,
            Self::Counter(_) => FieldKind::Counter,
            Self::List(items) => FieldKind::List(Box::new(
                items
                    .iter()
                    .find_map(Value::kind)
                    .unwrap_or(FieldKind::Custom),
            )),
            Self::Map(pairs) => {
                let key = pairs
                    .iter()
                    .find_map(|(k, _)| k.kind())
                    .unwrap_or(FieldKind::Custom);
                let value = pairs
                    .iter()
                    .find_map(|(_, v)| v.kind())
                    .unwrap_or(FieldKind::Custom);
                FieldKind::Map(Box::new(key), Box::new(value))
            }
            Self::Custom(_) => FieldKind::Custom,
        };
        Some(kind)
    }

    /// Convert this value into its JSON representation.
    ///
    /// Timestamps serialize as RFC 3339 strings, UUIDs as their canonical
    /// text form, blobs as byte arrays. Map keys are stringified; kinds with
    /// no sensible string form fail with [`MappingError::JsonMapKey`].
    pub fn to_json(&self) -> Result<serde_json::Value, MappingError> {
        Ok(match self {
            Self::Null => serde_json::Value::Null,
            Self::Int(i) => json!(i),
            Self::BigInt(i) => json!(i),
            Self::Varchar(s) => json!(s),
            Self::Float(f) => json!(f),
            Self::Double(f) => json!(f),
            Self::Boolean(b) => json!(b),
            Self::Timestamp(dt) => json!(dt.to_rfc3339()),
            Self::Uuid(u) => json!(u.to_string()),
            Self::Blob(bytes) => json!(bytes),
            Self::Counter(Counter(i)) => json!(i),
            Self::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Self::Map(pairs) => {
                let mut object = serde_json::Map::with_capacity(pairs.len());
                for (key, value) in pairs {
                    object.insert(key.json_key()?, value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
            Self::Custom(json) => json.clone(),
        })
    }

    /// Rebuild a value of the given kind from its JSON representation.
    ///
    /// This is the inverse of [`Value::to_json`], driven by the declared
    /// target kind because JSON alone cannot distinguish e.g. `int` from
    /// `counter` or a timestamp from plain text.
    pub fn from_json(kind: &FieldKind, json: serde_json::Value) -> Result<Self, MappingError> {
        if json.is_null() {
            return Ok(Self::Null);
        }
        match kind {
            FieldKind::Int => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Self::Int)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::BigInt => json
                .as_i64()
                .map(Self::BigInt)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Varchar => json
                .as_str()
                .map(|s| Self::Varchar(s.to_string()))
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Float => json
                .as_f64()
                .map(|f| Self::Float(f as f32))
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Double => json
                .as_f64()
                .map(Self::Double)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Boolean => json
                .as_bool()
                .map(Self::Boolean)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Timestamp => json
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Self::Timestamp(dt.with_timezone(&Utc)))
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Uuid => json
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(Self::Uuid)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Blob => json
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                        .collect::<Option<Vec<u8>>>()
                })
                .map(Self::Blob)
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::Counter => json
                .as_i64()
                .map(|n| Self::Counter(Counter(n)))
                .ok_or_else(|| decode_error(kind, &json)),
            FieldKind::List(elem) => match json {
                serde_json::Value::Array(items) => Ok(Self::List(
                    items
                        .into_iter()
                        .map(|item| Self::from_json(elem, item))
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                other => Err(decode_error(kind, &other)),
            },
            FieldKind::Map(key_kind, value_kind) => match json {
                serde_json::Value::Object(object) => {
                    let mut pairs = Vec::with_capacity(object.len());
                    for (raw_key, value) in object {
                        pairs.push((
                            key_from_str(key_kind, &raw_key)?,
                            Self::from_json(value_kind, value)?,
                        ));
                    }
                    Ok(Self::Map(pairs))
                }
                other => Err(decode_error(kind, &other)),
            },
            FieldKind::Custom => Ok(Self::Custom(json)),
        }
    }

    /// Stringify this value for use as a JSON object key.
    fn json_key(&self) -> Result<String, MappingError> {
        match self {
            Self::Varchar(s) => Ok(s.clone()),
            Self::Int(i) => Ok(i.to_string()),
            Self::BigInt(i) => Ok(i.to_string()),
            Self::Counter(Counter(i)) => Ok(i.to_string()),
            Self::Boolean(b) => Ok(b.to_string()),
            Self::Float(f) => Ok(f.to_string()),
            Self::Double(f) => Ok(f.to_string()),
            Self::Timestamp(dt) => Ok(dt.to_rfc3339()),
            Self::Uuid(u) => Ok(u.to_string()),
            other => Err(MappingError::JsonMapKey(
                other.kind().unwrap_or(FieldKind::Custom),
            )),
        }
    }
}

/// Rebuild a map key of the given kind from a JSON object key.
fn key_from_str(kind: &FieldKind, raw: &str) -> Result<Value, MappingError> {
    let parsed = match kind {
        FieldKind::Varchar => Some(Value::Varchar(raw.to_string())),
        FieldKind::Int => raw.parse().ok().map(Value::Int),
        FieldKind::BigInt => raw.parse().ok().map(Value::BigInt),
        FieldKind::Counter => raw.parse().ok().map(|n| Value::Counter(Counter(n))),
        FieldKind::Boolean => raw.parse().ok().map(Value::Boolean),
        FieldKind::Float => raw.parse().ok().map(Value::Float),
        FieldKind::Double => raw.parse().ok().map(Value::Double),
        FieldKind::Uuid => Uuid::parse_str(raw).ok().map(Value::Uuid),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| Value::Timestamp(dt.with_timezone(&Utc))),
        _ => return Err(MappingError::JsonMapKey(kind.clone())),
    };
    parsed.ok_or_else(|| {
        use serde::de::Error;
        MappingError::Json(serde_json::Error::custom(format!(
            "map key '{raw}' does not parse as {kind}"
        )))
    })
}

fn decode_error(kind: &FieldKind, json: &serde_json::Value) -> MappingError {
    use serde::de::Error;
    MappingError::Json(serde_json::Error::custom(format!(
        "JSON value {json} does not decode into {kind}"
    )))
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Varchar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Varchar(s)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Blob(bytes)
    }
}

impl From<Counter> for Value {
    fn from(c: Counter) -> Self {
        Self::Counter(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}
