//! Struct <-> mapping translation over [`Record`] shapes.
//!
//! A mapping is the generic interchange form between typed records and the
//! store client: key-unique, order-irrelevant. Translation is one-shot and
//! stateless per call; the only shared state touched is the shape-metadata
//! cache in [`crate::shape`].

use crate::error::MappingError;
use crate::shape::{shape_metadata, FieldInfo, Record};
use crate::values::{Counter, FieldKind, Value};
use std::collections::HashMap;

/// Generic key -> value interchange form.
pub type Mapping = HashMap<String, Value>;

/// Policy for JSON-text list elements that fail to decode.
///
/// The historical behavior is [`Lenient`](Self::Lenient): a bad element is
/// dropped and the resulting list is shorter than the source. Callers that
/// would rather fail loudly use [`Strict`](Self::Strict).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Drop undecodable elements, keeping the rest in source order.
    #[default]
    Lenient,
    /// Abort the whole call on the first undecodable element.
    Strict,
}

/// Convert a record to a generic mapping.
///
/// Emits one entry per exposed field, keyed by the field's exposed key.
/// Values are taken as-is; store-native type translation is the job of the
/// type-inference layer, invoked by callers separately.
pub fn to_mapping<T: Record>(record: &T) -> Mapping {
    let metadata = shape_metadata::<T>();
    let mut mapping = Mapping::with_capacity(metadata.len());
    for field in metadata.fields() {
        mapping.insert(field.key.clone(), record.get(field.ordinal));
    }
    mapping
}

/// Parallel-array view of the same data as [`to_mapping`], in declaration
/// order.
pub fn fields_and_values<T: Record>(record: &T) -> (Vec<String>, Vec<Value>) {
    let metadata = shape_metadata::<T>();
    let mut keys = Vec::with_capacity(metadata.len());
    let mut values = Vec::with_capacity(metadata.len());
    for field in metadata.fields() {
        keys.push(field.key.clone());
        values.push(record.get(field.ordinal));
    }
    (keys, values)
}

/// Convert a mapping back into a record, mutating `target` in place.
///
/// Uses the historical [`DecodePolicy::Lenient`] element-decode policy; see
/// [`from_mapping_with`] to choose.
pub fn from_mapping<T: Record>(mapping: &Mapping, target: &mut T) -> Result<(), MappingError> {
    from_mapping_with(mapping, target, DecodePolicy::default())
}

/// Convert a mapping back into a record with an explicit decode policy.
///
/// Keys are matched case-insensitively against the record's exposed keys;
/// entries with no matching field are skipped, which permits partial and
/// superset mappings. The first unassignable entry aborts the call with its
/// error; fields assigned before the failure keep their new values.
pub fn from_mapping_with<T: Record>(
    mapping: &Mapping,
    target: &mut T,
    policy: DecodePolicy,
) -> Result<(), MappingError> {
    let metadata = shape_metadata::<T>();
    for (key, value) in mapping {
        let Some(field) = metadata.field(key) else {
            tracing::trace!(key = %key, "mapping key not in record shape, skipped");
            continue;
        };
        let coerced = coerce(field, value.clone(), policy)?;
        target.set(field.ordinal, coerced)?;
    }
    Ok(())
}

/// Coerce a source value against a field's declared kind.
///
/// Null passes through untouched; the record implementation decides what an
/// absent value means for the field.
fn coerce(field: &FieldInfo, value: Value, policy: DecodePolicy) -> Result<Value, MappingError> {
    if value.is_null() {
        return Ok(value);
    }
    match (&field.kind, value) {
        (FieldKind::List(elem), Value::List(items)) => coerce_list(field, elem, items, policy),
        (kind, value) => coerce_scalar(field, kind, value),
    }
}

/// Element-wise list coercion, in rule order:
///
/// 1. every element already has the target element kind -> assign as-is;
/// 2. every element is scalar-convertible to the target element kind ->
///    rebuild the list converting each element;
/// 3. target element kind is not varchar but every element is a string ->
///    treat each string as a JSON-encoded element and decode it, applying
///    the [`DecodePolicy`] to failures;
/// 4. otherwise the pair is unhandled.
fn coerce_list(
    field: &FieldInfo,
    elem: &FieldKind,
    items: Vec<Value>,
    policy: DecodePolicy,
) -> Result<Value, MappingError> {
    if items
        .iter()
        .all(|item| item.kind().is_none_or(|kind| kind == *elem))
    {
        return Ok(Value::List(items));
    }

    if items.iter().all(|item| scalar_convertible(elem, item)) {
        let converted = items
            .into_iter()
            .map(|item| coerce_scalar(field, elem, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::List(converted));
    }

    if *elem != FieldKind::Varchar
        && items
            .iter()
            .all(|item| matches!(item, Value::Varchar(_) | Value::Null))
    {
        return decode_json_elements(field, elem, items, policy);
    }

    let actual = Value::List(items).kind().unwrap_or(FieldKind::Custom);
    Err(MappingError::TypeMismatch {
        field: field.key.clone(),
        expected: FieldKind::List(Box::new(elem.clone())),
        actual,
    })
}

/// Decode a list of JSON texts into values of the target element kind.
fn decode_json_elements(
    field: &FieldInfo,
    elem: &FieldKind,
    items: Vec<Value>,
    policy: DecodePolicy,
) -> Result<Value, MappingError> {
    let mut decoded = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Varchar(text) = item else {
            decoded.push(item); // nulls pass through
            continue;
        };
        let result = serde_json::from_str::<serde_json::Value>(&text)
            .map_err(MappingError::from)
            .and_then(|json| Value::from_json(elem, json));
        match (result, policy) {
            (Ok(value), _) => decoded.push(value),
            (Err(err), DecodePolicy::Lenient) => {
                tracing::debug!(
                    field = %field.key,
                    index,
                    error = %err,
                    "dropping undecodable list element"
                );
            }
            (Err(err), DecodePolicy::Strict) => {
                return Err(MappingError::ElementDecode {
                    field: field.key.clone(),
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(Value::List(decoded))
}

/// Whether a value can be scalar-converted to the target kind without a
/// JSON detour: either it already matches, or it sits in the same numeric
/// family.
fn scalar_convertible(target: &FieldKind, value: &Value) -> bool {
    if value.kind().is_none_or(|kind| kind == *target) {
        return true;
    }
    matches!(
        (target, value),
        (FieldKind::BigInt, Value::Int(_) | Value::Counter(_))
            | (FieldKind::Counter, Value::Int(_) | Value::BigInt(_))
            | (FieldKind::Int, Value::BigInt(_) | Value::Counter(_))
            | (FieldKind::Double, Value::Float(_))
    )
}

/// Scalar assignment: identical kind passes as-is; numeric-family pairs are
/// converted (narrowing is checked); anything else is an unhandled pair.
fn coerce_scalar(field: &FieldInfo, kind: &FieldKind, value: Value) -> Result<Value, MappingError> {
    let Some(actual) = value.kind() else {
        return Ok(value);
    };
    if actual == *kind {
        return Ok(value);
    }
    match (kind, value) {
        (FieldKind::BigInt, Value::Int(n)) => Ok(Value::BigInt(i64::from(n))),
        (FieldKind::BigInt, Value::Counter(Counter(n))) => Ok(Value::BigInt(n)),
        (FieldKind::Counter, Value::Int(n)) => Ok(Value::Counter(Counter(i64::from(n)))),
        (FieldKind::Counter, Value::BigInt(n)) => Ok(Value::Counter(Counter(n))),
        (FieldKind::Double, Value::Float(f)) => Ok(Value::Double(f64::from(f))),
        (FieldKind::Int, Value::BigInt(n)) => narrow_to_int(field, n),
        (FieldKind::Int, Value::Counter(Counter(n))) => narrow_to_int(field, n),
        _ => Err(MappingError::TypeMismatch {
            field: field.key.clone(),
            expected: kind.clone(),
            actual,
        }),
    }
}

fn narrow_to_int(field: &FieldInfo, value: i64) -> Result<Value, MappingError> {
    i32::try_from(value)
        .map(Value::Int)
        .map_err(|_| MappingError::OutOfRange {
            field: field.key.clone(),
            expected: FieldKind::Int,
            value,
        })
}
