//! Errors produced while translating between records and mappings.

use crate::values::FieldKind;
use thiserror::Error;

/// Error during record <-> mapping translation.
///
/// Every variant is local to a single field or value and aborts the enclosing
/// call. Duplicate-key shape errors are deliberately *not* represented here:
/// they indicate a broken record declaration and panic during metadata
/// construction instead (see [`crate::shape`]).
#[derive(Debug, Error)]
pub enum MappingError {
    /// No assignment rule matches the (target field kind, source value kind) pair.
    #[error("unhandled type pair for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Exposed key of the target field.
        field: String,
        /// Declared kind of the target field.
        expected: FieldKind,
        /// Kind of the source value.
        actual: FieldKind,
    },

    /// A numeric conversion would lose the value.
    #[error("value {value} does not fit field '{field}' of kind {expected}")]
    OutOfRange {
        /// Exposed key of the target field.
        field: String,
        /// Declared kind of the target field.
        expected: FieldKind,
        /// The out-of-range source value.
        value: i64,
    },

    /// A JSON-text list element failed to decode under [`DecodePolicy::Strict`].
    ///
    /// [`DecodePolicy::Strict`]: crate::mapping::DecodePolicy::Strict
    #[error("element {index} of field '{field}' is not valid JSON for its element kind: {reason}")]
    ElementDecode {
        /// Exposed key of the target field.
        field: String,
        /// Position of the offending element in the source list.
        index: usize,
        /// Decode failure description.
        reason: String,
    },

    /// JSON encode/decode failure while crossing the custom-value boundary.
    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A map key kind that cannot be represented as a JSON object key.
    #[error("map key of kind {0} cannot be represented as a JSON object key")]
    JsonMapKey(FieldKind),

    /// A `Record::set` implementation was handed an ordinal outside its shape.
    ///
    /// This indicates an internal inconsistency between a record's declared
    /// shape and its accessors, not bad input data.
    #[error("record {record} has no field at ordinal {ordinal}")]
    UnknownOrdinal {
        /// Type name of the record.
        record: &'static str,
        /// The out-of-shape ordinal.
        ordinal: usize,
    },
}
