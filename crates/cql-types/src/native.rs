//! The closed set of CQL column types this layer can emit.

/// Machine tag for a CQL column type.
///
/// `Custom` is not a wire type: it marks a value outside the native set,
/// and every surface that produces schema text or wire values rewrites it
/// to `varchar` carrying JSON, or rejects it where no text fallback exists
/// (map components).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
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
    Custom,
}

impl NativeType {
    /// Canonical lowercase CQL schema name, or `None` for `Custom`.
    pub fn schema_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Varchar => "varchar",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::Blob => "blob",
            Self::Counter => "counter",
            Self::Custom => return None,
        })
    }

    /// Whether this tag names a real wire type.
    pub fn is_native(self) -> bool {
        !matches!(self, Self::Custom)
    }
}
