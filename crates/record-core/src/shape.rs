//! Record shape descriptors and the process-wide shape-metadata cache.
//!
//! A record type declares its exposed fields once through [`Record::shape`].
//! The first translation touching the type builds a [`ShapeMetadata`] from
//! that descriptor and caches it keyed by [`TypeId`]; every later call for
//! the same type returns the shared instance without recomputation.

use crate::error::MappingError;
use crate::values::{FieldKind, Value};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// One declared field of a record shape.
///
/// `column` overrides the exposed key, the way a struct tag would in other
/// ecosystems; when absent the declared field name is used. Fields the
/// record author wants hidden from the store are simply left out of the
/// descriptor.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Declared field name.
    pub name: &'static str,
    /// Explicit key override. Empty or absent falls back to `name`.
    pub column: Option<&'static str>,
    /// Declared field type.
    pub kind: FieldKind,
}

/// A typed record that can be translated to and from a generic mapping.
///
/// Implementations are mechanical: `shape` lists the exposed fields in
/// declaration order, `get` reads the field at an ordinal as a [`Value`],
/// and `set` writes a coerced [`Value`] back. The translator guarantees the
/// value handed to `set` already matches the declared [`FieldKind`] (or is
/// [`Value::Null`]).
pub trait Record: 'static {
    /// The record's declared fields, in declaration order.
    fn shape() -> &'static [FieldSpec]
    where
        Self: Sized;

    /// Read the field at `ordinal` as a dynamic value.
    fn get(&self, ordinal: usize) -> Value;

    /// Write a coerced value into the field at `ordinal`.
    fn set(&mut self, ordinal: usize, value: Value) -> Result<(), MappingError>;
}

/// Resolved metadata for one field: exposed key, position, declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Exposed key, exactly as emitted into mappings.
    pub key: String,
    /// Position of the field in its declaring shape.
    pub ordinal: usize,
    /// Declared field type.
    pub kind: FieldKind,
}

/// Immutable per-shape metadata: key lookup plus declaration-order walk.
#[derive(Debug)]
pub struct ShapeMetadata {
    /// Lowercased exposed key -> index into `ordered`.
    by_key: HashMap<String, usize>,
    /// Fields in declaration order.
    ordered: Vec<FieldInfo>,
}

impl ShapeMetadata {
    /// Build metadata from a shape descriptor.
    ///
    /// Panics on a duplicate case-insensitive key: two fields whose exposed
    /// keys differ only by case indicate a broken record declaration and
    /// must not be silently merged.
    fn build(record: &'static str, shape: &[FieldSpec]) -> Self {
        let mut by_key = HashMap::with_capacity(shape.len());
        let mut ordered = Vec::with_capacity(shape.len());
        for (ordinal, field) in shape.iter().enumerate() {
            let key = match field.column {
                Some(column) if !column.is_empty() => column,
                _ => field.name,
            };
            if by_key.insert(key.to_lowercase(), ordinal).is_some() {
                panic!("duplicate column key '{key}' in record {record}");
            }
            ordered.push(FieldInfo {
                key: key.to_string(),
                ordinal,
                kind: field.kind.clone(),
            });
        }
        Self { by_key, ordered }
    }

    /// Look up a field by its exposed key, case-insensitively.
    pub fn field(&self, key: &str) -> Option<&FieldInfo> {
        self.by_key
            .get(&key.to_lowercase())
            .map(|&index| &self.ordered[index])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.ordered
    }

    /// Number of exposed fields.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the shape exposes no fields.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn cache() -> &'static RwLock<HashMap<TypeId, Arc<ShapeMetadata>>> {
    static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<ShapeMetadata>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get the cached metadata for a record type, building it on first access.
///
/// Reads take the read lock only; a miss builds the metadata outside any
/// lock and then inserts under the write lock. Two threads racing on the
/// same cold shape both build equal metadata, and the first insert wins.
pub fn shape_metadata<T: Record>() -> Arc<ShapeMetadata> {
    let id = TypeId::of::<T>();
    if let Some(metadata) = cache().read().expect("shape cache lock poisoned").get(&id) {
        return Arc::clone(metadata);
    }

    let record = std::any::type_name::<T>();
    let built = Arc::new(ShapeMetadata::build(record, T::shape()));
    tracing::debug!(record, fields = built.len(), "built shape metadata");

    let mut shapes = cache().write().expect("shape cache lock poisoned");
    Arc::clone(shapes.entry(id).or_insert(built))
}

/// Empty the process-wide shape cache.
///
/// The cache is bounded by the number of distinct record types in a running
/// process and is never evicted in normal operation; this exists for tests
/// that need a cold cache.
pub fn clear_shape_cache() {
    cache()
        .write()
        .expect("shape cache lock poisoned")
        .clear();
}
