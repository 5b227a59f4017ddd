//! Core record/value types and the struct <-> mapping translator.
//!
//! This crate bridges typed records in application code with the generic,
//! dynamically-typed mappings a column store client works with:
//!
//! - [`Value`] - the closed dynamic value universe, with one opaque
//!   [`Value::Custom`] fallback for everything outside it
//! - [`Record`] - the per-type shape descriptor a record registers once
//! - [`shape_metadata`] - the process-wide, lazily populated shape cache
//! - [`to_mapping`] / [`from_mapping`] / [`fields_and_values`] - one-shot
//!   translation between a record instance and a [`Mapping`]
//!
//! # Architecture
//!
//! ```text
//! record-core (this crate)
//!    │
//!    └─── cql-types   (classifies Values into CQL column types and
//!                      prepares wire-ready values)
//! ```
//!
//! # Example
//!
//! ```rust
//! use record_core::{FieldKind, FieldSpec, MappingError, Record, Value};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for User {
//!     fn shape() -> &'static [FieldSpec] {
//!         const SHAPE: &[FieldSpec] = &[
//!             FieldSpec { name: "Id", column: Some("id"), kind: FieldKind::BigInt },
//!             FieldSpec { name: "Name", column: Some("name"), kind: FieldKind::Varchar },
//!         ];
//!         SHAPE
//!     }
//!
//!     fn get(&self, ordinal: usize) -> Value {
//!         match ordinal {
//!             0 => Value::BigInt(self.id),
//!             1 => Value::Varchar(self.name.clone()),
//!             _ => Value::Null,
//!         }
//!     }
//!
//!     fn set(&mut self, ordinal: usize, value: Value) -> Result<(), MappingError> {
//!         match (ordinal, value) {
//!             (_, Value::Null) => {}
//!             (0, Value::BigInt(id)) => self.id = id,
//!             (1, Value::Varchar(name)) => self.name = name,
//!             (ordinal, _) => {
//!                 return Err(MappingError::UnknownOrdinal { record: "User", ordinal })
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let user = User { id: 7, name: "Ada".into() };
//! let mapping = record_core::to_mapping(&user);
//! assert_eq!(mapping["name"], Value::Varchar("Ada".into()));
//! ```

pub mod error;
pub mod mapping;
pub mod shape;
pub mod values;

// Re-exports for convenience
pub use error::MappingError;
pub use mapping::{
    fields_and_values, from_mapping, from_mapping_with, to_mapping, DecodePolicy, Mapping,
};
pub use shape::{clear_shape_cache, shape_metadata, FieldInfo, FieldSpec, Record, ShapeMetadata};
pub use values::{Counter, FieldKind, Value};
