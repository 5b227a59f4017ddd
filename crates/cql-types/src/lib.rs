//! CQL column-type inference for record-core values.
//!
//! Given an arbitrary [`record_core::Value`], this crate answers the three
//! questions a schema/query layer needs before talking to the store:
//!
//! - [`classify`] - which native column type is this, if any?
//! - [`type_name`] - what schema type string should a DDL consumer declare?
//! - [`wire_value`] - what value actually goes on the wire? (custom-bucket
//!   values are JSON-encoded to varchar text)
//!
//! # Example
//!
//! ```rust
//! use cql_types::{classify, type_name, NativeType};
//! use record_core::Value;
//!
//! assert_eq!(classify(&Value::Int(42)), NativeType::Int);
//! assert_eq!(type_name(&Value::Int(42)).unwrap(), "int");
//! ```

pub mod infer;
pub mod native;

pub use infer::{classify, type_name, wire_value, TypeError};
pub use native::NativeType;
