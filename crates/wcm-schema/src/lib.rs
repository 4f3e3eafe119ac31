//! Record schemas for the wide-column mapper.
//!
//! A record type implements [`Record`] and describes its table in a
//! [`TableDecl`]: the table name, its column families, the row key field,
//! and one binding per mapped field. The [`SchemaValidator`] checks the
//! declaration and produces an immutable [`SchemaDescriptor`], which the
//! [`SchemaRegistry`] caches per type.
//!
//! # Key Types
//!
//! - [`Record`] -- implemented by every mapped type
//! - [`TableDecl`] / [`FieldSet`] / [`Column`] -- declaration builders
//! - [`SingleField`] / [`VersionedField`] -- which Rust types may be mapped
//! - [`SchemaDescriptor`] / [`FieldBinding`] -- the validated mapping
//! - [`SchemaRegistry`] -- validate-once cache shared across threads
//! - [`SchemaError`] -- every way a declaration can be rejected
//!
//! Parts shared by several records are declared once as a [`FieldSet`] and
//! embedded with [`TableDecl::embed`]; only embedded sets contribute fields.

pub mod decl;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod registry;
pub mod traits;
pub mod validator;

pub use decl::{Column, ColumnFamily, FieldSet, TableDecl};
pub use descriptor::{FieldBinding, SchemaDescriptor, Versioning};
pub use error::{SchemaError, SchemaResult};
pub use field::{Accessor, SingleField, VersionValue, VersionedField, VersionedShape};
pub use registry::SchemaRegistry;
pub use traits::Record;
pub use validator::SchemaValidator;
