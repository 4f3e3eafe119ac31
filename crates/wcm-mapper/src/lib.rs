//! Bidirectional mapping between typed records and wide-column rows.
//!
//! A [`RecordMapper`] turns any [`Record`] into a [`Row`] (an encoded row key
//! plus a family/qualifier/timestamp cell map) and turns rows back into
//! records. Single-version fields are written at [`LATEST_TIMESTAMP`] and read
//! from the newest cell; multi-version fields carry their whole timestamp
//! history in both directions.
//!
//! # Key Types
//!
//! - [`RecordMapper`] -- the conversion engine, shared across threads
//! - [`MapperConfig`] -- codec selection, loadable from TOML
//! - [`MapperError`] / [`ErrorKind`] -- conversion failures and their class
//!
//! Schema and codec types are re-exported so applications depend on this
//! crate alone.

pub mod config;
pub mod error;
pub mod mapper;

#[cfg(test)]
mod fixtures;

pub use config::{CodecKind, MapperConfig};
pub use error::{ErrorKind, MapperError, MapperResult};
pub use mapper::RecordMapper;

pub use wcm_codec::{
    BestFitCodec, CellValue, Codec, CodecError, CodecOptions, ColumnType, JsonCodec, NativeType,
    ValueType, SERIALIZE_AS_STRING,
};
pub use wcm_schema::{
    Column, ColumnFamily, FieldSet, Record, SchemaDescriptor, SchemaError, TableDecl, Versioning,
};
pub use wcm_types::{Cell, CellMap, Decimal, Row, LATEST_TIMESTAMP};
