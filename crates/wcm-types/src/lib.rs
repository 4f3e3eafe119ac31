//! Foundation types for the wide-column mapper (WCM).
//!
//! A wide-column store addresses every value by four coordinates: row key,
//! column family, column qualifier and timestamp. This crate provides the
//! in-memory shapes of that model shared by every other WCM crate.
//!
//! # Key Types
//!
//! - [`CellMap`] -- `family → qualifier → timestamp → value`, the nested form a row takes
//! - [`Row`] -- a row key together with its [`CellMap`]
//! - [`Cell`] -- one flattened `(row, family, qualifier, timestamp, value)` coordinate
//! - [`Decimal`] -- arbitrary-scale decimal used as a native column type
//! - [`LATEST_TIMESTAMP`] -- timestamp sentinel for "the current version"

pub mod cell;
pub mod decimal;
pub mod error;

pub use cell::{Cell, CellMap, QualifierMap, Row, VersionMap, LATEST_TIMESTAMP};
pub use decimal::Decimal;
pub use error::TypeError;
