//! Value codecs for the wide-column mapper.
//!
//! A codec turns one field value into the bytes stored in a cell and back.
//! Field values cross the codec boundary as [`CellValue`]s; the field's
//! declared [`ValueType`] tells the codec what to decode into.
//!
//! # Codecs
//!
//! - [`BestFitCodec`] -- the default. Native types ([`NativeType`]) use the
//!   store's big-endian binary encodings, everything else is JSON. The
//!   [`SERIALIZE_AS_STRING`] flag switches native types to their UTF-8 text.
//! - [`JsonCodec`] -- structured values as JSON, natives in store bytes or
//!   (codec-wide) as text. Per-column flags are ignored.
//!
//! Custom codecs implement the [`Codec`] trait.
//!
//! # Rules
//!
//! 1. `None` serializes to `None`; `None` or empty bytes deserialize to `None`.
//! 2. Encoding is deterministic for identical input and options.
//! 3. Deserialization is the exact inverse of serialization for every
//!    supported type.
//! 4. Unknown option flags are ignored.

pub mod best_fit;
pub mod error;
pub mod json;
pub mod native;
pub mod options;
pub mod traits;
pub mod value;

pub use best_fit::BestFitCodec;
pub use error::{CodecError, CodecResult};
pub use json::JsonCodec;
pub use options::{BestFitOptions, CodecOptions, SERIALIZE_AS_STRING};
pub use traits::Codec;
pub use value::{CellValue, ColumnType, NativeType, ValueType};
