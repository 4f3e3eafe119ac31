use std::fmt;

use wcm_codec::CodecError;
use wcm_schema::SchemaError;
use wcm_types::TypeError;

/// Broad classes of mapper failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The record type's declaration is wrong; fix the type.
    Schema,
    /// The record or the stored row holds bad data.
    Data,
    /// The mapper configuration could not be loaded.
    Config,
}

/// Errors from converting records to rows and back.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// The record type failed validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A field value could not be encoded or decoded.
    #[error("codec error on field '{field}': {source}")]
    Codec {
        field: String,
        #[source]
        source: CodecError,
    },

    /// `compose_row_key` failed.
    #[error("row key could not be composed: {0}")]
    RowKeyCantBeComposed(String),

    /// `compose_row_key` returned nothing, or the key encoded to no bytes.
    #[error("row key cannot be empty")]
    RowKeyCantBeEmpty,

    /// `parse_row_key` rejected a decoded key.
    #[error("row key {key} could not be parsed: {reason}")]
    RowKeyCouldNotBeParsed { key: String, reason: String },

    /// The declared constructor failed.
    #[error("record type {record} could not be instantiated: {reason}")]
    NotInstantiable { record: String, reason: String },

    /// Every mapped field was absent, so there is nothing to write.
    #[error("all mapped fields of record type {record} are null")]
    AllFieldsNull { record: String },

    /// A multi-version field held an empty map.
    #[error("multi-version field '{field}' cannot be an empty map")]
    EmptyMultiVersionField { field: String },

    /// Flat cells could not be assembled into one row.
    #[error("malformed cells: {0}")]
    MalformedCells(#[from] TypeError),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MapperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Schema,
            Self::Config(_) => ErrorKind::Config,
            Self::Codec { .. }
            | Self::RowKeyCantBeComposed(_)
            | Self::RowKeyCantBeEmpty
            | Self::RowKeyCouldNotBeParsed { .. }
            | Self::NotInstantiable { .. }
            | Self::AllFieldsNull { .. }
            | Self::EmptyMultiVersionField { .. }
            | Self::MalformedCells(_) => ErrorKind::Data,
        }
    }

    pub(crate) fn codec(field: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            field: field.into(),
            source,
        }
    }
}

impl PartialEq for MapperError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for MapperError {}

/// Result alias for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;
