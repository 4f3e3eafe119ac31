use thiserror::Error;

/// A record type whose declaration cannot be mapped.
///
/// Every variant is a bug in the type definition, never in the data, so none
/// of them are worth retrying. Errors are cached by the registry and returned
/// unchanged on every later use of the same type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("record type {record} declares an empty table name")]
    EmptyTableName { record: String },

    #[error("record type {record} declares a column family with an empty name")]
    EmptyColumnFamily { record: String },

    #[error("record type {record} declares column family '{family}' more than once")]
    DuplicateColumnFamily { record: String, family: String },

    #[error("column family '{family}' of record type {record} must keep at least 1 version (got {versions})")]
    InvalidFamilyVersions {
        record: String,
        family: String,
        versions: u32,
    },

    #[error("record type {record} declares field '{field}' more than once")]
    DuplicateFieldName { record: String, field: String },

    #[error("field '{field}' of record type {record} is declared both single-version and multi-version")]
    ConflictingVersionMarkers { record: String, field: String },

    #[error("record type {record} does not declare a zero-argument constructor")]
    NoEmptyConstructor { record: String },

    #[error("record type {record} has no row key field")]
    MissingRowKeyField { record: String },

    #[error("record type {record} declares {count} row key fields, expected exactly one")]
    TooManyRowKeyFields { record: String, count: usize },

    #[error("row key field '{field}' of record type {record} is not a declared field")]
    UndeclaredRowKeyField { record: String, field: String },

    #[error("record type {record} has no fields mapped to columns")]
    MissingColumnFields { record: String },

    #[error("field '{field}' of record type {record} sets codec flag '{flag}' more than once")]
    DuplicateCodecFlag {
        record: String,
        field: String,
        flag: String,
    },

    #[error("field '{field}' of record type {record} is mapped to column '{family}:{column}' but family '{family}' is not declared on table '{table}'")]
    UndeclaredColumnFamily {
        record: String,
        field: String,
        table: String,
        family: String,
        column: String,
    },

    #[error("field '{field}' of record type {record} is transient and cannot be mapped to column '{column}'")]
    MappedColumnCantBeTransient {
        record: String,
        field: String,
        column: String,
    },

    #[error("field '{field}' of record type {record} is shared across instances and cannot be mapped to column '{column}'")]
    MappedColumnCantBeStatic {
        record: String,
        field: String,
        column: String,
    },

    #[error("field '{field}' of record type {record} has non-nullable type {type_name}; single-version columns must be Option<T>")]
    MappedColumnCantBePrimitive {
        record: String,
        field: String,
        type_name: String,
    },

    #[error("field '{field}' of record type {record} has type {type_name} which cannot hold multiple versions: {reason}")]
    IncompatibleMultiVersionField {
        record: String,
        field: String,
        type_name: String,
        reason: String,
    },

    #[error("field '{field}' of record type {record} has type {type_name} which codec '{codec}' does not support")]
    UnsupportedFieldType {
        record: String,
        field: String,
        type_name: String,
        codec: String,
    },

    #[error("fields '{other}' and '{field}' of record type {record} are both mapped to column '{column}'")]
    FieldsMappedToSameColumn {
        record: String,
        field: String,
        other: String,
        column: String,
    },
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
