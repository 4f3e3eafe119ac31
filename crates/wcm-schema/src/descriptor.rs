use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wcm_codec::{CodecOptions, ValueType};

use crate::decl::ColumnFamily;
use crate::field::Accessor;

/// How many versions of a column a field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Versioning {
    /// The latest version only, written at `LATEST_TIMESTAMP`.
    Single,
    /// Every version, keyed by timestamp.
    Multi,
}

/// One record field bound to a `(family, column)` pair.
pub struct FieldBinding<R> {
    pub(crate) name: String,
    pub(crate) family: String,
    pub(crate) column: String,
    pub(crate) versioning: Versioning,
    pub(crate) options: CodecOptions,
    pub(crate) value_type: ValueType,
    pub(crate) accessor: Accessor<R>,
}

impl<R> FieldBinding<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn versioning(&self) -> Versioning {
        self.versioning
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Type of one stored value (for multi-version fields, of one version).
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn accessor(&self) -> &Accessor<R> {
        &self.accessor
    }
}

impl<R> fmt::Debug for FieldBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("column", &format_args!("{}:{}", self.family, self.column))
            .field("versioning", &self.versioning)
            .field("value_type", &self.value_type)
            .field("options", &self.options)
            .finish()
    }
}

/// The validated mapping of one record type. Immutable once built.
pub struct SchemaDescriptor<R> {
    pub(crate) record_type: &'static str,
    pub(crate) table: String,
    pub(crate) families: Vec<ColumnFamily>,
    pub(crate) row_key_field: String,
    pub(crate) row_key_type: ValueType,
    pub(crate) row_key_options: CodecOptions,
    pub(crate) bindings: Vec<FieldBinding<R>>,
    pub(crate) constructor: fn() -> anyhow::Result<R>,
}

impl<R> SchemaDescriptor<R> {
    /// Rust type name of the record.
    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Declared column families, in declaration order.
    pub fn families(&self) -> &[ColumnFamily] {
        &self.families
    }

    /// Family name to the number of versions the table keeps.
    pub fn column_families(&self) -> BTreeMap<String, u32> {
        self.families
            .iter()
            .map(|f| (f.name.clone(), f.versions))
            .collect()
    }

    pub fn row_key_field(&self) -> &str {
        &self.row_key_field
    }

    pub fn row_key_type(&self) -> ValueType {
        self.row_key_type
    }

    pub fn row_key_options(&self) -> &CodecOptions {
        &self.row_key_options
    }

    /// Column bindings in declaration order.
    pub fn bindings(&self) -> &[FieldBinding<R>] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&FieldBinding<R>> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Names of the mapped fields in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.name.as_str()).collect()
    }

    /// Create an empty record through the declared constructor.
    pub fn instantiate(&self) -> anyhow::Result<R> {
        (self.constructor)()
    }
}

impl<R> fmt::Debug for SchemaDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("record_type", &self.record_type)
            .field("table", &self.table)
            .field("families", &self.families)
            .field("row_key_field", &self.row_key_field)
            .field("row_key_type", &self.row_key_type)
            .field("bindings", &self.bindings)
            .finish()
    }
}
