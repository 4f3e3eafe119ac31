//! Declaration builders: how a record type describes its table and fields.
//!
//! Nothing here is checked when it is built. The
//! [`SchemaValidator`](crate::SchemaValidator) consumes a [`TableDecl`] and
//! reports the first problem it finds.

use std::fmt;

use serde::{Deserialize, Serialize};
use wcm_codec::ValueType;

use crate::descriptor::Versioning;
use crate::field::{Accessor, SingleField, VersionedField, VersionedShape};

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Where a field is stored, plus its per-field modifiers and codec flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub(crate) field: String,
    pub(crate) family: String,
    pub(crate) qualifier: String,
    pub(crate) flags: Vec<(String, String)>,
    pub(crate) transient: bool,
    pub(crate) shared: bool,
}

impl Column {
    /// Map field `field` to column `family:qualifier`.
    pub fn new(
        field: impl Into<String>,
        family: impl Into<String>,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            flags: Vec::new(),
            transient: false,
            shared: false,
        }
    }

    /// Attach a codec flag.
    pub fn flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.push((name.into(), value.into()));
        self
    }

    /// Mark the field as transient (excluded from persistence).
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Mark the field as shared by every instance of the type.
    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.qualifier)
    }
}

/// A column family and the number of versions the table keeps for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamily {
    pub name: String,
    pub versions: u32,
}

// ---------------------------------------------------------------------------
// Field declarations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldShape {
    Single { nullable: bool },
    Versioned(VersionedShape),
}

pub(crate) struct MappedField<R> {
    pub column: Column,
    pub versioning: Versioning,
    pub value_type: ValueType,
    pub type_name: &'static str,
    pub shape: FieldShape,
    pub accessor: Accessor<R>,
}

pub(crate) enum FieldKind<R> {
    Mapped(MappedField<R>),
    Unmapped,
}

pub(crate) struct FieldDecl<R> {
    pub name: String,
    pub kind: FieldKind<R>,
}

impl<R: 'static> FieldDecl<R> {
    fn embed_in<O: 'static>(self, get: fn(&O) -> &R, get_mut: fn(&mut O) -> &mut R) -> FieldDecl<O> {
        let kind = match self.kind {
            FieldKind::Mapped(m) => FieldKind::Mapped(MappedField {
                column: m.column,
                versioning: m.versioning,
                value_type: m.value_type,
                type_name: m.type_name,
                shape: m.shape,
                accessor: m.accessor.embed_in(get, get_mut),
            }),
            FieldKind::Unmapped => FieldKind::Unmapped,
        };
        FieldDecl {
            name: self.name,
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// FieldSet
// ---------------------------------------------------------------------------

/// An ordered list of field declarations for type `R`.
///
/// A `FieldSet` on its own describes a reusable part (a struct embedded in
/// several records); [`TableDecl`] wraps one for the record itself.
pub struct FieldSet<R> {
    pub(crate) fields: Vec<FieldDecl<R>>,
    pub(crate) row_keys: Vec<String>,
}

impl<R: 'static> FieldSet<R> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            row_keys: Vec::new(),
        }
    }

    /// Name the field the row key is composed from. The name must also be
    /// declared as a field, mapped or not.
    pub fn row_key(mut self, field: impl Into<String>) -> Self {
        self.row_keys.push(field.into());
        self
    }

    /// Declare a single-version column field.
    pub fn column<V: SingleField>(
        mut self,
        column: Column,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: column.field.clone(),
            kind: FieldKind::Mapped(MappedField {
                column,
                versioning: Versioning::Single,
                value_type: V::value_type(),
                type_name: std::any::type_name::<V>(),
                shape: FieldShape::Single {
                    nullable: V::NULLABLE,
                },
                accessor: Accessor::single(get, get_mut),
            }),
        });
        self
    }

    /// Declare a multi-version column field.
    pub fn multi_version<V: VersionedField>(
        mut self,
        column: Column,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: column.field.clone(),
            kind: FieldKind::Mapped(MappedField {
                column,
                versioning: Versioning::Multi,
                value_type: V::value_type(),
                type_name: std::any::type_name::<V>(),
                shape: FieldShape::Versioned(V::shape()),
                accessor: Accessor::versions(get, get_mut),
            }),
        });
        self
    }

    /// Declare a field that is not stored.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            kind: FieldKind::Unmapped,
        });
        self
    }

    /// Append the fields of an embedded part, reached through `get`/`get_mut`.
    pub fn embed<P: 'static>(
        mut self,
        part: FieldSet<P>,
        get: fn(&R) -> &P,
        get_mut: fn(&mut R) -> &mut P,
    ) -> Self {
        self.fields
            .extend(part.fields.into_iter().map(|f| f.embed_in(get, get_mut)));
        self.row_keys.extend(part.row_keys);
        self
    }

    /// Number of declared fields, mapped or not.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R: 'static> Default for FieldSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TableDecl
// ---------------------------------------------------------------------------

/// Everything a record type declares about its table.
pub struct TableDecl<R> {
    pub(crate) table: String,
    pub(crate) families: Vec<ColumnFamily>,
    pub(crate) row_key_flags: Vec<(String, String)>,
    pub(crate) constructor: Option<fn() -> anyhow::Result<R>>,
    pub(crate) fields: FieldSet<R>,
}

impl<R: 'static> TableDecl<R> {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            families: Vec::new(),
            row_key_flags: Vec::new(),
            constructor: None,
            fields: FieldSet::new(),
        }
    }

    /// Declare a column family keeping up to `versions` versions per cell.
    pub fn family(mut self, name: impl Into<String>, versions: u32) -> Self {
        self.families.push(ColumnFamily {
            name: name.into(),
            versions,
        });
        self
    }

    /// Attach a codec flag used when encoding and decoding the row key.
    pub fn row_key_flag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.row_key_flags.push((name.into(), value.into()));
        self
    }

    /// The zero-argument constructor used to instantiate records on read.
    pub fn constructor(mut self, constructor: fn() -> anyhow::Result<R>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn row_key(mut self, field: impl Into<String>) -> Self {
        self.fields = self.fields.row_key(field);
        self
    }

    pub fn column<V: SingleField>(
        mut self,
        column: Column,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        self.fields = self.fields.column(column, get, get_mut);
        self
    }

    pub fn multi_version<V: VersionedField>(
        mut self,
        column: Column,
        get: fn(&R) -> &V,
        get_mut: fn(&mut R) -> &mut V,
    ) -> Self {
        self.fields = self.fields.multi_version(column, get, get_mut);
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields = self.fields.field(name);
        self
    }

    pub fn embed<P: 'static>(
        mut self,
        part: FieldSet<P>,
        get: fn(&R) -> &P,
        get_mut: fn(&mut R) -> &mut P,
    ) -> Self {
        self.fields = self.fields.embed(part, get, get_mut);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn families(&self) -> &[ColumnFamily] {
        &self.families
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Audit {
        created_by: Option<String>,
    }

    #[derive(Default)]
    struct Doc {
        id: Option<String>,
        title: Option<String>,
        audit: Audit,
    }

    fn audit_fields() -> FieldSet<Audit> {
        FieldSet::new().column(
            Column::new("created_by", "meta", "created_by"),
            |a| &a.created_by,
            |a| &mut a.created_by,
        )
    }

    #[test]
    fn column_builder() {
        let col = Column::new("sal", "main", "sal").flag("serializeAsString", "true");
        assert_eq!(col.to_string(), "main:sal");
        assert_eq!(col.flags, vec![("serializeAsString".into(), "true".into())]);
        assert!(!col.transient && !col.shared);
        assert!(col.clone().transient().transient);
        assert!(col.shared().shared);
    }

    #[test]
    fn declaration_order_is_kept() {
        let decl = TableDecl::<Doc>::new("docs")
            .family("main", 1)
            .row_key("id")
            .field("id")
            .column(Column::new("title", "main", "title"), |d| &d.title, |d| &mut d.title)
            .embed(audit_fields(), |d| &d.audit, |d| &mut d.audit);
        let names: Vec<_> = decl.fields.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "created_by"]);
        assert_eq!(decl.fields.row_keys, vec!["id".to_string()]);
        assert_eq!(decl.fields.len(), 3);
        assert_eq!(decl.table(), "docs");
    }

    #[test]
    fn shapes_are_captured() {
        let set = FieldSet::<Doc>::new()
            .column(Column::new("title", "main", "title"), |d| &d.title, |d| &mut d.title);
        let FieldKind::Mapped(m) = &set.fields[0].kind else {
            panic!("expected mapped field");
        };
        assert_eq!(m.shape, FieldShape::Single { nullable: true });
        assert_eq!(m.versioning, Versioning::Single);
        assert!(m.type_name.contains("Option"));
    }

    #[test]
    fn embedded_accessor_targets_part() {
        let set = FieldSet::<Doc>::new().embed(audit_fields(), |d| &d.audit, |d| &mut d.audit);
        let FieldKind::Mapped(m) = &set.fields[0].kind else {
            panic!("expected mapped field");
        };
        let Accessor::Single { write, .. } = &m.accessor else {
            panic!("expected single accessor");
        };
        let mut doc = Doc::default();
        write(&mut doc, Some(wcm_codec::CellValue::String("ops".into()))).unwrap();
        assert_eq!(doc.audit.created_by.as_deref(), Some("ops"));
        assert!(doc.id.is_none());
    }
}
