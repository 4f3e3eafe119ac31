use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;
use wcm_codec::{Codec, CodecOptions, ColumnType, ValueType};

use crate::decl::{Column, ColumnFamily, FieldKind, FieldShape, MappedField, TableDecl};
use crate::descriptor::{FieldBinding, SchemaDescriptor, Versioning};
use crate::error::{SchemaError, SchemaResult};
use crate::field::VersionedShape;
use crate::traits::Record;

/// Turns a record type's [`TableDecl`] into a [`SchemaDescriptor`].
///
/// Checks run in a fixed order and the first failure is returned, so a given
/// declaration always produces the same error:
///
/// 1. table name and column families
/// 2. duplicate or conflicting field declarations
/// 3. constructor
/// 4. row key count, row key type and flags
/// 5. each mapped field in declaration order
/// 6. at least one mapped field
pub struct SchemaValidator {
    codec: Arc<dyn Codec>,
    warn_on_unknown_flags: bool,
}

impl SchemaValidator {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            warn_on_unknown_flags: true,
        }
    }

    /// Whether codec flags the codec does not recognize are logged.
    pub fn warn_on_unknown_flags(mut self, enabled: bool) -> Self {
        self.warn_on_unknown_flags = enabled;
        self
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Validate `R`'s declaration.
    pub fn validate<R: Record>(&self) -> SchemaResult<SchemaDescriptor<R>> {
        self.validate_decl(R::declare(), R::RowKey::value_type())
    }

    fn validate_decl<R: 'static>(
        &self,
        decl: TableDecl<R>,
        row_key_type: ValueType,
    ) -> SchemaResult<SchemaDescriptor<R>> {
        let record = std::any::type_name::<R>();
        let TableDecl {
            table,
            families,
            row_key_flags,
            constructor,
            fields,
        } = decl;

        check_table(record, &table, &families)?;
        check_field_names(record, &fields.fields)?;

        let constructor = constructor.ok_or_else(|| SchemaError::NoEmptyConstructor {
            record: record.to_string(),
        })?;

        let row_key_field = match fields.row_keys.as_slice() {
            [] => {
                return Err(SchemaError::MissingRowKeyField {
                    record: record.to_string(),
                })
            }
            [single] => single.clone(),
            many => {
                return Err(SchemaError::TooManyRowKeyFields {
                    record: record.to_string(),
                    count: many.len(),
                })
            }
        };
        if !fields.fields.iter().any(|f| f.name == row_key_field) {
            return Err(SchemaError::UndeclaredRowKeyField {
                record: record.to_string(),
                field: row_key_field,
            });
        }
        self.check_supported(record, &row_key_field, row_key_type, row_key_type.name())?;
        let row_key_options = self.codec_options(record, &row_key_field, row_key_flags)?;

        let declared: HashSet<&str> = families.iter().map(|f| f.name.as_str()).collect();
        let mut columns: HashMap<(String, String), String> = HashMap::new();
        let mut bindings = Vec::new();
        for decl in fields.fields {
            let FieldKind::Mapped(mapped) = decl.kind else {
                continue;
            };
            let binding = self.check_mapped(record, &table, &declared, decl.name, mapped)?;
            let key = (binding.family.clone(), binding.column.clone());
            if let Some(other) = columns.get(&key) {
                return Err(SchemaError::FieldsMappedToSameColumn {
                    record: record.to_string(),
                    field: binding.name,
                    other: other.clone(),
                    column: format!("{}:{}", key.0, key.1),
                });
            }
            columns.insert(key, binding.name.clone());
            bindings.push(binding);
        }

        if bindings.is_empty() {
            return Err(SchemaError::MissingColumnFields {
                record: record.to_string(),
            });
        }

        Ok(SchemaDescriptor {
            record_type: record,
            table,
            families,
            row_key_field,
            row_key_type,
            row_key_options,
            bindings,
            constructor,
        })
    }

    fn check_mapped<R>(
        &self,
        record: &str,
        table: &str,
        declared_families: &HashSet<&str>,
        name: String,
        mapped: MappedField<R>,
    ) -> SchemaResult<FieldBinding<R>> {
        let MappedField {
            column,
            versioning,
            value_type,
            type_name,
            shape,
            accessor,
        } = mapped;
        let Column {
            family,
            qualifier,
            flags,
            transient,
            shared,
            ..
        } = column;
        let options = self.codec_options(record, &name, flags)?;

        if !declared_families.contains(family.as_str()) {
            return Err(SchemaError::UndeclaredColumnFamily {
                record: record.to_string(),
                field: name,
                table: table.to_string(),
                family,
                column: qualifier,
            });
        }
        if transient {
            return Err(SchemaError::MappedColumnCantBeTransient {
                record: record.to_string(),
                field: name,
                column: format!("{family}:{qualifier}"),
            });
        }
        if shared {
            return Err(SchemaError::MappedColumnCantBeStatic {
                record: record.to_string(),
                field: name,
                column: format!("{family}:{qualifier}"),
            });
        }
        match shape {
            FieldShape::Single { nullable: false } => {
                return Err(SchemaError::MappedColumnCantBePrimitive {
                    record: record.to_string(),
                    field: name,
                    type_name: type_name.to_string(),
                });
            }
            FieldShape::Versioned(VersionedShape::Incompatible(reason)) => {
                return Err(SchemaError::IncompatibleMultiVersionField {
                    record: record.to_string(),
                    field: name,
                    type_name: type_name.to_string(),
                    reason: reason.to_string(),
                });
            }
            FieldShape::Single { nullable: true } | FieldShape::Versioned(VersionedShape::Timeline) => {}
        }
        self.check_supported(record, &name, value_type, type_name)?;

        Ok(FieldBinding {
            name,
            family,
            column: qualifier,
            versioning,
            options,
            value_type,
            accessor,
        })
    }

    fn check_supported(
        &self,
        record: &str,
        field: &str,
        value_type: ValueType,
        type_name: &str,
    ) -> SchemaResult<()> {
        if self.codec.supports(value_type) {
            return Ok(());
        }
        Err(SchemaError::UnsupportedFieldType {
            record: record.to_string(),
            field: field.to_string(),
            type_name: type_name.to_string(),
            codec: self.codec.name().to_string(),
        })
    }

    /// Collect a field's flags, rejecting repeats and logging unknown names.
    fn codec_options(
        &self,
        record: &str,
        field: &str,
        flags: Vec<(String, String)>,
    ) -> SchemaResult<CodecOptions> {
        let mut options = CodecOptions::new();
        for (name, value) in flags {
            if options.get(&name).is_some() {
                return Err(SchemaError::DuplicateCodecFlag {
                    record: record.to_string(),
                    field: field.to_string(),
                    flag: name,
                });
            }
            if self.warn_on_unknown_flags && !self.codec.recognized_flags().contains(&name.as_str()) {
                warn!(
                    record,
                    field,
                    flag = %name,
                    codec = self.codec.name(),
                    "codec flag is not recognized and will be ignored"
                );
            }
            options.insert(name, value);
        }
        Ok(options)
    }
}

fn check_table(record: &str, table: &str, families: &[ColumnFamily]) -> SchemaResult<()> {
    if table.trim().is_empty() {
        return Err(SchemaError::EmptyTableName {
            record: record.to_string(),
        });
    }
    let mut seen = HashSet::new();
    for family in families {
        if family.name.trim().is_empty() {
            return Err(SchemaError::EmptyColumnFamily {
                record: record.to_string(),
            });
        }
        if !seen.insert(family.name.as_str()) {
            return Err(SchemaError::DuplicateColumnFamily {
                record: record.to_string(),
                family: family.name.clone(),
            });
        }
        if family.versions == 0 {
            return Err(SchemaError::InvalidFamilyVersions {
                record: record.to_string(),
                family: family.name.clone(),
                versions: family.versions,
            });
        }
    }
    Ok(())
}

fn check_field_names<R>(record: &str, fields: &[crate::decl::FieldDecl<R>]) -> SchemaResult<()> {
    let mut seen: HashMap<&str, Option<Versioning>> = HashMap::new();
    for field in fields {
        let mode = match &field.kind {
            FieldKind::Mapped(m) => Some(m.versioning),
            FieldKind::Unmapped => None,
        };
        match seen.insert(field.name.as_str(), mode) {
            None => {}
            Some(Some(previous)) if mode.is_some_and(|m| m != previous) => {
                return Err(SchemaError::ConflictingVersionMarkers {
                    record: record.to_string(),
                    field: field.name.clone(),
                });
            }
            Some(_) => {
                return Err(SchemaError::DuplicateFieldName {
                    record: record.to_string(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use wcm_codec::{BestFitCodec, CellValue, CodecResult, NativeType, SERIALIZE_AS_STRING};

    use super::*;
    use crate::decl::FieldSet;

    #[derive(Default)]
    struct Emp {
        id: Option<String>,
        name: Option<String>,
        sal: Option<i32>,
        age: i32,
        score: Option<BTreeMap<i64, f64>>,
        ranks: Option<HashMap<i64, f64>>,
        tags: Option<BTreeMap<String, f64>>,
        thread: Option<Handle>,
        audit: Audit,
    }

    #[derive(Default)]
    struct Audit {
        by: Option<String>,
    }

    /// A type no built-in codec can store.
    #[derive(Default)]
    struct Handle;

    impl ColumnType for Handle {
        fn value_type() -> ValueType {
            ValueType::Opaque("Handle")
        }

        fn to_cell_value(&self) -> CodecResult<CellValue> {
            Ok(CellValue::Bool(true))
        }

        fn from_cell_value(_value: CellValue) -> CodecResult<Self> {
            Ok(Handle)
        }
    }

    fn validator() -> SchemaValidator {
        SchemaValidator::new(Arc::new(BestFitCodec))
    }

    fn base() -> TableDecl<Emp> {
        TableDecl::new("employees")
            .family("main", 1)
            .family("optional", 3)
            .constructor(|| Ok(Emp::default()))
            .row_key("id")
            .field("id")
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name)
    }

    fn check(decl: TableDecl<Emp>) -> SchemaResult<SchemaDescriptor<Emp>> {
        validator().validate_decl(decl, ValueType::Native(NativeType::String))
    }

    #[test]
    fn valid_declaration() {
        let decl = base()
            .column(
                Column::new("sal", "main", "sal").flag(SERIALIZE_AS_STRING, "true"),
                |e| &e.sal,
                |e| &mut e.sal,
            )
            .multi_version(
                Column::new("score", "optional", "score"),
                |e| &e.score,
                |e| &mut e.score,
            )
            .field("age");
        let desc = check(decl).unwrap();
        assert_eq!(desc.table(), "employees");
        assert_eq!(desc.row_key_field(), "id");
        assert_eq!(desc.field_names(), vec!["name", "sal", "score"]);
        assert_eq!(desc.binding("score").unwrap().versioning(), Versioning::Multi);
        assert!(desc.binding("sal").unwrap().options().is_true(SERIALIZE_AS_STRING));
        assert_eq!(desc.column_families().get("optional"), Some(&3));
    }

    #[test]
    fn embedded_fields_are_bound() {
        let part = FieldSet::<Audit>::new().column(
            Column::new("by", "main", "by"),
            |a| &a.by,
            |a| &mut a.by,
        );
        let desc = check(base().embed(part, |e| &e.audit, |e| &mut e.audit)).unwrap();
        assert_eq!(desc.field_names(), vec!["name", "by"]);
    }

    #[test]
    fn table_checks() {
        let err = check(TableDecl::new(" ").family("main", 1)).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyTableName { .. }));
        let err = check(base().family("", 1)).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyColumnFamily { .. }));
        let err = check(base().family("main", 2)).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumnFamily { ref family, .. } if family == "main"));
        let err = check(base().family("cold", 0)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFamilyVersions { versions: 0, .. }));
    }

    #[test]
    fn missing_and_extra_row_keys() {
        let decl = TableDecl::<Emp>::new("employees")
            .family("main", 1)
            .constructor(|| Ok(Emp::default()))
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::MissingRowKeyField { .. }
        ));
        assert!(matches!(
            check(base().row_key("name")).unwrap_err(),
            SchemaError::TooManyRowKeyFields { count: 2, .. }
        ));
    }

    #[test]
    fn row_key_must_name_a_field() {
        let decl = TableDecl::<Emp>::new("employees")
            .family("main", 1)
            .constructor(|| Ok(Emp::default()))
            .row_key("emp_id")
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name);
        let err = check(decl).unwrap_err();
        assert!(matches!(err, SchemaError::UndeclaredRowKeyField { ref field, .. } if field == "emp_id"));
        assert!(err.to_string().contains("'emp_id'"));

        let mapped = TableDecl::<Emp>::new("employees")
            .family("main", 1)
            .constructor(|| Ok(Emp::default()))
            .row_key("name")
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name);
        assert_eq!(check(mapped).unwrap().row_key_field(), "name");
    }

    #[test]
    fn no_constructor() {
        let decl = TableDecl::<Emp>::new("employees")
            .family("main", 1)
            .row_key("id")
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::NoEmptyConstructor { .. }
        ));
    }

    #[test]
    fn no_columns() {
        let decl = TableDecl::<Emp>::new("employees")
            .family("main", 1)
            .constructor(|| Ok(Emp::default()))
            .row_key("id")
            .field("id")
            .field("name");
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::MissingColumnFields { .. }
        ));
    }

    #[test]
    fn conflicting_and_duplicate_names() {
        let decl = base().multi_version(
            Column::new("name", "optional", "name"),
            |e| &e.score,
            |e| &mut e.score,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::ConflictingVersionMarkers { ref field, .. } if field == "name"
        ));
        let decl = base().column(Column::new("name", "main", "alias"), |e| &e.name, |e| &mut e.name);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::DuplicateFieldName { .. }
        ));
    }

    #[test]
    fn modifiers_rejected() {
        let decl = base().column(
            Column::new("sal", "main", "sal").transient(),
            |e| &e.sal,
            |e| &mut e.sal,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::MappedColumnCantBeTransient { ref column, .. } if column == "main:sal"
        ));
        let decl = base().column(
            Column::new("sal", "main", "sal").shared(),
            |e| &e.sal,
            |e| &mut e.sal,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::MappedColumnCantBeStatic { .. }
        ));
    }

    #[test]
    fn same_column_twice() {
        let decl = base().column(Column::new("sal", "main", "name"), |e| &e.sal, |e| &mut e.sal);
        let err = check(decl).unwrap_err();
        assert_eq!(
            err,
            SchemaError::FieldsMappedToSameColumn {
                record: std::any::type_name::<Emp>().to_string(),
                field: "sal".into(),
                other: "name".into(),
                column: "main:name".into(),
            }
        );
    }

    #[test]
    fn undeclared_family() {
        let decl = base().column(Column::new("sal", "depts", "sal"), |e| &e.sal, |e| &mut e.sal);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::UndeclaredColumnFamily { ref family, .. } if family == "depts"
        ));
    }

    #[test]
    fn primitive_single_version() {
        let decl = base().column(Column::new("age", "main", "age"), |e| &e.age, |e| &mut e.age);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::MappedColumnCantBePrimitive { ref type_name, .. } if type_name == "i32"
        ));
    }

    #[test]
    fn incompatible_multi_version() {
        let decl = base().multi_version(
            Column::new("ranks", "optional", "ranks"),
            |e| &e.ranks,
            |e| &mut e.ranks,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::IncompatibleMultiVersionField { .. }
        ));
        let decl = base().multi_version(
            Column::new("tags", "optional", "tags"),
            |e| &e.tags,
            |e| &mut e.tags,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::IncompatibleMultiVersionField { .. }
        ));
        let decl = base().multi_version(Column::new("sal", "main", "sal"), |e| &e.sal, |e| &mut e.sal);
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::IncompatibleMultiVersionField { .. }
        ));
    }

    #[test]
    fn unsupported_types() {
        let decl = base().column(
            Column::new("thread", "main", "thread"),
            |e| &e.thread,
            |e| &mut e.thread,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::UnsupportedFieldType { ref codec, .. } if codec == "best-fit"
        ));
        let err = validator()
            .validate_decl(base(), ValueType::Opaque("Handle"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedFieldType { ref field, .. } if field == "id"));
    }

    #[test]
    fn duplicate_flags() {
        let decl = base().column(
            Column::new("sal", "main", "sal")
                .flag(SERIALIZE_AS_STRING, "true")
                .flag(SERIALIZE_AS_STRING, "false"),
            |e| &e.sal,
            |e| &mut e.sal,
        );
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::DuplicateCodecFlag { ref flag, .. } if flag == SERIALIZE_AS_STRING
        ));
        let decl = base().row_key_flag("x", "1").row_key_flag("x", "2");
        assert!(matches!(
            check(decl).unwrap_err(),
            SchemaError::DuplicateCodecFlag { ref field, .. } if field == "id"
        ));
    }

    #[test]
    fn unknown_flags_are_accepted() {
        let decl = base().column(
            Column::new("sal", "main", "sal").flag("compress", "true"),
            |e| &e.sal,
            |e| &mut e.sal,
        );
        let desc = check(decl).unwrap();
        assert_eq!(desc.binding("sal").unwrap().options().get("compress"), Some("true"));
    }

    #[test]
    fn same_declaration_same_error() {
        let make = || base().column(Column::new("age", "main", "age"), |e| &e.age, |e| &mut e.age);
        let first = check(make()).unwrap_err();
        let second = check(make()).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
