//! Record types shared by the mapper tests.

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use wcm_codec::{CellValue, CodecResult, ColumnType, ValueType, SERIALIZE_AS_STRING};
use wcm_schema::{Column, FieldSet, Record, TableDecl};

use crate::error::MapperError;
use crate::mapper::RecordMapper;

// ---------------------------------------------------------------------------
// Valid records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub street: String,
}

wcm_codec::structured_column!(Address);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Audit {
    pub created_by: Option<String>,
}

pub fn audit_fields() -> FieldSet<Audit> {
    FieldSet::new().column(
        Column::new("created_by", "optional", "created_by"),
        |a| &a.created_by,
        |a| &mut a.created_by,
    )
}

/// Row key is `"{country}#{id}"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Employee {
    pub country: Option<String>,
    pub id: Option<i32>,
    pub name: Option<String>,
    pub sal: Option<i32>,
    pub pincode: Option<i32>,
    pub score: Option<BTreeMap<i64, Option<f64>>>,
    pub address: Option<Address>,
    pub notes: Option<String>,
    pub audit: Audit,
}

fn split_key(key: &str) -> anyhow::Result<(String, i32)> {
    let (country, id) = key
        .split_once('#')
        .ok_or_else(|| anyhow!("missing '#' separator"))?;
    Ok((country.to_string(), id.parse()?))
}

impl Record for Employee {
    type RowKey = String;

    fn declare() -> TableDecl<Self> {
        TableDecl::new("employees")
            .family("main", 1)
            .family("optional", 10)
            .constructor(|| Ok(Employee::default()))
            .row_key("id")
            .field("country")
            .field("id")
            .column(Column::new("name", "main", "name"), |e| &e.name, |e| &mut e.name)
            .column(Column::new("sal", "main", "sal"), |e| &e.sal, |e| &mut e.sal)
            .column(
                Column::new("pincode", "main", "pin").flag(SERIALIZE_AS_STRING, "true"),
                |e| &e.pincode,
                |e| &mut e.pincode,
            )
            .multi_version(
                Column::new("score", "optional", "score"),
                |e| &e.score,
                |e| &mut e.score,
            )
            .column(
                Column::new("address", "optional", "address"),
                |e| &e.address,
                |e| &mut e.address,
            )
            .field("notes")
            .embed(audit_fields(), |e| &e.audit, |e| &mut e.audit)
    }

    fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
        match (&self.country, self.id) {
            (None, _) => Ok(None),
            (Some(_), None) => bail!("employee id is missing"),
            (Some(country), Some(id)) => Ok(Some(format!("{country}#{id}"))),
        }
    }

    fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
        let (country, id) = split_key(&key)?;
        self.country = Some(country);
        self.id = Some(id);
        Ok(())
    }
}

/// Reads the `employees` table with `score` as a single-version column.
#[derive(Debug, Default)]
pub struct EmployeeLatest {
    pub country: Option<String>,
    pub id: Option<i32>,
    pub sal: Option<i32>,
    pub score: Option<f64>,
}

impl Record for EmployeeLatest {
    type RowKey = String;

    fn declare() -> TableDecl<Self> {
        TableDecl::new("employees")
            .family("main", 1)
            .family("optional", 10)
            .constructor(|| Ok(EmployeeLatest::default()))
            .row_key("id")
            .field("country")
            .field("id")
            .column(Column::new("sal", "main", "sal"), |e| &e.sal, |e| &mut e.sal)
            .column(Column::new("score", "optional", "score"), |e| &e.score, |e| &mut e.score)
    }

    fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .country
            .as_ref()
            .zip(self.id)
            .map(|(country, id)| format!("{country}#{id}")))
    }

    fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
        let (country, id) = split_key(&key)?;
        self.country = Some(country);
        self.id = Some(id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Uninstantiable {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Record for Uninstantiable {
    type RowKey = String;

    fn declare() -> TableDecl<Self> {
        TableDecl::new("singletons")
            .family("main", 1)
            .constructor(|| Err(anyhow!("singleton cannot be constructed")))
            .row_key("id")
            .field("id")
            .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name)
    }

    fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
        Ok(self.id.clone())
    }

    fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
        self.id = Some(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Invalid records
// ---------------------------------------------------------------------------

/// Reads `main:sal` of the `employees` table as a version history.
#[derive(Debug, Default)]
pub struct SalHistory {
    pub country: Option<String>,
    pub id: Option<i32>,
    pub sal: Option<BTreeMap<i64, i32>>,
}

impl Record for SalHistory {
    type RowKey = String;

    fn declare() -> TableDecl<Self> {
        TableDecl::new("employees")
            .family("main", 1)
            .family("optional", 10)
            .constructor(|| Ok(SalHistory::default()))
            .row_key("id")
            .field("country")
            .field("id")
            .multi_version(Column::new("sal", "main", "sal"), |e| &e.sal, |e| &mut e.sal)
    }

    fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .country
            .as_ref()
            .zip(self.id)
            .map(|(country, id)| format!("{country}#{id}")))
    }

    fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
        let (country, id) = split_key(&key)?;
        self.country = Some(country);
        self.id = Some(id);
        Ok(())
    }
}

/// A type no built-in codec can store.
#[derive(Debug, Default)]
pub struct Handle;

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

macro_rules! catalog_record {
    ($name:ident, $declare:expr) => {
        #[allow(dead_code)]
        #[derive(Debug, Default)]
        pub struct $name {
            pub id: Option<String>,
            pub name: Option<String>,
            pub age: i32,
            pub score: Option<BTreeMap<i64, f64>>,
            pub ranks: Option<HashMap<i64, f64>>,
            pub handle: Option<Handle>,
        }

        impl Record for $name {
            type RowKey = String;

            fn declare() -> TableDecl<Self> {
                let declare: fn(TableDecl<Self>) -> TableDecl<Self> = $declare;
                declare(TableDecl::new("catalog").family("main", 1).field("id"))
            }

            fn compose_row_key(&self) -> anyhow::Result<Option<String>> {
                Ok(self.id.clone())
            }

            fn parse_row_key(&mut self, key: String) -> anyhow::Result<()> {
                self.id = Some(key);
                Ok(())
            }
        }
    };
}

catalog_record!(NoRowKey, |t| t
    .constructor(|| Ok(NoRowKey::default()))
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name));

catalog_record!(TwoRowKeys, |t| t
    .constructor(|| Ok(TwoRowKeys::default()))
    .row_key("id")
    .row_key("name")
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name));

catalog_record!(UndeclaredKeyField, |t| t
    .constructor(|| Ok(UndeclaredKeyField::default()))
    .row_key("code")
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name));

catalog_record!(NoColumns, |t| t
    .constructor(|| Ok(NoColumns::default()))
    .row_key("id")
    .field("name"));

catalog_record!(BothMarkers, |t| t
    .constructor(|| Ok(BothMarkers::default()))
    .row_key("id")
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name)
    .multi_version(Column::new("name", "main", "names"), |r| &r.score, |r| &mut r.score));

catalog_record!(TransientColumn, |t| t
    .constructor(|| Ok(TransientColumn::default()))
    .row_key("id")
    .column(
        Column::new("name", "main", "name").transient(),
        |r| &r.name,
        |r| &mut r.name
    ));

catalog_record!(SharedColumn, |t| t
    .constructor(|| Ok(SharedColumn::default()))
    .row_key("id")
    .column(Column::new("name", "main", "name").shared(), |r| &r.name, |r| &mut r.name));

catalog_record!(SameColumn, |t| t
    .constructor(|| Ok(SameColumn::default()))
    .row_key("id")
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name)
    .multi_version(Column::new("score", "main", "name"), |r| &r.score, |r| &mut r.score));

catalog_record!(UndeclaredFamily, |t| t
    .constructor(|| Ok(UndeclaredFamily::default()))
    .row_key("id")
    .column(Column::new("name", "extra", "name"), |r| &r.name, |r| &mut r.name));

catalog_record!(PrimitiveColumn, |t| t
    .constructor(|| Ok(PrimitiveColumn::default()))
    .row_key("id")
    .column(Column::new("age", "main", "age"), |r| &r.age, |r| &mut r.age));

catalog_record!(UnorderedVersions, |t| t
    .constructor(|| Ok(UnorderedVersions::default()))
    .row_key("id")
    .multi_version(Column::new("ranks", "main", "ranks"), |r| &r.ranks, |r| &mut r.ranks));

catalog_record!(OpaqueColumn, |t| t
    .constructor(|| Ok(OpaqueColumn::default()))
    .row_key("id")
    .column(Column::new("handle", "main", "handle"), |r| &r.handle, |r| &mut r.handle));

catalog_record!(NoConstructor, |t| t
    .row_key("id")
    .column(Column::new("name", "main", "name"), |r| &r.name, |r| &mut r.name));

fn every_entry_point<R: Record + Default + std::fmt::Debug>(mapper: &RecordMapper) -> Vec<MapperError> {
    let record = R::default();
    let row = wcm_types::Row::default();
    let cells = wcm_types::CellMap::new();
    assert!(!mapper.is_valid::<R>(), "{} passed validation", std::any::type_name::<R>());
    vec![
        mapper.descriptor::<R>().unwrap_err(),
        mapper.to_row(&record).unwrap_err(),
        mapper.to_cell_map(&record).unwrap_err(),
        mapper.to_cells(&record).unwrap_err(),
        mapper.row_key(&record).unwrap_err(),
        mapper.from_row::<R>(None, &row).unwrap_err(),
        mapper.from_cell_map::<R>(b"k", &cells).unwrap_err(),
        mapper.from_cells::<R>(None, &[]).unwrap_err(),
        mapper.column_families::<R>().unwrap_err(),
    ]
}

/// Errors from every entry point for each invalid record type.
pub fn catalog_errors(mapper: &RecordMapper) -> Vec<(&'static str, Vec<MapperError>)> {
    vec![
        ("NoRowKey", every_entry_point::<NoRowKey>(mapper)),
        ("TwoRowKeys", every_entry_point::<TwoRowKeys>(mapper)),
        ("UndeclaredKeyField", every_entry_point::<UndeclaredKeyField>(mapper)),
        ("NoColumns", every_entry_point::<NoColumns>(mapper)),
        ("BothMarkers", every_entry_point::<BothMarkers>(mapper)),
        ("TransientColumn", every_entry_point::<TransientColumn>(mapper)),
        ("SharedColumn", every_entry_point::<SharedColumn>(mapper)),
        ("SameColumn", every_entry_point::<SameColumn>(mapper)),
        ("UndeclaredFamily", every_entry_point::<UndeclaredFamily>(mapper)),
        ("PrimitiveColumn", every_entry_point::<PrimitiveColumn>(mapper)),
        ("UnorderedVersions", every_entry_point::<UnorderedVersions>(mapper)),
        ("OpaqueColumn", every_entry_point::<OpaqueColumn>(mapper)),
        ("NoConstructor", every_entry_point::<NoConstructor>(mapper)),
    ]
}
