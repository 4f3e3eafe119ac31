use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;
use wcm_codec::{BestFitCodec, CellValue, Codec, CodecOptions, ColumnType};
use wcm_schema::{Accessor, FieldBinding, Record, SchemaDescriptor, SchemaRegistry, SchemaValidator};
use wcm_types::{Cell, CellMap, Row, LATEST_TIMESTAMP};

use crate::config::MapperConfig;
use crate::error::{MapperError, MapperResult};

/// Converts records to wide-column rows and back.
///
/// A mapper owns one codec and one schema cache. Each record type is
/// validated the first time it is used; afterwards every call reuses the
/// cached descriptor (or the cached validation error). The mapper is
/// `Send + Sync` and meant to be shared.
pub struct RecordMapper {
    codec: Arc<dyn Codec>,
    registry: SchemaRegistry,
}

impl RecordMapper {
    /// A mapper using [`BestFitCodec`].
    pub fn new() -> Self {
        Self::with_codec(Arc::new(BestFitCodec::new()))
    }

    /// A mapper using a custom codec.
    pub fn with_codec(codec: Arc<dyn Codec>) -> Self {
        Self::build(codec, true)
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self::build(config.build_codec(), config.warn_on_unknown_flags)
    }

    fn build(codec: Arc<dyn Codec>, warn_on_unknown_flags: bool) -> Self {
        let validator =
            SchemaValidator::new(Arc::clone(&codec)).warn_on_unknown_flags(warn_on_unknown_flags);
        Self {
            codec,
            registry: SchemaRegistry::new(validator),
        }
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    // -----------------------------------------------------------------------
    // Schema
    // -----------------------------------------------------------------------

    /// The validated descriptor for `R`.
    pub fn descriptor<R: Record>(&self) -> MapperResult<Arc<SchemaDescriptor<R>>> {
        Ok(self.registry.descriptor::<R>()?)
    }

    /// `true` if `R` can be mapped. Validation errors are discarded.
    pub fn is_valid<R: Record>(&self) -> bool {
        self.registry.is_valid::<R>()
    }

    /// Column families of `R`'s table, with the versions each keeps.
    pub fn column_families<R: Record>(&self) -> MapperResult<BTreeMap<String, u32>> {
        Ok(self.descriptor::<R>()?.column_families())
    }

    /// Names of `R`'s mapped fields in declaration order.
    pub fn mapped_fields<R: Record>(&self) -> MapperResult<Vec<String>> {
        let descriptor = self.descriptor::<R>()?;
        Ok(descriptor.field_names().into_iter().map(String::from).collect())
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Encode a record into its row key and cells.
    pub fn to_row<R: Record>(&self, record: &R) -> MapperResult<Row> {
        let descriptor = self.descriptor::<R>()?;
        let cells = self.write_cells(&descriptor, record)?;
        let key = self.compose_row_key(&descriptor, record)?;
        trace!(
            table = descriptor.table(),
            key_len = key.len(),
            cells = cells.cell_count(),
            "record converted to row"
        );
        Ok(Row::new(key, cells))
    }

    /// Encode a record's fields without its row key.
    pub fn to_cell_map<R: Record>(&self, record: &R) -> MapperResult<CellMap> {
        let descriptor = self.descriptor::<R>()?;
        self.write_cells(&descriptor, record)
    }

    /// Encode a record as flat cells, one per stored value.
    pub fn to_cells<R: Record>(&self, record: &R) -> MapperResult<Vec<Cell>> {
        Ok(self.to_row(record)?.to_cells())
    }

    /// Encode several records. Stops at the first failure.
    pub fn to_rows<R: Record>(&self, records: &[R]) -> MapperResult<Vec<Row>> {
        records.iter().map(|record| self.to_row(record)).collect()
    }

    /// The encoded row key of a record.
    pub fn row_key<R: Record>(&self, record: &R) -> MapperResult<Vec<u8>> {
        let descriptor = self.descriptor::<R>()?;
        self.compose_row_key(&descriptor, record)
    }

    /// Encode a standalone value with this mapper's codec.
    pub fn encode_value<T: ColumnType>(&self, value: &T, options: &CodecOptions) -> MapperResult<Vec<u8>> {
        let name = std::any::type_name::<T>();
        let cell = value
            .to_cell_value()
            .map_err(|e| MapperError::codec(name, e))?;
        let bytes = self
            .codec
            .serialize(Some(&cell), options)
            .map_err(|e| MapperError::codec(name, e))?;
        Ok(bytes.unwrap_or_default())
    }

    fn compose_row_key<R: Record>(
        &self,
        descriptor: &SchemaDescriptor<R>,
        record: &R,
    ) -> MapperResult<Vec<u8>> {
        let key = record
            .compose_row_key()
            .map_err(|e| MapperError::RowKeyCantBeComposed(format!("{e:#}")))?
            .ok_or(MapperError::RowKeyCantBeEmpty)?;
        let field = descriptor.row_key_field();
        let value = key
            .to_cell_value()
            .map_err(|e| MapperError::codec(field, e))?;
        let bytes = self
            .codec
            .serialize(Some(&value), descriptor.row_key_options())
            .map_err(|e| MapperError::codec(field, e))?;
        match bytes {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(MapperError::RowKeyCantBeEmpty),
        }
    }

    fn write_cells<R: Record>(
        &self,
        descriptor: &SchemaDescriptor<R>,
        record: &R,
    ) -> MapperResult<CellMap> {
        let mut cells = CellMap::new();
        for binding in descriptor.bindings() {
            let family = binding.family().as_bytes();
            let column = binding.column().as_bytes();
            match binding.accessor() {
                Accessor::Single { read, .. } => {
                    let value = read(record).map_err(|e| MapperError::codec(binding.name(), e))?;
                    let Some(value) = value else {
                        continue;
                    };
                    if let Some(bytes) = self.encode(binding, &value)? {
                        cells.put(family, column, LATEST_TIMESTAMP, bytes);
                    }
                }
                Accessor::Versions { read, .. } => {
                    let versions =
                        read(record).map_err(|e| MapperError::codec(binding.name(), e))?;
                    let Some(versions) = versions else {
                        continue;
                    };
                    if versions.is_empty() {
                        return Err(MapperError::EmptyMultiVersionField {
                            field: binding.name().to_string(),
                        });
                    }
                    for (timestamp, value) in versions {
                        let Some(value) = value else {
                            continue;
                        };
                        if let Some(bytes) = self.encode(binding, &value)? {
                            cells.put(family, column, timestamp, bytes);
                        }
                    }
                }
            }
        }
        if cells.is_empty() {
            return Err(MapperError::AllFieldsNull {
                record: descriptor.record_type().to_string(),
            });
        }
        Ok(cells)
    }

    /// Encoded bytes for one value; empty encodings are dropped.
    fn encode<R>(&self, binding: &FieldBinding<R>, value: &CellValue) -> MapperResult<Option<Vec<u8>>> {
        let bytes = self
            .codec
            .serialize(Some(value), binding.options())
            .map_err(|e| MapperError::codec(binding.name(), e))?;
        Ok(bytes.filter(|b| !b.is_empty()))
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Decode a row. `row_key` overrides the row's own key when given.
    ///
    /// Returns `Ok(None)` when the key or the cells are empty.
    pub fn from_row<R: Record>(&self, row_key: Option<&[u8]>, row: &Row) -> MapperResult<Option<R>> {
        let descriptor = self.descriptor::<R>()?;
        let key = row_key.unwrap_or(row.key.as_slice());
        self.read_record(&descriptor, key, &row.cells)
    }

    /// Decode a cell map stored under `row_key`.
    pub fn from_cell_map<R: Record>(&self, row_key: &[u8], cells: &CellMap) -> MapperResult<Option<R>> {
        let descriptor = self.descriptor::<R>()?;
        self.read_record(&descriptor, row_key, cells)
    }

    /// Decode flat cells. The row key comes from the cells unless given.
    pub fn from_cells<R: Record>(&self, row_key: Option<&[u8]>, cells: &[Cell]) -> MapperResult<Option<R>> {
        let descriptor = self.descriptor::<R>()?;
        let row = Row::from_cells(cells)?;
        let key = row_key.unwrap_or(row.key.as_slice());
        self.read_record(&descriptor, key, &row.cells)
    }

    /// Decode several rows, keeping positions: empty rows yield `None`.
    pub fn from_rows<R: Record>(&self, rows: &[Row]) -> MapperResult<Vec<Option<R>>> {
        rows.iter().map(|row| self.from_row(None, row)).collect()
    }

    fn read_record<R: Record>(
        &self,
        descriptor: &SchemaDescriptor<R>,
        key: &[u8],
        cells: &CellMap,
    ) -> MapperResult<Option<R>> {
        if key.is_empty() || cells.is_empty() {
            return Ok(None);
        }

        let key_field = descriptor.row_key_field();
        let decoded_key = self
            .codec
            .deserialize(Some(key), descriptor.row_key_type(), descriptor.row_key_options())
            .map_err(|e| MapperError::codec(key_field, e))?;
        let Some(decoded_key) = decoded_key else {
            return Ok(None);
        };
        let row_key =
            R::RowKey::from_cell_value(decoded_key).map_err(|e| MapperError::codec(key_field, e))?;

        let mut record = descriptor
            .instantiate()
            .map_err(|e| MapperError::NotInstantiable {
                record: descriptor.record_type().to_string(),
                reason: format!("{e:#}"),
            })?;
        record
            .parse_row_key(row_key)
            .map_err(|e| MapperError::RowKeyCouldNotBeParsed {
                key: hex::encode(key),
                reason: format!("{e:#}"),
            })?;

        for binding in descriptor.bindings() {
            let family = binding.family().as_bytes();
            let column = binding.column().as_bytes();
            match binding.accessor() {
                Accessor::Single { write, .. } => {
                    let Some((_, bytes)) = cells.latest(family, column) else {
                        continue;
                    };
                    if let Some(value) = self.decode(binding, bytes)? {
                        write(&mut record, Some(value))
                            .map_err(|e| MapperError::codec(binding.name(), e))?;
                    }
                }
                Accessor::Versions { write, .. } => {
                    let Some(versions) = cells.versions(family, column) else {
                        continue;
                    };
                    let mut decoded = BTreeMap::new();
                    for (timestamp, bytes) in versions {
                        if let Some(value) = self.decode(binding, bytes)? {
                            decoded.insert(*timestamp, value);
                        }
                    }
                    if !decoded.is_empty() {
                        write(&mut record, decoded)
                            .map_err(|e| MapperError::codec(binding.name(), e))?;
                    }
                }
            }
        }
        trace!(
            table = descriptor.table(),
            key_len = key.len(),
            cells = cells.cell_count(),
            "row converted to record"
        );
        Ok(Some(record))
    }

    fn decode<R>(&self, binding: &FieldBinding<R>, bytes: &[u8]) -> MapperResult<Option<CellValue>> {
        self.codec
            .deserialize(Some(bytes), binding.value_type(), binding.options())
            .map_err(|e| MapperError::codec(binding.name(), e))
    }
}

impl Default for RecordMapper {
    fn default() -> Self {
        Self::new()
    }
}
