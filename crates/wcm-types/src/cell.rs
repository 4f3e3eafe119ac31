use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Timestamp sentinel meaning "the current version".
///
/// Single-version columns are written under this timestamp; the store is
/// expected to substitute its own clock when it persists the cell.
pub const LATEST_TIMESTAMP: i64 = i64::MAX;

/// Versions of one column: `timestamp → value`, ascending by timestamp.
pub type VersionMap = BTreeMap<i64, Vec<u8>>;

/// Columns of one family: `qualifier → versions`.
pub type QualifierMap = BTreeMap<Vec<u8>, VersionMap>;

// ---------------------------------------------------------------------------
// CellMap
// ---------------------------------------------------------------------------

/// The nested, sparse form of one row: `family → qualifier → timestamp → value`.
///
/// Every level is a `BTreeMap`, so keys are unique and iteration is ordered
/// (byte-wise for families and qualifiers, ascending for timestamps). The
/// latest version of a column is its entry with the greatest timestamp.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CellMap {
    families: BTreeMap<Vec<u8>, QualifierMap>,
}

impl CellMap {
    /// Create an empty cell map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one value, returning the value previously held at the same
    /// coordinate (if any).
    pub fn put(
        &mut self,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.families
            .entry(family.into())
            .or_default()
            .entry(qualifier.into())
            .or_default()
            .insert(timestamp, value.into())
    }

    /// All columns of a family.
    pub fn family(&self, family: &[u8]) -> Option<&QualifierMap> {
        self.families.get(family)
    }

    /// All versions of one column.
    pub fn versions(&self, family: &[u8], qualifier: &[u8]) -> Option<&VersionMap> {
        self.families.get(family)?.get(qualifier)
    }

    /// The version with the greatest timestamp, if the column has any.
    pub fn latest(&self, family: &[u8], qualifier: &[u8]) -> Option<(i64, &[u8])> {
        self.versions(family, qualifier)?
            .iter()
            .next_back()
            .map(|(ts, value)| (*ts, value.as_slice()))
    }

    /// Family names present in the map, in byte order.
    pub fn families(&self) -> impl Iterator<Item = &[u8]> {
        self.families.keys().map(Vec::as_slice)
    }

    /// Number of stored values across all families, columns and versions.
    pub fn cell_count(&self) -> usize {
        self.families
            .values()
            .flat_map(|columns| columns.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Returns `true` if the map holds no values. Families or columns that
    /// exist but carry no versions do not count.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Iterate every value as `(family, qualifier, timestamp, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8], i64, &[u8])> {
        self.families.iter().flat_map(|(family, columns)| {
            columns.iter().flat_map(move |(qualifier, versions)| {
                versions.iter().map(move |(ts, value)| {
                    (
                        family.as_slice(),
                        qualifier.as_slice(),
                        *ts,
                        value.as_slice(),
                    )
                })
            })
        })
    }
}

impl fmt::Debug for CellMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (family, qualifier, ts, value) in self.iter() {
            list.entry(&format_args!(
                "{}:{}@{} = {}",
                String::from_utf8_lossy(family),
                String::from_utf8_lossy(qualifier),
                ts,
                hex::encode(value)
            ));
        }
        list.finish()
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One fully-addressed value, as stores report them in flat result lists.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: Vec<u8>,
    pub family: Vec<u8>,
    pub qualifier: Vec<u8>,
    pub timestamp: i64,
    pub value: Vec<u8>,
}

impl Cell {
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cell({}/{}:{}@{} = {})",
            hex::encode(&self.row),
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier),
            self.timestamp,
            hex::encode(&self.value)
        )
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// A row key together with the cells stored under it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    pub key: Vec<u8>,
    pub cells: CellMap,
}

impl Row {
    pub fn new(key: impl Into<Vec<u8>>, cells: CellMap) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    /// A row is empty when it has no key or no values; stores return such
    /// rows for "not found".
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() || self.cells.is_empty()
    }

    /// Flatten into one [`Cell`] per value, ordered by family, qualifier and
    /// ascending timestamp.
    pub fn to_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .map(|(family, qualifier, ts, value)| {
                Cell::new(self.key.clone(), family, qualifier, ts, value)
            })
            .collect()
    }

    /// Rebuild a row from flat cells.
    ///
    /// All cells must carry the same row key. When two cells share a
    /// `(family, qualifier, timestamp)` coordinate the one that comes later
    /// in the input wins. No cells yields an empty row.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Result<Self, TypeError> {
        let mut row = Row::default();
        let mut first = true;
        for cell in cells {
            if first {
                row.key = cell.row.clone();
                first = false;
            } else if cell.row != row.key {
                return Err(TypeError::RowMismatch {
                    expected: hex::encode(&row.key),
                    found: hex::encode(&cell.row),
                });
            }
            row.cells.put(
                cell.family.clone(),
                cell.qualifier.clone(),
                cell.timestamp,
                cell.value.clone(),
            );
        }
        Ok(row)
    }
}
