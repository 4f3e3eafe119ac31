//! Field shapes and the type-erased accessors a descriptor uses to read and
//! write record fields.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wcm_codec::{CellValue, CodecError, CodecResult, ColumnType, ValueType};
use wcm_types::Decimal;

// ---------------------------------------------------------------------------
// Single-version fields
// ---------------------------------------------------------------------------

/// A Rust type usable as a single-version column field.
///
/// Only `Option<T>` is valid: an absent cell must be representable. Bare
/// scalars implement the trait so a declaration using them fails validation
/// with a descriptive error instead of at compile time.
pub trait SingleField: Send + Sync + 'static {
    /// `false` for types that cannot represent an absent value.
    const NULLABLE: bool;

    fn value_type() -> ValueType;

    /// The current value, or `None` if the field is absent.
    fn read(&self) -> CodecResult<Option<CellValue>>;

    /// Replace the field with a decoded value.
    fn write(&mut self, value: Option<CellValue>) -> CodecResult<()>;
}

impl<T: ColumnType> SingleField for Option<T> {
    const NULLABLE: bool = true;

    fn value_type() -> ValueType {
        T::value_type()
    }

    fn read(&self) -> CodecResult<Option<CellValue>> {
        self.as_ref().map(T::to_cell_value).transpose()
    }

    fn write(&mut self, value: Option<CellValue>) -> CodecResult<()> {
        *self = value.map(T::from_cell_value).transpose()?;
        Ok(())
    }
}

macro_rules! bare_single_field {
    ($($ty:ty),+) => {$(
        impl SingleField for $ty {
            const NULLABLE: bool = false;

            fn value_type() -> ValueType {
                <$ty as ColumnType>::value_type()
            }

            fn read(&self) -> CodecResult<Option<CellValue>> {
                self.to_cell_value().map(Some)
            }

            fn write(&mut self, value: Option<CellValue>) -> CodecResult<()> {
                if let Some(value) = value {
                    *self = <$ty as ColumnType>::from_cell_value(value)?;
                }
                Ok(())
            }
        }
    )+};
}

bare_single_field!(bool, i16, i32, i64, f32, f64, String, Decimal);

// ---------------------------------------------------------------------------
// Multi-version fields
// ---------------------------------------------------------------------------

/// Whether a container can hold a column's version history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionedShape {
    /// An optional ordered map keyed by `i64` timestamps.
    Timeline,
    /// Any other container, with the reason it was rejected.
    Incompatible(&'static str),
}

/// A value stored inside a multi-version map.
///
/// `Option<T>` entries set to `None` are skipped individually on write.
pub trait VersionValue: Sized + Send + Sync + 'static {
    fn value_type() -> ValueType;

    fn to_version(&self) -> CodecResult<Option<CellValue>>;

    fn from_version(value: CellValue) -> CodecResult<Self>;
}

impl<T: ColumnType> VersionValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_version(&self) -> CodecResult<Option<CellValue>> {
        self.as_ref().map(T::to_cell_value).transpose()
    }

    fn from_version(value: CellValue) -> CodecResult<Self> {
        T::from_cell_value(value).map(Some)
    }
}

macro_rules! plain_version_value {
    ($($ty:ty),+) => {$(
        impl VersionValue for $ty {
            fn value_type() -> ValueType {
                <$ty as ColumnType>::value_type()
            }

            fn to_version(&self) -> CodecResult<Option<CellValue>> {
                self.to_cell_value().map(Some)
            }

            fn from_version(value: CellValue) -> CodecResult<Self> {
                <$ty as ColumnType>::from_cell_value(value)
            }
        }
    )+};
}

plain_version_value!(bool, i16, i32, i64, f32, f64, String, Decimal, serde_json::Value);

impl<T> VersionValue for Vec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn value_type() -> ValueType {
        <Self as ColumnType>::value_type()
    }

    fn to_version(&self) -> CodecResult<Option<CellValue>> {
        self.to_cell_value().map(Some)
    }

    fn from_version(value: CellValue) -> CodecResult<Self> {
        <Self as ColumnType>::from_cell_value(value)
    }
}

/// A Rust type usable as a multi-version column field.
///
/// Valid fields are `Option<BTreeMap<i64, V>>`. The other implementations
/// exist so common mistakes are reported by the validator as
/// [`SchemaError::IncompatibleMultiVersionField`](crate::SchemaError).
pub trait VersionedField: Send + Sync + 'static {
    fn shape() -> VersionedShape;

    /// Type of a single version's value.
    fn value_type() -> ValueType;

    /// Every version as `(timestamp, value)` in ascending timestamp order,
    /// or `None` if the field is absent.
    fn read(&self) -> CodecResult<Option<Vec<(i64, Option<CellValue>)>>>;

    /// Replace the field with a decoded version history.
    fn write(&mut self, versions: BTreeMap<i64, CellValue>) -> CodecResult<()>;
}

impl<V: VersionValue> VersionedField for Option<BTreeMap<i64, V>> {
    fn shape() -> VersionedShape {
        VersionedShape::Timeline
    }

    fn value_type() -> ValueType {
        V::value_type()
    }

    fn read(&self) -> CodecResult<Option<Vec<(i64, Option<CellValue>)>>> {
        let Some(map) = self else {
            return Ok(None);
        };
        map.iter()
            .map(|(ts, v)| Ok((*ts, v.to_version()?)))
            .collect::<CodecResult<Vec<_>>>()
            .map(Some)
    }

    fn write(&mut self, versions: BTreeMap<i64, CellValue>) -> CodecResult<()> {
        let map = versions
            .into_iter()
            .map(|(ts, v)| Ok((ts, V::from_version(v)?)))
            .collect::<CodecResult<BTreeMap<_, _>>>()?;
        *self = Some(map);
        Ok(())
    }
}

fn incompatible<T>() -> CodecError {
    CodecError::Unsupported {
        codec: "multi-version".to_string(),
        type_name: std::any::type_name::<T>().to_string(),
    }
}

macro_rules! incompatible_versioned {
    ($reason:expr => $($ty:ty),+) => {$(
        impl VersionedField for $ty {
            fn shape() -> VersionedShape {
                VersionedShape::Incompatible($reason)
            }

            fn value_type() -> ValueType {
                ValueType::Opaque(std::any::type_name::<$ty>())
            }

            fn read(&self) -> CodecResult<Option<Vec<(i64, Option<CellValue>)>>> {
                Err(incompatible::<$ty>())
            }

            fn write(&mut self, _versions: BTreeMap<i64, CellValue>) -> CodecResult<()> {
                Err(incompatible::<$ty>())
            }
        }
    )+};
}

const NOT_A_MAP: &str = "not an ordered map";
const UNORDERED: &str = "map iteration order is not timestamp order";
const WRONG_KEY: &str = "keys must be i64 timestamps";

incompatible_versioned!(NOT_A_MAP => bool, i16, i32, i64, f32, f64, String, Decimal);
incompatible_versioned!(NOT_A_MAP => Option<bool>, Option<i16>, Option<i32>, Option<i64>);
incompatible_versioned!(NOT_A_MAP => Option<f32>, Option<f64>, Option<String>, Option<Decimal>);

macro_rules! incompatible_generic {
    ($reason:expr => $ty:ty) => {
        impl<T: ColumnType> VersionedField for $ty {
            fn shape() -> VersionedShape {
                VersionedShape::Incompatible($reason)
            }

            fn value_type() -> ValueType {
                T::value_type()
            }

            fn read(&self) -> CodecResult<Option<Vec<(i64, Option<CellValue>)>>> {
                Err(incompatible::<$ty>())
            }

            fn write(&mut self, _versions: BTreeMap<i64, CellValue>) -> CodecResult<()> {
                Err(incompatible::<$ty>())
            }
        }
    };
}

incompatible_generic!(NOT_A_MAP => Option<Vec<T>>);
incompatible_generic!(UNORDERED => Option<HashMap<i64, T>>);
incompatible_generic!(WRONG_KEY => Option<BTreeMap<i32, T>>);
incompatible_generic!(WRONG_KEY => Option<BTreeMap<u64, T>>);
incompatible_generic!(WRONG_KEY => Option<BTreeMap<String, T>>);

// ---------------------------------------------------------------------------
// Erased accessors
// ---------------------------------------------------------------------------

type ReadOne<R> = dyn Fn(&R) -> CodecResult<Option<CellValue>> + Send + Sync;
type WriteOne<R> = dyn Fn(&mut R, Option<CellValue>) -> CodecResult<()> + Send + Sync;
type ReadMany<R> = dyn Fn(&R) -> CodecResult<Option<Vec<(i64, Option<CellValue>)>>> + Send + Sync;
type WriteMany<R> = dyn Fn(&mut R, BTreeMap<i64, CellValue>) -> CodecResult<()> + Send + Sync;

/// Reads and writes one field of `R` without knowing its concrete type.
pub enum Accessor<R> {
    Single {
        read: Arc<ReadOne<R>>,
        write: Arc<WriteOne<R>>,
    },
    Versions {
        read: Arc<ReadMany<R>>,
        write: Arc<WriteMany<R>>,
    },
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Single { read, write } => Self::Single {
                read: Arc::clone(read),
                write: Arc::clone(write),
            },
            Self::Versions { read, write } => Self::Versions {
                read: Arc::clone(read),
                write: Arc::clone(write),
            },
        }
    }
}

impl<R: 'static> Accessor<R> {
    pub fn single<V: SingleField>(get: fn(&R) -> &V, get_mut: fn(&mut R) -> &mut V) -> Self {
        Self::Single {
            read: Arc::new(move |record: &R| get(record).read()),
            write: Arc::new(move |record: &mut R, value: Option<CellValue>| {
                get_mut(record).write(value)
            }),
        }
    }

    pub fn versions<V: VersionedField>(get: fn(&R) -> &V, get_mut: fn(&mut R) -> &mut V) -> Self {
        Self::Versions {
            read: Arc::new(move |record: &R| get(record).read()),
            write: Arc::new(move |record: &mut R, versions: BTreeMap<i64, CellValue>| {
                get_mut(record).write(versions)
            }),
        }
    }

    /// Lift an accessor on an embedded part `R` into one on its owner `O`.
    pub fn embed_in<O: 'static>(self, get: fn(&O) -> &R, get_mut: fn(&mut O) -> &mut R) -> Accessor<O> {
        match self {
            Self::Single { read, write } => Accessor::Single {
                read: Arc::new(move |owner: &O| read(get(owner))),
                write: Arc::new(move |owner: &mut O, value: Option<CellValue>| {
                    write(get_mut(owner), value)
                }),
            },
            Self::Versions { read, write } => Accessor::Versions {
                read: Arc::new(move |owner: &O| read(get(owner))),
                write: Arc::new(move |owner: &mut O, versions: BTreeMap<i64, CellValue>| {
                    write(get_mut(owner), versions)
                }),
            },
        }
    }
}
