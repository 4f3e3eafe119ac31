use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wcm_types::Decimal;

use crate::error::{CodecError, CodecResult};

// ---------------------------------------------------------------------------
// NativeType
// ---------------------------------------------------------------------------

/// Scalar types with a direct, store-native byte encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeType {
    Bool,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Decimal,
}

impl NativeType {
    /// Every native type, in declaration order.
    pub const ALL: [NativeType; 8] = [
        NativeType::Bool,
        NativeType::Short,
        NativeType::Int,
        NativeType::Long,
        NativeType::Float,
        NativeType::Double,
        NativeType::String,
        NativeType::Decimal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Short => "i16",
            Self::Int => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::String => "String",
            Self::Decimal => "Decimal",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// ValueType
// ---------------------------------------------------------------------------

/// The declared type of a field value, as seen by a codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One of the native scalar types.
    Native(NativeType),
    /// Any serde-serializable type; carries the Rust type name.
    Structured(&'static str),
    /// A type with no byte representation known to the built-in codecs.
    Opaque(&'static str),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Native(native) => native.name(),
            Self::Structured(name) | Self::Opaque(name) => name,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CellValue
// ---------------------------------------------------------------------------

/// A field value in codec-neutral form.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Decimal(Decimal),
    /// Any non-native value, held as a JSON tree.
    Structured(serde_json::Value),
}

impl CellValue {
    /// The native type of this value, or `None` for structured values.
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            Self::Bool(_) => Some(NativeType::Bool),
            Self::Short(_) => Some(NativeType::Short),
            Self::Int(_) => Some(NativeType::Int),
            Self::Long(_) => Some(NativeType::Long),
            Self::Float(_) => Some(NativeType::Float),
            Self::Double(_) => Some(NativeType::Double),
            Self::String(_) => Some(NativeType::String),
            Self::Decimal(_) => Some(NativeType::Decimal),
            Self::Structured(_) => None,
        }
    }

    /// Short label used in error messages.
    pub fn type_label(&self) -> &'static str {
        self.native_type().map_or("structured", |n| n.name())
    }
}

// ---------------------------------------------------------------------------
// ColumnType
// ---------------------------------------------------------------------------

/// A Rust type that can be stored as a single cell value.
///
/// Implemented for the native scalars, for `Vec<T>` and `BTreeMap<String, T>`
/// of serde types, for `serde_json::Value`, and for any user type passed to
/// [`structured_column!`](crate::structured_column).
pub trait ColumnType: Sized + Send + Sync + 'static {
    /// The type the codec sees for this Rust type.
    fn value_type() -> ValueType;

    fn to_cell_value(&self) -> CodecResult<CellValue>;

    fn from_cell_value(value: CellValue) -> CodecResult<Self>;
}

macro_rules! native_column {
    ($ty:ty, $variant:ident) => {
        impl ColumnType for $ty {
            fn value_type() -> ValueType {
                ValueType::Native(NativeType::$variant)
            }

            fn to_cell_value(&self) -> CodecResult<CellValue> {
                Ok(CellValue::$variant(self.clone()))
            }

            fn from_cell_value(value: CellValue) -> CodecResult<Self> {
                match value {
                    CellValue::$variant(v) => Ok(v),
                    other => Err(CodecError::TypeMismatch {
                        expected: NativeType::$variant.name().to_string(),
                        actual: other.type_label().to_string(),
                    }),
                }
            }
        }
    };
}

native_column!(bool, Bool);
native_column!(i16, Short);
native_column!(i32, Int);
native_column!(i64, Long);
native_column!(f32, Float);
native_column!(f64, Double);
native_column!(String, String);
native_column!(Decimal, Decimal);

/// Convert a serde value into its structured cell form.
pub fn to_structured<T: Serialize>(value: &T) -> CodecResult<CellValue> {
    serde_json::to_value(value)
        .map(CellValue::Structured)
        .map_err(|e| CodecError::serialize(std::any::type_name::<T>(), e))
}

/// Convert a structured cell value back into a serde value.
pub fn from_structured<T: DeserializeOwned>(value: CellValue) -> CodecResult<T> {
    match value {
        CellValue::Structured(json) => serde_json::from_value(json)
            .map_err(|e| CodecError::deserialize(std::any::type_name::<T>(), e)),
        other => Err(CodecError::TypeMismatch {
            expected: "structured".to_string(),
            actual: other.type_label().to_string(),
        }),
    }
}

/// Implement [`ColumnType`] for serde types so they are stored through the
/// codec's structured encoding.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Address { city: String, zip: String }
/// wcm_codec::structured_column!(Address);
/// ```
#[macro_export]
macro_rules! structured_column {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::ColumnType for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Structured(::std::any::type_name::<$ty>())
            }

            fn to_cell_value(&self) -> $crate::CodecResult<$crate::CellValue> {
                $crate::value::to_structured(self)
            }

            fn from_cell_value(value: $crate::CellValue) -> $crate::CodecResult<Self> {
                $crate::value::from_structured(value)
            }
        }
    )+};
}

structured_column!(serde_json::Value);

impl<T> ColumnType for Vec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn value_type() -> ValueType {
        ValueType::Structured(std::any::type_name::<Self>())
    }

    fn to_cell_value(&self) -> CodecResult<CellValue> {
        to_structured(self)
    }

    fn from_cell_value(value: CellValue) -> CodecResult<Self> {
        from_structured(value)
    }
}

impl<T> ColumnType for BTreeMap<String, T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn value_type() -> ValueType {
        ValueType::Structured(std::any::type_name::<Self>())
    }

    fn to_cell_value(&self) -> CodecResult<CellValue> {
        to_structured(self)
    }

    fn from_cell_value(value: CellValue) -> CodecResult<Self> {
        from_structured(value)
    }
}
