//! Store-native encodings for the eight [`NativeType`]s.
//!
//! Binary forms follow the store's conventions:
//!
//! | type      | bytes                                                        |
//! |-----------|--------------------------------------------------------------|
//! | `bool`    | 1 byte, `0xFF` for true, `0x00` for false                    |
//! | `i16..i64`| big-endian two's complement, 2/4/8 bytes                     |
//! | `f32/f64` | big-endian IEEE-754 bit pattern, 4/8 bytes                   |
//! | `String`  | UTF-8                                                        |
//! | `Decimal` | 4-byte big-endian scale, then the minimal big-endian two's   |
//! |           | complement of the unscaled value                             |
//!
//! Text forms are the UTF-8 of each value's `Display` output.

use wcm_types::Decimal;

use crate::error::{CodecError, CodecResult};
use crate::value::{CellValue, NativeType};

/// Binary encode/decode pair for one native type.
#[derive(Clone, Copy)]
pub struct NativeEncoding {
    pub encode: fn(&CellValue) -> Option<Vec<u8>>,
    pub decode: fn(&[u8]) -> CodecResult<CellValue>,
}

/// Dispatch from native type to its binary encoding.
pub fn encoding_for(native: NativeType) -> NativeEncoding {
    match native {
        NativeType::Bool => NativeEncoding {
            encode: |v| match v {
                CellValue::Bool(b) => Some(vec![if *b { 0xFF } else { 0x00 }]),
                _ => None,
            },
            decode: |bytes| Ok(CellValue::Bool(fixed::<1>(bytes, NativeType::Bool)?[0] != 0)),
        },
        NativeType::Short => NativeEncoding {
            encode: |v| match v {
                CellValue::Short(n) => Some(n.to_be_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| Ok(CellValue::Short(i16::from_be_bytes(fixed(bytes, NativeType::Short)?))),
        },
        NativeType::Int => NativeEncoding {
            encode: |v| match v {
                CellValue::Int(n) => Some(n.to_be_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| Ok(CellValue::Int(i32::from_be_bytes(fixed(bytes, NativeType::Int)?))),
        },
        NativeType::Long => NativeEncoding {
            encode: |v| match v {
                CellValue::Long(n) => Some(n.to_be_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| Ok(CellValue::Long(i64::from_be_bytes(fixed(bytes, NativeType::Long)?))),
        },
        NativeType::Float => NativeEncoding {
            encode: |v| match v {
                CellValue::Float(n) => Some(n.to_bits().to_be_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| {
                let bits = u32::from_be_bytes(fixed(bytes, NativeType::Float)?);
                Ok(CellValue::Float(f32::from_bits(bits)))
            },
        },
        NativeType::Double => NativeEncoding {
            encode: |v| match v {
                CellValue::Double(n) => Some(n.to_bits().to_be_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| {
                let bits = u64::from_be_bytes(fixed(bytes, NativeType::Double)?);
                Ok(CellValue::Double(f64::from_bits(bits)))
            },
        },
        NativeType::String => NativeEncoding {
            encode: |v| match v {
                CellValue::String(s) => Some(s.as_bytes().to_vec()),
                _ => None,
            },
            decode: |bytes| {
                std::str::from_utf8(bytes)
                    .map(|s| CellValue::String(s.to_string()))
                    .map_err(|e| CodecError::deserialize(NativeType::String.name(), e))
            },
        },
        NativeType::Decimal => NativeEncoding {
            encode: |v| match v {
                CellValue::Decimal(d) => Some(encode_decimal(d)),
                _ => None,
            },
            decode: |bytes| decode_decimal(bytes).map(CellValue::Decimal),
        },
    }
}

/// Encode a native value in its binary form. `None` for structured values.
pub fn encode_binary(value: &CellValue) -> Option<Vec<u8>> {
    let native = value.native_type()?;
    (encoding_for(native).encode)(value)
}

/// Decode the binary form of a native value.
pub fn decode_binary(bytes: &[u8], native: NativeType) -> CodecResult<CellValue> {
    (encoding_for(native).decode)(bytes)
}

/// Encode a native value as UTF-8 text. `None` for structured values.
pub fn encode_text(value: &CellValue) -> Option<Vec<u8>> {
    let text = match value {
        CellValue::Bool(v) => v.to_string(),
        CellValue::Short(v) => v.to_string(),
        CellValue::Int(v) => v.to_string(),
        CellValue::Long(v) => v.to_string(),
        CellValue::Float(v) => v.to_string(),
        CellValue::Double(v) => v.to_string(),
        CellValue::String(v) => v.clone(),
        CellValue::Decimal(v) => v.to_string(),
        CellValue::Structured(_) => return None,
    };
    Some(text.into_bytes())
}

/// Decode a native value from UTF-8 text.
pub fn decode_text(bytes: &[u8], native: NativeType) -> CodecResult<CellValue> {
    let text = std::str::from_utf8(bytes).map_err(|e| CodecError::deserialize(native.name(), e))?;
    parse_text(text, native)
}

/// Parse the text form of a native value.
pub fn parse_text(text: &str, native: NativeType) -> CodecResult<CellValue> {
    let err = |reason: String| CodecError::deserialize(native.name(), reason);
    match native {
        NativeType::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(CellValue::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(CellValue::Bool(false))
            } else {
                Err(err(format!("'{text}' is not a boolean")))
            }
        }
        NativeType::Short => text.parse().map(CellValue::Short).map_err(|e| err(e.to_string())),
        NativeType::Int => text.parse().map(CellValue::Int).map_err(|e| err(e.to_string())),
        NativeType::Long => text.parse().map(CellValue::Long).map_err(|e| err(e.to_string())),
        NativeType::Float => {
            let value: f32 = text.parse().map_err(|e: std::num::ParseFloatError| err(e.to_string()))?;
            if value.is_infinite() && !names_infinity(text) {
                return Err(err(format!("'{text}' is out of range for f32")));
            }
            Ok(CellValue::Float(value))
        }
        NativeType::Double => text.parse().map(CellValue::Double).map_err(|e| err(e.to_string())),
        NativeType::String => Ok(CellValue::String(text.to_string())),
        NativeType::Decimal => text
            .parse::<Decimal>()
            .map(CellValue::Decimal)
            .map_err(|e| err(e.to_string())),
    }
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn fixed<const N: usize>(bytes: &[u8], native: NativeType) -> CodecResult<[u8; N]> {
    bytes.try_into().map_err(|_| {
        CodecError::deserialize(
            native.name(),
            format!("expected {N} bytes, got {}", bytes.len()),
        )
    })
}

fn encode_decimal(value: &Decimal) -> Vec<u8> {
    let full = value.unscaled().to_be_bytes();
    // Drop leading bytes that only repeat the sign of the next byte.
    let mut start = 0;
    while start < full.len() - 1 {
        let redundant = (full[start] == 0x00 && full[start + 1] & 0x80 == 0)
            || (full[start] == 0xFF && full[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    let mut out = Vec::with_capacity(4 + full.len() - start);
    out.extend_from_slice(&value.scale().to_be_bytes());
    out.extend_from_slice(&full[start..]);
    out
}

fn decode_decimal(bytes: &[u8]) -> CodecResult<Decimal> {
    let err = |reason: String| CodecError::deserialize(NativeType::Decimal.name(), reason);
    if bytes.len() < 5 {
        return Err(err(format!("expected at least 5 bytes, got {}", bytes.len())));
    }
    let (scale_bytes, magnitude) = bytes.split_at(4);
    let scale = i32::from_be_bytes(fixed(scale_bytes, NativeType::Decimal)?);

    let sign = if magnitude[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let excess = magnitude.len().saturating_sub(16);
    if magnitude[..excess].iter().any(|b| *b != sign) {
        return Err(err("unscaled value exceeds 128 bits".to_string()));
    }
    let significant = &magnitude[excess..];
    let mut full = [sign; 16];
    full[16 - significant.len()..].copy_from_slice(significant);
    Ok(Decimal::new(i128::from_be_bytes(full), scale))
}
