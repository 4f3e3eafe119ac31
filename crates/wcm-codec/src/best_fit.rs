use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::native;
use crate::options::{BestFitOptions, CodecOptions, SERIALIZE_AS_STRING};
use crate::traits::Codec;
use crate::value::{CellValue, ValueType};

/// The default codec.
///
/// Native values use the store's binary encoding, or their UTF-8 text when
/// the column sets `serializeAsString = "true"`. Structured values are
/// stored as compact JSON. Opaque types are not supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct BestFitCodec;

impl BestFitCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for BestFitCodec {
    fn name(&self) -> &str {
        "best-fit"
    }

    fn serialize(
        &self,
        value: Option<&CellValue>,
        options: &CodecOptions,
    ) -> CodecResult<Option<Vec<u8>>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let opts = BestFitOptions::from_options(options);
        let bytes = match value {
            CellValue::Structured(json) => serde_json::to_vec(json)
                .map_err(|e| CodecError::serialize(value.type_label(), e))?,
            native_value => {
                let encoded = if opts.serialize_as_string {
                    native::encode_text(native_value)
                } else {
                    native::encode_binary(native_value)
                };
                encoded.ok_or_else(|| {
                    CodecError::serialize(native_value.type_label(), "no native encoding")
                })?
            }
        };
        trace!(
            codec = "best-fit",
            type_name = value.type_label(),
            len = bytes.len(),
            "serialized value"
        );
        Ok(Some(bytes))
    }

    fn deserialize(
        &self,
        bytes: Option<&[u8]>,
        target: ValueType,
        options: &CodecOptions,
    ) -> CodecResult<Option<CellValue>> {
        let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let opts = BestFitOptions::from_options(options);
        let value = match target {
            ValueType::Native(native_type) if opts.serialize_as_string => {
                native::decode_text(bytes, native_type)?
            }
            ValueType::Native(native_type) => native::decode_binary(bytes, native_type)?,
            ValueType::Structured(name) => serde_json::from_slice(bytes)
                .map(CellValue::Structured)
                .map_err(|e| CodecError::deserialize(name, e))?,
            ValueType::Opaque(name) => {
                return Err(CodecError::Unsupported {
                    codec: self.name().to_string(),
                    type_name: name.to_string(),
                })
            }
        };
        Ok(Some(value))
    }

    fn supports(&self, target: ValueType) -> bool {
        !matches!(target, ValueType::Opaque(_))
    }

    fn recognized_flags(&self) -> &[&'static str] {
        &[SERIALIZE_AS_STRING]
    }
}
