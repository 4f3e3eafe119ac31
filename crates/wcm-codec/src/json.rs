use serde_json::Value;
use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::native;
use crate::options::CodecOptions;
use crate::traits::Codec;
use crate::value::{CellValue, ValueType};

/// Codec that writes structured values as JSON documents.
///
/// Native values keep the store's binary encoding, or their UTF-8 text when
/// the codec is built with `serialize_as_string`. Unlike
/// [`BestFitCodec`](crate::BestFitCodec) the text choice is made once for the
/// whole codec; per-column flags are ignored. A stored JSON `null` reads back
/// as absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec {
    serialize_as_string: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serialize_as_string(serialize_as_string: bool) -> Self {
        Self {
            serialize_as_string,
        }
    }

    pub fn serialize_as_string(&self) -> bool {
        self.serialize_as_string
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(
        &self,
        value: Option<&CellValue>,
        _options: &CodecOptions,
    ) -> CodecResult<Option<Vec<u8>>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let bytes = match value {
            CellValue::Structured(json) => serde_json::to_vec(json)
                .map_err(|e| CodecError::serialize(value.type_label(), e))?,
            native_value => {
                let encoded = if self.serialize_as_string {
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
            codec = "json",
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
        _options: &CodecOptions,
    ) -> CodecResult<Option<CellValue>> {
        let Some(bytes) = bytes.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        match target {
            ValueType::Native(native_type) if self.serialize_as_string => {
                native::decode_text(bytes, native_type).map(Some)
            }
            ValueType::Native(native_type) => native::decode_binary(bytes, native_type).map(Some),
            ValueType::Structured(name) => {
                let json: Value =
                    serde_json::from_slice(bytes).map_err(|e| CodecError::deserialize(name, e))?;
                Ok((!json.is_null()).then_some(CellValue::Structured(json)))
            }
            ValueType::Opaque(name) => Err(CodecError::Unsupported {
                codec: self.name().to_string(),
                type_name: name.to_string(),
            }),
        }
    }

    fn supports(&self, target: ValueType) -> bool {
        !matches!(target, ValueType::Opaque(_))
    }
}
