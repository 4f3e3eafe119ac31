use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wcm_codec::{BestFitCodec, Codec, JsonCodec};

use crate::error::{MapperError, MapperResult};

/// Which built-in codec a mapper uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
    /// Native binary encodings with a JSON fallback.
    #[default]
    BestFit,
    /// Structured values as JSON, natives in store bytes or text.
    Json,
}

/// Configuration for a [`RecordMapper`](crate::RecordMapper).
///
/// ```toml
/// codec = "json"
/// json_serialize_as_string = true
/// warn_on_unknown_flags = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Codec used for every field and row key.
    pub codec: CodecKind,
    /// With the JSON codec, write native values as UTF-8 text instead of
    /// their binary encodings.
    pub json_serialize_as_string: bool,
    /// Log codec flags the codec does not recognize when a schema is validated.
    pub warn_on_unknown_flags: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::BestFit,
            json_serialize_as_string: false,
            warn_on_unknown_flags: true,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> MapperResult<Self> {
        toml::from_str(text).map_err(|e| MapperError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> MapperResult<String> {
        toml::to_string(self).map_err(|e| MapperError::Config(e.to_string()))
    }

    /// Instantiate the configured codec.
    pub fn build_codec(&self) -> Arc<dyn Codec> {
        match self.codec {
            CodecKind::BestFit => Arc::new(BestFitCodec::new()),
            CodecKind::Json => Arc::new(JsonCodec::with_serialize_as_string(
                self.json_serialize_as_string,
            )),
        }
    }
}
