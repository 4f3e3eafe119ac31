use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flag that makes [`BestFitCodec`](crate::BestFitCodec) store native values
/// as their UTF-8 text instead of the binary encoding.
pub const SERIALIZE_AS_STRING: &str = "serializeAsString";

/// Named string flags attached to a column (or to a table's row key) and
/// handed to the codec untouched.
///
/// Each codec reads the flags it recognizes into its own typed options
/// (see [`BestFitOptions`]); any other flag is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    flags: BTreeMap<String, String>,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a flag, returning its previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.flags.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    /// Returns `true` if the flag is set to `"true"` (any case).
    pub fn is_true(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Typed options understood by [`BestFitCodec`](crate::BestFitCodec).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BestFitOptions {
    /// Store native values as UTF-8 text.
    pub serialize_as_string: bool,
}

impl BestFitOptions {
    pub fn from_options(options: &CodecOptions) -> Self {
        Self {
            serialize_as_string: options.is_true(SERIALIZE_AS_STRING),
        }
    }
}
