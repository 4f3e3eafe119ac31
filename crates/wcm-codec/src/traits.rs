use crate::error::CodecResult;
use crate::options::CodecOptions;
use crate::value::{CellValue, ValueType};

/// Strategy for turning field values into cell bytes and back.
///
/// All implementations must satisfy these invariants:
/// - `serialize(None, _)` is `Ok(None)`: nothing is written for absent values.
/// - `deserialize(None, ..)` and `deserialize(Some(&[]), ..)` are `Ok(None)`.
/// - Output is deterministic for identical input and options.
/// - For every type where `supports` is `true`, `deserialize` inverts
///   `serialize` under the same options.
///
/// The trait is object-safe and `Send + Sync` so a mapper can hold an
/// `Arc<dyn Codec>` shared across threads.
pub trait Codec: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Encode a value.
    fn serialize(
        &self,
        value: Option<&CellValue>,
        options: &CodecOptions,
    ) -> CodecResult<Option<Vec<u8>>>;

    /// Decode bytes into a value of the target type.
    fn deserialize(
        &self,
        bytes: Option<&[u8]>,
        target: ValueType,
        options: &CodecOptions,
    ) -> CodecResult<Option<CellValue>>;

    /// Whether values of `target` can be encoded and decoded.
    fn supports(&self, target: ValueType) -> bool;

    /// Option flags this codec interprets. Anything else is ignored.
    fn recognized_flags(&self) -> &[&'static str] {
        &[]
    }
}
