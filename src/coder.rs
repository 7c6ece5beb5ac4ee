use crate::error::DaemonResult;

/// Shared encode/decode contract for the primitive wire types (varint,
/// string, float) and for the higher-level dispatcher payloads built out of
/// them.
///
/// `encode` appends to an existing buffer rather than returning a fresh one:
/// every wire value is interleaved with sibling fields during frame assembly,
/// so a caller almost never wants an allocation back.
pub trait Coder: Sized {
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decodes a value from the front of `buf`, advancing it past the bytes
    /// consumed. Leaves `buf` untouched on error.
    fn decode(buf: &mut &[u8]) -> DaemonResult<Self>;
}
