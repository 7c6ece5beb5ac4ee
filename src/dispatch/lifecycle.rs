//! Payload encoders for the two process-lifecycle handshake frames.

use crate::primitives::encode_str;
use crate::wire::PROT_VERSION;

/// `[protocol version][host runtime version][extended runtime version]`
pub fn encode_req_init(runtime_version: &str, runtime_version_extended: &str) -> Vec<u8> {
    let mut buf = vec![PROT_VERSION];
    encode_str(runtime_version, &mut buf);
    encode_str(runtime_version_extended, &mut buf);
    buf
}
