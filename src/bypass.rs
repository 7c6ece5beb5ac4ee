//! The frame delivery capability: either this client writes frames to the
//! transport itself, or a co-resident native extension is asked to deliver
//! them instead. Chosen once at init; the dispatchers never see the branch,
//! only a single virtual call through [`FrameSink`].

use std::time::Duration;

use crate::error::DaemonResult;
use crate::platform;
use crate::primitives::FloatWidth;
use crate::transport::PlatformTransport;
use crate::wire::{build_frame, send_frame, Message};

/// A narrow interface a host process implements when it ships a co-resident
/// native extension capable of delivering frames on this client's behalf.
/// The client trusts the extension to deliver what it is handed; there is no
/// feedback path beyond the boolean result.
pub trait NativeExtension: Send {
    /// Hands the extension a message type tag and its payload to deliver.
    /// On this path the frame writer is skipped entirely: no header is
    /// assembled, and no sequence number, process/thread ID, or timestamp is
    /// produced by this client — the extension owns framing itself. Returns
    /// whether delivery succeeded.
    fn deliver_frame(&mut self, msg_type: u8, payload: &[u8]) -> bool;
}

/// Where a [`Message`] goes once the dispatcher has built its payload.
pub trait FrameSink: Send {
    fn send(&mut self, msg: Message, float_width: FloatWidth) -> DaemonResult<()>;
}

/// Writes frames to this client's own transport, deadline-bounded.
pub struct TransportSink {
    transport: PlatformTransport,
    budget: Duration,
}

impl TransportSink {
    pub fn new(transport: PlatformTransport, budget: Duration) -> Self {
        Self { transport, budget }
    }
}

impl FrameSink for TransportSink {
    fn send(&mut self, msg: Message, float_width: FloatWidth) -> DaemonResult<()> {
        let frame = build_frame(&msg, float_width);
        send_frame(&mut self.transport, &frame, self.budget)
    }
}

/// Delegates delivery to a co-resident native extension. The transport
/// handle is never opened on this path.
pub struct ExtensionSink {
    extension: Box<dyn NativeExtension>,
}

impl ExtensionSink {
    pub fn new(extension: Box<dyn NativeExtension>) -> Self {
        Self { extension }
    }
}

impl FrameSink for ExtensionSink {
    /// Skips the frame writer entirely, per §4.4's bypass path: the
    /// extension gets only the type byte and payload, never a sequence
    /// number, process/thread ID, or timestamp from this client.
    fn send(&mut self, msg: Message, _float_width: FloatWidth) -> DaemonResult<()> {
        if self.extension.deliver_frame(msg.msg_type as u8, &msg.payload) {
            Ok(())
        } else {
            Err(crate::error::DaemonClientError::WriteFailed(
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "native extension declined to deliver frame",
                ),
            ))
        }
    }
}

/// Whether the current host exposes per-thread IDs, probed once at init
/// alongside the float width.
pub fn thread_identity_available() -> bool {
    platform::thread_id().is_some()
}
