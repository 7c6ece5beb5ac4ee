//! Frame assembly and the deadline-bounded non-blocking send loop.

use std::io::{self, ErrorKind};
use std::time::{Duration, Instant};

use super::constants::START_OF_MSG;
use super::message::Message;
use crate::error::DaemonClientError;
use crate::primitives::{encode_float, encode_u64, FloatWidth};

/// Anything the frame writer can issue a non-blocking write against.
/// Implemented by the platform transports; kept separate from `std::io::Write`
/// because a non-blocking write legitimately returns `WouldBlock` as part of
/// normal operation rather than as an error to propagate.
pub trait NonBlockingWrite {
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// Serializes `msg` into a contiguous header+payload buffer per the wire
/// layout: `START_OF_MSG | TYPE | SEQUENCE_NR | PROCESS_ID | THREAD_ID |
/// START_TIME | MSG_LEN | PAYLOAD`.
pub fn build_frame(msg: &Message, float_width: FloatWidth) -> Vec<u8> {
    let mut buf = Vec::with_capacity(START_OF_MSG.len() + 1 + 24 + msg.payload.len());

    buf.extend_from_slice(&START_OF_MSG);
    buf.push(msg.msg_type as u8);
    encode_u64(msg.sequence_nr, &mut buf);
    encode_u64(msg.process_id, &mut buf);
    encode_u64(msg.thread_id, &mut buf);
    encode_float(msg.start_time_secs, float_width, &mut buf);
    encode_u64(msg.payload.len() as u64, &mut buf);
    buf.extend_from_slice(&msg.payload);

    buf
}

/// Writes `frame` to `writer` within `budget`, retrying partial writes until
/// either the whole buffer lands or the deadline passes.
///
/// A write returning `0` or a non-`WouldBlock` error terminates the send
/// immediately. A deadline expiring with bytes still buffered is reported as
/// failure without attempting recovery: whatever was already written stays
/// on the wire, and the receiver is expected to resync on the next frame's
/// leading zero bytes.
pub fn send_frame(
    writer: &mut dyn NonBlockingWrite,
    frame: &[u8],
    budget: Duration,
) -> Result<(), DaemonClientError> {
    let deadline = Instant::now() + budget;
    let mut sent = 0usize;

    while sent < frame.len() {
        if Instant::now() >= deadline {
            return Err(DaemonClientError::DeadlineExceeded {
                budget_secs: budget.as_secs_f64(),
                sent,
                total: frame.len(),
            });
        }

        match writer.try_write(&frame[sent..]) {
            Ok(0) => {
                return Err(DaemonClientError::WriteFailed(io::Error::new(
                    ErrorKind::WriteZero,
                    "transport write returned 0 bytes",
                )))
            }
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
            Err(e) => return Err(DaemonClientError::WriteFailed(e)),
        }
    }

    Ok(())
}
