//! Little-endian IEEE-754 floats, with the width probed once per session.
//!
//! A 32-bit field is still written as 8 bytes on the wire: two zero-padding
//! bytes, the 4-byte float, two more zero-padding bytes. A receiver can tell
//! the two widths apart by checking whether those sentinel positions are
//! zero, which is what lets a daemon built with a different native float
//! width decode frames from this client without a negotiation round trip.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::DaemonClientError;

pub const WIRE_FLOAT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    /// Probes the host's native double representation by encoding `1.0` and
    /// measuring the result, exactly as the reference client does. In Rust
    /// `f64` is always 8 bytes, so this resolves to `F64` on every target;
    /// it is kept as an explicit computation rather than a hardcoded
    /// constant so the session's behavior stays traceable to this rule
    /// rather than to an assumption baked into the type system.
    pub fn probe() -> Self {
        let probe: f64 = 1.0;
        match std::mem::size_of_val(&probe) {
            4 => FloatWidth::F32,
            8 => FloatWidth::F64,
            other => unreachable!("unsupported native float width: {other} bytes"),
        }
    }
}

/// Appends the wire encoding of `value` to `buf`. Always writes
/// [`WIRE_FLOAT_LEN`] bytes regardless of `width`.
pub fn encode_float(value: f64, width: FloatWidth, buf: &mut Vec<u8>) {
    match width {
        FloatWidth::F64 => buf
            .write_f64::<LittleEndian>(value)
            .expect("writes to a Vec<u8> never fail"),
        FloatWidth::F32 => {
            buf.extend_from_slice(&[0, 0]);
            buf.write_f32::<LittleEndian>(value as f32)
                .expect("writes to a Vec<u8> never fail");
            buf.extend_from_slice(&[0, 0]);
        }
    }
}

/// Decodes a wire float from the front of `buf`, advancing past the
/// [`WIRE_FLOAT_LEN`] bytes consumed.
pub fn decode_float(buf: &mut &[u8], width: FloatWidth) -> Result<f64, DaemonClientError> {
    if buf.len() < WIRE_FLOAT_LEN {
        return Err(DaemonClientError::Varint("buffer too short for float field"));
    }

    let (field, rest) = buf.split_at(WIRE_FLOAT_LEN);
    *buf = rest;

    let value = match width {
        FloatWidth::F64 => {
            let mut cursor = field;
            cursor
                .read_f64::<LittleEndian>()
                .expect("field is exactly 8 bytes")
        }
        FloatWidth::F32 => {
            let mut cursor = &field[2..6];
            cursor
                .read_f32::<LittleEndian>()
                .expect("field slice is exactly 4 bytes") as f64
        }
    };

    Ok(value)
}
