pub mod float;
pub mod string;
pub mod varint;

pub use float::{decode_float, encode_float, FloatWidth, WIRE_FLOAT_LEN};
pub use string::{decode_string, encode_str, encoded_len_str};
pub use varint::{decode_u64, encode_u64, encoded_len, VarInt};
