pub mod constants;
pub mod frame;
pub mod message;

pub use constants::*;
pub use frame::{build_frame, send_frame, NonBlockingWrite};
pub use message::{Message, MessageType, ValueType};
