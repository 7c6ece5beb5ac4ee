//! Out-of-band trace and stats export to a local daemon over a
//! length-delimited binary IPC protocol: a Unix domain socket on POSIX, a
//! named pipe on Windows.
//!
//! A host process calls [`Session::init`] once at startup, keeps the
//! returned [`ShutdownGuard`] alive for the process lifetime, and then
//! drives the six dispatchers on [`Session`] as spans and stats come in.
//! Every send is non-blocking and deadline-bounded: a slow or wedged daemon
//! degrades the host's own timing budget by at most [`config::InitOptions`]'s
//! `max_send_time`, never by blocking indefinitely.

pub mod bypass;
pub mod coder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod platform;
pub mod primitives;
pub mod session;
pub mod transport;
pub mod wire;

pub use bypass::{FrameSink, NativeExtension};
pub use config::{ConfigValue, InitOptions};
pub use error::{DaemonClientError, DaemonResult};
pub use model::{
    Aggregation, Measure, Measurement, MeasurementValue, NoTags, Span, SpanRecord, SpanStatus, Tag,
    TagContext, View,
};
pub use session::{Session, ShutdownGuard};
pub use wire::{MessageType, ValueType};
