use crate::error::DaemonClientError;

/// Wire type tag for the six application-level message kinds plus the two
/// process-lifecycle handshake frames. Partitioned by purpose: process
/// lifecycle (0x01-0x02), request lifecycle (0x03-0x04), trace (0x14),
/// stats (0x28-0x2C).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    ProcInit = 0x01,
    ProcShutdown = 0x02,
    ReqInit = 0x03,
    ReqShutdown = 0x04,
    TraceExport = 0x14,
    MeasureCreate = 0x28,
    ViewReportingPeriod = 0x29,
    ViewRegister = 0x2A,
    ViewUnregister = 0x2B,
    StatsRecord = 0x2C,
}

impl MessageType {
    pub fn try_from_u8(value: u8) -> Result<Self, DaemonClientError> {
        match value {
            0x01 => Ok(MessageType::ProcInit),
            0x02 => Ok(MessageType::ProcShutdown),
            0x03 => Ok(MessageType::ReqInit),
            0x04 => Ok(MessageType::ReqShutdown),
            0x14 => Ok(MessageType::TraceExport),
            0x28 => Ok(MessageType::MeasureCreate),
            0x29 => Ok(MessageType::ViewReportingPeriod),
            0x2A => Ok(MessageType::ViewRegister),
            0x2B => Ok(MessageType::ViewUnregister),
            0x2C => Ok(MessageType::StatsRecord),
            _ => Err(DaemonClientError::InvalidArgument(format!(
                "unknown message type 0x{value:02x}"
            ))),
        }
    }
}

/// One byte identifying the concrete shape of a measurement value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int = 0x01,
    Float = 0x02,
    Unknown = 0xFF,
}

/// A transient frame payload, not retained after it is handed to the frame
/// writer. `thread_id` is `0` when the host has no thread concept.
#[derive(Debug, Clone)]
pub struct Message {
    pub msg_type: MessageType,
    pub sequence_nr: u64,
    pub process_id: u64,
    pub thread_id: u64,
    pub start_time_secs: f64,
    pub payload: Vec<u8>,
}
