//! The process-wide singleton and its state machine: `Uninitialized` until
//! [`Session::init`] runs, `Ready` once the transport is open and the
//! `REQ_INIT` handshake has gone out, `Closed` once [`Session::shutdown`]
//! has run. There is no way back from `Closed`.

use std::sync::{LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::bypass::{ExtensionSink, FrameSink, NativeExtension, TransportSink};
use crate::config::InitOptions;
use crate::dispatch;
use crate::error::{DaemonClientError, DaemonResult};
use crate::model::{Measure, Measurement, NoTags, Span, TagContext, View};
use crate::platform;
use crate::primitives::FloatWidth;
use crate::transport;
use crate::wire::{Message, MessageType};

enum SessionSlot {
    Uninitialized,
    Ready(SessionCore),
    Closed,
}

struct SessionCore {
    sink: Box<dyn FrameSink>,
    sequence_nr: u64,
    float_width: FloatWidth,
    thread_identity_available: bool,
}

impl SessionCore {
    /// Increments the counter first, then returns the new value, so the
    /// first frame ever sent carries sequence number 1, not 0.
    fn next_sequence_nr(&mut self) -> u64 {
        self.sequence_nr += 1;
        self.sequence_nr
    }
}

static SESSION: LazyLock<Mutex<SessionSlot>> =
    LazyLock::new(|| Mutex::new(SessionSlot::Uninitialized));

fn process_start_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// The process-wide daemon client handle.
///
/// There is at most one live session per process: a second [`Session::init`]
/// call while already `Ready` is a no-op. All mutable state lives behind one
/// mutex, so concurrent callers serialize around frame assembly — this keeps
/// the sequence counter and the byte stream on the wire in lockstep, at the
/// cost of one send blocking another's caller for the duration of a write.
pub struct Session {
    _private: (),
}

/// Dropping this sends a best-effort `REQ_SHUTDOWN` frame and closes the
/// session.
///
/// A host that wires its own shutdown handler should call
/// [`Session::shutdown`] from it directly and may discard the guard
/// ([`Session::init`] still returns one either way). A host that doesn't must
/// keep this bound to a variable for the life of the process — binding it to
/// `_` drops it immediately, which would tear the session down on the same
/// line it was brought up.
#[must_use = "binding this to `_` drops it immediately and shuts the session down"]
pub struct ShutdownGuard {
    _private: (),
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        let _ = Session::shutdown();
    }
}

#[cfg(unix)]
fn transport_path(options: &InitOptions) -> std::path::PathBuf {
    options.socket_path.clone()
}

#[cfg(windows)]
fn transport_path(options: &InitOptions) -> std::path::PathBuf {
    std::path::PathBuf::from(&options.named_pipe_path)
}

fn open_transport_sink(options: &InitOptions) -> DaemonResult<Box<dyn FrameSink>> {
    let path = transport_path(options);
    let platform_transport = transport::connect(&path)?;
    Ok(Box::new(TransportSink::new(
        platform_transport,
        options.max_send_time,
    )))
}

impl Session {
    /// Opens the transport, probes this process's float width and thread
    /// identity, and sends the `REQ_INIT` handshake. Idempotent: a call made
    /// while already `Ready` returns a fresh guard without touching the
    /// transport or incrementing the sequence counter.
    pub fn init(
        options: InitOptions,
        runtime_version: &str,
        runtime_version_extended: &str,
    ) -> DaemonResult<ShutdownGuard> {
        let sink = open_transport_sink(&options)?;
        Self::init_with_sink(sink, runtime_version, runtime_version_extended)
    }

    /// As [`Session::init`], but delegates every frame to a co-resident
    /// native extension instead of opening this client's own transport. The
    /// `max_send_time` in `options` is ignored on this path: the extension,
    /// not this client, owns the deadline.
    pub fn init_bypassed(
        extension: Box<dyn NativeExtension>,
        runtime_version: &str,
        runtime_version_extended: &str,
    ) -> DaemonResult<ShutdownGuard> {
        let sink = Box::new(ExtensionSink::new(extension));
        Self::init_with_sink(sink, runtime_version, runtime_version_extended)
    }

    fn init_with_sink(
        sink: Box<dyn FrameSink>,
        runtime_version: &str,
        runtime_version_extended: &str,
    ) -> DaemonResult<ShutdownGuard> {
        let mut slot = SESSION.lock().unwrap();

        if matches!(*slot, SessionSlot::Ready(_)) {
            return Ok(ShutdownGuard { _private: () });
        }

        let mut core = SessionCore {
            sink,
            sequence_nr: 0,
            float_width: FloatWidth::probe(),
            thread_identity_available: platform::thread_id().is_some(),
        };

        let payload = dispatch::encode_req_init(runtime_version, runtime_version_extended);
        send(&mut core, MessageType::ReqInit, payload)?;
        log::debug!("daemon client session initialized (float_width={:?})", core.float_width);

        *slot = SessionSlot::Ready(core);
        Ok(ShutdownGuard { _private: () })
    }

    /// Sends the `REQ_SHUTDOWN` frame and moves the session to `Closed`.
    /// Operations invoked afterward fail with
    /// [`DaemonClientError::SessionClosed`]. Calling this more than once, or
    /// before [`Session::init`], is a no-op that returns `Ok(())`.
    pub fn shutdown() -> DaemonResult<()> {
        let mut slot = SESSION.lock().unwrap();

        let mut core = match std::mem::replace(&mut *slot, SessionSlot::Closed) {
            SessionSlot::Ready(core) => core,
            SessionSlot::Uninitialized | SessionSlot::Closed => return Ok(()),
        };

        log::debug!("daemon client session shutting down");
        send(&mut core, MessageType::ReqShutdown, Vec::new())
    }

    /// Serializes `spans` to JSON and ships them as a single `TRACE_EXPORT`
    /// frame. An empty slice is a no-op.
    pub fn trace_export(spans: &[&dyn Span]) -> DaemonResult<()> {
        if spans.is_empty() {
            return Ok(());
        }

        let payload = dispatch::encode_trace_export(spans).map_err(|e| {
            DaemonClientError::InvalidArgument(format!("failed to serialize spans: {e}"))
        })?;
        with_ready(move |_core| Ok(payload), MessageType::TraceExport)
    }

    /// Registers a measure definition with the daemon.
    pub fn measure_create(measure: &dyn Measure) -> DaemonResult<()> {
        let payload = dispatch::encode_measure_create(measure);
        with_ready(move |_core| Ok(payload), MessageType::MeasureCreate)
    }

    /// Sets the daemon's view export interval. Rejected before anything is
    /// sent when `period_secs` is below the protocol minimum.
    pub fn view_reporting_period(period_secs: f64) -> DaemonResult<()> {
        with_ready(
            |core| dispatch::encode_view_reporting_period(period_secs, core.float_width),
            MessageType::ViewReportingPeriod,
        )
    }

    /// Registers `views` with the daemon. An empty slice is a no-op.
    pub fn view_register(views: &[&dyn View]) -> DaemonResult<()> {
        if views.is_empty() {
            return Ok(());
        }
        with_ready(
            |core| Ok(dispatch::encode_view_register(views, core.float_width)),
            MessageType::ViewRegister,
        )
    }

    /// Unregisters `views` from the daemon. An empty slice is a no-op.
    pub fn view_unregister(views: &[&dyn View]) -> DaemonResult<()> {
        if views.is_empty() {
            return Ok(());
        }
        with_ready(
            |_core| Ok(dispatch::encode_view_unregister(views)),
            MessageType::ViewUnregister,
        )
    }

    /// Records `measurements` against `tag_context` and `attachments`. An
    /// empty `measurements` slice is a no-op.
    pub fn stats_record(
        measurements: &[&dyn Measurement],
        tag_context: &dyn TagContext,
        attachments: &[(String, String)],
    ) -> DaemonResult<()> {
        if measurements.is_empty() {
            return Ok(());
        }
        with_ready(
            |core| {
                Ok(dispatch::encode_stats_record(
                    measurements,
                    tag_context,
                    attachments,
                    core.float_width,
                ))
            },
            MessageType::StatsRecord,
        )
    }

    /// Whether the host platform exposes a per-thread identity, as probed at
    /// init. `false` before [`Session::init`] has run.
    pub fn thread_identity_available() -> bool {
        match &*SESSION.lock().unwrap() {
            SessionSlot::Ready(core) => core.thread_identity_available,
            SessionSlot::Uninitialized | SessionSlot::Closed => false,
        }
    }
}

/// Locks the session, hands the live [`SessionCore`] to `build_payload` to
/// produce the wire payload, and sends it. Payload construction happens
/// under the lock so it can read session state (the probed float width)
/// without a second round trip.
fn with_ready(
    build_payload: impl FnOnce(&mut SessionCore) -> DaemonResult<Vec<u8>>,
    msg_type: MessageType,
) -> DaemonResult<()> {
    let mut slot = SESSION.lock().unwrap();
    match &mut *slot {
        SessionSlot::Ready(core) => {
            let payload = build_payload(core)?;
            send(core, msg_type, payload)
        }
        SessionSlot::Uninitialized | SessionSlot::Closed => Err(DaemonClientError::SessionClosed),
    }
}

fn send(core: &mut SessionCore, msg_type: MessageType, payload: Vec<u8>) -> DaemonResult<()> {
    let msg = Message {
        msg_type,
        sequence_nr: core.next_sequence_nr(),
        process_id: platform::process_id(),
        thread_id: platform::thread_id().unwrap_or(0),
        start_time_secs: process_start_time(),
        payload,
    };
    let float_width = core.float_width;
    core.sink.send(msg, float_width).map_err(|err| {
        log::warn!("daemon client send failed for {msg_type:?}: {err}");
        err
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;
    use std::io::Read;
    use std::os::unix::net::UnixListener;

    // `Session` is a process-wide singleton behind one static mutex, so every
    // test below that calls `Session::init`/`Session::shutdown` must run with
    // no other such test interleaved in the same process, or one test's
    // "already Ready, return a fresh guard" short-circuit would silently
    // reuse another test's transport. `#[serial]` (all sharing the implicit
    // default key) forces them onto one thread.

    fn unique_socket_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "daemon-client-session-test-{tag}-{}.sock",
            std::process::id()
        ))
    }

    #[test]
    #[serial]
    fn test_stats_record_with_no_measurements_sends_nothing() {
        // No session initialized at all: would fail with SessionClosed if it
        // tried to send, so this only passes because the empty-batch
        // short-circuit runs before the Ready check.
        let measurements: Vec<&dyn Measurement> = vec![];
        assert!(Session::stats_record(&measurements, &NoTags, &[]).is_ok());
    }

    #[test]
    #[serial]
    fn test_view_register_and_unregister_with_empty_slice_are_no_ops() {
        let views: Vec<&dyn View> = vec![];
        assert!(Session::view_register(&views).is_ok());
        assert!(Session::view_unregister(&views).is_ok());
    }

    #[test]
    #[serial]
    fn test_trace_export_with_no_spans_sends_nothing() {
        let spans: Vec<&dyn Span> = vec![];
        assert!(Session::trace_export(&spans).is_ok());
    }

    #[test]
    #[serial]
    fn test_init_against_a_real_listener_sends_req_init_then_shutdown_sends_req_shutdown() {
        let path = unique_socket_path("s3-s4");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let mut options = InitOptions::default();
        options.socket_path = path.clone();

        let guard = Session::init(options, "test-runtime", "test-runtime-ext").unwrap();

        let (mut conn, _) = listener.accept().unwrap();
        let mut init_frame = [0u8; 64];
        let n = conn.read(&mut init_frame).unwrap();
        assert!(n >= 5);
        assert_eq!(&init_frame[0..4], &[0, 0, 0, 0]);
        assert_eq!(init_frame[4], MessageType::ReqInit as u8);

        drop(guard);

        let mut shutdown_frame = [0u8; 64];
        let n = conn.read(&mut shutdown_frame).unwrap();
        assert!(n >= 5);
        assert_eq!(&shutdown_frame[0..4], &[0, 0, 0, 0]);
        assert_eq!(shutdown_frame[4], MessageType::ReqShutdown as u8);

        drop(listener);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[serial]
    fn test_operations_after_shutdown_fail_with_session_closed() {
        let path = unique_socket_path("s6");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let mut options = InitOptions::default();
        options.socket_path = path.clone();

        let guard = Session::init(options, "v", "v-ext").unwrap();
        let (_conn, _) = listener.accept().unwrap();

        Session::shutdown().unwrap();
        drop(guard); // already closed; the guard's own shutdown is a no-op

        let measurement = crate::model::MeasurementValue::Int(1);
        struct M(crate::model::MeasurementValue);
        impl Measurement for M {
            fn measure_name(&self) -> &str {
                "m"
            }
            fn value(&self) -> crate::model::MeasurementValue {
                self.0
            }
        }
        let m = M(measurement);
        let measurements: Vec<&dyn Measurement> = vec![&m];
        let err = Session::stats_record(&measurements, &NoTags, &[]).unwrap_err();
        assert!(matches!(err, DaemonClientError::SessionClosed));

        drop(listener);
        let _ = std::fs::remove_file(&path);
    }
}
