//! End-to-end scenarios against a real `UnixListener`, exercising the full
//! init -> send -> shutdown path through [`Session`] rather than the
//! individual payload encoders.

use std::io::Read;
use std::os::unix::net::UnixListener;

use daemon_client::model::{Measurement, MeasurementValue, NoTags};
use daemon_client::{DaemonClientError, InitOptions, Session};
use serial_test::serial;

// `Session` is a process-wide singleton, so every test in this file that
// drives it through `Session::init` must be `#[serial]` — otherwise two
// tests running on separate threads in the same process could see `init`'s
// "already Ready" short-circuit hand back another test's transport.

fn unique_socket_path(tag: &str) -> std::path::PathBuf {
    let _ = env_logger::try_init();
    std::env::temp_dir().join(format!(
        "daemon-client-integration-{tag}-{}.sock",
        std::process::id()
    ))
}

fn read_one_frame(conn: &mut impl Read) -> Vec<u8> {
    let mut buf = [0u8; 256];
    let n = conn.read(&mut buf).unwrap();
    buf[..n].to_vec()
}

struct OneMeasurement {
    name: &'static str,
    value: MeasurementValue,
}

impl Measurement for OneMeasurement {
    fn measure_name(&self) -> &str {
        self.name
    }
    fn value(&self) -> MeasurementValue {
        self.value
    }
}

#[test]
#[serial]
fn test_s1_stats_record_one_int_measurement_end_to_end() {
    let path = unique_socket_path("s1");
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).unwrap();

    let mut options = InitOptions::default();
    options.socket_path = path.clone();
    let guard = Session::init(options, "test", "test-ext").unwrap();

    let (mut conn, _) = listener.accept().unwrap();
    let _init_frame = read_one_frame(&mut conn);

    let measurement = OneMeasurement {
        name: "requests",
        value: MeasurementValue::Int(7),
    };
    let measurements: Vec<&dyn Measurement> = vec![&measurement];
    Session::stats_record(&measurements, &NoTags, &[]).unwrap();

    let frame = read_one_frame(&mut conn);
    // header: START_OF_MSG(4) | TYPE(1) | SEQ | PID | TID | START_TIME | MSG_LEN, then payload
    assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
    assert_eq!(frame[4], daemon_client::MessageType::StatsRecord as u8);

    let expected_payload: &[u8] = &[0x01, 0x08, b'r', b'e', b'q', b'u', b'e', b's', b't', b's', 0x01, 0x07];
    assert!(frame.windows(expected_payload.len()).any(|w| w == expected_payload));

    drop(guard);
    drop(listener);
    let _ = std::fs::remove_file(&path);
}

#[test]
#[serial]
fn test_s3_reporting_period_below_minimum_sends_no_frame() {
    let path = unique_socket_path("s3");
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).unwrap();

    let mut options = InitOptions::default();
    options.socket_path = path.clone();
    let guard = Session::init(options, "test", "test-ext").unwrap();

    let (mut conn, _) = listener.accept().unwrap();
    let _init_frame = read_one_frame(&mut conn);

    let err = Session::view_reporting_period(0.5).unwrap_err();
    assert!(matches!(err, DaemonClientError::InvalidArgument(_)));

    conn.set_read_timeout(Some(std::time::Duration::from_millis(50)))
        .unwrap();
    let mut buf = [0u8; 16];
    let result = conn.read(&mut buf);
    assert!(result.is_err() || result.unwrap() == 0, "no frame should have been sent");

    drop(guard);
    drop(listener);
    let _ = std::fs::remove_file(&path);
}

#[test]
#[serial]
fn test_s4_reporting_period_2_5_emits_a_single_float_frame() {
    let path = unique_socket_path("s4");
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).unwrap();

    let mut options = InitOptions::default();
    options.socket_path = path.clone();
    let guard = Session::init(options, "test", "test-ext").unwrap();

    let (mut conn, _) = listener.accept().unwrap();
    let _init_frame = read_one_frame(&mut conn);

    Session::view_reporting_period(2.5).unwrap();

    let frame = read_one_frame(&mut conn);
    assert_eq!(frame[4], daemon_client::MessageType::ViewReportingPeriod as u8);

    // the payload is exactly one float; the last WIRE_FLOAT_LEN bytes of the
    // frame hold its little-endian f64.
    let float_len = daemon_client::primitives::WIRE_FLOAT_LEN;
    let float_bytes = &frame[frame.len() - float_len..];
    let decoded = f64::from_le_bytes(float_bytes.try_into().unwrap());
    assert!((decoded - 2.5).abs() < 1e-9);

    drop(guard);
    drop(listener);
    let _ = std::fs::remove_file(&path);
}

#[test]
#[serial]
fn test_s6_shutdown_sends_a_final_empty_req_shutdown_frame() {
    let path = unique_socket_path("s6");
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path).unwrap();

    let mut options = InitOptions::default();
    options.socket_path = path.clone();
    let guard = Session::init(options, "test", "test-ext").unwrap();

    let (mut conn, _) = listener.accept().unwrap();
    let _init_frame = read_one_frame(&mut conn);

    drop(guard);

    let frame = read_one_frame(&mut conn);
    assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
    assert_eq!(frame[4], daemon_client::MessageType::ReqShutdown as u8);
    // msg_len varint immediately follows the header fields and must be 0;
    // the frame ends right after it with no payload bytes trailing.
    assert_eq!(*frame.last().unwrap(), 0x00);

    drop(listener);
    let _ = std::fs::remove_file(&path);
}
