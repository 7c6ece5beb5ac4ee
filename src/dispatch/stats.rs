//! Payload encoders for the five stats-shaped message kinds: measure
//! create, view reporting period, view register/unregister, stats record.
//!
//! Each function returns the exact payload bytes the frame writer wraps; it
//! does not know about sequence numbers, transports, or frames.

use crate::error::{DaemonClientError, DaemonResult};
use crate::model::{Aggregation, Measure, Measurement, NoTags, TagContext, View};
use crate::primitives::{encode_float, encode_str, encode_u64, FloatWidth};
use crate::wire::constants::MIN_REPORTING_PERIOD_SECS;

/// `[value-type tag][name][description][unit]`
pub fn encode_measure_create(measure: &dyn Measure) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(measure.value_type() as u8);
    encode_str(measure.name(), &mut buf);
    encode_str(measure.description(), &mut buf);
    encode_str(measure.unit(), &mut buf);
    buf
}

/// `[period]`. Rejected at the boundary (no payload built, no frame sent)
/// when `period_secs < 1.0`.
pub fn encode_view_reporting_period(
    period_secs: f64,
    float_width: FloatWidth,
) -> DaemonResult<Vec<u8>> {
    if period_secs < MIN_REPORTING_PERIOD_SECS {
        return Err(DaemonClientError::InvalidArgument(format!(
            "reporting period {period_secs}s is below the {MIN_REPORTING_PERIOD_SECS}s minimum"
        )));
    }

    let mut buf = Vec::new();
    encode_float(period_secs, float_width, &mut buf);
    Ok(buf)
}

/// `[count][per view: name, description, tag key count, tag keys...,
/// measure name, aggregation type code, (bucket count, buckets...)?]`
pub fn encode_view_register(views: &[&dyn View], float_width: FloatWidth) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_u64(views.len() as u64, &mut buf);

    for view in views {
        encode_str(view.name(), &mut buf);
        encode_str(view.description(), &mut buf);

        let tag_keys = view.tag_keys();
        encode_u64(tag_keys.len() as u64, &mut buf);
        for key in &tag_keys {
            encode_str(key, &mut buf);
        }

        encode_str(view.measure_name(), &mut buf);

        let aggregation = view.aggregation();
        encode_u64(aggregation.type_code(), &mut buf);

        if let Some(boundaries) = aggregation.bucket_boundaries() {
            encode_u64(boundaries.len() as u64, &mut buf);
            for boundary in boundaries {
                encode_float(boundary, float_width, &mut buf);
            }
        }
    }

    buf
}

/// `[count][per view: name]`
pub fn encode_view_unregister(views: &[&dyn View]) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_u64(views.len() as u64, &mut buf);
    for view in views {
        encode_str(view.name(), &mut buf);
    }
    buf
}

/// `[count][per measurement: measure name, value-type tag, value?]
/// [tag count][per tag: key, value][attachment count][per attachment: key, value]`
///
/// The "unknown" measurement value type writes its tag byte and nothing
/// else; there is no value to encode and the receiver must infer that from
/// the tag alone.
pub fn encode_stats_record(
    measurements: &[&dyn Measurement],
    tag_context: &dyn TagContext,
    attachments: &[(String, String)],
    float_width: FloatWidth,
) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_u64(measurements.len() as u64, &mut buf);

    for measurement in measurements {
        encode_str(measurement.measure_name(), &mut buf);
        let value = measurement.value();
        buf.push(value.value_type() as u8);
        match value {
            crate::model::MeasurementValue::Int(v) => encode_u64(v as u64, &mut buf),
            crate::model::MeasurementValue::Float(v) => encode_float(v, float_width, &mut buf),
            crate::model::MeasurementValue::Unknown => {}
        }
    }

    let tags = tag_context.tags();
    encode_u64(tags.len() as u64, &mut buf);
    for tag in tags {
        encode_str(tag.key(), &mut buf);
        encode_str(tag.value(), &mut buf);
    }

    encode_u64(attachments.len() as u64, &mut buf);
    for (key, value) in attachments {
        encode_str(key, &mut buf);
        encode_str(value, &mut buf);
    }

    buf
}
