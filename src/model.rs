//! Narrow accessor contracts for the span/measure/view/tag object model this
//! client consumes but does not own. A host application implements these
//! traits directly on its existing types rather than copying data into
//! client-owned structs; see §6 of the protocol description.

use serde::Serialize;

use crate::wire::ValueType;

/// A named numeric quantity definition.
pub trait Measure {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn unit(&self) -> &str;
    fn value_type(&self) -> ValueType;
}

/// A rule for combining measurements, identified on the wire by a numeric
/// type code. `bucket_boundaries` returning `Some` is what the wire encoding
/// treats as "the distribution variant" — there is no separate enum on this
/// trait for that, the `Option` itself is the discriminant.
///
/// Whether the returned boundaries are monotonically increasing is not
/// enforced here; the encoder writes whatever is returned, in the order
/// given.
pub trait Aggregation {
    fn type_code(&self) -> u64;
    fn bucket_boundaries(&self) -> Option<Vec<f64>>;
}

/// A named aggregation over a measure, optionally filtered by tag keys.
pub trait View {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn tag_keys(&self) -> Vec<String>;
    fn measure_name(&self) -> &str;
    fn aggregation(&self) -> &dyn Aggregation;
}

/// A single key/value label attached to recorded measurements.
pub trait Tag {
    fn key(&self) -> &str;
    fn value(&self) -> &str;
}

/// A set of tags recorded alongside a measurement.
pub trait TagContext {
    fn tags(&self) -> Vec<&dyn Tag>;
}

/// A [`TagContext`] with no tags, for callers recording measurements with no
/// active tag set.
pub struct NoTags;

impl TagContext for NoTags {
    fn tags(&self) -> Vec<&dyn Tag> {
        Vec::new()
    }
}

/// The concrete value carried by a [`Measurement`].
///
/// `Unknown` measurements write their value-type tag on the wire and no
/// value bytes at all; this mirrors the reference client's behavior and is
/// a fragile wire-format quirk rather than an oversight — receivers must
/// infer the absence of a value from the tag alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementValue {
    Int(i64),
    Float(f64),
    Unknown,
}

impl MeasurementValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            MeasurementValue::Int(_) => ValueType::Int,
            MeasurementValue::Float(_) => ValueType::Float,
            MeasurementValue::Unknown => ValueType::Unknown,
        }
    }
}

/// A single recorded value of a measure.
pub trait Measurement {
    fn measure_name(&self) -> &str;
    fn value(&self) -> MeasurementValue;
}

/// The outcome of a unit of traced work.
#[derive(Debug, Clone, Serialize)]
pub struct SpanStatus {
    pub code: i32,
    pub message: String,
}

/// A unit of traced work, as exported to the daemon. This is the projection
/// the trace-export dispatcher serializes to JSON; a host `Span`
/// implementation is adapted into this shape via [`Span::to_record`].
#[derive(Debug, Clone, Serialize)]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub name: String,
    pub kind: String,
    pub stack_trace: String,
    pub start_time: f64,
    pub end_time: f64,
    pub status: SpanStatus,
    pub attributes: serde_json::Value,
    pub time_events: serde_json::Value,
    pub links: serde_json::Value,
    pub same_process_as_parent_span: bool,
}

/// A unit of traced work with timing and metadata.
pub trait Span {
    fn trace_id(&self) -> String;
    fn span_id(&self) -> String;
    fn parent_span_id(&self) -> String;
    fn name(&self) -> String;
    fn kind(&self) -> String;
    fn stack_trace(&self) -> String;
    fn start_time(&self) -> f64;
    fn end_time(&self) -> f64;
    fn status(&self) -> SpanStatus;
    fn attributes(&self) -> serde_json::Value;
    fn time_events(&self) -> serde_json::Value;
    fn links(&self) -> serde_json::Value;
    fn same_process_as_parent_span(&self) -> bool;

    /// Projects this span into the JSON-serializable record the wire
    /// protocol actually sends. Provided so implementers only need the
    /// narrow field accessors above.
    fn to_record(&self) -> SpanRecord {
        SpanRecord {
            trace_id: self.trace_id(),
            span_id: self.span_id(),
            parent_span_id: self.parent_span_id(),
            name: self.name(),
            kind: self.kind(),
            stack_trace: self.stack_trace(),
            start_time: self.start_time(),
            end_time: self.end_time(),
            status: self.status(),
            attributes: self.attributes(),
            time_events: self.time_events(),
            links: self.links(),
            same_process_as_parent_span: self.same_process_as_parent_span(),
        }
    }
}
