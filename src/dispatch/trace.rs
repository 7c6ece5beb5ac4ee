//! Trace export: spans are JSON, not binary. They are variable-shape,
//! evolve frequently, and are produced at lower rates than stats, so the
//! simplicity of JSON wins over the density of a binary encoding here.

use crate::model::Span;

/// Serializes `spans` to a JSON array and returns it as the payload bytes.
/// The projection fields come from [`crate::model::SpanRecord`].
pub fn encode_trace_export(spans: &[&dyn Span]) -> serde_json::Result<Vec<u8>> {
    let records: Vec<_> = spans.iter().map(|span| span.to_record()).collect();
    serde_json::to_vec(&records)
}
