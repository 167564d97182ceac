use crate::error::DecodeError;
use tracing::{error, warn};

/// Receives non-fatal decode diagnostics.
///
/// Warnings are parser-level oddities the decoder recovers from (ignored
/// attributes, stray character data, skipped processing instructions).
/// Errors are benign frame failures: the frame's value becomes null and the
/// decode continues. Structural and policy failures never reach the
/// listener-and-continue path; they abort the decode.
pub trait DecodeListener {
    fn warning(&self, message: &str);
    fn error(&self, error: &DecodeError);
}

/// Default listener: logs through `tracing`, swallows nothing silently.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl DecodeListener for TracingListener {
    fn warning(&self, message: &str) {
        warn!(target: "wicker_xml", message, "decode warning");
    }

    fn error(&self, err: &DecodeError) {
        error!(target: "wicker_xml", error = %err, "decode element failed");
    }
}
