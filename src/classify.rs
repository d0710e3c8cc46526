//! Turning a raw invocation into a finalized result record.

use crate::record::{truncate_chars, ResultRecord};
use crate::toolchain::Invocation;
use std::time::Duration;

/// Detail stored when a failed solver printed nothing to stderr.
pub const EMPTY_STDERR_DETAIL: &str = "Unknown error";

/// Finalize `pending` from `invocation`.
///
/// Priority: timeout, then non-zero exit, then success, then launch/wait errors.
/// The returned record is never `Unknown`.
pub fn classify(
    pending: ResultRecord,
    invocation: Invocation,
    limit: Duration,
    detail_limit: usize,
) -> ResultRecord {
    match invocation {
        Invocation::TimedOut => pending.timed_out(limit.as_secs_f64()),
        Invocation::Exited {
            success: false,
            stderr,
            elapsed,
            ..
        } => {
            let detail = if stderr.trim().is_empty() {
                EMPTY_STDERR_DETAIL.to_string()
            } else {
                truncate_chars(&stderr, detail_limit)
            };
            pending.failed(detail, elapsed.as_secs_f64())
        }
        Invocation::Exited {
            success: true,
            elapsed,
            ..
        } => pending.succeeded(elapsed.as_secs_f64()),
        Invocation::Errored(message) => {
            let detail = if message.trim().is_empty() {
                EMPTY_STDERR_DETAIL.to_string()
            } else {
                truncate_chars(&message, detail_limit)
            };
            pending.errored(detail)
        }
    }
}
