//! Error reporting.
//!
//! # Data Flow
//! ```text
//! application error
//!     → find_stack_trace (walk source chain, downcast to TracedError)
//!     → error_message (ErrorMsg: message, stacks, innermost file/line)
//!     → UbtClient::send_error (dispatch at error level)
//! ```
//!
//! # Design Decisions
//! - Call frames come from `#[track_caller]` locations recorded as an error
//!   propagates, not from runtime backtraces
//! - An error without frames is normal and yields empty `stacks`

pub mod traced;

pub use traced::{find_stack_trace, Frame, ResultExt, StackTrace, TracedError};

use crate::message::ErrorMsg;

/// Convert an error into the record shipped to the collector.
pub fn error_message(err: &(dyn std::error::Error + 'static)) -> ErrorMsg {
    let mut error = ErrorMsg {
        message: err.to_string(),
        ..Default::default()
    };

    if let Some(frames) = find_stack_trace(err).filter(|f| !f.is_empty()) {
        error.stacks = frames
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        error.file = frames[0].file.to_string();
        error.line = frames[0].line.to_string();
    }
    error
}
