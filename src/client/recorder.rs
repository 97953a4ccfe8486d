//! Send history for inline (test / CI) dispatch.
//!
//! One recorder belongs to one inline client. It is not a general purpose
//! concurrent log buffer: tests sharing a client must run one at a time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::transport::TransportError;

/// Snapshot of everything recorded since the last [`Recorder::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderState {
    /// Text of the most recent message.
    pub last_message: String,
    /// Every message text, in dispatch order.
    pub history: Vec<String>,
    /// Body returned by the collector for the most recent message.
    pub last_response: String,
    /// Transport error for the most recent message, if any.
    pub last_error: Option<String>,
}

/// Resettable accumulator of inline dispatch outcomes.
#[derive(Debug, Default)]
pub struct Recorder {
    state: Mutex<RecorderState>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a message about to be sent. Clears the previous error.
    pub(crate) fn begin(&self, text: &str) {
        let mut state = self.lock();
        state.last_error = None;
        state.last_message = text.to_string();
        state.history.push(text.to_string());
    }

    /// Record the transport outcome of the message passed to `begin`.
    pub(crate) fn finish(&self, outcome: &Result<String, TransportError>) {
        let mut state = self.lock();
        match outcome {
            Ok(body) => state.last_response = body.clone(),
            Err(e) => {
                state.last_response = match e {
                    TransportError::Status { body, .. } => body.clone(),
                    _ => String::new(),
                };
                state.last_error = Some(e.to_string());
            }
        }
    }

    /// Empty the history and reset the last message, response and error.
    pub fn clear(&self) {
        *self.lock() = RecorderState::default();
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    pub fn last_message(&self) -> String {
        self.lock().last_message.clone()
    }

    pub fn last_response(&self) -> String {
        self.lock().last_response.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> RecorderState {
        self.lock().clone()
    }
}
