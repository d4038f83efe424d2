//! Per-flow progress feedback: a single latest-value slot with many readers.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    /// Operation in progress, the message describes the current step.
    Primary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub status: FeedbackStatus,
    pub message: String,
    /// Optional machine-usable extra (explorer link, tx hash). Presentation
    /// decides whether and how to render it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            status: FeedbackStatus::Primary,
            message: String::new(),
            details: None,
        }
    }
}

/// Single-writer, many-reader channel holding exactly one live `Feedback`.
/// Writes overwrite in place, no history is kept.
pub struct FeedbackChannel {
    tx: watch::Sender<Feedback>,
}

impl FeedbackChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Feedback::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Feedback> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Feedback {
        self.tx.borrow().clone()
    }

    pub fn set(&self, feedback: Feedback) {
        self.tx.send_replace(feedback);
    }

    pub fn progress(&self, message: impl Into<String>) {
        self.set(Feedback {
            status: FeedbackStatus::Primary,
            message: message.into(),
            details: None,
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.set(Feedback {
            status: FeedbackStatus::Success,
            message: message.into(),
            details: None,
        });
    }

    pub fn danger(&self, message: impl Into<String>) {
        self.set(Feedback {
            status: FeedbackStatus::Danger,
            message: message.into(),
            details: None,
        });
    }

    /// Returns to the neutral `{primary, ""}` state. Idempotent.
    pub fn reset(&self) {
        self.set(Feedback::default());
    }
}

impl Default for FeedbackChannel {
    fn default() -> Self {
        Self::new()
    }
}
