use std::fmt;

use tokio::sync::watch;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn variant(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub severity: Severity,
    pub text: String,
}

impl Feedback {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            text: text.into(),
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.variant(), self.text)
    }
}

pub fn failure_feedback(action: &str, err: &CatalogError) -> Feedback {
    match err {
        CatalogError::AuthRequired => Feedback::warning(format!("Please sign in to {action}.")),
        CatalogError::Forbidden => Feedback::warning(format!("You are not allowed to {action}.")),
        CatalogError::NotFound => Feedback::warning(format!("Could not {action}: it no longer exists.")),
        _ => Feedback::danger(format!("Could not {action}. Please try again.")),
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackChannel {
    tx: watch::Sender<Option<Feedback>>,
}

impl Default for FeedbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackChannel {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn emit(&self, feedback: Feedback) {
        tracing::debug!(severity = feedback.severity.variant(), text = %feedback.text, "feedback");
        self.tx.send_replace(Some(feedback));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<Feedback> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Feedback>> {
        self.tx.subscribe()
    }
}
