//! The viewer identity as seen by the application.

use serde::{Deserialize, Serialize};

pub const ANONYMOUS_SUBJECT: &str = "anon";
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Who is making a request. Never persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, name: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            name,
        }
    }

    /// The fixed identity used when nobody is signed in.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_SUBJECT, Some(ANONYMOUS_NAME.to_string()))
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject == ANONYMOUS_SUBJECT
    }
}
