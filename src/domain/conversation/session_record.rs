//! Persisted conversation state.

use serde::{Deserialize, Serialize};

use super::Answer;
use crate::domain::foundation::{SessionId, Timestamp};

/// What is stored between visits: the answers given so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSession {
    Record(SessionRecord),
    BareAnswers(Vec<Answer>),
}

impl SessionRecord {
    pub fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Timestamp::now(),
            answers: Vec::new(),
        }
    }

    pub fn with_answers(mut self, answers: Vec<Answer>) -> Self {
        self.answers = answers;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a stored record. A bare answer array from older versions is
    /// wrapped in a fresh record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            StoredSession::Record(record) => record,
            StoredSession::BareAnswers(answers) => Self::new().with_answers(answers),
        })
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}
