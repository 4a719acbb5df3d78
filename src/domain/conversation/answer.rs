//! Recorded answers and the transcript derived from them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::foundation::{OptionId, QuestionId};

/// One selection, as persisted for resumption.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(deserialize_with = "lenient_id")]
    pub question_id: QuestionId,
    #[serde(deserialize_with = "lenient_id")]
    pub option_id: OptionId,
}

impl Answer {
    pub fn new(question_id: QuestionId, option_id: OptionId) -> Self {
        Self {
            question_id,
            option_id,
        }
    }
}

/// A question as it was asked plus the option that was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub question_id: QuestionId,
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub option_id: OptionId,
    pub option_label: String,
}

/// Accepts ids stored either as strings or as bare numbers.
fn lenient_id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    let raw = match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    };
    raw.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let answer = Answer::new(QuestionId::new("1").unwrap(), OptionId::new("2").unwrap());
        let json = serde_json::to_string(&answer).unwrap();
        assert_eq!(json, r#"{"questionId":"1","optionId":"2"}"#);
    }

    #[test]
    fn accepts_numeric_ids() {
        let answer: Answer = serde_json::from_str(r#"{"questionId":1,"optionId":3}"#).unwrap();
        assert_eq!(answer.question_id.as_str(), "1");
        assert_eq!(answer.option_id.as_str(), "3");
    }

    #[test]
    fn rejects_blank_ids() {
        assert!(serde_json::from_str::<Answer>(r#"{"questionId":" ","optionId":"1"}"#).is_err());
    }
}
