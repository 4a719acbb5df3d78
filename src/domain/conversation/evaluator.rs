//! Document dependency evaluation.
//!
//! A document's conditions are grouped by question. The document applies
//! when every group is satisfied, and a group is satisfied when the answer
//! given to its question is one of the group's options. Documents without
//! conditions never apply.

use serde::Serialize;
use std::collections::HashMap;

use super::Answer;
use crate::domain::foundation::{OptionId, QuestionId};
use crate::domain::questionnaire::{Document, DocumentType};

/// Qualifying documents split by type, each in questionnaire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub mandatory: Vec<Document>,
    pub optional: Vec<Document>,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.optional.is_empty()
    }
}

/// Evaluates documents against a set of answers. When a question was
/// answered more than once, the latest answer counts.
#[derive(Debug, Clone, Default)]
pub struct DocumentEvaluator {
    answers: HashMap<QuestionId, OptionId>,
}

impl DocumentEvaluator {
    pub fn new<'a>(answers: impl IntoIterator<Item = &'a Answer>) -> Self {
        let answers = answers
            .into_iter()
            .map(|answer| (answer.question_id.clone(), answer.option_id.clone()))
            .collect();
        Self { answers }
    }

    pub fn qualifies(&self, document: &Document) -> bool {
        let groups = document.condition_groups();
        !groups.is_empty()
            && groups.iter().all(|(question, options)| {
                self.answers
                    .get(*question)
                    .is_some_and(|answered| options.contains(&answered))
            })
    }

    pub fn evaluate<'a>(&self, documents: impl IntoIterator<Item = &'a Document>) -> Recommendation {
        let mut recommendation = Recommendation::default();
        for document in documents {
            if !self.qualifies(document) {
                continue;
            }
            match document.kind {
                DocumentType::Mandatory => recommendation.mandatory.push(document.clone()),
                DocumentType::Optional => recommendation.optional.push(document.clone()),
            }
        }
        recommendation
    }
}
