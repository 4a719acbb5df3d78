//! The questionnaire aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{AnswerOption, Document, EndNode, NextTarget, Question};
use crate::domain::foundation::{EndNodeId, OptionId, QuestionId};

/// Every conversation starts at this question.
pub const START_QUESTION_ID: &str = "1";

/// A reference in the questionnaire that points at nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    NextQuestion {
        from: QuestionId,
        target: QuestionId,
    },
    NextEndNode {
        from: QuestionId,
        target: EndNodeId,
    },
    Condition {
        document: String,
        question_id: QuestionId,
        option_id: OptionId,
    },
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanglingReference::NextQuestion { from, target } => {
                write!(f, "question {} routes to missing question {}", from, target)
            }
            DanglingReference::NextEndNode { from, target } => {
                write!(f, "question {} routes to missing end node {}", from, target)
            }
            DanglingReference::Condition {
                document,
                question_id,
                option_id,
            } => write!(
                f,
                "document '{}' depends on missing option {}/{}",
                document, question_id, option_id
            ),
        }
    }
}

/// Questions, end nodes and dependency documents of one questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Questionnaire {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub end_nodes: Vec<EndNode>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            end_nodes: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn start_question_id() -> QuestionId {
        QuestionId::from_static(START_QUESTION_ID)
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    pub fn option(&self, question: &QuestionId, option: &OptionId) -> Option<&AnswerOption> {
        self.question(question).and_then(|q| q.option(option))
    }

    pub fn end_node(&self, id: &EndNodeId) -> Option<&EndNode> {
        self.end_nodes.iter().find(|end| &end.id == id)
    }

    /// Sorts questions and their options by numeric id, and end nodes by id.
    pub fn canonicalize(&mut self) {
        self.questions.sort_by(|a, b| a.id.cmp(&b.id));
        for question in &mut self.questions {
            question.options.sort_by(|a, b| a.id.cmp(&b.id));
        }
        self.end_nodes.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// The effective target of every `(question, option)` pair that routes
    /// somewhere, with defaults already applied.
    pub fn routing_table(&self) -> BTreeMap<(QuestionId, OptionId), NextTarget> {
        let mut table = BTreeMap::new();
        for question in &self.questions {
            for option in &question.options {
                if let Some(target) = question.resolve_next(&option.id) {
                    table.insert((question.id.clone(), option.id.clone()), target.clone());
                }
            }
        }
        table
    }

    /// Lists routing targets and document conditions that reference missing
    /// questions, options or end nodes.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for question in &self.questions {
            for rule in &question.next {
                match &rule.target {
                    NextTarget::Question(target) if self.question(target).is_none() => {
                        dangling.push(DanglingReference::NextQuestion {
                            from: question.id.clone(),
                            target: target.clone(),
                        });
                    }
                    NextTarget::EndNode(target) if self.end_node(target).is_none() => {
                        dangling.push(DanglingReference::NextEndNode {
                            from: question.id.clone(),
                            target: target.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }
        for document in &self.documents {
            for condition in &document.conditions {
                if self
                    .option(&condition.question_id, &condition.option_id)
                    .is_none()
                {
                    dangling.push(DanglingReference::Condition {
                        document: document.title.clone(),
                        question_id: condition.question_id.clone(),
                        option_id: condition.option_id.clone(),
                    });
                }
            }
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DocumentIndex;
    use crate::domain::questionnaire::{DocumentType, NextRule};

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id).unwrap()
    }

    fn sample() -> Questionnaire {
        Questionnaire::new(vec![
            Question::new(q("10"), "Last")
                .with_option(o("2"), "Two")
                .with_option(o("1"), "One"),
            Question::new(q("1"), "First")
                .with_option(o("a"), "A")
                .with_option(o("b"), "B")
                .with_rule(NextRule::specific(o("a"), NextTarget::Question(q("10"))))
                .with_rule(NextRule::default_for_question(NextTarget::Question(q("2")))),
        ])
    }

    #[test]
    fn canonicalize_orders_questions_and_options_numerically() {
        let mut questionnaire = sample();
        questionnaire.canonicalize();
        assert_eq!(questionnaire.questions[0].id, q("1"));
        assert_eq!(questionnaire.questions[1].id, q("10"));
        assert_eq!(questionnaire.questions[1].options[0].id, o("1"));
    }

    #[test]
    fn routing_table_applies_defaults() {
        let table = sample().routing_table();
        assert_eq!(table[&(q("1"), o("a"))], NextTarget::Question(q("10")));
        assert_eq!(table[&(q("1"), o("b"))], NextTarget::Question(q("2")));
        assert!(!table.contains_key(&(q("10"), o("1"))));
    }

    #[test]
    fn dangling_references_reports_missing_targets_and_conditions() {
        let mut questionnaire = sample();
        questionnaire.documents.push(
            Document::new(DocumentIndex::new(0), "ID card", DocumentType::Mandatory)
                .with_condition(q("1"), o("z")),
        );
        let dangling = questionnaire.dangling_references();
        assert!(dangling.contains(&DanglingReference::NextQuestion {
            from: q("1"),
            target: q("2"),
        }));
        assert!(dangling
            .iter()
            .any(|d| matches!(d, DanglingReference::Condition { option_id, .. } if option_id == &o("z"))));
    }

    #[test]
    fn start_question_is_one() {
        assert_eq!(Questionnaire::start_question_id().as_str(), "1");
    }
}
