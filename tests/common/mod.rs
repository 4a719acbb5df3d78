//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use questionnaire_flow::domain::foundation::{DocumentIndex, EndNodeId, OptionId, QuestionId};
use questionnaire_flow::domain::questionnaire::{
    Document, DocumentType, EndNode, NextRule, NextTarget, Question, Questionnaire,
};

pub fn q(id: &str) -> QuestionId {
    QuestionId::new(id).unwrap()
}

pub fn o(id: &str) -> OptionId {
    OptionId::new(id).unwrap()
}

pub fn end(id: &str) -> EndNodeId {
    EndNodeId::new(id).unwrap()
}

/// Reads choices off a byte stream; wraps around when exhausted.
struct Dice {
    bytes: Vec<u8>,
    cursor: usize,
}

impl Dice {
    fn roll(&mut self, sides: usize) -> usize {
        if self.bytes.is_empty() || sides == 0 {
            return 0;
        }
        let value = self.bytes[self.cursor % self.bytes.len()] as usize;
        self.cursor += 1;
        value % sides
    }
}

/// Builds an acyclic questionnaire: questions only route forward (to a
/// higher id) or to an end node.
pub fn acyclic_questionnaire(size: usize, labels: Vec<String>, bytes: Vec<u8>) -> Questionnaire {
    let mut dice = Dice { bytes, cursor: 0 };
    let label = |i: usize| labels[i % labels.len()].clone();
    let ends = vec![
        EndNode {
            id: end("done"),
            label: label(0),
        },
        EndNode {
            id: end("stop"),
            label: label(1),
        },
    ];

    let mut questions = Vec::new();
    for number in 1..=size {
        let mut question = Question::new(q(&number.to_string()), label(number));
        let option_count = 1 + dice.roll(3);
        for option in 1..=option_count {
            question = question.with_option(o(&option.to_string()), label(number + option));
        }
        let forward = |dice: &mut Dice| -> Option<NextTarget> {
            match dice.roll(3) {
                0 => None,
                1 if number < size => {
                    let target = number + 1 + dice.roll(size - number);
                    Some(NextTarget::Question(q(&target.to_string())))
                }
                _ => Some(NextTarget::EndNode(ends[dice.roll(ends.len())].id.clone())),
            }
        };
        for option in 1..=option_count {
            if let Some(target) = forward(&mut dice) {
                question = question.with_rule(NextRule::specific(o(&option.to_string()), target));
            }
        }
        if let Some(target) = forward(&mut dice) {
            question = question.with_rule(NextRule::default_for_question(target));
        }
        questions.push(question);
    }

    let mut documents = Vec::new();
    for index in 0..dice.roll(4) {
        let kind = if dice.roll(2) == 0 {
            DocumentType::Mandatory
        } else {
            DocumentType::Optional
        };
        let mut document = Document::new(DocumentIndex::new(index), label(index + 7), kind);
        for _ in 0..1 + dice.roll(3) {
            let question = &questions[dice.roll(questions.len())];
            let option = &question.options[dice.roll(question.options.len())];
            if !document
                .conditions
                .iter()
                .any(|c| c.question_id == question.id && c.option_id == option.id)
            {
                document = document.with_condition(question.id.clone(), option.id.clone());
            }
        }
        documents.push(document);
    }

    Questionnaire {
        questions,
        end_nodes: ends,
        documents,
    }
}

pub fn questionnaire_strategy() -> impl Strategy<Value = Questionnaire> {
    (
        1usize..7,
        prop::collection::vec("[A-Za-z][A-Za-z&<>'\"]{0,7}( [a-z]{1,5})?", 2..6),
        prop::collection::vec(any::<u8>(), 16..64),
    )
        .prop_map(|(size, labels, bytes)| acyclic_questionnaire(size, labels, bytes))
}

/// Order-insensitive view of everything that matters semantically.
#[derive(Debug, PartialEq, Eq)]
pub struct Shape {
    questions: Vec<(String, String, Vec<(String, String)>)>,
    routing: Vec<(String, String, NextTarget)>,
    end_nodes: BTreeSet<(String, String)>,
    documents: Vec<(String, DocumentType, BTreeSet<(String, String)>)>,
}

pub fn shape(questionnaire: &Questionnaire) -> Shape {
    let mut questionnaire = questionnaire.clone();
    questionnaire.canonicalize();
    Shape {
        questions: questionnaire
            .questions
            .iter()
            .map(|question| {
                (
                    question.id.to_string(),
                    question.text.clone(),
                    question
                        .options
                        .iter()
                        .map(|option| (option.id.to_string(), option.label.clone()))
                        .collect(),
                )
            })
            .collect(),
        routing: questionnaire
            .routing_table()
            .into_iter()
            .map(|((question, option), target)| (question.to_string(), option.to_string(), target))
            .collect(),
        end_nodes: questionnaire
            .end_nodes
            .iter()
            .map(|end| (end.id.to_string(), end.label.clone()))
            .collect(),
        documents: questionnaire
            .documents
            .iter()
            .map(|document| {
                (
                    document.title.clone(),
                    document.kind,
                    document
                        .conditions
                        .iter()
                        .map(|c| (c.question_id.to_string(), c.option_id.to_string()))
                        .collect(),
                )
            })
            .collect(),
    }
}
