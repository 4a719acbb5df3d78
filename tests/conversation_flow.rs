//! Integration tests for the conversation traversal and document evaluation.
//!
//! These tests verify:
//! 1. Routing prefers option-specific rules over question defaults
//! 2. Documents qualify with AND across questions, OR within a question
//! 3. Any acyclic questionnaire finishes within one answer per question
//! 4. Rewinding and replaying reproduces the same history

mod common;

use std::sync::Arc;

use proptest::prelude::*;

use common::{acyclic_questionnaire, o, q, questionnaire_strategy};
use questionnaire_flow::adapters::xml::parse_questionnaire;
use questionnaire_flow::domain::conversation::{
    Answer, Conversation, DocumentEvaluator, Step, TraversalPhase,
};
use questionnaire_flow::domain::foundation::{DocumentIndex, ErrorCode};
use questionnaire_flow::domain::questionnaire::{Document, DocumentType, Questionnaire};

// =============================================================================
// Test Infrastructure
// =============================================================================

const ROUTED: &str = r#"<questions>
  <question id="1"><text>Start</text>
    <options><option id="1">A</option><option id="2">B</option><option id="3">C</option></options>
    <nextQuestions>
      <next optionId="3" questionId="3"/>
      <next questionId="2"/>
    </nextQuestions>
  </question>
  <question id="2"><text>Second</text><options><option id="1">Ok</option></options></question>
  <question id="3"><text>Third</text><options><option id="1">Ok</option></options></question>
</questions>"#;

fn start(xml: &str) -> Conversation {
    Conversation::start(Arc::new(parse_questionnaire(xml).unwrap())).unwrap()
}

fn answers(pairs: &[(&str, &str)]) -> Vec<Answer> {
    pairs.iter().map(|(question, option)| Answer::new(q(question), o(option))).collect()
}

fn qualifies(document: &Document, history: &[(&str, &str)]) -> bool {
    DocumentEvaluator::new(answers(history).iter()).qualifies(document)
}

/// Walks the questionnaire, picking options from `picks`, until finished.
fn walk(questionnaire: Arc<Questionnaire>, picks: &[u8]) -> (Conversation, usize) {
    let mut conversation = Conversation::start(questionnaire).unwrap();
    let mut steps = 0;
    while let Some(question) = conversation.current_question().cloned() {
        let pick = picks.get(steps).copied().unwrap_or(0) as usize;
        let option = question.options[pick % question.options.len()].id.clone();
        conversation.answer(&option).unwrap();
        steps += 1;
        if steps > questionnaire_len(&conversation) {
            break;
        }
    }
    (conversation, steps)
}

fn questionnaire_len(conversation: &Conversation) -> usize {
    conversation.questionnaire().questions.len()
}

// =============================================================================
// Routing
// =============================================================================

#[test]
fn test_specific_rule_beats_default() {
    let mut conversation = start(ROUTED);
    assert_eq!(conversation.answer(&o("3")).unwrap(), Step::Question(q("3")));

    let mut conversation = start(ROUTED);
    assert_eq!(conversation.answer(&o("1")).unwrap(), Step::Question(q("2")));
}

#[test]
fn test_no_rule_finishes() {
    let mut conversation = start(ROUTED);
    conversation.answer(&o("2")).unwrap();
    let step = conversation.answer(&o("1")).unwrap();

    assert_eq!(step, Step::Finished { end_node: None });
    assert_eq!(conversation.phase(), TraversalPhase::Finished);
    assert!(conversation.current_question().is_none());
}

#[test]
fn test_unknown_option_is_rejected_without_side_effects() {
    let mut conversation = start(ROUTED);
    let err = conversation.answer(&o("9")).unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidAnswer);
    assert!(conversation.answers().is_empty());
    assert_eq!(conversation.current_question().unwrap().id, q("1"));
}

#[test]
fn test_rewind_truncates_from_first_answer_to_question() {
    let mut conversation = start(ROUTED);
    conversation.answer(&o("1")).unwrap();
    conversation.answer(&o("1")).unwrap();

    conversation.rewind_to(&q("1")).unwrap();
    assert!(conversation.answers().is_empty());
    assert_eq!(conversation.phase(), TraversalPhase::PresentingQuestion);
    assert_eq!(conversation.current_question().unwrap().id, q("1"));
}

// =============================================================================
// Document Evaluation
// =============================================================================

#[test]
fn test_and_across_questions_or_within_question() {
    let document = Document::new(DocumentIndex::new(0), "Visa", DocumentType::Mandatory)
        .with_condition(q("1"), o("A"))
        .with_condition(q("1"), o("B"))
        .with_condition(q("2"), o("C"));

    assert!(qualifies(&document, &[("1", "A"), ("2", "C")]));
    assert!(qualifies(&document, &[("1", "B"), ("2", "C")]));
    assert!(!qualifies(&document, &[("1", "A"), ("2", "D")]));
    assert!(!qualifies(&document, &[("1", "A")]));
}

#[test]
fn test_single_condition_scenario() {
    let document = Document::new(DocumentIndex::new(0), "Form", DocumentType::Optional)
        .with_condition(q("1"), o("2"));

    assert!(qualifies(&document, &[("1", "2")]));
    assert!(!qualifies(&document, &[("1", "3")]));
}

#[test]
fn test_document_without_conditions_is_never_recommended() {
    let document = Document::new(DocumentIndex::new(0), "Always?", DocumentType::Mandatory);
    assert!(!qualifies(&document, &[("1", "1")]));
}

#[test]
fn test_recommendations_partition_by_type() {
    let xml = r#"<questions>
  <question id="1"><text>Q</text><options><option id="1">Yes</option></options></question>
  <dependencies>
    <document type="mandatory"><text>Must</text>
      <conditions><condition questionId="1" optionId="1"/></conditions></document>
    <document type="optional"><text>May</text>
      <conditions><condition questionId="1" optionId="1"/></conditions></document>
  </dependencies>
</questions>"#;
    let mut conversation = start(xml);
    assert!(conversation.recommendations().is_none());

    conversation.answer(&o("1")).unwrap();
    let recommendation = conversation.recommendations().unwrap();
    assert_eq!(recommendation.mandatory.len(), 1);
    assert_eq!(recommendation.mandatory[0].title, "Must");
    assert_eq!(recommendation.optional[0].title, "May");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_acyclic_walk_terminates(
        questionnaire in questionnaire_strategy(),
        picks in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let size = questionnaire.questions.len();
        let (conversation, steps) = walk(Arc::new(questionnaire), &picks);
        prop_assert!(steps <= size);
        prop_assert_eq!(conversation.phase(), TraversalPhase::Finished);
    }

    #[test]
    fn prop_rewind_then_replay_is_identical(
        size in 1usize..7,
        bytes in prop::collection::vec(any::<u8>(), 16..64),
        picks in prop::collection::vec(any::<u8>(), 0..8),
        cut in any::<prop::sample::Index>(),
    ) {
        let questionnaire = acyclic_questionnaire(size, vec!["Alpha".into(), "Beta".into()], bytes);
        let (original, _) = walk(Arc::new(questionnaire), &picks);
        let recorded = original.answers().to_vec();
        prop_assume!(!recorded.is_empty());

        let from = cut.index(recorded.len());
        let mut replayed = original.clone();
        replayed.rewind_to(&recorded[from].question_id).unwrap();
        prop_assert_eq!(replayed.answers(), &recorded[..from]);
        for answer in &recorded[from..] {
            replayed.answer(&answer.option_id).unwrap();
        }

        prop_assert_eq!(replayed.answers(), original.answers());
        prop_assert_eq!(replayed.history(), original.history());
        prop_assert_eq!(replayed.phase(), original.phase());
    }
}
