//! Questionnaire -> graph conversion.

use std::collections::HashSet;
use tracing::warn;

use super::{EdgeKind, FlowEdge, FlowGraph, FlowNode};
use crate::domain::foundation::{NodeId, OptionId};
use crate::domain::questionnaire::{NextTarget, Question, Questionnaire};

/// Builds the editor graph for a questionnaire. Positions are left at the
/// origin; run the layout pass afterwards.
///
/// Routing targets and document conditions that reference missing questions
/// or options produce no edge. An end-node target that was never declared
/// gets an implicit end node labelled with its id.
pub fn build_graph(questionnaire: &Questionnaire) -> FlowGraph {
    let mut graph = FlowGraph::new();

    for question in &questionnaire.questions {
        add_question(&mut graph, question);
    }

    for end in &questionnaire.end_nodes {
        let node = FlowNode::end(end.id.clone(), end.label.clone());
        if graph.add_node(node).is_err() {
            warn!(end_node = %end.id, "Duplicate end node ignored");
        }
    }

    for question in &questionnaire.questions {
        add_transitions(&mut graph, question);
    }

    for document in &questionnaire.documents {
        let node = FlowNode::document(
            document.index,
            document.title.clone(),
            document.description.clone(),
            document.kind,
        );
        let document_node = node.id.clone();
        if graph.add_node(node).is_err() {
            warn!(document = %document.index, "Duplicate document ignored");
            continue;
        }
        for condition in &document.conditions {
            let option_node = NodeId::option(&condition.question_id, &condition.option_id);
            if !graph.contains_node(&option_node) {
                warn!(
                    document = %document.title,
                    question_id = %condition.question_id,
                    option_id = %condition.option_id,
                    "Condition references an unknown option"
                );
                continue;
            }
            let _ = graph.insert_edge(FlowEdge::new(
                option_node,
                document_node.clone(),
                EdgeKind::OptionToDocument,
            ));
        }
    }

    graph
}

fn add_question(graph: &mut FlowGraph, question: &Question) {
    let node = FlowNode::question(
        question.id.clone(),
        question.text.clone(),
        question.tooltip.clone(),
    );
    let question_node = node.id.clone();
    if graph.add_node(node).is_err() {
        warn!(question_id = %question.id, "Duplicate question ignored");
        return;
    }

    for option in &question.options {
        let node = FlowNode::option(question.id.clone(), option.id.clone(), option.label.clone());
        let option_node = node.id.clone();
        if graph.add_node(node).is_err() {
            warn!(question_id = %question.id, option_id = %option.id, "Duplicate option ignored");
            continue;
        }
        let _ = graph.insert_edge(FlowEdge::new(
            question_node.clone(),
            option_node,
            EdgeKind::QuestionToOption,
        ));
    }
}

fn add_transitions(graph: &mut FlowGraph, question: &Question) {
    let mut routed: HashSet<&OptionId> = HashSet::new();

    for rule in &question.next {
        if let Some(option) = &rule.option {
            if question.option(option).is_none() || !routed.insert(option) {
                continue;
            }
            add_transition(graph, question, option, &rule.target);
        }
    }

    if let Some(default) = question.default_next() {
        for option in &question.options {
            if !routed.contains(&option.id) {
                add_transition(graph, question, &option.id, default);
            }
        }
    }
}

fn add_transition(graph: &mut FlowGraph, question: &Question, option: &OptionId, target: &NextTarget) {
    let source = NodeId::option(&question.id, option);
    let (target_node, kind) = match target {
        NextTarget::Question(id) => (NodeId::question(id), EdgeKind::OptionToQuestion),
        NextTarget::EndNode(id) => {
            let node = NodeId::end(id);
            if !graph.contains_node(&node) {
                let _ = graph.add_node(FlowNode::end(id.clone(), id.as_str()));
            }
            (node, EdgeKind::ToEnd)
        }
    };

    if !graph.contains_node(&target_node) {
        warn!(
            question_id = %question.id,
            option_id = %option,
            target = %target_node,
            "Next rule points at a missing question"
        );
        return;
    }
    let _ = graph.insert_edge(FlowEdge::new(source, target_node, kind));
}
