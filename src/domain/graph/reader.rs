//! Graph -> questionnaire reconstruction.

use std::collections::BTreeSet;

use super::{EdgeKind, FlowGraph, NodeKind};
use crate::domain::foundation::{DocumentIndex, NodeId};
use crate::domain::questionnaire::{
    AnswerOption, Condition, Document, EndNode, NextRule, NextTarget, Question, Questionnaire,
};

/// Reads the questionnaire an edited graph describes.
///
/// Questions and options come out sorted by numeric id. Every routed option
/// gets its own next rule (defaults are not re-collapsed). Documents are
/// renumbered positionally in the order of their previous indices, and
/// waypoint chains are followed to their real endpoints.
pub fn read_graph(graph: &FlowGraph) -> Questionnaire {
    let logical = graph.logical_edges();

    let mut questions = Vec::new();
    for node in graph.nodes() {
        if let NodeKind::Question {
            question_id,
            text,
            tooltip,
        } = &node.kind
        {
            let mut question = Question::new(question_id.clone(), text.clone());
            question.tooltip = tooltip.clone().filter(|t| !t.trim().is_empty());
            questions.push(question);
        }
    }

    for node in graph.nodes() {
        if let NodeKind::AnswerOption {
            question_id,
            option_id,
            label,
        } = &node.kind
        {
            let Some(question) = questions.iter_mut().find(|q| &q.id == question_id) else {
                continue;
            };
            if question.option(option_id).is_none() {
                question.options.push(AnswerOption {
                    id: option_id.clone(),
                    question_id: question_id.clone(),
                    label: label.clone(),
                });
            }

            let transition = logical
                .iter()
                .find(|edge| edge.source == node.id && edge.kind.is_transition())
                .and_then(|edge| target_of(graph, &edge.target));
            if let Some(target) = transition {
                question.next.push(NextRule::specific(option_id.clone(), target));
            }
        }
    }

    let end_nodes = graph
        .nodes()
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::End { end_id, label } => Some(EndNode {
                id: end_id.clone(),
                label: label.clone(),
            }),
            _ => None,
        })
        .collect();

    let mut document_nodes: Vec<_> = graph
        .nodes()
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::Document {
                index,
                title,
                description,
                document_type,
            } => Some((&node.id, *index, title, description, *document_type)),
            _ => None,
        })
        .collect();
    document_nodes.sort_by_key(|(_, index, ..)| *index);

    let documents = document_nodes
        .into_iter()
        .enumerate()
        .map(|(position, (node_id, _, title, description, kind))| {
            let conditions: BTreeSet<Condition> = logical
                .iter()
                .filter(|edge| &edge.target == node_id && edge.kind == EdgeKind::OptionToDocument)
                .filter_map(|edge| match graph.node(&edge.source).map(|n| &n.kind) {
                    Some(NodeKind::AnswerOption {
                        question_id,
                        option_id,
                        ..
                    }) => Some(Condition::new(question_id.clone(), option_id.clone())),
                    _ => None,
                })
                .collect();
            let mut document = Document::new(DocumentIndex::new(position), title.clone(), kind);
            document.description = description.clone().filter(|d| !d.trim().is_empty());
            document.conditions = conditions.into_iter().collect();
            document
        })
        .collect();

    let mut questionnaire = Questionnaire {
        questions,
        end_nodes,
        documents,
    };
    questionnaire.canonicalize();
    for question in &mut questionnaire.questions {
        question
            .next
            .sort_by(|a, b| a.option.cmp(&b.option));
    }
    questionnaire
}

fn target_of(graph: &FlowGraph, node: &NodeId) -> Option<NextTarget> {
    match graph.node(node).map(|n| &n.kind) {
        Some(NodeKind::Question { question_id, .. }) => Some(NextTarget::Question(question_id.clone())),
        Some(NodeKind::End { end_id, .. }) => Some(NextTarget::EndNode(end_id.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EndNodeId, OptionId, QuestionId};
    use crate::domain::graph::{build_graph, FlowEdge, FlowNode, Point};
    use crate::domain::questionnaire::DocumentType;

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id).unwrap()
    }

    fn id(raw: &str) -> NodeId {
        NodeId::from_raw(raw)
    }

    fn sample() -> Questionnaire {
        let mut questionnaire = Questionnaire::new(vec![
            Question::new(q("2"), "Second").with_option(o("1"), "Ok"),
            Question::new(q("1"), "First")
                .with_tooltip("Pick one")
                .with_option(o("2"), "Two")
                .with_option(o("1"), "One")
                .with_rule(NextRule::specific(o("2"), NextTarget::EndNode(EndNodeId::new("E").unwrap())))
                .with_rule(NextRule::default_for_question(NextTarget::Question(q("2")))),
        ]);
        questionnaire.end_nodes.push(EndNode {
            id: EndNodeId::new("E").unwrap(),
            label: "Bye".into(),
        });
        questionnaire.documents.push(
            Document::new(DocumentIndex::new(0), "Form A", DocumentType::Optional)
                .with_description("Needed sometimes")
                .with_condition(q("1"), o("1")),
        );
        questionnaire
    }

    #[test]
    fn reconstructs_sorted_questions_and_options() {
        let questionnaire = read_graph(&build_graph(&sample()));
        assert_eq!(questionnaire.questions[0].id, q("1"));
        assert_eq!(questionnaire.questions[0].tooltip.as_deref(), Some("Pick one"));
        let options: Vec<_> = questionnaire.questions[0]
            .options
            .iter()
            .map(|option| option.id.as_str())
            .collect();
        assert_eq!(options, vec!["1", "2"]);
    }

    #[test]
    fn preserves_effective_routing() {
        let original = sample();
        let rebuilt = read_graph(&build_graph(&original));
        assert_eq!(rebuilt.routing_table(), original.routing_table());
        assert!(rebuilt.questions[0].next.iter().all(|rule| !rule.is_default()));
    }

    #[test]
    fn reconstructs_documents_from_incoming_edges() {
        let rebuilt = read_graph(&build_graph(&sample()));
        assert_eq!(rebuilt.documents.len(), 1);
        assert_eq!(rebuilt.documents[0].conditions, vec![Condition::new(q("1"), o("1"))]);
        assert_eq!(rebuilt.documents[0].description.as_deref(), Some("Needed sometimes"));
    }

    #[test]
    fn follows_waypoint_chains() {
        let mut graph = build_graph(&sample());
        let direct = crate::domain::foundation::EdgeId::between(&id("q1-opt1"), &id("q2"));
        graph.remove_edge(&direct).unwrap();
        graph
            .add_node(FlowNode::waypoint(id("wp-0"), Point::new(1.0, 1.0)))
            .unwrap();
        graph
            .insert_edge(FlowEdge::new(id("q1-opt1"), id("wp-0"), EdgeKind::OptionToQuestion))
            .unwrap();
        graph
            .insert_edge(FlowEdge::new(id("wp-0"), id("q2"), EdgeKind::OptionToQuestion))
            .unwrap();

        let rebuilt = read_graph(&graph);
        assert_eq!(
            rebuilt.questions[0].resolve_next(&o("1")),
            Some(&NextTarget::Question(q("2")))
        );
    }

    #[test]
    fn documents_are_renumbered_positionally() {
        let mut graph = build_graph(&sample());
        graph
            .add_node(FlowNode::document(DocumentIndex::new(5), "Form B", None, DocumentType::Mandatory))
            .unwrap();
        graph.remove_node(&id("doc0"));
        let rebuilt = read_graph(&graph);
        assert_eq!(rebuilt.documents[0].index, DocumentIndex::new(0));
        assert_eq!(rebuilt.documents[0].title, "Form B");
    }
}
