//! Integration tests for editor sessions backed by files on disk.
//!
//! These tests verify the editor wiring end to end:
//! 1. A session opened from a file can be edited and saved back
//! 2. Manual positions and waypoint routes survive a reopen
//! 3. Undo/redo restore earlier graph states
//! 4. Rejected edits leave the session untouched

mod common;

use std::sync::Arc;
use tempfile::TempDir;

use common::{o, q};
use questionnaire_flow::adapters::source::FileQuestionnaireSource;
use questionnaire_flow::adapters::storage::FileKeyValueStore;
use questionnaire_flow::adapters::xml::parse_questionnaire;
use questionnaire_flow::application::EditorService;
use questionnaire_flow::domain::foundation::{EdgeId, NodeId};
use questionnaire_flow::domain::graph::{
    ConnectRejection, EditOutcome, EdgeKind, LayoutSettings, NodeCategory, Point,
};
use questionnaire_flow::domain::questionnaire::{DocumentType, NextTarget};
use questionnaire_flow::ports::{KeyValueStore, QuestionnaireSource};

// =============================================================================
// Test Infrastructure
// =============================================================================

const XML: &str = r#"<questions>
  <question id="1"><text>Do you own a car?</text>
    <options><option id="1">Yes</option><option id="2">No</option></options>
    <nextQuestions><next optionId="1" questionId="2"/></nextQuestions>
  </question>
  <question id="2"><text>Is it electric?</text>
    <options><option id="1">Yes</option><option id="2">No</option></options>
  </question>
</questions>"#;

struct Fixture {
    _dir: TempDir,
    source: Arc<FileQuestionnaireSource>,
    store: Arc<FileKeyValueStore>,
    editor: EditorService,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questionnaire.xml");
    std::fs::write(&path, XML).unwrap();
    let source = Arc::new(FileQuestionnaireSource::new(&path));
    let store = Arc::new(FileKeyValueStore::new(dir.path().join("state")));
    let editor = EditorService::new(
        source.clone(),
        store.clone(),
        "flow-layout",
        LayoutSettings::default(),
    );
    Fixture {
        _dir: dir,
        source,
        store,
        editor,
    }
}

fn node(id: &str) -> NodeId {
    NodeId::from_raw(id)
}

fn edge_between(graph: &questionnaire_flow::domain::graph::FlowGraph, source: &str, target: &str) -> EdgeId {
    graph
        .edges()
        .iter()
        .find(|edge| edge.source == node(source) && edge.target == node(target))
        .map(|edge| edge.id.clone())
        .unwrap()
}

// =============================================================================
// Save and Reopen
// =============================================================================

#[tokio::test]
async fn test_edits_are_saved_to_the_source_file() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();

    let question = session.add_question("Do you charge at home?").unwrap();
    session.add_option(&question, "Yes").unwrap();
    assert!(session.connect(&node("q2-opt1"), &question).is_applied());
    let document = session.add_document("Wallbox permit", DocumentType::Optional).unwrap();
    assert!(session.connect(&node("q3-opt1"), &document).is_applied());

    fixture.editor.save(&session).await.unwrap();

    let saved = parse_questionnaire(&fixture.source.fetch().await.unwrap()).unwrap();
    assert_eq!(saved.questions.len(), 3);
    assert_eq!(saved.question(&q("3")).unwrap().text, "Do you charge at home?");
    assert_eq!(
        saved.routing_table().get(&(q("2"), o("1"))),
        Some(&NextTarget::Question(q("3")))
    );
    assert_eq!(saved.documents[0].title, "Wallbox permit");
    assert_eq!(saved.documents[0].kind, DocumentType::Optional);
}

#[tokio::test]
async fn test_manual_positions_and_waypoints_survive_reopen() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();

    assert!(session.move_node(&node("q2"), Point::new(512.0, 64.0)).is_applied());
    let routed = edge_between(session.graph(), "q1-opt1", "q2");
    session.insert_waypoint(&routed, Point::new(300.0, 200.0)).unwrap();
    fixture.editor.save(&session).await.unwrap();

    let reopened = fixture.editor.open().await.unwrap();
    let graph = reopened.graph();
    assert_eq!(graph.node(&node("q2")).unwrap().position, Point::new(512.0, 64.0));
    assert!(reopened.manual_positions().contains(&node("q2")));

    let waypoints: Vec<_> = graph.nodes_of(NodeCategory::Waypoint).collect();
    assert_eq!(waypoints.len(), 1);
    assert_eq!(waypoints[0].position, Point::new(300.0, 200.0));
    assert!(!graph.has_direct_edge(&node("q1-opt1"), &node("q2")));
}

#[tokio::test]
async fn test_waypoints_do_not_leak_into_xml() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();
    let routed = edge_between(session.graph(), "q1-opt1", "q2");
    session.insert_waypoint(&routed, Point::new(10.0, 10.0)).unwrap();

    let xml = fixture.editor.export_xml(&session).unwrap();
    assert!(!xml.contains("wp-"));
    assert!(xml.contains("<next optionId=\"1\" questionId=\"2\"/>"));
}

#[tokio::test]
async fn test_clear_layout_forgets_manual_positions() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();
    session.move_node(&node("q1"), Point::new(-900.0, -900.0));
    fixture.editor.persist_layout(&session).await.unwrap();

    fixture.editor.clear_layout().await.unwrap();
    assert_eq!(fixture.store.get("flow-layout").await.unwrap(), None);

    let reopened = fixture.editor.open().await.unwrap();
    assert!(reopened.manual_positions().is_empty());
    assert_ne!(
        reopened.graph().node(&node("q1")).unwrap().position,
        Point::new(-900.0, -900.0)
    );
}

// =============================================================================
// History and Rejections
// =============================================================================

#[tokio::test]
async fn test_undo_and_redo_restore_graph_states() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();
    let before = session.graph().clone();

    session.delete_node(&node("q2"));
    assert!(session.graph().node(&node("q2-opt1")).is_none());

    assert!(session.undo());
    assert_eq!(session.graph(), &before);
    assert!(session.redo());
    assert!(session.graph().node(&node("q2")).is_none());
    assert!(!session.can_redo());
}

#[tokio::test]
async fn test_rejected_connections_change_nothing() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();
    let before = session.graph().clone();

    let outcome = session.connect(&node("q1"), &node("q1"));
    assert!(matches!(outcome, EditOutcome::Rejected(ConnectRejection::SelfLoop(_))));

    let outcome = session.connect(&node("q1-opt1"), &node("q2"));
    assert!(!outcome.is_applied());

    let outcome = session.connect(&node("q1"), &node("q2-opt1"));
    assert!(matches!(
        outcome,
        EditOutcome::Rejected(ConnectRejection::ForeignOption { .. })
    ));

    assert_eq!(session.graph(), &before);
    assert!(!session.can_undo());
}

#[tokio::test]
async fn test_reconnecting_a_routed_option_requires_disconnect() {
    let fixture = fixture();
    let mut session = fixture.editor.open().await.unwrap();
    let end = session.add_end_node("Thanks").unwrap();

    let outcome = session.connect(&node("q1-opt1"), &end);
    assert!(matches!(
        outcome,
        EditOutcome::Rejected(ConnectRejection::OptionAlreadyRouted(_))
    ));

    let routed = edge_between(session.graph(), "q1-opt1", "q2");
    assert!(session.disconnect(&routed).is_applied());
    assert!(session.connect(&node("q1-opt1"), &end).is_applied());
    let opt1 = node("q1-opt1");
    let edge = session
        .graph()
        .outgoing(&opt1)
        .find(|edge| edge.target == end)
        .unwrap();
    assert_eq!(edge.kind, EdgeKind::ToEnd);
}
