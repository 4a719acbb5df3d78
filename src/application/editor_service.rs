//! EditorService - loads, saves and persists the layout of editor sessions.

use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::xml::{parse_questionnaire, serialize_graph};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::graph::{
    apply_layout, build_graph, decode_layout, encode_layout, EditorSession, FlowGraph,
    LayoutSettings, PersistedLayout,
};
use crate::domain::questionnaire::Questionnaire;
use crate::ports::{KeyValueStore, QuestionnaireSource};

pub struct EditorService {
    source: Arc<dyn QuestionnaireSource>,
    store: Arc<dyn KeyValueStore>,
    layout_key: String,
    settings: LayoutSettings,
}

impl EditorService {
    pub fn new(
        source: Arc<dyn QuestionnaireSource>,
        store: Arc<dyn KeyValueStore>,
        layout_key: impl Into<String>,
        settings: LayoutSettings,
    ) -> Self {
        Self {
            source,
            store,
            layout_key: layout_key.into(),
            settings,
        }
    }

    /// Fetches the questionnaire from the source and opens it.
    pub async fn open(&self) -> Result<EditorSession, DomainError> {
        let xml = self.source.fetch().await?;
        self.open_xml(&xml).await
    }

    /// Opens XML text, e.g. a file the user picked. Structural XML errors
    /// fail the load; an unreadable saved layout is ignored. Dangling
    /// references and routing cycles are logged but do not fail the load.
    pub async fn open_xml(&self, xml: &str) -> Result<EditorSession, DomainError> {
        let questionnaire = parse_questionnaire(xml)?;
        let mut graph = build_graph(&questionnaire);
        let issues = report_load_issues(&questionnaire, &graph);
        let saved = self.load_layout(&graph).await;
        apply_layout(&mut graph, &self.settings, &saved);
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            issues,
            manual = saved.positions.len(),
            routes = saved.edges.len(),
            "Editor session opened"
        );
        Ok(EditorSession::new(graph, self.settings, &saved))
    }

    /// Canonical XML for the session's graph.
    pub fn export_xml(&self, session: &EditorSession) -> Result<String, DomainError> {
        Ok(serialize_graph(session.graph())?)
    }

    /// Writes the XML back to the source and persists the layout. The
    /// session itself is never modified, so a failed save loses nothing.
    pub async fn save(&self, session: &EditorSession) -> Result<String, DomainError> {
        let xml = self.export_xml(session)?;
        self.source.store(&xml).await?;
        self.persist_layout(session).await?;
        Ok(xml)
    }

    pub async fn persist_layout(&self, session: &EditorSession) -> Result<(), DomainError> {
        let layout = session.layout_snapshot();
        let json = encode_layout(&layout).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to encode layout: {}", e),
            )
        })?;
        self.store.put(&self.layout_key, &json).await?;
        info!(
            positions = layout.positions.len(),
            routes = layout.edges.len(),
            "Layout persisted"
        );
        Ok(())
    }

    /// Forgets the saved layout.
    pub async fn clear_layout(&self) -> Result<(), DomainError> {
        self.store.remove(&self.layout_key).await?;
        Ok(())
    }

    async fn load_layout(&self, graph: &FlowGraph) -> PersistedLayout {
        let stored = match self.store.get(&self.layout_key).await {
            Ok(Some(json)) => json,
            Ok(None) => return PersistedLayout::default(),
            Err(e) => {
                warn!(error = %e, "Could not read saved layout");
                return PersistedLayout::default();
            }
        };
        decode_layout(&stored, graph).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable saved layout");
            PersistedLayout::default()
        })
    }
}

/// Logs references to missing targets and question loops. Returns how many
/// were found.
fn report_load_issues(questionnaire: &Questionnaire, graph: &FlowGraph) -> usize {
    let dangling = questionnaire.dangling_references();
    for reference in &dangling {
        warn!(reference = %reference, "Questionnaire references a missing target");
    }
    let cycles = graph.find_cycles();
    for cycle in &cycles {
        let path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
        warn!(cycle = %path.join(" -> "), "Questionnaire routing contains a cycle");
    }
    dangling.len() + cycles.len()
}
