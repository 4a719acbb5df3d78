//! ConversationService - drives a questionnaire walk with persisted answers.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::xml::parse_questionnaire;
use crate::domain::content::RichText;
use crate::domain::conversation::{Conversation, Recommendation, SessionRecord, Step};
use crate::domain::foundation::{DomainError, OptionId, QuestionId, SessionId, Timestamp};
use crate::domain::questionnaire::{Document, Questionnaire};
use crate::ports::{ContentProvider, KeyValueStore, QuestionnaireSource};

/// One user's walk: the traversal state plus whatever auxiliary content
/// could be loaded for it.
#[derive(Debug, Clone)]
pub struct ActiveConversation {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    conversation: Conversation,
    tooltips: HashMap<QuestionId, RichText>,
    descriptions: HashMap<String, RichText>,
}

impl ActiveConversation {
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Tooltip for a question as HTML. CMS content wins; the XML tooltip is
    /// the fallback. `None` means no tooltip affordance.
    pub fn tooltip_html(&self, question: &QuestionId) -> Option<String> {
        if let Some(content) = self.tooltips.get(question) {
            return Some(content.to_html());
        }
        self.conversation
            .questionnaire()
            .question(question)
            .and_then(|q| q.tooltip.as_deref())
            .map(|text| RichText::plain(text).to_html())
    }

    /// Description of a document as HTML, CMS content first.
    pub fn description_html(&self, document: &Document) -> Option<String> {
        if let Some(content) = self.descriptions.get(document.title.trim()) {
            return Some(content.to_html());
        }
        document
            .description
            .as_deref()
            .map(|text| RichText::plain(text).to_html())
    }

    pub fn recommendations(&self) -> Option<Recommendation> {
        self.conversation.recommendations()
    }

    fn record(&self) -> SessionRecord {
        SessionRecord {
            session_id: self.session_id,
            started_at: self.started_at,
            answers: self.conversation.answers().to_vec(),
        }
    }
}

pub struct ConversationService {
    source: Arc<dyn QuestionnaireSource>,
    content: Arc<dyn ContentProvider>,
    store: Arc<dyn KeyValueStore>,
    session_key: String,
}

impl ConversationService {
    pub fn new(
        source: Arc<dyn QuestionnaireSource>,
        content: Arc<dyn ContentProvider>,
        store: Arc<dyn KeyValueStore>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            source,
            content,
            store,
            session_key: session_key.into(),
        }
    }

    /// Fetches and parses the questionnaire. Failure here means the
    /// conversation cannot start.
    pub async fn load_questionnaire(&self) -> Result<Arc<Questionnaire>, DomainError> {
        let xml = self.source.fetch().await?;
        let questionnaire = parse_questionnaire(&xml)?;
        info!(
            source = %self.source.describe(),
            questions = questionnaire.questions.len(),
            "Questionnaire loaded"
        );
        Ok(Arc::new(questionnaire))
    }

    /// Loads the questionnaire and resumes the stored session, or starts a
    /// fresh one when nothing usable is stored.
    pub async fn start(&self) -> Result<ActiveConversation, DomainError> {
        let questionnaire = self.load_questionnaire().await?;
        let record = self.load_record().await.unwrap_or_default();
        let (tooltips, descriptions) = self.load_content().await;

        let resumed = Conversation::resume(questionnaire, record.answers.clone())?;
        let active = ActiveConversation {
            session_id: record.session_id,
            started_at: record.started_at,
            conversation: resumed.conversation,
            tooltips,
            descriptions,
        };
        if !resumed.discarded.is_empty() || record.answers.is_empty() {
            self.persist(&active).await;
        }
        info!(
            session_id = %active.session_id,
            answers = active.conversation.answers().len(),
            "Conversation started"
        );
        Ok(active)
    }

    /// Records an answer and persists the answer list right away.
    pub async fn answer(
        &self,
        active: &mut ActiveConversation,
        option: &OptionId,
    ) -> Result<Step, DomainError> {
        let step = active.conversation.answer(option)?;
        self.persist(active).await;
        Ok(step)
    }

    pub async fn undo(&self, active: &mut ActiveConversation) -> Result<bool, DomainError> {
        let undone = active.conversation.undo()?;
        if undone {
            self.persist(active).await;
        }
        Ok(undone)
    }

    pub async fn rewind_to(
        &self,
        active: &mut ActiveConversation,
        question: &QuestionId,
    ) -> Result<(), DomainError> {
        active.conversation.rewind_to(question)?;
        self.persist(active).await;
        Ok(())
    }

    /// Starts over with a new session id.
    pub async fn reset(&self, active: &mut ActiveConversation) -> Result<(), DomainError> {
        active.conversation.reset()?;
        let fresh = SessionRecord::new();
        active.session_id = fresh.session_id;
        active.started_at = fresh.started_at;
        self.persist(active).await;
        Ok(())
    }

    async fn load_record(&self) -> Option<SessionRecord> {
        let stored = match self.store.get(&self.session_key).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(error = %e, "Could not read stored session");
                return None;
            }
        };
        match SessionRecord::from_json(&stored) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored session");
                None
            }
        }
    }

    /// Tooltips and descriptions are fetched together; either failing only
    /// drops that content.
    async fn load_content(&self) -> (HashMap<QuestionId, RichText>, HashMap<String, RichText>) {
        let (tooltips, descriptions) =
            tokio::join!(self.content.tooltips(), self.content.document_descriptions());
        let tooltips = tooltips.unwrap_or_else(|e| {
            warn!(error = %e, "Tooltip content unavailable");
            HashMap::new()
        });
        let descriptions = descriptions.unwrap_or_else(|e| {
            warn!(error = %e, "Document descriptions unavailable");
            HashMap::new()
        });
        (tooltips, descriptions)
    }

    /// Storing is best effort: a failed write is logged and the in-memory
    /// conversation stays authoritative.
    async fn persist(&self, active: &ActiveConversation) {
        let json = match active.record().to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not encode session");
                return;
            }
        };
        match self.store.put(&self.session_key, &json).await {
            Ok(()) => debug!(answers = active.conversation.answers().len(), "Session persisted"),
            Err(e) => warn!(error = %e, "Could not persist session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::content::StaticContentProvider;
    use crate::adapters::storage::InMemoryKeyValueStore;
    use crate::domain::conversation::{Answer, TraversalPhase};
    use crate::domain::foundation::ErrorCode;
    use crate::ports::{ContentError, SourceError};
    use async_trait::async_trait;

    const XML: &str = r#"<questions>
  <question id="1"><text>Travelling?</text><tooltip>From the XML</tooltip>
    <options><option id="1">Yes</option><option id="2">No</option></options>
    <nextQuestions>
      <next optionId="1" questionId="2"/>
      <next optionId="2" endNodeId="stay"/>
    </nextQuestions>
  </question>
  <question id="2"><text>Abroad?</text>
    <options><option id="1">Yes</option><option id="2">No</option></options>
  </question>
  <endNodes><endNode id="stay"><text>Enjoy home</text></endNode></endNodes>
  <dependencies>
    <document type="mandatory"><text>Passport</text><description>XML text</description>
      <conditions><condition questionId="2" optionId="1"/></conditions>
    </document>
  </dependencies>
</questions>"#;

    struct FixedSource(Option<&'static str>);

    #[async_trait]
    impl QuestionnaireSource for FixedSource {
        async fn fetch(&self) -> Result<String, SourceError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| SourceError::Request("offline".into()))
        }

        fn describe(&self) -> String {
            "fixed".into()
        }
    }

    struct FailingContent;

    #[async_trait]
    impl ContentProvider for FailingContent {
        async fn tooltips(&self) -> Result<HashMap<QuestionId, RichText>, ContentError> {
            Err(ContentError::Request("cms down".into()))
        }

        async fn document_descriptions(&self) -> Result<HashMap<String, RichText>, ContentError> {
            Err(ContentError::Request("cms down".into()))
        }
    }

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id).unwrap()
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id).unwrap()
    }

    fn service(content: Arc<dyn ContentProvider>, store: InMemoryKeyValueStore) -> ConversationService {
        ConversationService::new(
            Arc::new(FixedSource(Some(XML))),
            content,
            Arc::new(store),
            "questionnaire-answers",
        )
    }

    async fn stored_answers(store: &InMemoryKeyValueStore) -> Vec<Answer> {
        let json = store.get("questionnaire-answers").await.unwrap().unwrap();
        SessionRecord::from_json(&json).unwrap().answers
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn answers_are_persisted_immediately() {
            let store = InMemoryKeyValueStore::new();
            let service = service(Arc::new(StaticContentProvider::empty()), store.clone());
            let mut active = service.start().await.unwrap();

            service.answer(&mut active, &o("1")).await.unwrap();
            assert_eq!(stored_answers(&store).await, vec![Answer::new(q("1"), o("1"))]);
        }

        #[tokio::test]
        async fn restart_resumes_stored_answers() {
            let store = InMemoryKeyValueStore::new();
            let service = service(Arc::new(StaticContentProvider::empty()), store.clone());
            let mut first = service.start().await.unwrap();
            service.answer(&mut first, &o("1")).await.unwrap();

            let resumed = service.start().await.unwrap();
            assert_eq!(resumed.session_id, first.session_id);
            assert_eq!(resumed.conversation().current_question().unwrap().id, q("2"));
        }

        #[tokio::test]
        async fn legacy_bare_array_is_resumed() {
            let store = InMemoryKeyValueStore::new();
            store
                .put("questionnaire-answers", r#"[{"questionId":"1","optionId":"1"},{"questionId":"2","optionId":"1"}]"#)
                .await
                .unwrap();
            let service = service(Arc::new(StaticContentProvider::empty()), store);
            let active = service.start().await.unwrap();
            assert_eq!(active.conversation().phase(), TraversalPhase::Finished);
            let recommendation = active.recommendations().unwrap();
            assert_eq!(recommendation.mandatory[0].title, "Passport");
        }

        #[tokio::test]
        async fn stale_answers_are_dropped_and_rewritten() {
            let store = InMemoryKeyValueStore::new();
            store
                .put("questionnaire-answers", r#"[{"questionId":"1","optionId":"9"}]"#)
                .await
                .unwrap();
            let service = service(Arc::new(StaticContentProvider::empty()), store.clone());
            let active = service.start().await.unwrap();
            assert!(active.conversation().answers().is_empty());
            assert!(stored_answers(&store).await.is_empty());
        }

        #[tokio::test]
        async fn rewind_and_reset_update_storage() {
            let store = InMemoryKeyValueStore::new();
            let service = service(Arc::new(StaticContentProvider::empty()), store.clone());
            let mut active = service.start().await.unwrap();
            service.answer(&mut active, &o("1")).await.unwrap();
            service.answer(&mut active, &o("2")).await.unwrap();

            service.rewind_to(&mut active, &q("2")).await.unwrap();
            assert_eq!(stored_answers(&store).await.len(), 1);

            let old_session = active.session_id;
            service.reset(&mut active).await.unwrap();
            assert!(stored_answers(&store).await.is_empty());
            assert_ne!(active.session_id, old_session);
        }

        #[tokio::test]
        async fn fetch_failure_prevents_start() {
            let service = ConversationService::new(
                Arc::new(FixedSource(None)),
                Arc::new(StaticContentProvider::empty()),
                Arc::new(InMemoryKeyValueStore::new()),
                "questionnaire-answers",
            );
            let err = service.start().await.unwrap_err();
            assert_eq!(err.code, ErrorCode::SourceUnavailable);
        }
    }

    mod content {
        use super::*;

        #[tokio::test]
        async fn cms_failure_falls_back_to_xml_content() {
            let service = service(Arc::new(FailingContent), InMemoryKeyValueStore::new());
            let active = service.start().await.unwrap();
            assert_eq!(active.tooltip_html(&q("1")).as_deref(), Some("<p>From the XML</p>"));
            assert_eq!(active.tooltip_html(&q("2")), None);
        }

        #[tokio::test]
        async fn cms_content_overrides_xml() {
            let content = StaticContentProvider::empty()
                .with_tooltip(q("1"), RichText::plain("From the CMS"))
                .with_description("Passport", RichText::plain("CMS description"));
            let service = service(Arc::new(content), InMemoryKeyValueStore::new());
            let mut active = service.start().await.unwrap();
            assert_eq!(active.tooltip_html(&q("1")).as_deref(), Some("<p>From the CMS</p>"));

            service.answer(&mut active, &o("1")).await.unwrap();
            service.answer(&mut active, &o("1")).await.unwrap();
            let recommendation = active.recommendations().unwrap();
            assert_eq!(
                active.description_html(&recommendation.mandatory[0]).as_deref(),
                Some("<p>CMS description</p>")
            );
        }
    }
}
