//! Question-by-question traversal.
//!
//! The answer list is the only source of truth. History, the current
//! question and the finished state are all recomputed by replaying answers
//! from the start question, so undo and rewind reduce to truncating the
//! list and replaying it.

use std::sync::Arc;
use tracing::{debug, warn};

use super::{Answer, DocumentEvaluator, HistoryEntry, Recommendation, TraversalPhase};
use crate::domain::foundation::{
    DomainError, EndNodeId, ErrorCode, OptionId, QuestionId, StateMachine,
};
use crate::domain::questionnaire::{EndNode, NextTarget, Question, Questionnaire};

/// Where the walk stands after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Question(QuestionId),
    Finished { end_node: Option<EndNodeId> },
}

/// A resumed conversation plus the persisted answers that could not be
/// replayed against the current questionnaire.
#[derive(Debug, Clone)]
pub struct Resumed {
    pub conversation: Conversation,
    pub discarded: Vec<Answer>,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    questionnaire: Arc<Questionnaire>,
    phase: TraversalPhase,
    current: Option<QuestionId>,
    end_node: Option<EndNodeId>,
    answers: Vec<Answer>,
    history: Vec<HistoryEntry>,
}

impl Conversation {
    /// Creates a conversation in the `Loading` phase.
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        Self {
            questionnaire,
            phase: TraversalPhase::Loading,
            current: None,
            end_node: None,
            answers: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Creates a conversation and presents the start question.
    pub fn start(questionnaire: Arc<Questionnaire>) -> Result<Self, DomainError> {
        let mut conversation = Self::new(questionnaire);
        conversation.present_start()?;
        Ok(conversation)
    }

    /// Replays persisted answers. Replay stops at the first answer that no
    /// longer fits the questionnaire; it and everything after it is
    /// returned as discarded.
    pub fn resume(
        questionnaire: Arc<Questionnaire>,
        answers: Vec<Answer>,
    ) -> Result<Resumed, DomainError> {
        let mut conversation = Self::start(questionnaire)?;
        let discarded = conversation.replay(answers);
        if !discarded.is_empty() {
            warn!(
                replayed = conversation.answers.len(),
                discarded = discarded.len(),
                "Persisted answers no longer match the questionnaire"
            );
        }
        Ok(Resumed {
            conversation,
            discarded,
        })
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn phase(&self) -> TraversalPhase {
        self.phase
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current
            .as_ref()
            .and_then(|id| self.questionnaire.question(id))
    }

    /// The end node the walk stopped at. `None` while in progress, and also
    /// when the walk finished because no next rule matched.
    pub fn end_node(&self) -> Option<&EndNode> {
        self.end_node
            .as_ref()
            .and_then(|id| self.questionnaire.end_node(id))
    }

    pub fn end_node_id(&self) -> Option<&EndNodeId> {
        self.end_node.as_ref()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Answers the current question with `option`.
    pub fn answer(&mut self, option: &OptionId) -> Result<Step, DomainError> {
        if !self.phase.accepts_answers() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot answer while {:?}", self.phase),
            ));
        }
        let question = self.current_question().ok_or_else(|| {
            DomainError::new(ErrorCode::QuestionNotFound, "No question is being presented")
        })?;
        let selected = question.option(option).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidAnswer,
                format!("Question {} has no option {}", question.id, option),
            )
            .with_detail("question_id", question.id.as_str())
            .with_detail("option_id", option.as_str())
        })?;

        let entry = HistoryEntry {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            tooltip: question.tooltip.clone(),
            option_id: selected.id.clone(),
            option_label: selected.label.clone(),
        };
        let next = question.resolve_next(option).cloned();

        self.answers
            .push(Answer::new(entry.question_id.clone(), entry.option_id.clone()));
        self.history.push(entry);

        let step = match next {
            Some(NextTarget::Question(id)) if self.questionnaire.question(&id).is_some() => {
                self.phase = self.phase.transition_to(TraversalPhase::PresentingQuestion)?;
                self.current = Some(id.clone());
                Step::Question(id)
            }
            Some(NextTarget::Question(id)) => {
                warn!(question_id = %id, "Next question does not exist, finishing");
                self.finish(None)?
            }
            Some(NextTarget::EndNode(id)) => self.finish(Some(id))?,
            None => self.finish(None)?,
        };
        debug!(answers = self.answers.len(), ?step, "Answer recorded");
        Ok(step)
    }

    /// Drops the last answer. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, DomainError> {
        if self.answers.is_empty() {
            return Ok(false);
        }
        let mut answers = std::mem::take(&mut self.answers);
        answers.pop();
        self.restart_with(answers)?;
        Ok(true)
    }

    /// Goes back to `question`, forgetting its answer and every later one.
    ///
    /// Rewinding to the question currently presented is a no-op.
    pub fn rewind_to(&mut self, question: &QuestionId) -> Result<(), DomainError> {
        if self.phase.accepts_answers() && self.current.as_ref() == Some(question) {
            return Ok(());
        }
        let position = self
            .answers
            .iter()
            .position(|answer| &answer.question_id == question)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::QuestionNotFound,
                    format!("Question {} was not answered in this conversation", question),
                )
            })?;
        let mut answers = std::mem::take(&mut self.answers);
        answers.truncate(position);
        self.restart_with(answers)
    }

    /// Clears all answers and presents the start question again.
    pub fn reset(&mut self) -> Result<(), DomainError> {
        self.restart_with(Vec::new())
    }

    /// Documents that apply to the answers given. Only available once the
    /// walk has finished.
    pub fn recommendations(&self) -> Option<Recommendation> {
        self.phase.is_finished().then(|| {
            DocumentEvaluator::new(&self.answers).evaluate(&self.questionnaire.documents)
        })
    }

    fn present_start(&mut self) -> Result<(), DomainError> {
        let start = Questionnaire::start_question_id();
        if self.questionnaire.question(&start).is_none() {
            return Err(DomainError::new(
                ErrorCode::InvalidSchema,
                format!("Start question {} is missing", start),
            ));
        }
        self.phase = TraversalPhase::PresentingQuestion;
        self.current = Some(start);
        self.end_node = None;
        self.answers.clear();
        self.history.clear();
        Ok(())
    }

    fn finish(&mut self, end_node: Option<EndNodeId>) -> Result<Step, DomainError> {
        self.phase = self.phase.transition_to(TraversalPhase::Finished)?;
        self.current = None;
        self.end_node = end_node.clone();
        Ok(Step::Finished { end_node })
    }

    fn restart_with(&mut self, answers: Vec<Answer>) -> Result<(), DomainError> {
        self.present_start()?;
        let discarded = self.replay(answers);
        if !discarded.is_empty() {
            warn!(discarded = discarded.len(), "Replay stopped early");
        }
        Ok(())
    }

    /// Replays `answers` onto the current state, returning the first answer
    /// that failed together with everything after it.
    fn replay(&mut self, answers: Vec<Answer>) -> Vec<Answer> {
        let mut remaining = answers.into_iter();
        while let Some(answer) = remaining.next() {
            let fits = self.current.as_ref() == Some(&answer.question_id)
                && self.answer(&answer.option_id).is_ok();
            if !fits {
                return std::iter::once(answer).chain(remaining).collect();
            }
        }
        Vec::new()
    }
}
