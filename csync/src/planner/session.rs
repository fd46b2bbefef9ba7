//! PlanningSession - study plan generation and chat refinement
//!
//! A session pins the most recent plan and resends it as standing context
//! with every chat turn, since the API keeps no state between calls.
//!
//! ```text
//! Empty -> PlanPending -> PlanReady <-> ChatTurnPending
//! ```
//!
//! Every call takes `&mut self`, so one session never has two requests in
//! flight. A new plan can only be requested once the current chat turn has
//! resolved.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Calendar, events_from_json};
use crate::gemini::{GeminiError, GenerateContentRequest, GenerativeClient, Part, Role};
use crate::prompts::PromptLoader;
use crate::upload::{SyllabusUpload, UploadError};

/// Plan text used when the model returns no candidate
pub const NO_PLAN_FALLBACK: &str = "No plan generated.";

/// Reply text used when the model returns no candidate
pub const NO_REPLY_FALLBACK: &str = "No response from Gemini.";

/// Shown in place of a structured reply once the calendar is replaced
pub const CALENDAR_CONFIRMATION: &str = "✅ Your updated plan has been added to the calendar.";

/// Errors surfaced by planning actions
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("Generate a study plan before asking for changes.")]
    NoPlan,

    #[error("Message is empty.")]
    EmptyMessage,

    #[error("Failed to build prompt: {0}")]
    Prompt(String),
}

/// State of the planning session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No plan yet
    Empty,
    /// Plan generation in flight
    PlanPending,
    /// Plan available, no request in flight
    PlanReady,
    /// Chat turn in flight
    ChatTurnPending,
}

/// Who wrote a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    /// Map onto the API's two-role vocabulary
    pub fn api_role(self) -> Role {
        match self {
            ChatRole::User => Role::User,
            ChatRole::Model => Role::Model,
        }
    }
}

/// One entry of the chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// What a chat turn produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Plain-text reply, appended verbatim
    Reply(String),
    /// Reply was JSON; the calendar now holds the decoded events
    CalendarUpdated { event_count: usize },
}

/// Holds a pending state for the life of one request
///
/// Dropping it, whether the request resolved or its future was dropped,
/// puts back the state that was current before the request.
struct PendingState<'a> {
    slot: &'a mut SessionState,
    previous: SessionState,
}

impl<'a> PendingState<'a> {
    fn enter(slot: &'a mut SessionState, pending: SessionState) -> Self {
        let previous = std::mem::replace(slot, pending);
        Self { slot, previous }
    }
}

impl Drop for PendingState<'_> {
    fn drop(&mut self) {
        *self.slot = self.previous;
    }
}

/// PlanningSession owns the plan, its chat history, and the derived calendar
pub struct PlanningSession {
    client: Arc<dyn GenerativeClient>,
    prompts: PromptLoader,
    plan: Option<String>,
    history: Vec<ChatTurn>,
    calendar: Calendar,
    state: SessionState,
}

impl PlanningSession {
    /// Create a new, empty planning session
    pub fn new(client: Arc<dyn GenerativeClient>, prompts: PromptLoader) -> Self {
        Self {
            client,
            prompts,
            plan: None,
            history: Vec::new(),
            calendar: Calendar::default(),
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Generate a plan from the syllabus and pin it
    ///
    /// On success the chat history is cleared. On failure the previous plan,
    /// history and state are left as they were.
    pub async fn generate_plan(&mut self, syllabus: &SyllabusUpload) -> Result<String, PlannerError> {
        let upload = syllabus.upload();
        debug!(name = %upload.name, mime_type = %upload.mime_type, bytes = upload.bytes.len(), "generate_plan: called");

        let prompt = self
            .prompts
            .syllabus_plan()
            .map_err(|e| PlannerError::Prompt(e.to_string()))?;
        let request = GenerateContentRequest::single_turn(vec![Part::text(prompt), upload.to_inline_part()]);

        info!("Generating study plan from {}", upload.name);
        let client = Arc::clone(&self.client);
        let result = {
            let _pending = PendingState::enter(&mut self.state, SessionState::PlanPending);
            client.generate(request).await
        };

        match result {
            Ok(response) => {
                let plan = response.text_or(NO_PLAN_FALLBACK).to_string();
                self.history.clear();
                self.plan = Some(plan.clone());
                self.state = SessionState::PlanReady;
                info!(plan_len = plan.len(), "Study plan ready");
                Ok(plan)
            }
            Err(e) => {
                warn!(error = %e, "generate_plan: request failed");
                Err(e.into())
            }
        }
    }

    /// Multi-turn request: the pinned plan first, then the whole history
    pub fn build_chat_request(&self) -> Result<GenerateContentRequest, PlannerError> {
        let plan = self.plan.as_deref().ok_or(PlannerError::NoPlan)?;
        let context = self
            .prompts
            .plan_context(plan)
            .map_err(|e| PlannerError::Prompt(e.to_string()))?;

        let turns = std::iter::once((Role::User, context))
            .chain(self.history.iter().map(|t| (t.role.api_role(), t.text.clone())))
            .collect();
        Ok(GenerateContentRequest::conversation(turns))
    }

    /// Send one chat message about the current plan
    ///
    /// The user turn is recorded as typed, before the call. A failed call
    /// records nothing else; a JSON reply replaces the calendar and records the
    /// confirmation instead of the raw text.
    pub async fn send_chat(&mut self, message: &str) -> Result<TurnOutcome, PlannerError> {
        debug!(message_len = message.len(), "send_chat: called");
        if message.trim().is_empty() {
            return Err(PlannerError::EmptyMessage);
        }
        if self.plan.is_none() {
            debug!("send_chat: no plan pinned");
            return Err(PlannerError::NoPlan);
        }

        self.history.push(ChatTurn::user(message));
        let request = match self.build_chat_request() {
            Ok(request) => request,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        let client = Arc::clone(&self.client);
        let result = {
            let _pending = PendingState::enter(&mut self.state, SessionState::ChatTurnPending);
            client.generate(request).await
        };

        let response = result.map_err(|e| {
            warn!(error = %e, "send_chat: request failed");
            PlannerError::from(e)
        })?;
        let reply = response.text_or(NO_REPLY_FALLBACK);

        match serde_json::from_str::<serde_json::Value>(reply) {
            Ok(value) => {
                let events = events_from_json(&value);
                let event_count = events.len();
                info!(event_count, "Chat reply was structured, replacing calendar");
                self.calendar.replace(events);
                self.history.push(ChatTurn::model(CALENDAR_CONFIRMATION));
                Ok(TurnOutcome::CalendarUpdated { event_count })
            }
            Err(_) => {
                debug!("send_chat: plain-text reply");
                self.history.push(ChatTurn::model(reply));
                Ok(TurnOutcome::Reply(reply.to_string()))
            }
        }
    }
}
