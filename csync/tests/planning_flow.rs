//! End-to-end planning and summarizing through the public API
//!
//! A scripted transport stands in for the network so the full stack
//! (session, prompts, Gemini client, retry loop) runs unchanged.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use campussync::gemini::{
    GeminiClient, GeminiError, HttpRequest, Pause, RawResponse, ResilientClient, RetryPolicy, TIMEOUT_MESSAGE,
    Transport,
};
use campussync::planner::{CALENDAR_CONFIRMATION, PlannerError, PlanningSession, SessionState, TurnOutcome};
use campussync::prompts::PromptLoader;
use campussync::summarizer::NoteSummarizer;
use campussync::upload::{MIME_JPEG, NoteSource, SyllabusUpload, Upload};

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Clone)]
enum Reply {
    Ok(String),
    Status(u16, String),
    Hang,
}

/// Plays back replies in order; the last one repeats
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, GeminiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(request.body.clone());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap()
            }
        };
        match reply {
            Reply::Ok(body) => Ok(RawResponse::new(200, body)),
            Reply::Status(status, body) => Ok(RawResponse::new(status, body)),
            Reply::Hang => std::future::pending().await,
        }
    }
}

struct NoPause;

#[async_trait]
impl Pause for NoPause {
    async fn pause(&self, _duration: Duration) {}
}

fn candidate(text: &str) -> Reply {
    Reply::Ok(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string())
}

fn client(transport: Arc<ScriptedTransport>, attempts: u32) -> Arc<GeminiClient> {
    let policy = RetryPolicy::linear(attempts, Duration::from_millis(50), Duration::from_millis(1));
    let caller = ResilientClient::new(transport, policy).with_pause(Arc::new(NoPause));
    Arc::new(GeminiClient::new(
        "gemini-1.5-flash-latest",
        "test-key",
        "http://localhost",
        caller,
    ))
}

fn pdf_syllabus() -> SyllabusUpload {
    SyllabusUpload::accept(Some(Upload::new(
        "syllabus.pdf",
        "application/pdf",
        b"%PDF-1.4 week 1".to_vec(),
    )))
    .unwrap()
}

// =============================================================================
// Planning
// =============================================================================

#[tokio::test]
async fn test_plan_then_chat_resends_plan_and_history() {
    let transport = ScriptedTransport::new(vec![
        candidate("Week 1: Intro"),
        candidate("Moved the quiz to Friday."),
        candidate("Done."),
    ]);
    let mut session = PlanningSession::new(client(transport.clone(), 3), PromptLoader::embedded_only());

    let plan = session.generate_plan(&pdf_syllabus()).await.unwrap();
    assert_eq!(plan, "Week 1: Intro");
    assert_eq!(session.state(), SessionState::PlanReady);

    let first = session.send_chat("Move the quiz").await.unwrap();
    assert_eq!(first, TurnOutcome::Reply("Moved the quiz to Friday.".to_string()));
    session.send_chat("Thanks").await.unwrap();

    let bodies = transport.bodies();
    assert_eq!(bodies.len(), 3);

    // Plan request: instructions then the syllabus inline
    let plan_parts = &bodies[0]["contents"][0]["parts"];
    assert_eq!(plan_parts[1]["inline_data"]["mime_type"], "application/pdf");

    // Third request: plan context, user, model, user
    let contents = bodies[2]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 4);
    assert!(contents[0]["parts"][0]["text"].as_str().unwrap().contains("Week 1: Intro"));
    assert_eq!(contents[1]["role"], "user");
    assert_eq!(contents[2]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "Moved the quiz to Friday.");
    assert_eq!(contents[3]["parts"][0]["text"], "Thanks");
}

#[tokio::test]
async fn test_structured_reply_replaces_calendar() {
    let events = json!([
        {"title": "Quiz 1", "date": "2025-03-10", "forCourse": "BSIT"},
        {"title": "Lab report", "date": "2025-03-12"}
    ])
    .to_string();
    let transport = ScriptedTransport::new(vec![candidate("Plan"), candidate(&events)]);
    let mut session = PlanningSession::new(client(transport, 3), PromptLoader::embedded_only());

    session.generate_plan(&pdf_syllabus()).await.unwrap();
    let outcome = session.send_chat("Add these to my calendar").await.unwrap();

    assert_eq!(outcome, TurnOutcome::CalendarUpdated { event_count: 2 });
    assert_eq!(session.history().last().unwrap().text, CALENDAR_CONFIRMATION);
    assert!(session.calendar().has_events_on(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
}

#[tokio::test]
async fn test_unsupported_syllabus_makes_no_call() {
    let transport = ScriptedTransport::new(vec![candidate("unused")]);
    let _client = client(transport.clone(), 3);

    let err = SyllabusUpload::accept(Some(Upload::new("syllabus.png", "image/png", vec![1, 2, 3]))).unwrap_err();

    assert_eq!(err.to_string(), "Please upload a .pdf, .jpeg, or .docx file.");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_jpeg_syllabus_accepted() {
    let transport = ScriptedTransport::new(vec![candidate("Plan from image")]);
    let mut session = PlanningSession::new(client(transport.clone(), 1), PromptLoader::embedded_only());
    let syllabus = SyllabusUpload::accept(Some(Upload::new("scan.jpg", MIME_JPEG, vec![0xff, 0xd8]))).unwrap();

    session.generate_plan(&syllabus).await.unwrap();

    assert_eq!(transport.bodies()[0]["contents"][0]["parts"][1]["inline_data"]["mime_type"], MIME_JPEG);
}

#[tokio::test]
async fn test_chat_without_plan_makes_no_call() {
    let transport = ScriptedTransport::new(vec![candidate("unused")]);
    let mut session = PlanningSession::new(client(transport.clone(), 3), PromptLoader::embedded_only());

    let err = session.send_chat("hello").await.unwrap_err();

    assert!(matches!(err, PlannerError::NoPlan));
    assert_eq!(transport.calls(), 0);
}

// =============================================================================
// Retry behavior through the full stack
// =============================================================================

#[tokio::test]
async fn test_every_attempt_times_out() {
    let transport = ScriptedTransport::new(vec![Reply::Hang]);
    let mut session = PlanningSession::new(client(transport.clone(), 3), PromptLoader::embedded_only());

    let err = session.generate_plan(&pdf_syllabus()).await.unwrap_err();

    assert_eq!(err.to_string(), TIMEOUT_MESSAGE);
    assert_eq!(transport.calls(), 3);
    assert_eq!(session.state(), SessionState::Empty);
}

#[tokio::test]
async fn test_upstream_error_message_surfaces() {
    let body = json!({"error": {"code": 400, "message": "Invalid value at 'contents'"}}).to_string();
    let transport = ScriptedTransport::new(vec![Reply::Status(400, body)]);
    let mut session = PlanningSession::new(client(transport.clone(), 2), PromptLoader::embedded_only());

    let err = session.generate_plan(&pdf_syllabus()).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid value at 'contents'");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_recovers_after_transient_error() {
    let transport = ScriptedTransport::new(vec![
        Reply::Status(503, json!({"error": {"message": "overloaded"}}).to_string()),
        candidate("Week 1"),
    ]);
    let mut session = PlanningSession::new(client(transport.clone(), 3), PromptLoader::embedded_only());

    let plan = session.generate_plan(&pdf_syllabus()).await.unwrap();

    assert_eq!(plan, "Week 1");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_failed_regeneration_keeps_plan_and_history() {
    let transport = ScriptedTransport::new(vec![
        candidate("Original plan"),
        candidate("Sure."),
        Reply::Status(500, "{}".to_string()),
    ]);
    let mut session = PlanningSession::new(client(transport, 1), PromptLoader::embedded_only());

    session.generate_plan(&pdf_syllabus()).await.unwrap();
    session.send_chat("Shift week 2").await.unwrap();
    let err = session.generate_plan(&pdf_syllabus()).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed after retries.");
    assert_eq!(session.plan(), Some("Original plan"));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.state(), SessionState::PlanReady);
}

// =============================================================================
// Summaries
// =============================================================================

#[tokio::test]
async fn test_summarize_text_through_client() {
    let transport = ScriptedTransport::new(vec![candidate("- Photosynthesis makes glucose")]);
    let summarizer = NoteSummarizer::new(client(transport.clone(), 3), PromptLoader::embedded_only());
    let date = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();

    let record = summarizer
        .summarize_on(NoteSource::Text("Plants turn light into sugar.".to_string()), date)
        .await
        .unwrap();

    assert_eq!(record.title, "Pasted notes");
    assert_eq!(record.summary, "- Photosynthesis makes glucose");
    let prompt = transport.bodies()[0]["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string();
    assert!(prompt.contains("Plants turn light into sugar."));
}
