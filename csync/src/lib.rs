//! CampusSync - study planning and note summaries on top of Gemini
//!
//! CampusSync turns a course syllabus into a study plan, refines the plan by
//! chat, and summarizes lecture notes. Every model call goes through a
//! resilient client with a per-attempt timeout and linear backoff.
//!
//! # Modules
//!
//! - [`gemini`] - `generateContent` client, retry policy and transport seam
//! - [`planner`] - plan generation, refinement chat, terminal REPL
//! - [`summarizer`] - note summaries from text or PDF
//! - [`upload`] - file reading and per-feature media-type checks
//! - [`domain`] - profile, calendar and summary records
//! - [`prompts`] - prompt templates with user overrides
//! - [`config`] - YAML configuration
//! - [`cli`] - command-line definitions

pub mod cli;
pub mod config;
pub mod domain;
pub mod gemini;
pub mod planner;
pub mod prompts;
pub mod summarizer;
pub mod upload;

pub use config::Config;
pub use domain::{Calendar, CalendarEvent, DomainError, Profile, SummaryArchive, SummaryRecord};
pub use gemini::{GeminiClient, GeminiError, GenerativeClient, ResilientClient, RetryPolicy, Transport};
pub use planner::{PlanRepl, PlannerError, PlanningSession, SessionState, TurnOutcome};
pub use prompts::PromptLoader;
pub use summarizer::{NoteSummarizer, SummarizeError};
pub use upload::{NoteSource, SyllabusUpload, Upload, UploadError};
