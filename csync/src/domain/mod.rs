//! Domain records exchanged with the document database
//!
//! - [`Profile`] - per-user profile
//! - [`CalendarEvent`] / [`Calendar`] - user and course events
//! - [`SummaryRecord`] / [`SummaryArchive`] - generated note summaries

mod event;
mod profile;
mod summary;

use thiserror::Error;

pub use event::{Calendar, CalendarEvent, events_from_json};
pub use profile::{COURSES, Profile, ROLES};
pub use summary::{SummaryArchive, SummaryRecord};

/// Errors from building or storing domain records
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
