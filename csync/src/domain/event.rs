//! Calendar events
//!
//! Events are owned either by one user (`forUID`) or by a course
//! (`forCourse`). The dashboard shows the union of both for the signed-in
//! user.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::DomainError;

/// A dated calendar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,

    /// Calendar day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    #[serde(rename = "forUID", default, skip_serializing_if = "Option::is_none")]
    pub for_uid: Option<String>,

    #[serde(rename = "forCourse", default, skip_serializing_if = "Option::is_none")]
    pub for_course: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::MissingField("title"));
        }
        Ok(Self {
            title,
            date,
            for_uid: None,
            for_course: None,
        })
    }

    pub fn for_user(mut self, uid: impl Into<String>) -> Self {
        self.for_uid = Some(uid.into());
        self
    }

    pub fn for_course(mut self, course: impl Into<String>) -> Self {
        self.for_course = Some(course.into());
        self
    }
}

/// Decode the event objects out of a parsed JSON value
///
/// Accepts an array of events or a single event object. Entries that do not
/// decode are dropped.
pub fn events_from_json(value: &serde_json::Value) -> Vec<CalendarEvent> {
    let items: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(_) => vec![value],
        _ => Vec::new(),
    };

    let total = items.len();
    let events: Vec<CalendarEvent> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CalendarEvent>(item.clone()) {
            Ok(event) if !event.title.trim().is_empty() => Some(event),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "events_from_json: skipping entry");
                None
            }
        })
        .collect();

    if events.len() < total {
        warn!(
            dropped = total - events.len(),
            kept = events.len(),
            "events_from_json: dropped entries that are not events"
        );
    }
    events
}

/// An in-memory set of events with the dashboard's queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    events: Vec<CalendarEvent>,
}

impl Calendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Load a JSON array of events from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        debug!(?path, "Calendar::load: called");
        let content = fs::read_to_string(path)?;
        let events: Vec<CalendarEvent> = serde_json::from_str(&content)?;
        Ok(Self { events })
    }

    /// Like [`Calendar::load`], but a missing file is an empty calendar
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(?path, "Calendar::load_or_empty: no file yet");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write the events back as a JSON array, creating the directory as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        debug!(?path, count = self.events.len(), "Calendar::save: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.events)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn add(&mut self, event: CalendarEvent) {
        info!("Added event '{}' on {}", event.title, event.date);
        self.events.push(event);
    }

    /// Swap in a whole new event list
    pub fn replace(&mut self, events: Vec<CalendarEvent>) {
        debug!(old = self.events.len(), new = events.len(), "Calendar::replace: called");
        self.events = events;
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        self.events.iter().filter(|e| e.date == date).collect()
    }

    pub fn has_events_on(&self, date: NaiveDate) -> bool {
        self.events.iter().any(|e| e.date == date)
    }

    pub fn for_user(&self, uid: &str) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|e| e.for_uid.as_deref() == Some(uid))
            .collect()
    }

    pub fn for_course(&self, course: &str) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|e| e.for_course.as_deref() == Some(course))
            .collect()
    }

    /// Events owned by the user plus events for their course
    pub fn visible_to(&self, uid: &str, course: Option<&str>) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|e| e.for_uid.as_deref() == Some(uid) || (course.is_some() && e.for_course.as_deref() == course))
            .collect()
    }

    /// Distinct dates that carry at least one event, ascending
    pub fn busy_dates(&self) -> BTreeSet<NaiveDate> {
        self.events.iter().map(|e| e.date).collect()
    }
}
