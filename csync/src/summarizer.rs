//! Note summarizer
//!
//! One-shot summaries of pasted notes or an attached PDF.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::SummaryRecord;
use crate::gemini::{GeminiError, GenerateContentRequest, GenerativeClient, Part};
use crate::prompts::PromptLoader;
use crate::upload::{NoteSource, UploadError};

/// Summary text used when the model returns no candidate
pub const NO_SUMMARY_FALLBACK: &str = "No summary could be generated.";

/// Title given to summaries of pasted text
pub const PASTED_NOTES_TITLE: &str = "Pasted notes";

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("No text to summarize.")]
    NothingToSummarize,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("Failed to build prompt: {0}")]
    Prompt(String),
}

pub struct NoteSummarizer {
    client: Arc<dyn GenerativeClient>,
    prompts: PromptLoader,
}

impl NoteSummarizer {
    pub fn new(client: Arc<dyn GenerativeClient>, prompts: PromptLoader) -> Self {
        Self { client, prompts }
    }

    /// Summarize the notes, dated today
    pub async fn summarize(&self, source: NoteSource) -> Result<SummaryRecord, SummarizeError> {
        self.summarize_on(source, Local::now().date_naive()).await
    }

    /// Summarize the notes with an explicit record date
    pub async fn summarize_on(&self, source: NoteSource, date: NaiveDate) -> Result<SummaryRecord, SummarizeError> {
        let (title, request) = match &source {
            NoteSource::Text(text) => {
                debug!(text_len = text.len(), "summarize_on: text source");
                if text.trim().is_empty() {
                    return Err(SummarizeError::NothingToSummarize);
                }
                let prompt = self
                    .prompts
                    .note_summary_text(text.trim())
                    .map_err(|e| SummarizeError::Prompt(e.to_string()))?;
                (
                    PASTED_NOTES_TITLE.to_string(),
                    GenerateContentRequest::single_turn(vec![Part::text(prompt)]),
                )
            }
            NoteSource::Pdf(upload) => {
                debug!(name = %upload.name, bytes = upload.bytes.len(), "summarize_on: pdf source");
                let prompt = self
                    .prompts
                    .note_summary()
                    .map_err(|e| SummarizeError::Prompt(e.to_string()))?;
                (
                    upload.name.clone(),
                    GenerateContentRequest::single_turn(vec![Part::text(prompt), upload.to_inline_part()]),
                )
            }
        };

        let response = self.client.generate(request).await?;
        let summary = response.text_or(NO_SUMMARY_FALLBACK).to_string();
        info!("Summarized '{}' ({} chars)", title, summary.len());

        Ok(SummaryRecord { title, date, summary })
    }
}
