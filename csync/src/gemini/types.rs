//! Wire types for the Gemini `generateContent` endpoint
//!
//! Single-turn requests carry one unnamed content entry holding a text part
//! and optional inline data. Multi-turn requests carry one entry per turn,
//! each tagged with a role.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request body for `generateContent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request: no roles, all parts in one entry
    pub fn single_turn(parts: Vec<Part>) -> Self {
        debug!(part_count = %parts.len(), "GenerateContentRequest::single_turn: called");
        Self {
            contents: vec![Content { role: None, parts }],
        }
    }

    /// Multi-turn request built from role-tagged text turns
    pub fn conversation(turns: Vec<(Role, String)>) -> Self {
        debug!(turn_count = %turns.len(), "GenerateContentRequest::conversation: called");
        Self {
            contents: turns
                .into_iter()
                .map(|(role, text)| Content {
                    role: Some(role),
                    parts: vec![Part::text(text)],
                })
                .collect(),
        }
    }
}

/// One entry of `contents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

/// The API's two-role vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A content part: either text or base64 inline data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::InlineData { .. } => None,
        }
    }
}

/// Base64 payload with its declared media type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Response body of `generateContent`
///
/// Every level is optional; a body missing the candidate path is still a
/// valid response and callers substitute their own fallback text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if present and non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// First text, or the given fallback
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.first_text() {
            Some(text) => text,
            None => {
                debug!(%fallback, "GenerateContentResponse::text_or: no candidate text, using fallback");
                fallback
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull `error.message` out of a failed response body
///
/// Returns `None` for bodies that are not JSON or lack the field.
pub fn extract_error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope.error?.message.filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_turn_serializes_without_role() {
        let request = GenerateContentRequest::single_turn(vec![
            Part::text("Summarize this"),
            Part::inline("application/pdf", "JVBERi0="),
        ]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        { "text": "Summarize this" },
                        { "inline_data": { "mime_type": "application/pdf", "data": "JVBERi0=" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_conversation_serializes_roles() {
        let request = GenerateContentRequest::conversation(vec![
            (Role::User, "context".to_string()),
            (Role::Model, "ok".to_string()),
        ]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "ok");
    }

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Week 1" }, { "text": "ignored" }] } },
                { "content": { "parts": [{ "text": "second candidate" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("Week 1"));
    }

    #[test]
    fn test_missing_candidate_path_uses_fallback() {
        let bodies = [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{}] }),
            json!({ "candidates": [{ "content": {} }] }),
            json!({ "candidates": [{ "content": { "parts": [{}] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }),
        ];

        for body in bodies {
            let response: GenerateContentResponse = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(response.text_or("No plan generated."), "No plan generated.", "body: {body}");
        }
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            Some("API key not valid".to_string())
        );
        assert_eq!(extract_error_message(r#"{"error":{"code":500}}"#), None);
        assert_eq!(extract_error_message(r#"{"unexpected":true}"#), None);
        assert_eq!(extract_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_error_message(""), None);
    }
}
