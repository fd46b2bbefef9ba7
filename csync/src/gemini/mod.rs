//! Gemini generative-language client
//!
//! Request shaping for `generateContent`, plus the retrying request client
//! every call goes through.

pub mod client;
mod error;
pub mod retry;
pub mod transport;
mod types;

pub use client::{GeminiClient, GenerativeClient};
pub use error::{GeminiError, TIMEOUT_MESSAGE, UPSTREAM_FALLBACK_MESSAGE};
pub use retry::{Pause, ResilientClient, RetryPolicy, TokioPause};
pub use transport::{HttpRequest, HttpTransport, RawResponse, Transport};
pub use types::{
    Candidate, CandidateContent, CandidatePart, Content, GenerateContentRequest, GenerateContentResponse, InlineData,
    Part, Role, extract_error_message,
};
