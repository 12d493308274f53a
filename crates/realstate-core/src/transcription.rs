//! Voice-note transcription using the Groq Whisper API.
//!
//! The endpoint is OpenAI-compatible: a multipart upload of the audio file
//! returning `{"text": "..."}`. Every failure is logged and reported as
//! `None` so the caller can fall through to its guidance reply.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Groq transcription endpoint.
pub const GROQ_TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

/// Whisper model used for voice notes.
pub const TRANSCRIPTION_MODEL: &str = "whisper-large-v3-turbo";

/// Spoken language of incoming audio.
pub const TRANSCRIPTION_LANGUAGE: &str = "es";

/// Errors that can occur during transcription.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The audio file could not be read.
    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    /// The request did not complete.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a transcription.
    #[error("failed to parse response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Converts a local audio file into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the file at `audio_path`, or `None` if unavailable.
    async fn transcribe(&self, audio_path: &Path) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Speech-to-text client for Groq's Whisper deployment.
#[derive(Clone)]
pub struct GroqTranscriber {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GroqTranscriber {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: GROQ_TRANSCRIPTION_URL.to_string(),
        }
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        let bytes = tokio::fs::read(audio_path).await?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.ogg")
            .to_string();

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", TRANSCRIPTION_LANGUAGE)
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse =
            response.json().await.map_err(TranscriptionError::Decode)?;

        Ok(parsed.text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for GroqTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Option<String> {
        match self.request(audio_path).await {
            Ok(text) if text.is_empty() => {
                debug!(path = %audio_path.display(), "Transcription returned no text");
                None
            }
            Ok(text) => {
                debug!(chars = text.len(), "Voice note transcribed");
                Some(text)
            }
            Err(e) => {
                warn!(path = %audio_path.display(), error = %e, "Transcription failed");
                None
            }
        }
    }
}
