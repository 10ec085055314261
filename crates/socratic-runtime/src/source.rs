#![forbid(unsafe_code)]

//! Dialogue sources.
//!
//! A [`DialogueSource`] turns a validated prompt into a validated
//! [`Dialogue`]. Every source validates against the same [`DialogueLimits`],
//! so a malformed payload is rejected before anything reaches the
//! transcript.

use std::path::Path;

use socratic_core::{Dialogue, DialogueError, DialogueLimits, PromptRequest};
use web_time::Instant;

/// Produces dialogues for prompts.
pub trait DialogueSource {
    /// Generate and validate a dialogue.
    fn generate(
        &mut self,
        request: &PromptRequest,
        limits: &DialogueLimits,
    ) -> Result<Dialogue, DialogueError>;
}

/// Static JSON payload; ignores the prompt.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    json: String,
}

impl FixtureSource {
    /// Use an in-memory payload.
    #[must_use]
    pub fn from_json(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Read the payload from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DialogueError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(DialogueError::Io)?;
        Ok(Self { json })
    }
}

impl DialogueSource for FixtureSource {
    fn generate(
        &mut self,
        request: &PromptRequest,
        limits: &DialogueLimits,
    ) -> Result<Dialogue, DialogueError> {
        tracing::debug!(
            target: "socratic.source",
            prompt_chars = request.prompt.chars().count(),
            bytes = self.json.len(),
            "serving fixture dialogue"
        );
        Dialogue::from_json_str(&self.json, limits)
    }
}

/// `POST {endpoint}/api/dialogue` over blocking HTTP.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Build a client for `endpoint` (scheme + host, optional base path).
    pub fn new(endpoint: &str, timeout: core::time::Duration) -> Result<Self, DialogueError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout.min(core::time::Duration::from_secs(5)))
            .timeout(timeout)
            .build()
            .map_err(|err| DialogueError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            url: format!("{}/api/dialogue", endpoint.trim_end_matches('/')),
        })
    }

    /// Full request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http")]
impl DialogueSource for HttpSource {
    fn generate(
        &mut self,
        request: &PromptRequest,
        limits: &DialogueLimits,
    ) -> Result<Dialogue, DialogueError> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|err| DialogueError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| DialogueError::Transport(err.to_string()))?;
        tracing::debug!(
            target: "socratic.source",
            url = %self.url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dialogue response"
        );
        if !status.is_success() {
            return Err(DialogueError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Dialogue::from_json_str(&body, limits)
    }
}

/// Validate `prompt`, ask `source`, and log the outcome.
pub fn generate_dialogue<S: DialogueSource + ?Sized>(
    source: &mut S,
    prompt: &str,
    limits: &DialogueLimits,
) -> Result<Dialogue, DialogueError> {
    let started = Instant::now();
    let request = PromptRequest::new(prompt, limits)?;
    let result = source.generate(&request, limits);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(dialogue) => tracing::info!(
            target: "socratic.source",
            turns = dialogue.turns.len(),
            elapsed_ms,
            "dialogue generated"
        ),
        Err(err) => tracing::warn!(
            target: "socratic.source",
            kind = err.kind(),
            error = %err,
            elapsed_ms,
            "dialogue generation failed"
        ),
    }
    result
}
