//! Completion retry engine
//!
//! Completion services cap the output length of a single call, so long fields
//! arrive in several truncated chunks. The client asks the model to finish with
//! [`END_MARKER`] and keeps feeding the accumulated text back as a continuation
//! until the marker (or an empty chunk) shows up.

use crate::error::GenerationError;
use crate::provider::{CompletionOptions, CompletionProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sentinel the model is asked to emit when it is done.
pub const END_MARKER: &str = "<end>";

/// Total provider calls allowed for one generation.
pub const MAX_ATTEMPTS: usize = 5;

/// Wrap a caller prompt with the end-marker instruction and continuation cue.
pub fn wrap_prompt(prompt: &str) -> String {
    format!(
        "{}. Finaliza con la cadena {}\n\ntexto:\n",
        prompt, END_MARKER
    )
}

/// Runs one prompt to completion against a [`CompletionProvider`].
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
    retry_delay: Duration,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            retry_delay: Duration::ZERO,
        }
    }

    /// Pause before retrying after a provider error. Continuations never wait.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    /// Generate text for `prompt`, stitching truncated chunks together.
    ///
    /// Fails only once all [`MAX_ATTEMPTS`] calls are spent without a terminal
    /// chunk; provider errors along the way are logged and retried.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, GenerationError> {
        let mut accumulated_prompt = wrap_prompt(prompt);
        let mut generated = String::new();
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let started = Instant::now();
            match self.provider.complete(&accumulated_prompt, options).await {
                Ok(chunk) => {
                    let finished = chunk.is_empty() || chunk.contains(END_MARKER);
                    accumulated_prompt.push_str(&chunk);
                    generated.push_str(&chunk);

                    if finished {
                        debug!(
                            provider = self.provider.provider_name(),
                            attempt,
                            chars = generated.len(),
                            duration_ms = started.elapsed().as_millis() as u64,
                            "Completion finished"
                        );
                        return Ok(generated.replace(END_MARKER, "").trim().to_string());
                    }

                    debug!(
                        provider = self.provider.provider_name(),
                        attempt,
                        chunk_chars = chunk.len(),
                        "Completion truncated, continuing"
                    );
                }
                Err(err) => {
                    warn!(
                        provider = self.provider.provider_name(),
                        attempt,
                        error = %err,
                        "Completion call failed"
                    );
                    last_error = Some(err.to_string());
                    if attempt < MAX_ATTEMPTS && !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(GenerationError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
            last_error,
        })
    }
}
