//! The turn driver.
//!
//! [`Interrogator::ask`] executes one externally observable turn attempt:
//! compose the prompt, call the generative service with bounded retries, and
//! reconcile whatever comes back — validated response or synthesized
//! fallback — into the dossier and transcript. Callers never see a raw
//! service error from a turn; the only error they can receive is a rejected
//! question that never reached the service.
//!
//! The retry loop is an explicit loop over [`Result`]s. Failures are
//! classified into [`TurnFailure`], each failed attempt is followed by a
//! linearly growing delay, and after the final failure the passenger answers
//! with a deterministic in-character deflection.

use crate::dialogue::{DialogueLog, EmotionalState};
use crate::dossier::Dossier;
use crate::roster::CharacterVoice;
use crate::turn::fallback::{fallback_response, TurnFailure};
use crate::turn::merge::merge;
use crate::turn::prompt::{build_turn_request, render_character_prompt, system_preamble};
use crate::turn::validate::{validate_payload, StructuredResponse};
use async_trait::async_trait;
use oracle::Oracle;
use std::time::Duration;

/// Errors surfaced to the caller. Everything retryable stays inside the
/// turn driver.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Question must be a non-empty string")]
    EmptyQuestion,

    #[error("No API key configured - set OPENAI_API_KEY environment variable")]
    NoApiKey,
}

/// Transport seam between the turn driver and the generative service.
///
/// Production uses [`Oracle`]; tests script this with
/// [`crate::testing::ScriptedOracle`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: oracle::Request) -> Result<oracle::Completion, oracle::Error>;
}

#[async_trait]
impl ChatTransport for Oracle {
    async fn complete(&self, request: oracle::Request) -> Result<oracle::Completion, oracle::Error> {
        Oracle::complete(self, request).await
    }
}

/// Configuration for turn execution.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Model override; the transport's default when `None`.
    pub model: Option<String>,

    /// Maximum tokens for the character's reply.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Total attempts per turn, including the first.
    pub max_attempts: u32,

    /// Base backoff unit; the delay after failed attempt `k` is
    /// `base_delay * k`.
    pub base_delay: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 500,
            temperature: Some(0.9),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// The delay inserted after the `failed_attempts`-th failure.
pub fn backoff_delay(base: Duration, failed_attempts: u32) -> Duration {
    base * failed_attempts
}

/// Outcome of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// What the character said.
    pub reply: String,

    /// The clamped trust delta that was applied.
    pub trust_change: i32,

    /// Trust level after the merge.
    pub trust_level: i32,

    /// Associates newly learned this turn.
    pub new_associates: Vec<String>,

    /// Set when the reply is a synthesized deflection rather than a service
    /// response; carries the failure that exhausted the retries.
    pub fallback: Option<TurnFailure>,
}

/// Drives turns against the generative service.
pub struct Interrogator<T = Oracle> {
    transport: T,
    config: TurnConfig,
}

impl Interrogator<Oracle> {
    /// Create an interrogator with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            transport: Oracle::new(api_key),
            config: TurnConfig::default(),
        }
    }

    /// Create an interrogator from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, TurnError> {
        let transport = Oracle::from_env().map_err(|_| TurnError::NoApiKey)?;
        Ok(Self {
            transport,
            config: TurnConfig::default(),
        })
    }
}

impl<T: ChatTransport> Interrogator<T> {
    /// Create an interrogator over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            config: TurnConfig::default(),
        }
    }

    /// Configure the interrogator.
    pub fn with_config(mut self, config: TurnConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    /// Mutable access to the turn configuration.
    pub fn config_mut(&mut self) -> &mut TurnConfig {
        &mut self.config
    }

    /// Ask the passenger one question and reconcile the answer.
    ///
    /// Mutates the dossier (via the merger) and appends both sides of the
    /// exchange to the transcript. At most one call per dossier may be in
    /// flight; the `&mut Dossier` borrow enforces that for safe callers.
    pub async fn ask(
        &self,
        dossier: &mut Dossier,
        voice: &CharacterVoice,
        question: &str,
        log: &mut DialogueLog,
        emotional_state: Option<&EmotionalState>,
    ) -> Result<TurnOutcome, TurnError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TurnError::EmptyQuestion);
        }

        let request = build_turn_request(dossier, question, log, emotional_state);
        let prompt = render_character_prompt(&request);
        log.push_inspector(question);

        let (validated, fallback) = match self.attempt_loop(&prompt).await {
            Ok(validated) => (validated, None),
            Err(failure) => {
                tracing::error!(passenger = %dossier.id, error = %failure, "all attempts failed, falling back");
                let synthesized = fallback_response(voice, dossier.trust_tier(), &failure);
                (synthesized, Some(failure))
            }
        };

        let outcome = merge(dossier, &validated);
        log.push_character(&validated.response);

        Ok(TurnOutcome {
            reply: validated.response,
            trust_change: validated.trust_change,
            trust_level: outcome.trust_after,
            new_associates: outcome.added_associates,
            fallback,
        })
    }

    /// Run the bounded attempt loop, returning the last failure if every
    /// attempt is spent.
    async fn attempt_loop(&self, prompt: &str) -> Result<StructuredResponse, TurnFailure> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_failure = TurnFailure::Request("no attempts were made".to_string());

        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, max_attempts, "sending turn attempt");

            match self.attempt(prompt).await {
                Ok(validated) => return Ok(validated),
                Err(failure) => {
                    tracing::warn!(attempt, error = %failure, "turn attempt failed");
                    last_failure = failure;
                    if attempt < max_attempts {
                        tokio::time::sleep(backoff_delay(self.config.base_delay, attempt)).await;
                    }
                }
            }
        }

        Err(last_failure)
    }

    async fn attempt(&self, prompt: &str) -> Result<StructuredResponse, TurnFailure> {
        let mut request = oracle::Request::new(prompt)
            .with_system(system_preamble())
            .with_max_tokens(self.config.max_tokens)
            .with_json_mode();

        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let completion = self.transport.complete(request).await?;
        Ok(validate_payload(&completion.content)?)
    }
}
