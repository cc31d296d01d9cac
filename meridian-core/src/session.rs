//! InterrogationSession - the primary public API for playing Meridian.
//!
//! A session owns one passenger's dossier, the transcript, and the advisory
//! emotional state, and wraps the turn driver behind a small interface:
//! `ask` for dialogue turns, `inspect` for evidence rolls. Turns are
//! serialized by `&mut self` — while one `ask` is pending there is no way to
//! start another against the same dossier, which is exactly the one
//! in-flight-call contract the engine requires. State lives only for the
//! lifetime of the session; `reset` returns the passenger to seed values.

use crate::dialogue::{DialogueEntry, DialogueLog, EmotionalState};
use crate::discovery;
use crate::dossier::Dossier;
use crate::roster::{Roster, RosterError};
use crate::turn::{ChatTransport, Interrogator, TurnConfig, TurnError, TurnOutcome};
use oracle::Oracle;

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),
}

/// Configuration for creating a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Which passenger to interrogate first.
    pub passenger_id: String,

    /// Model override for the generative service.
    pub model: Option<String>,

    /// Maximum tokens per character reply.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl SessionConfig {
    /// Create a session config for the given passenger.
    pub fn new(passenger_id: impl Into<String>) -> Self {
        Self {
            passenger_id: passenger_id.into(),
            model: None,
            max_tokens: 500,
            temperature: Some(0.9),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn turn_config(&self) -> TurnConfig {
        TurnConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            ..TurnConfig::default()
        }
    }
}

/// One inspector's interrogation of one passenger at a time.
pub struct InterrogationSession<T: ChatTransport = Oracle> {
    interrogator: Interrogator<T>,
    roster: Roster,
    dossier: Dossier,
    log: DialogueLog,
    emotional_state: Option<EmotionalState>,
}

impl InterrogationSession<Oracle> {
    /// Create a session against the standard roster.
    ///
    /// Requires `OPENAI_API_KEY` to be set in the environment.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let interrogator = Interrogator::from_env()?.with_config(config.turn_config());
        Self::assemble(interrogator, Roster::standard(), &config.passenger_id)
    }
}

impl<T: ChatTransport> InterrogationSession<T> {
    /// Create a session over a custom transport and roster.
    pub fn with_transport(
        transport: T,
        roster: Roster,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let interrogator = Interrogator::with_transport(transport).with_config(config.turn_config());
        Self::assemble(interrogator, roster, &config.passenger_id)
    }

    fn assemble(
        interrogator: Interrogator<T>,
        roster: Roster,
        passenger_id: &str,
    ) -> Result<Self, SessionError> {
        let dossier = roster.seed(passenger_id)?;
        Ok(Self {
            interrogator,
            roster,
            dossier,
            log: DialogueLog::new(),
            emotional_state: None,
        })
    }

    /// The passenger's opening line.
    pub fn greeting(&self) -> &str {
        // The roster was validated against the seeds at construction.
        self.roster
            .voice(&self.dossier.id)
            .map(|voice| voice.greeting.as_str())
            .unwrap_or_default()
    }

    /// Ask the current passenger a question.
    pub async fn ask(&mut self, question: &str) -> Result<TurnOutcome, SessionError> {
        let voice = self.roster.voice(&self.dossier.id)?;
        let outcome = self
            .interrogator
            .ask(
                &mut self.dossier,
                voice,
                question,
                &mut self.log,
                self.emotional_state.as_ref(),
            )
            .await?;
        Ok(outcome)
    }

    /// Search the passenger's belongings. Returns ids of newly discovered
    /// artifacts.
    pub fn inspect(&mut self) -> Vec<String> {
        discovery::inspect(&mut self.dossier)
    }

    /// Switch to another passenger, dropping the transcript. The previous
    /// passenger's dossier is discarded.
    pub fn select_passenger(&mut self, passenger_id: &str) -> Result<(), SessionError> {
        self.dossier = self.roster.seed(passenger_id)?;
        self.log.clear();
        Ok(())
    }

    /// Restore the current passenger to seed values and clear the transcript.
    pub fn reset(&mut self) {
        if let Ok(seed) = self.roster.seed(&self.dossier.id) {
            self.dossier = seed;
        }
        self.log.clear();
    }

    /// Set or clear the advisory emotional state for upcoming turns.
    pub fn set_emotional_state(&mut self, state: Option<EmotionalState>) {
        self.emotional_state = state;
    }

    /// The current passenger's dossier.
    pub fn dossier(&self) -> &Dossier {
        &self.dossier
    }

    /// The interrogation transcript so far.
    pub fn transcript(&self) -> &[DialogueEntry] {
        self.log.entries()
    }

    /// The roster this session draws passengers from.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The turn driver.
    pub fn interrogator(&self) -> &Interrogator<T> {
        &self.interrogator
    }

    /// Mutable access to the turn driver, e.g. to retune its retry clock.
    pub fn interrogator_mut(&mut self) -> &mut Interrogator<T> {
        &mut self.interrogator
    }
}
