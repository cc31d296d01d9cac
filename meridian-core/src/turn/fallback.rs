//! Deterministic fallback responses.
//!
//! When every attempt at the generative service fails, the passenger still
//! speaks: a fixed in-character deflection line with a small trust penalty,
//! chosen first by what went wrong and then by how much the passenger
//! currently trusts the inspector. The game continues; a dead service is
//! never fatal to a session.

use crate::dossier::TrustTier;
use crate::roster::CharacterVoice;
use crate::turn::validate::{Revelations, StructuredResponse};

/// Trust penalty applied by every fallback response.
pub const FALLBACK_TRUST_PENALTY: i32 = -2;

const TECHNICAL_DIFFICULTY_LINE: &str =
    "I apologize, but there seems to be a technical issue with the communication system. \
     Please try again in a moment.";

const MALFORMED_REQUEST_LINE: &str =
    "I'm having trouble understanding your question. Could you rephrase that?";

/// Why a single turn attempt failed. All four kinds are retryable; the last
/// one observed decides the fallback line.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TurnFailure {
    /// Network or transport failure reaching the service.
    #[error("Request failed: {0}")]
    Request(String),

    /// Service reachable but returned a non-success status.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Response body was not well-formed structured data.
    #[error("Unparsable response: {0}")]
    Parse(String),

    /// Well-formed but missing required fields.
    #[error("Response failed validation: {0}")]
    Schema(String),
}

impl From<oracle::Error> for TurnFailure {
    fn from(error: oracle::Error) -> Self {
        match error {
            oracle::Error::Network(message) => TurnFailure::Request(message),
            oracle::Error::Api { status, message } => TurnFailure::Upstream { status, message },
            oracle::Error::Parse(message) => TurnFailure::Parse(message),
            oracle::Error::NoApiKey => TurnFailure::Request("API key not configured".to_string()),
            oracle::Error::Config(message) => TurnFailure::Request(message),
        }
    }
}

impl From<crate::turn::validate::ValidateError> for TurnFailure {
    fn from(error: crate::turn::validate::ValidateError) -> Self {
        use crate::turn::validate::ValidateError;
        match error {
            ValidateError::Parse(message) => TurnFailure::Parse(message),
            ValidateError::Schema(message) => TurnFailure::Schema(message),
        }
    }
}

/// The deflection line for a given voice, trust tier, and failure.
pub fn fallback_line<'a>(
    voice: &'a CharacterVoice,
    tier: TrustTier,
    failure: &TurnFailure,
) -> &'a str {
    match failure {
        // The service or the route to it is down: a distinct "technical
        // difficulty" line regardless of trust.
        TurnFailure::Request(_) => TECHNICAL_DIFFICULTY_LINE,
        TurnFailure::Upstream { status: 400, .. } => MALFORMED_REQUEST_LINE,
        TurnFailure::Upstream { .. } => TECHNICAL_DIFFICULTY_LINE,
        // The service answered but unusably: deflect in character.
        TurnFailure::Parse(_) | TurnFailure::Schema(_) => voice.fallback.for_tier(tier),
    }
}

/// Synthesize the full fallback response for a failed turn.
pub fn fallback_response(
    voice: &CharacterVoice,
    tier: TrustTier,
    failure: &TurnFailure,
) -> StructuredResponse {
    StructuredResponse {
        response: fallback_line(voice, tier, failure).to_string(),
        trust_change: FALLBACK_TRUST_PENALTY,
        revelations: Revelations::default(),
    }
}
