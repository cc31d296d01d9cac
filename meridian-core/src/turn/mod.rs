//! The per-turn pipeline: prompt construction, the retrying service client,
//! response validation, fallback synthesis, and the dossier merger.

pub mod agent;
pub mod fallback;
pub mod merge;
pub mod prompt;
pub mod validate;

pub use agent::{backoff_delay, ChatTransport, Interrogator, TurnConfig, TurnError, TurnOutcome};
pub use fallback::{fallback_line, fallback_response, TurnFailure, FALLBACK_TRUST_PENALTY};
pub use merge::{merge, MergeOutcome};
pub use prompt::{build_turn_request, render_character_prompt, TurnRequest, HISTORY_WINDOW};
pub use validate::{
    validate_payload, validate_value, BiographyUpdate, Revelations, StructuredResponse,
    ValidateError, TRUST_CHANGE_MAX, TRUST_CHANGE_MIN,
};
