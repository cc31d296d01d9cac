//! Dialogue-response reconciliation engine for Meridian, an interrogation
//! game aboard an inspection train.
//!
//! This crate provides:
//! - Passenger dossiers with bounded trust, append-only secrets, and
//!   deduplicated associates
//! - Prompt construction for the generative service that voices passengers
//! - A retrying turn driver that always produces an in-character reply,
//!   falling back to deterministic deflection lines when the service fails
//! - Evidence discovery rolls over hidden artifacts
//!
//! # Quick Start
//!
//! ```ignore
//! use meridian_core::{InterrogationSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = InterrogationSession::new(SessionConfig::new("professor"))?;
//!
//!     println!("{}", session.greeting());
//!
//!     let outcome = session.ask("What were you researching at the Academy?").await?;
//!     println!("{}", outcome.reply);
//!
//!     for id in session.inspect() {
//!         println!("Discovered: {id}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod dialogue;
pub mod discovery;
pub mod dossier;
pub mod roster;
pub mod session;
pub mod testing;
pub mod turn;

// Primary public API
pub use dialogue::{DialogueEntry, DialogueLog, EmotionalState, Mood, Speaker};
pub use dossier::{Artifact, ArtifactKind, Associate, Dossier, TrustTier};
pub use roster::{CharacterVoice, Roster, RosterError};
pub use session::{InterrogationSession, SessionConfig, SessionError};
pub use turn::{
    Interrogator, StructuredResponse, TurnConfig, TurnError, TurnFailure, TurnOutcome,
};
