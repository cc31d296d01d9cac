//! Testing utilities for the interrogation engine.
//!
//! This module provides tools for integration testing:
//! - `ScriptedOracle` — a deterministic transport with scripted replies and
//!   failures, so the real retry/validate/merge pipeline runs without a
//!   network
//! - `TestHarness` — a session over a scripted transport with a fast retry
//!   clock
//! - Assertion helpers for verifying dossier state

use crate::roster::Roster;
use crate::session::{InterrogationSession, SessionConfig, SessionError};
use crate::turn::{ChatTransport, TurnOutcome};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted transport result.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A completion whose content is the given payload string.
    Payload(String),

    /// A network-level failure.
    NetworkError(String),

    /// A non-success HTTP status from the service.
    Status(u16, String),
}

impl ScriptedReply {
    /// A well-formed payload with the given reply text and trust change.
    pub fn speech(text: &str, trust_change: i32) -> Self {
        ScriptedReply::Payload(
            serde_json::json!({ "response": text, "trustChange": trust_change }).to_string(),
        )
    }
}

#[derive(Default)]
struct ScriptedInner {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: AtomicUsize,
}

/// A transport that replays scripted results in order.
///
/// Clones share the same script, so a harness can keep queueing replies
/// after the session takes ownership of its copy. When the script runs dry
/// it returns a neutral valid reply, mirroring how a scripted DM falls back
/// to a stock line.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    inner: Arc<ScriptedInner>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next transport result.
    pub fn queue(&self, reply: ScriptedReply) {
        self.inner.replies.lock().unwrap().push_back(reply);
    }

    /// How many transport calls have been made.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for ScriptedOracle {
    async fn complete(
        &self,
        _request: oracle::Request,
    ) -> Result<oracle::Completion, oracle::Error> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.inner.replies.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedReply::Payload(content)) => Ok(oracle::Completion {
                id: "scripted".to_string(),
                model: "scripted".to_string(),
                content,
                usage: None,
            }),
            Some(ScriptedReply::NetworkError(message)) => Err(oracle::Error::Network(message)),
            Some(ScriptedReply::Status(status, message)) => {
                Err(oracle::Error::Api { status, message })
            }
            None => Ok(oracle::Completion {
                id: "scripted".to_string(),
                model: "scripted".to_string(),
                content: serde_json::json!({
                    "response": "The passenger has nothing more to say.",
                    "trustChange": 0
                })
                .to_string(),
                usage: None,
            }),
        }
    }
}

/// Test harness for running scripted interrogations.
pub struct TestHarness {
    /// Handle to the script shared with the session's transport.
    pub oracle: ScriptedOracle,
    /// The session under test.
    pub session: InterrogationSession<ScriptedOracle>,
}

impl TestHarness {
    /// Create a harness interrogating the professor, with a millisecond
    /// retry clock so failure paths run fast.
    pub fn new() -> Self {
        Self::for_passenger("professor")
    }

    /// Create a harness for a specific standard passenger.
    pub fn for_passenger(passenger_id: &str) -> Self {
        let oracle = ScriptedOracle::new();
        let mut session = InterrogationSession::with_transport(
            oracle.clone(),
            Roster::standard(),
            SessionConfig::new(passenger_id),
        )
        .expect("standard roster contains the passenger");

        // Millisecond retry clock so failure-path tests run fast.
        session.interrogator_mut().config_mut().base_delay = Duration::from_millis(1);

        Self { oracle, session }
    }

    /// Queue a plain reply with a trust change.
    pub fn expect_speech(&mut self, text: &str, trust_change: i32) -> &mut Self {
        self.oracle.queue(ScriptedReply::speech(text, trust_change));
        self
    }

    /// Queue a raw payload string.
    pub fn expect_payload(&mut self, payload: &str) -> &mut Self {
        self.oracle.queue(ScriptedReply::Payload(payload.to_string()));
        self
    }

    /// Queue a transport failure.
    pub fn expect_failure(&mut self, reply: ScriptedReply) -> &mut Self {
        self.oracle.queue(reply);
        self
    }

    /// Ask the current passenger a question.
    pub async fn ask(&mut self, question: &str) -> Result<TurnOutcome, SessionError> {
        self.session.ask(question).await
    }

    /// Current trust level.
    pub fn trust(&self) -> i32 {
        self.session.dossier().trust_level
    }

    /// Whether an associate with this exact name is known.
    pub fn has_associate(&self, name: &str) -> bool {
        self.session
            .dossier()
            .known_associates
            .iter()
            .any(|a| a.name == name)
    }

    /// Number of known secrets.
    pub fn secret_count(&self) -> usize {
        self.session.dossier().secrets.len()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the dossier's trust level.
#[track_caller]
pub fn assert_trust(harness: &TestHarness, expected: i32) {
    let actual = harness.trust();
    assert_eq!(actual, expected, "Expected trust {expected}, got {actual}");
}

/// Assert an associate with the given name is known.
#[track_caller]
pub fn assert_has_associate(harness: &TestHarness, name: &str) {
    assert!(
        harness.has_associate(name),
        "Expected associate '{name}' in the dossier"
    );
}

/// Assert no associate with the given name is known.
#[track_caller]
pub fn assert_no_associate(harness: &TestHarness, name: &str) {
    assert!(
        !harness.has_associate(name),
        "Expected associate '{name}' to NOT be in the dossier"
    );
}

/// Assert the number of known secrets.
#[track_caller]
pub fn assert_secret_count(harness: &TestHarness, expected: usize) {
    let actual = harness.secret_count();
    assert_eq!(actual, expected, "Expected {expected} secrets, got {actual}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mut harness = TestHarness::new();
        harness
            .expect_speech("First answer.", 1)
            .expect_speech("Second answer.", 2);

        assert_eq!(harness.ask("One?").await.unwrap().reply, "First answer.");
        assert_eq!(harness.ask("Two?").await.unwrap().reply, "Second answer.");
    }

    #[tokio::test]
    async fn test_exhausted_script_returns_neutral_reply() {
        let mut harness = TestHarness::new();
        let outcome = harness.ask("Anything left?").await.unwrap();

        assert!(outcome.reply.contains("nothing more to say"));
        assert_eq!(outcome.trust_change, 0);
    }

    #[tokio::test]
    async fn test_call_counting() {
        let mut harness = TestHarness::new();
        harness.expect_speech("Yes?", 0);
        harness.ask("Hello?").await.unwrap();
        assert_eq!(harness.oracle.calls(), 1);
    }
}
