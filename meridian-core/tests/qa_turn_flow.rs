//! QA tests for the full turn pipeline over a scripted transport.
//!
//! These run the real prompt/retry/validate/merge path end to end with no
//! network: scripted payloads and failures go in, dossier state comes out.

use meridian_core::testing::{
    assert_has_associate, assert_no_associate, assert_secret_count, assert_trust, ScriptedReply,
    TestHarness,
};
use meridian_core::{SessionError, TurnError, TurnFailure};

// =============================================================================
// MERGE SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_positive_trust_change_applies() {
    let mut harness = TestHarness::new();
    assert_trust(&harness, 50);

    harness.expect_speech("Temporal mechanics, nothing more.", 5);
    let outcome = harness.ask("What were you researching?").await.unwrap();

    assert_eq!(outcome.trust_change, 5);
    assert_eq!(outcome.trust_level, 55);
    assert_trust(&harness, 55);
}

#[tokio::test]
async fn test_out_of_range_trust_change_clamped_before_merge() {
    let mut harness = TestHarness::new();

    harness.expect_payload(r#"{"response": "You have my complete confidence.", "trustChange": 20}"#);
    let outcome = harness.ask("Can I trust you?").await.unwrap();

    // +20 clamps to +10 before it is added.
    assert_eq!(outcome.trust_change, 10);
    assert_trust(&harness, 60);
}

#[tokio::test]
async fn test_duplicate_associate_across_turns() {
    let mut harness = TestHarness::new();
    let revelation = r#"{
        "response": "Kovacs can vouch for me.",
        "trustChange": 0,
        "revelations": {
            "newAssociates": [{"name": "Kovacs", "relationship": "ally", "details": "An old friend."}]
        }
    }"#;

    harness.expect_payload(revelation);
    let outcome = harness.ask("Who can vouch for you?").await.unwrap();
    assert_eq!(outcome.new_associates, vec!["Kovacs"]);

    harness.expect_payload(revelation);
    let outcome = harness.ask("Tell me about Kovacs again.").await.unwrap();
    assert!(outcome.new_associates.is_empty());

    assert_has_associate(&harness, "Kovacs");
    assert_eq!(harness.session.dossier().known_associates.len(), 1);
}

#[tokio::test]
async fn test_revelations_update_biography_and_secrets() {
    let mut harness = TestHarness::new();
    let seeded_secrets = harness.secret_count();

    harness.expect_payload(
        r#"{
            "response": "Very well. The briefcase has a false bottom.",
            "trustChange": -3,
            "revelations": {
                "biographyUpdates": [
                    {"section": "secrets", "content": "The briefcase has a false bottom."},
                    {"section": "background", "content": "He was seen boarding at a closed station."},
                    {"section": "motive", "content": "This section does not exist."}
                ]
            }
        }"#,
    );
    harness.ask("Open the briefcase.").await.unwrap();

    assert_secret_count(&harness, seeded_secrets + 1);
    assert!(harness
        .session
        .dossier()
        .background
        .contains("closed station"));
    assert_trust(&harness, 47);
}

// =============================================================================
// RESILIENCE
// =============================================================================

#[tokio::test]
async fn test_three_failures_synthesize_fallback() {
    let mut harness = TestHarness::new();
    for _ in 0..3 {
        harness.expect_failure(ScriptedReply::NetworkError("connection refused".to_string()));
    }

    let outcome = harness.ask("Is anyone there?").await.unwrap();

    assert!(matches!(outcome.fallback, Some(TurnFailure::Request(_))));
    assert_eq!(outcome.trust_change, -2);
    assert!(!outcome.reply.is_empty());
    assert_trust(&harness, 48);
    // All three attempts were spent; no fourth was made.
    assert_eq!(harness.oracle.calls(), 3);
}

#[tokio::test]
async fn test_no_fourth_attempt_after_exhaustion() {
    let mut harness = TestHarness::new();
    for _ in 0..3 {
        harness.expect_failure(ScriptedReply::Status(500, "upstream exploded".to_string()));
    }
    // A valid reply sits behind the failures; it must never be consumed.
    harness.expect_speech("Too late for this.", 5);

    let outcome = harness.ask("Hello?").await.unwrap();

    assert!(outcome.fallback.is_some());
    assert_eq!(harness.oracle.calls(), 3);

    // The stranded reply is consumed by the next turn instead.
    let outcome = harness.ask("And now?").await.unwrap();
    assert_eq!(outcome.reply, "Too late for this.");
}

#[tokio::test]
async fn test_validation_failure_counts_as_attempt_and_retries() {
    let mut harness = TestHarness::new();
    harness.expect_payload("this is not json at all");
    harness.expect_payload(r#"{"trustChange": 2}"#);
    harness.expect_speech("Third time lucky, Inspector.", 2);

    let outcome = harness.ask("State your business.").await.unwrap();

    assert!(outcome.fallback.is_none());
    assert_eq!(outcome.reply, "Third time lucky, Inspector.");
    assert_eq!(harness.oracle.calls(), 3);
}

#[tokio::test]
async fn test_fallback_line_reflects_failure_category() {
    // Transport failures produce the technical-difficulty line.
    let mut harness = TestHarness::new();
    for _ in 0..3 {
        harness.expect_failure(ScriptedReply::NetworkError("dns".to_string()));
    }
    let outcome = harness.ask("Hello?").await.unwrap();
    assert!(outcome.reply.contains("technical issue"));

    // A 400 from the service produces the rephrase line.
    let mut harness = TestHarness::new();
    for _ in 0..3 {
        harness.expect_failure(ScriptedReply::Status(400, "bad request".to_string()));
    }
    let outcome = harness.ask("Hello?").await.unwrap();
    assert!(outcome.reply.contains("rephrase"));
}

#[tokio::test]
async fn test_fallback_deflection_uses_trust_tier() {
    let mut harness = TestHarness::new();

    // Drive trust from 50 into the guarded tier.
    for _ in 0..3 {
        harness.expect_speech("Leave me alone.", -10);
        harness.ask("Talk.").await.unwrap();
    }
    assert_trust(&harness, 20);

    // Unusable payloads deflect in character rather than citing technology.
    for _ in 0..3 {
        harness.expect_payload("garbled nonsense");
    }
    let outcome = harness.ask("Last chance.").await.unwrap();

    assert!(matches!(outcome.fallback, Some(TurnFailure::Parse(_))));
    assert_eq!(
        outcome.reply,
        "I have nothing further to say on that subject, Inspector."
    );
    assert_trust(&harness, 18);
}

// =============================================================================
// CALLER VALIDATION
// =============================================================================

#[tokio::test]
async fn test_empty_question_rejected_before_service() {
    let mut harness = TestHarness::new();

    let err = harness.ask("   ").await.unwrap_err();
    assert!(matches!(err, SessionError::Turn(TurnError::EmptyQuestion)));

    // Nothing reached the transport and nothing was recorded.
    assert_eq!(harness.oracle.calls(), 0);
    assert!(harness.session.transcript().is_empty());
    assert_trust(&harness, 50);
}

// =============================================================================
// STATE PROPERTIES ACROSS TURNS
// =============================================================================

#[tokio::test]
async fn test_trust_bounded_across_any_turn_sequence() {
    let mut harness = TestHarness::new();

    for delta in [10, 10, 10, 10, 10, 10, -10, -10, 7, -10, -10, -10, -10, -10, -10, 3] {
        harness.expect_speech("Noted.", delta);
        let outcome = harness.ask("Go on.").await.unwrap();
        assert!(
            (0..=100).contains(&outcome.trust_level),
            "trust escaped bounds: {}",
            outcome.trust_level
        );
    }
}

#[tokio::test]
async fn test_secret_count_never_decreases() {
    let mut harness = TestHarness::new();
    let mut previous = harness.secret_count();

    for i in 0..5 {
        if i % 2 == 0 {
            harness.expect_payload(
                r#"{
                    "response": "There is more.",
                    "trustChange": 0,
                    "revelations": {"biographyUpdates": [{"section": "secrets", "content": "Another layer."}]}
                }"#,
            );
        } else {
            harness.expect_speech("Nothing else.", 0);
        }

        harness.ask("What else?").await.unwrap();
        assert!(harness.secret_count() >= previous);
        previous = harness.secret_count();
    }
}

#[tokio::test]
async fn test_transcript_records_both_sides() {
    let mut harness = TestHarness::new();
    harness.expect_speech("In my compartment.", 0);
    harness.ask("Where were you at midnight?").await.unwrap();

    let transcript = harness.session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].text, "Where were you at midnight?");
    assert_eq!(transcript[1].text, "In my compartment.");
}

#[tokio::test]
async fn test_switching_passenger_resets_transcript_and_dossier() {
    let mut harness = TestHarness::new();
    harness.expect_speech("Hmph.", -5);
    harness.ask("Papers.").await.unwrap();
    assert_trust(&harness, 45);

    harness.session.select_passenger("widow").unwrap();
    assert_eq!(harness.session.dossier().id, "widow");
    assert_trust(&harness, 50);
    assert!(harness.session.transcript().is_empty());
    assert_no_associate(&harness, "Kovacs");
}

#[tokio::test]
async fn test_reset_restores_seed_values() {
    let mut harness = TestHarness::new();
    harness.expect_payload(
        r#"{
            "response": "Fine. Kovacs sent me.",
            "trustChange": -8,
            "revelations": {"newAssociates": [{"name": "Kovacs", "relationship": "handler", "details": ""}]}
        }"#,
    );
    harness.ask("Who sent you?").await.unwrap();
    assert_trust(&harness, 42);
    assert_has_associate(&harness, "Kovacs");

    harness.session.reset();
    assert_trust(&harness, 50);
    assert_no_associate(&harness, "Kovacs");
    assert!(harness.session.transcript().is_empty());
}

#[tokio::test]
async fn test_discovery_feeds_next_prompt_request() {
    let mut harness = TestHarness::new();

    // Force every artifact into view: seeds use chance 10, so roll until
    // found. The roller is monotonic, so looping is safe.
    let total = harness.session.dossier().artifacts.len();
    let mut found = harness
        .session
        .dossier()
        .artifacts
        .iter()
        .filter(|a| a.discovered)
        .count();
    for _ in 0..2000 {
        found += harness.session.inspect().len();
        if found == total {
            break;
        }
    }
    assert_eq!(found, total, "expected all artifacts to surface eventually");

    // Discovery alone never moves trust.
    assert_trust(&harness, 50);

    // Found artifacts now ride along in the next turn's request.
    let request = meridian_core::turn::build_turn_request(
        harness.session.dossier(),
        "Explain these.",
        &meridian_core::DialogueLog::new(),
        None,
    );
    assert_eq!(request.discovered_items.len(), total);
}

#[tokio::test]
async fn test_greeting_comes_from_voice_table() {
    let harness = TestHarness::for_passenger("mechanic");
    assert!(harness.session.greeting().starts_with("Just doing my job"));
}
