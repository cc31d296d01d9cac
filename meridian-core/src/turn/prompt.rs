//! Turn request construction and character prompt rendering.
//!
//! Both halves are pure: the same dossier snapshot, question, history window,
//! and emotional state always produce the same request payload and the same
//! prompt text. Only discovered artifacts are ever included, and every empty
//! collection renders an explicit placeholder so an empty interrogation never
//! breaks templating.

use crate::dialogue::{DialogueEntry, DialogueLog, EmotionalState, Speaker};
use crate::dossier::{Associate, Dossier};
use serde::{Deserialize, Serialize};

/// How many transcript entries are carried into the prompt.
pub const HISTORY_WINDOW: usize = 5;

/// The passenger as presented to the generative service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub background: String,
    pub trust_level: i32,
    pub secrets: Vec<String>,
    /// Carried for prompt rendering only; not part of the wire body.
    #[serde(skip)]
    pub known_associates: Vec<Associate>,
}

/// A discovered artifact as presented to the generative service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredItem {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

/// One turn's request to the generative service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub passenger: PassengerProfile,
    pub question: String,
    pub discovered_items: Vec<DiscoveredItem>,
    pub dialogue_history: Vec<DialogueEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_state: Option<EmotionalState>,
}

/// Fixed system preamble sent with every turn.
pub fn system_preamble() -> &'static str {
    include_str!("prompts/interrogation.txt")
}

/// Compose the request payload for one turn.
///
/// The transcript is truncated to the last [`HISTORY_WINDOW`] entries and
/// hidden artifacts are omitted entirely. The question is carried as its own
/// field; callers append it to the transcript separately.
pub fn build_turn_request(
    dossier: &Dossier,
    question: &str,
    log: &DialogueLog,
    emotional_state: Option<&EmotionalState>,
) -> TurnRequest {
    TurnRequest {
        passenger: PassengerProfile {
            id: dossier.id.clone(),
            name: dossier.name.clone(),
            title: dossier.title.clone(),
            description: dossier.description.clone(),
            background: dossier.background.clone(),
            trust_level: dossier.trust_level,
            secrets: dossier.secrets.clone(),
            known_associates: dossier.known_associates.clone(),
        },
        question: question.to_string(),
        discovered_items: dossier
            .discovered_artifacts()
            .map(|artifact| DiscoveredItem {
                name: artifact.name.clone(),
                description: artifact.description.clone(),
                kind: artifact.kind.as_str().to_string(),
                content: artifact.content.clone().unwrap_or_default(),
            })
            .collect(),
        dialogue_history: log.recent(HISTORY_WINDOW).to_vec(),
        emotional_state: emotional_state.cloned(),
    }
}

/// Render the full character prompt for a turn request.
pub fn render_character_prompt(request: &TurnRequest) -> String {
    let passenger = &request.passenger;
    let mut prompt = String::new();

    prompt.push_str(
        "You are roleplaying as a passenger on the inspection train Meridian. You are currently \
         being interrogated by an inspector.\n\n",
    );

    prompt.push_str("Your character:\n");
    prompt.push_str(&format!("- **Name**: {}\n", passenger.name));
    prompt.push_str(&format!("- **Title**: {}\n", passenger.title));
    prompt.push_str(&format!("- **Description**: {}\n", passenger.description));
    prompt.push_str(&format!("- **Background**: {}\n", passenger.background));

    if passenger.secrets.is_empty() {
        prompt.push_str("- **Known secrets**: No known secrets\n");
    } else {
        prompt.push_str(&format!(
            "- **Known secrets**: {}\n",
            passenger.secrets.join(", ")
        ));
    }

    if passenger.known_associates.is_empty() {
        prompt.push_str("- **Known associates**: No known associates\n");
    } else {
        let associates: Vec<String> = passenger
            .known_associates
            .iter()
            .map(|a| format!("{} ({})", a.name, a.relationship))
            .collect();
        prompt.push_str(&format!("- **Known associates**: {}\n", associates.join(", ")));
    }

    prompt.push_str(&format!(
        "- **Trust Level with Inspector**: {} / 100\n",
        passenger.trust_level
    ));

    prompt.push_str("\nRecent events:\n- **Discovered Items**:\n");
    if request.discovered_items.is_empty() {
        prompt.push_str("  None\n");
    } else {
        for item in &request.discovered_items {
            prompt.push_str(&format!("  - {}: {}\n", item.name, item.description));
        }
    }

    prompt.push_str("- **Emotional State**:\n");
    match &request.emotional_state {
        Some(state) => {
            prompt.push_str(&format!("  - Mood: {}\n", state.mood.as_str()));
            prompt.push_str(&format!("  - Suspicion: {} / 100\n", state.suspicion));
            prompt.push_str(&format!("  - Stress: {} / 100\n", state.stress));
        }
        None => {
            prompt.push_str("  - Mood: Unknown\n  - Suspicion: N/A\n  - Stress: N/A\n");
        }
    }

    prompt.push_str("\nRecent dialogue:\n");
    if request.dialogue_history.is_empty() {
        prompt.push_str("No dialogue yet\n");
    } else {
        for entry in &request.dialogue_history {
            let speaker = match entry.speaker {
                Speaker::Inspector => "Inspector",
                Speaker::Character => passenger.name.as_str(),
            };
            prompt.push_str(&format!("{}: \"{}\"\n", speaker, entry.text));
        }
    }

    prompt.push_str(&format!(
        "\nInstruction:\nRespond **in character** as {}, using their voice and perspective. Your \
         tone and behavior should reflect your emotional state and current trust level.\n\n\
         You may:\n\
         - Reveal or withhold information based on trust.\n\
         - Be evasive, aggressive, or vulnerable depending on stress/suspicion.\n\
         - React to the inspector's question authentically.\n\n",
        passenger.name
    ));

    prompt.push_str(&format!(
        "**Current question from the Inspector**:\n\"{}\"\n\n",
        request.question
    ));

    prompt.push_str(
        "Respond with a single spoken reply as the character (no narration).\n\n\
         Your response must be a valid JSON object that strictly adheres to the following schema:\n",
    );
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push_str(
        "\nDo not mention or reference the JSON format, and never break character. When you refer \
         to other characters or reveal additional information, include those details in the \
         \"revelations\" section of your JSON output.\n",
    );

    prompt
}

/// Schema description embedded in every prompt.
const RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "response": { "type": "string" },
    "trustChange": { "type": "number", "minimum": -10, "maximum": 10 },
    "revelations": {
      "type": "object",
      "properties": {
        "newAssociates": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "name": { "type": "string" },
              "relationship": { "type": "string" },
              "details": { "type": "string" }
            },
            "required": ["name", "relationship", "details"]
          }
        },
        "biographyUpdates": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "section": { "type": "string", "enum": ["background", "description", "secrets"] },
              "content": { "type": "string" }
            },
            "required": ["section", "content"]
          }
        }
      }
    }
  },
  "required": ["response", "trustChange"]
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::{Artifact, ArtifactKind};

    fn sample_dossier() -> Dossier {
        Dossier::new("professor", "Dr. Alexander Volkov", "The Professor")
            .with_description("A disgraced academic.")
            .with_background("Former head of theoretical physics.")
            .with_trust_level(50)
            .with_secrets(vec!["The equations allow time travel".to_string()])
            .with_artifacts(vec![
                Artifact::new("badge", "Academy Badge", "A tarnished badge.", ArtifactKind::Object, 10),
                Artifact::new("papers", "Forbidden Equations", "Dense formulas.", ArtifactKind::Document, 10)
                    .with_content("Temporal displacement notes..."),
            ])
    }

    #[test]
    fn test_only_discovered_artifacts_included() {
        let mut dossier = sample_dossier();
        let log = DialogueLog::new();

        let request = build_turn_request(&dossier, "What is in the briefcase?", &log, None);
        assert!(request.discovered_items.is_empty());

        dossier.artifacts[1].discovered = true;
        let request = build_turn_request(&dossier, "What is in the briefcase?", &log, None);
        assert_eq!(request.discovered_items.len(), 1);
        assert_eq!(request.discovered_items[0].name, "Forbidden Equations");
        assert_eq!(request.discovered_items[0].kind, "document");
        assert_eq!(request.discovered_items[0].content, "Temporal displacement notes...");
    }

    #[test]
    fn test_history_truncated_to_window() {
        let dossier = sample_dossier();
        let mut log = DialogueLog::new();
        for i in 0..9 {
            log.push_inspector(format!("Question {i}"));
        }

        let request = build_turn_request(&dossier, "And now?", &log, None);
        assert_eq!(request.dialogue_history.len(), HISTORY_WINDOW);
        assert_eq!(request.dialogue_history[0].text, "Question 4");
    }

    #[test]
    fn test_wire_shape_matches_contract() {
        let mut dossier = sample_dossier();
        dossier.artifacts[0].discovered = true;
        let mut log = DialogueLog::new();
        log.push_inspector("Your papers, please.");

        let request = build_turn_request(&dossier, "Where are you headed?", &log, None);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["passenger"]["trustLevel"], 50);
        assert!(value["passenger"]["secrets"].is_array());
        // Associates are prompt-side context, not wire payload.
        assert!(value["passenger"].get("knownAssociates").is_none());
        assert_eq!(value["discoveredItems"][0]["type"], "object");
        assert_eq!(value["dialogueHistory"][0]["speaker"], "inspector");
        // Absent emotional state is omitted, not null.
        assert!(value.get("emotionalState").is_none());
    }

    #[test]
    fn test_empty_collections_render_placeholders() {
        let dossier = Dossier::new("stranger", "A Stranger", "The Stranger");
        let log = DialogueLog::new();

        let request = build_turn_request(&dossier, "Who are you?", &log, None);
        let prompt = render_character_prompt(&request);

        assert!(prompt.contains("No known secrets"));
        assert!(prompt.contains("No known associates"));
        assert!(prompt.contains("No dialogue yet"));
        assert!(prompt.contains("  None\n"));
        assert!(prompt.contains("Mood: Unknown"));
    }

    #[test]
    fn test_prompt_carries_question_and_history() {
        let dossier = sample_dossier();
        let mut log = DialogueLog::new();
        log.push_inspector("Your papers, please.");
        log.push_character("Of course, Inspector.");

        let state = EmotionalState::new(crate::dialogue::Mood::Nervous, 40, 70);
        let request = build_turn_request(&dossier, "What were you researching?", &log, Some(&state));
        let prompt = render_character_prompt(&request);

        assert!(prompt.contains("**Current question from the Inspector**:\n\"What were you researching?\""));
        assert!(prompt.contains("Inspector: \"Your papers, please.\""));
        assert!(prompt.contains("Dr. Alexander Volkov: \"Of course, Inspector.\""));
        assert!(prompt.contains("Mood: nervous"));
        assert!(prompt.contains("Suspicion: 40 / 100"));
        assert!(prompt.contains("\"trustChange\""));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let dossier = sample_dossier();
        let log = DialogueLog::new();

        let a = render_character_prompt(&build_turn_request(&dossier, "Why?", &log, None));
        let b = render_character_prompt(&build_turn_request(&dossier, "Why?", &log, None));
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_preamble_nonempty() {
        assert!(system_preamble().contains("Meridian"));
    }
}
