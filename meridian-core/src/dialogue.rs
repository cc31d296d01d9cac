//! Interrogation transcript and advisory emotional state.
//!
//! The transcript is append-only; prompt construction only ever reads the
//! most recent entries. Emotional state is context supplied by the caller —
//! nothing in this crate mutates it.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Inspector,
    Character,
}

/// One line of the interrogation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueEntry {
    pub speaker: Speaker,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Append-only transcript of one interrogation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueLog {
    entries: Vec<DialogueEntry>,
}

impl DialogueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a question from the inspector.
    pub fn push_inspector(&mut self, text: impl Into<String>) {
        self.push(Speaker::Inspector, text.into());
    }

    /// Record a reply from the character.
    pub fn push_character(&mut self, text: impl Into<String>) {
        self.push(Speaker::Character, text.into());
    }

    fn push(&mut self, speaker: Speaker, text: String) {
        self.entries.push(DialogueEntry {
            speaker,
            text,
            timestamp: now_millis(),
        });
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[DialogueEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[DialogueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the transcript, e.g. when the inspector moves to another passenger.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A character's current mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Nervous,
    Defensive,
    Cooperative,
    Hostile,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Nervous => "nervous",
            Mood::Defensive => "defensive",
            Mood::Cooperative => "cooperative",
            Mood::Hostile => "hostile",
            Mood::Neutral => "neutral",
        }
    }
}

/// Advisory context passed into prompt construction. Owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalState {
    pub mood: Mood,
    /// In [0, 100].
    pub suspicion: u8,
    /// In [0, 100].
    pub stress: u8,
}

impl EmotionalState {
    pub fn new(mood: Mood, suspicion: u8, stress: u8) -> Self {
        Self {
            mood,
            suspicion: suspicion.min(100),
            stress: stress.min(100),
        }
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self {
            mood: Mood::Neutral,
            suspicion: 0,
            stress: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_in_order() {
        let mut log = DialogueLog::new();
        log.push_inspector("Where were you last night?");
        log.push_character("In my compartment, of course.");

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].speaker, Speaker::Inspector);
        assert_eq!(log.entries()[1].speaker, Speaker::Character);
    }

    #[test]
    fn test_recent_window() {
        let mut log = DialogueLog::new();
        for i in 0..8 {
            log.push_inspector(format!("Question {i}"));
        }

        let recent = log.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].text, "Question 3");
        assert_eq!(recent[4].text, "Question 7");
    }

    #[test]
    fn test_recent_on_short_log() {
        let mut log = DialogueLog::new();
        log.push_inspector("Only one");

        assert_eq!(log.recent(5).len(), 1);
        assert!(DialogueLog::new().recent(5).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut log = DialogueLog::new();
        log.push_inspector("Anything to declare?");
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_emotional_state_clamps_to_scale() {
        let state = EmotionalState::new(Mood::Nervous, 250, 250);
        assert_eq!(state.suspicion, 100);
        assert_eq!(state.stress, 100);
    }

    #[test]
    fn test_speaker_wire_format() {
        let entry = DialogueEntry {
            speaker: Speaker::Inspector,
            text: "hm".to_string(),
            timestamp: 0,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["speaker"], "inspector");
    }
}
