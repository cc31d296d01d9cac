//! The passenger roster: seed dossiers and character voices.
//!
//! A [`Roster`] pairs every seed [`Dossier`] with a [`CharacterVoice`] — the
//! greeting used when an interrogation opens and the in-character deflection
//! lines used when the generative service cannot be reached. The pairing is
//! validated at construction so an unknown or voiceless passenger id fails
//! fast instead of silently falling through to a default.

use crate::dossier::{Artifact, ArtifactKind, Dossier, TrustTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors raised while assembling or querying a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("No voice registered for passenger '{0}'")]
    MissingVoice(String),

    #[error("Voice registered for unknown passenger '{0}'")]
    OrphanVoice(String),

    #[error("Unknown passenger '{0}'")]
    UnknownPassenger(String),
}

/// Deflection lines by trust tier, spoken when a turn falls back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLines {
    /// Trust below 30: refusal.
    pub guarded: String,
    /// Trust below 60: stalling, asks to rephrase.
    pub wary: String,
    /// Trust 60 and above: apologetic.
    pub open: String,
}

impl TierLines {
    pub fn for_tier(&self, tier: TrustTier) -> &str {
        match tier {
            TrustTier::Guarded => &self.guarded,
            TrustTier::Wary => &self.wary,
            TrustTier::Open => &self.open,
        }
    }
}

/// Fixed spoken lines for one passenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterVoice {
    /// Passenger id this voice belongs to.
    pub id: String,
    /// Opening line when the inspector begins an interrogation.
    pub greeting: String,
    /// Deflection lines used by the fallback path.
    pub fallback: TierLines,
}

/// Seed dossiers plus their voices, validated as a set.
#[derive(Debug, Clone)]
pub struct Roster {
    seeds: Vec<Dossier>,
    voices: HashMap<String, CharacterVoice>,
}

impl Roster {
    /// Build a roster, checking that every passenger has exactly one voice
    /// and every voice a passenger.
    pub fn new(seeds: Vec<Dossier>, voices: Vec<CharacterVoice>) -> Result<Self, RosterError> {
        let voices: HashMap<String, CharacterVoice> =
            voices.into_iter().map(|v| (v.id.clone(), v)).collect();

        for seed in &seeds {
            if !voices.contains_key(&seed.id) {
                return Err(RosterError::MissingVoice(seed.id.clone()));
            }
        }
        for id in voices.keys() {
            if !seeds.iter().any(|s| &s.id == id) {
                return Err(RosterError::OrphanVoice(id.clone()));
            }
        }

        Ok(Self { seeds, voices })
    }

    /// The standard five-passenger cast.
    pub fn standard() -> Self {
        Self::new(seed_passengers(), STANDARD_VOICES.clone())
            .expect("standard roster is internally consistent")
    }

    /// Ids of every passenger aboard, in boarding order.
    pub fn passenger_ids(&self) -> impl Iterator<Item = &str> {
        self.seeds.iter().map(|s| s.id.as_str())
    }

    /// A fresh dossier for `id`, cloned from seed values.
    pub fn seed(&self, id: &str) -> Result<Dossier, RosterError> {
        self.seeds
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| RosterError::UnknownPassenger(id.to_string()))
    }

    /// The voice for `id`.
    pub fn voice(&self, id: &str) -> Result<&CharacterVoice, RosterError> {
        self.voices
            .get(id)
            .ok_or_else(|| RosterError::UnknownPassenger(id.to_string()))
    }
}

lazy_static::lazy_static! {
    /// Voices for the standard cast.
    static ref STANDARD_VOICES: Vec<CharacterVoice> = vec![
        CharacterVoice {
            id: "professor".to_string(),
            greeting: "Ah, Inspector. I assure you, these are merely theoretical exercises. \
                       The Academy's concerns were... exaggerated. How may I assist your investigation?"
                .to_string(),
            fallback: TierLines {
                guarded: "I have nothing further to say on that subject, Inspector.".to_string(),
                wary: "Forgive me, I am not certain I follow. Could you phrase that differently?"
                    .to_string(),
                open: "My apologies, Inspector — my thoughts wandered. Perhaps approach the question \
                       another way?"
                    .to_string(),
            },
        },
        CharacterVoice {
            id: "widow".to_string(),
            greeting: "My dear Inspector... *clutches photograph tightly* My husband... he was a \
                       good man. The war took him from me, but his memory lives on. What brings you \
                       to speak with me?"
                .to_string(),
            fallback: TierLines {
                guarded: "I don't feel comfortable discussing this right now.".to_string(),
                wary: "I'm sorry, I don't quite understand what you are asking of me.".to_string(),
                open: "Forgive me, Inspector, I am a little overcome. Could we try a different \
                       question?"
                    .to_string(),
            },
        },
        CharacterVoice {
            id: "mechanic".to_string(),
            greeting: "Just doing my job, Inspector. This old train needs constant attention, you \
                       know how it is. What can I help you with?"
                .to_string(),
            fallback: TierLines {
                guarded: "Got nothing to say about that. Train won't fix itself.".to_string(),
                wary: "Come again? You lost me somewhere around the middle of that.".to_string(),
                open: "Sorry, Inspector, my head was in the gearbox. Run that by me once more?"
                    .to_string(),
            },
        },
        CharacterVoice {
            id: "child".to_string(),
            greeting: "The music box was my mother's. She said it would keep me safe on my journey. \
                       Are you here to help me?"
                .to_string(),
            fallback: TierLines {
                guarded: "I don't want to talk about that.".to_string(),
                wary: "I don't understand what you mean...".to_string(),
                open: "I'm sorry, I wasn't listening. What did you ask?".to_string(),
            },
        },
        CharacterVoice {
            id: "official".to_string(),
            greeting: "I trust you understand the importance of my mission, Inspector. Some \
                       questions are better left unasked. What do you need to know?"
                .to_string(),
            fallback: TierLines {
                guarded: "That matter is classified. Move along, Inspector.".to_string(),
                wary: "Be precise, Inspector. I cannot answer a question I cannot parse.".to_string(),
                open: "My apologies — the demands of my office pull my attention. Ask again."
                    .to_string(),
            },
        },
    ];
}

/// The standard cast of five passengers, at seed values.
pub fn seed_passengers() -> Vec<Dossier> {
    vec![professor(), widow(), mechanic(), child(), official()]
}

fn professor() -> Dossier {
    Dossier::new("professor", "Dr. Alexander Volkov", "The Professor")
        .with_description("A disgraced academic with a briefcase full of forbidden research papers.")
        .with_background(
            "Former head of theoretical physics at the Imperial Academy. Dismissed after his \
             research into temporal mechanics was deemed \"dangerous to the state.\" Claims to be \
             traveling to a new teaching position at a provincial university.",
        )
        .with_trust_level(50)
        .with_secrets(vec![
            "The equations could potentially allow time travel".to_string(),
            "He was forced to leave the Academy after a failed experiment".to_string(),
            "His destination is not a university but a secret research facility".to_string(),
        ])
        .with_artifacts(vec![
            Artifact::new(
                "research_papers",
                "Forbidden Equations",
                "Complex mathematical formulas that seem to describe time manipulation.",
                ArtifactKind::Document,
                10,
            )
            .with_content("The equations suggest a method of temporal displacement..."),
            Artifact::new(
                "academy_badge",
                "Imperial Academy Badge",
                "A tarnished brass badge showing his former position.",
                ArtifactKind::Object,
                10,
            ),
        ])
}

fn widow() -> Dossier {
    Dossier::new("widow", "Madame Elena Petrovna", "The Widow")
        .with_description("A mysterious woman in black, clutching a worn photograph.")
        .with_background(
            "Claims to be traveling to visit her husband's grave, but her luggage contains items \
             that suggest a different journey entirely.",
        )
        .with_trust_level(50)
        .with_secrets(vec![
            "The photograph is not of her husband".to_string(),
            "The package contains stolen military documents".to_string(),
            "She's working with a resistance group".to_string(),
        ])
        .with_artifacts(vec![
            Artifact::new(
                "photograph",
                "Worn Photograph",
                "A faded photograph of a man in military uniform.",
                ArtifactKind::Photograph,
                10,
            ),
            Artifact::new(
                "mysterious_package",
                "Mysterious Package",
                "A carefully wrapped package with strange symbols.",
                ArtifactKind::Object,
                10,
            ),
        ])
}

fn mechanic() -> Dossier {
    Dossier::new("mechanic", "Boris \"The Fixer\"", "The Mechanic")
        .with_description("A gruff individual with oil-stained hands and a mysterious toolbox.")
        .with_background(
            "Their knowledge of the train's inner workings seems too detailed for a simple \
             repairman.",
        )
        .with_trust_level(50)
        .with_secrets(vec![
            "They're not a real mechanic".to_string(),
            "The toolbox contains surveillance equipment".to_string(),
            "They know about the train's secret purpose".to_string(),
        ])
        .with_artifacts(vec![
            Artifact::new(
                "toolbox",
                "Mysterious Toolbox",
                "Contains unusual tools and blueprints.",
                ArtifactKind::Object,
                10,
            ),
            Artifact::new(
                "blueprints",
                "Train Blueprints",
                "Detailed schematics of the train's systems.",
                ArtifactKind::Document,
                10,
            )
            .with_content("The blueprints show hidden compartments..."),
        ])
}

fn child() -> Dossier {
    Dossier::new("child", "Anya", "The Child")
        .with_description("Traveling alone with a music box that plays a haunting melody.")
        .with_background(
            "Their innocence might be a facade, and their connection to the train's past is deeper \
             than it appears.",
        )
        .with_trust_level(50)
        .with_secrets(vec![
            "The music box controls the train".to_string(),
            "They're not really a child".to_string(),
            "They know about the train's true nature".to_string(),
        ])
        .with_artifacts(vec![
            Artifact::new(
                "music_box",
                "Haunting Music Box",
                "Plays a melody that seems to affect the train's systems.",
                ArtifactKind::Object,
                10,
            ),
            Artifact::new(
                "doll",
                "Strange Doll",
                "A doll that seems to move on its own.",
                ArtifactKind::Object,
                10,
            ),
        ])
}

fn official() -> Dossier {
    Dossier::new("official", "Commissar Ivanov", "The Official")
        .with_description("A government representative with impeccable credentials and a cold demeanor.")
        .with_background(
            "Their presence on the train raises questions about who's really in control. Carries \
             documents that could change the fate of everyone aboard.",
        )
        .with_trust_level(50)
        .with_secrets(vec![
            "They're not who they claim to be".to_string(),
            "The orders contain a list of passengers to be detained".to_string(),
            "They know about the train's true purpose".to_string(),
        ])
        .with_artifacts(vec![
            Artifact::new(
                "credentials",
                "Official Credentials",
                "Impeccably forged government documents.",
                ArtifactKind::Document,
                10,
            )
            .with_content("Authorization Level: Alpha, Department: Special Operations"),
            Artifact::new(
                "sealed_orders",
                "Sealed Orders",
                "A sealed envelope containing classified instructions.",
                ArtifactKind::Letter,
                10,
            )
            .with_content("To be opened only at the final station..."),
        ])
}
