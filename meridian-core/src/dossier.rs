//! Passenger dossier types.
//!
//! A [`Dossier`] is the canonical mutable record for one passenger: trust,
//! discovered evidence, known associates, and biography text. It is owned by
//! its session and mutated only through the turn merger
//! ([`crate::turn::merge`]) and the evidence roller ([`crate::discovery`]).

use serde::{Deserialize, Serialize};

/// Lower bound of a dossier's trust level.
pub const TRUST_MIN: i32 = 0;
/// Upper bound of a dossier's trust level.
pub const TRUST_MAX: i32 = 100;

/// What kind of physical evidence an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Document,
    Photograph,
    Object,
    Letter,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Document => "document",
            ArtifactKind::Photograph => "photograph",
            ArtifactKind::Object => "object",
            ArtifactKind::Letter => "letter",
        }
    }
}

/// A discoverable piece of evidence tied to a passenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ArtifactKind,
    /// Readable content, for documents and letters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Once true, never reset within a session.
    pub discovered: bool,
    /// Roll threshold in [1, 10]; an inspection roll at or above it reveals
    /// the artifact, so 10 is the hardest to find.
    pub discovery_chance: u8,
}

impl Artifact {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ArtifactKind,
        discovery_chance: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind,
            content: None,
            discovered: false,
            discovery_chance: discovery_chance.clamp(1, 10),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Someone a passenger is known to be connected to.
///
/// Immutable once added; uniqueness key is the exact `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Associate {
    pub name: String,
    pub relationship: String,
    pub details: String,
}

/// How forthcoming a passenger currently is, derived from trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustTier {
    /// Below 30: refuses to engage.
    Guarded,
    /// Below 60: deflects and stalls.
    Wary,
    /// 60 and above: cooperative, even apologetic.
    Open,
}

/// The mutable per-passenger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dossier {
    /// Stable seed id, e.g. `"professor"`.
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub background: String,
    pub trust_level: i32,
    pub secrets: Vec<String>,
    pub known_associates: Vec<Associate>,
    pub artifacts: Vec<Artifact>,
}

impl Dossier {
    /// Create a dossier with empty narrative collections and neutral trust.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            description: String::new(),
            background: String::new(),
            trust_level: 50,
            secrets: Vec::new(),
            known_associates: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_trust_level(mut self, trust_level: i32) -> Self {
        self.trust_level = trust_level.clamp(TRUST_MIN, TRUST_MAX);
        self
    }

    pub fn with_secrets(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Current trust tier, used for fallback and greeting tone.
    pub fn trust_tier(&self) -> TrustTier {
        if self.trust_level < 30 {
            TrustTier::Guarded
        } else if self.trust_level < 60 {
            TrustTier::Wary
        } else {
            TrustTier::Open
        }
    }

    /// Shift trust by `delta`, keeping the level within [0, 100].
    pub fn adjust_trust(&mut self, delta: i32) {
        self.trust_level = (self.trust_level + delta).clamp(TRUST_MIN, TRUST_MAX);
    }

    /// Append narrative text to the background, separated by a blank line.
    pub fn append_background(&mut self, content: &str) {
        append_paragraph(&mut self.background, content);
    }

    /// Append narrative text to the description, separated by a blank line.
    pub fn append_description(&mut self, content: &str) {
        append_paragraph(&mut self.description, content);
    }

    /// Record a newly surfaced secret. Secrets are append-only.
    pub fn add_secret(&mut self, content: impl Into<String>) {
        self.secrets.push(content.into());
    }

    /// Add an associate unless one with the same name (exact match) exists.
    /// Returns whether the associate was added.
    pub fn add_associate(&mut self, associate: Associate) -> bool {
        if self
            .known_associates
            .iter()
            .any(|a| a.name == associate.name)
        {
            return false;
        }
        self.known_associates.push(associate);
        true
    }

    /// Artifacts the inspector has already found.
    pub fn discovered_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.discovered)
    }

    /// Artifacts still hidden.
    pub fn undiscovered_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| !a.discovered)
    }
}

fn append_paragraph(target: &mut String, content: &str) {
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(content);
}
