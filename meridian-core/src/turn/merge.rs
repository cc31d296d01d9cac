//! Merging a validated response into a dossier.
//!
//! The merge is synchronous and total: given a valid dossier and a validated
//! [`StructuredResponse`] it always succeeds. Trust lands in [0, 100],
//! associates stay unique by exact name (including within a single
//! response), secrets only grow, and biography text routes through
//! [`SECTION_ROUTES`] — adding a section is a table row, not new control
//! flow. Repeated identical biography content accumulates verbatim; that is
//! observed reference behavior, deliberately left alone.

use crate::dossier::Dossier;
use crate::turn::validate::StructuredResponse;

/// What a merge changed, for the caller to present.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub trust_before: i32,
    pub trust_after: i32,
    /// Names of associates added this merge, in insertion order.
    pub added_associates: Vec<String>,
    /// Secrets appended this merge.
    pub added_secrets: usize,
    /// Section tags that matched no route and were ignored.
    pub ignored_sections: Vec<String>,
}

type SectionAppender = fn(&mut Dossier, &str);

/// Biography routing table: section tag to appender.
static SECTION_ROUTES: &[(&str, SectionAppender)] = &[
    ("background", append_background),
    ("description", append_description),
    ("secrets", append_secret),
];

fn append_background(dossier: &mut Dossier, content: &str) {
    dossier.append_background(content);
}

fn append_description(dossier: &mut Dossier, content: &str) {
    dossier.append_description(content);
}

fn append_secret(dossier: &mut Dossier, content: &str) {
    dossier.add_secret(content);
}

/// Apply a validated response to a dossier, in revelation order.
pub fn merge(dossier: &mut Dossier, response: &StructuredResponse) -> MergeOutcome {
    let trust_before = dossier.trust_level;
    dossier.adjust_trust(response.trust_change);

    let mut added_associates = Vec::new();
    for associate in &response.revelations.new_associates {
        if dossier.add_associate(associate.clone()) {
            added_associates.push(associate.name.clone());
        }
    }

    let mut added_secrets = 0;
    let mut ignored_sections = Vec::new();
    for update in &response.revelations.biography_updates {
        match SECTION_ROUTES
            .iter()
            .find(|(tag, _)| *tag == update.section)
        {
            Some((tag, appender)) => {
                if *tag == "secrets" {
                    added_secrets += 1;
                }
                appender(dossier, &update.content);
            }
            None => {
                tracing::debug!(section = %update.section, "ignoring unrecognized biography section");
                ignored_sections.push(update.section.clone());
            }
        }
    }

    MergeOutcome {
        trust_before,
        trust_after: dossier.trust_level,
        added_associates,
        added_secrets,
        ignored_sections,
    }
}
