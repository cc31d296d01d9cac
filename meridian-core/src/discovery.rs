//! Evidence discovery rolls.
//!
//! Invoked on an explicit "inspect" action, never as part of a dialogue
//! turn. Each hidden artifact gets one uniform roll in [1, 10] and is
//! revealed when the roll meets or beats its `discovery_chance`, so a
//! threshold of 10 is the hardest find. Discovery is monotonic: an artifact
//! already found is never rolled again, and a roll never hides anything.

use crate::dossier::Dossier;
use rand::Rng;

/// Roll discovery for every hidden artifact in `dossier`.
///
/// Returns the ids of artifacts revealed by this inspection, in artifact
/// order. Trust is unaffected.
pub fn inspect(dossier: &mut Dossier) -> Vec<String> {
    inspect_with_rng(dossier, &mut rand::thread_rng())
}

/// Roll discovery with a specific RNG (useful for testing).
pub fn inspect_with_rng<R: Rng>(dossier: &mut Dossier, rng: &mut R) -> Vec<String> {
    let mut revealed = Vec::new();

    for artifact in dossier.artifacts.iter_mut() {
        if artifact.discovered {
            continue;
        }

        let roll: u8 = rng.gen_range(1..=10);
        if roll >= artifact.discovery_chance {
            artifact.discovered = true;
            revealed.push(artifact.id.clone());
            tracing::debug!(artifact = %artifact.id, roll, "artifact discovered");
        }
    }

    revealed
}
