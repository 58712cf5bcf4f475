// Bass generation.
//
// The bass line is coupled to the harmony much more tightly than the melody:
// every slot where the harmony attacks is a forced bass attack on the chord
// root, so chord changes always land. Between chord changes the bass favors
// salient slots, occasionally picks up a quarter-note pulse on the other
// even slots, and otherwise sustains. There are no bass rests.
//
// Degrees resolve to pitches exactly like the melody does, via
// `melody::resolve_degrees`.

use rand::Rng;
use serde::Serialize;

use loopsmith_theory::family::Catalog;

use crate::grid::{Compressed, Grid, Role, SLOTS_PER_MEASURE, Step};
use crate::harmony::HarmonyTrack;
use crate::loops::Loop;
use crate::melody::{Degree, resolve_degrees};

/// All bass grid stages for one loop.
#[derive(Debug, Clone, Serialize)]
pub struct BassTrack {
    pub rhythm: Grid<Role>,
    pub degrees: Grid<Degree>,
    pub notes: Grid<Step>,
    pub compressed: Compressed<Step>,
}

/// Build the full bass track.
pub fn construct_bass(
    lp: &Loop,
    catalog: &Catalog,
    harmony: &HarmonyTrack,
    rng: &mut impl Rng,
) -> BassTrack {
    let mut rhythm: Grid<Role> = Grid::new(lp.measures);
    for index in 0..lp.slot_count() {
        let offset = index % SLOTS_PER_MEASURE;
        let role = if offset == 0 {
            Role::Attack
        } else if harmony.rhythm.value(index) == &Role::Attack {
            // A new chord always gets a bass note.
            Role::Attack
        } else if lp.accents[offset] && rng.random_range(0..=2) != 0 {
            Role::Attack
        } else if offset % 2 == 0 && rng.random_range(0..=2) == 0 {
            Role::Attack
        } else {
            Role::Sustain
        };
        rhythm.set(index, role);
    }

    let mut degrees: Grid<Degree> = Grid::new(lp.measures);
    for index in 0..lp.slot_count() {
        match rhythm.value(index) {
            Role::Attack => {
                let degree = if harmony.rhythm.value(index) == &Role::Attack {
                    // Root under every chord change.
                    0
                } else {
                    let chord = &harmony.passing.value(index).chord;
                    let scale = chord.scale(lp.key.quality, lp.depth);
                    let mut options: Vec<Degree> = Vec::new();
                    // Shell tones dominate; guide and color add movement.
                    for _ in 0..2 {
                        options.extend(scale.shell.iter().map(|&d| d as Degree));
                    }
                    options.extend(scale.guide.iter().map(|&d| d as Degree));
                    options.extend(scale.color.iter().map(|&d| d as Degree));
                    options[rng.random_range(0..options.len())]
                };
                degrees.set(index, degree);
            }
            Role::Sustain => {
                let copied = *degrees.value(index - 1);
                degrees.set(index, copied);
            }
            Role::Rest => unreachable!("bass rhythm never rests"),
        }
    }

    let notes = resolve_degrees(&lp.key, catalog, harmony, &rhythm, &degrees);
    let compressed = notes.compress();

    BassTrack {
        rhythm,
        degrees,
        notes,
        compressed,
    }
}
