// The harmony pipeline.
//
// Four stages, each a grid over the whole loop:
// - shell: one chord+voicing per measure, chosen by the shell state machine
//   with voice leading threaded from measure to measure
// - passing: a copy of shell, decorated in place with turnarounds, relative
//   iis, and preparatory dominants
// - rhythm: Attack wherever the passing grid's value changes between
//   adjacent slots (slot 0 is always an attack), Sustain elsewhere
// - compressed: the passing grid run-length encoded for output
//
// Melody and bass read the passing and rhythm grids; nothing here is
// mutated after construct_harmony returns.

use rand::Rng;
use serde::Serialize;

use loopsmith_theory::chord::Chord;
use loopsmith_theory::family::Catalog;

use crate::grid::{Compressed, Grid, Role};
use crate::loops::Loop;
use crate::passing::passing_chords;
use crate::shell::shell_chord;
use crate::voicing::{VoicedChord, voice_chord};

/// One harmony slot: the governing chord and its concrete voicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarmonyCell {
    pub chord: Chord,
    pub voicing: VoicedChord,
}

/// All harmony grid stages for one loop.
#[derive(Debug, Clone, Serialize)]
pub struct HarmonyTrack {
    pub shell: Grid<HarmonyCell>,
    pub passing: Grid<HarmonyCell>,
    pub rhythm: Grid<Role>,
    pub compressed: Compressed<HarmonyCell>,
}

/// Build the full harmony track: shell chords, passing decoration, the
/// attack/sustain rhythm, and the compressed output grid.
pub fn construct_harmony(lp: &Loop, catalog: &Catalog, rng: &mut impl Rng) -> HarmonyTrack {
    // Shell chords, one per measure, with voice leading carried across.
    let mut shell: Grid<HarmonyCell> = Grid::new(lp.measures);
    let mut prev_chord: Option<Chord> = None;
    let mut prev_voice: Option<VoicedChord> = None;

    for measure in 0..lp.measures {
        let chord = shell_chord(lp, catalog, measure, prev_chord.as_ref(), rng);
        let voicing = voice_chord(&chord, &lp.key, lp.depth, catalog, prev_voice.as_ref(), rng);
        for index in shell.measure_range(measure) {
            shell.set(
                index,
                HarmonyCell {
                    chord,
                    voicing: voicing.clone(),
                },
            );
        }
        prev_chord = Some(chord);
        prev_voice = Some(voicing);
    }

    // Passing-chord decoration works on its own copy.
    let mut passing = shell.clone();
    for measure in 0..lp.measures {
        passing_chords(lp, catalog, &mut passing, measure, rng);
    }

    // Harmony rhythm falls out of where the chord value changes.
    let mut rhythm: Grid<Role> = Grid::new(lp.measures);
    for index in 0..lp.slot_count() {
        let role = if index == 0 {
            Role::Attack
        } else if passing.value(index) == passing.value(index - 1) {
            Role::Sustain
        } else {
            Role::Attack
        };
        rhythm.set(index, role);
    }

    let compressed = passing.compress();

    HarmonyTrack {
        shell,
        passing,
        rhythm,
        compressed,
    }
}
