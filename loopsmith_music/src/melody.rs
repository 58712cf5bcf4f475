// Melody generation: rhythm, scale degrees, resolved pitches.
//
// Rhythm comes first. Measures 0 and 3 of every group of four (and the final
// measure) get a fresh pattern; measures 1 and 2 copy their predecessor, so
// the loop falls into an A A A B phrase shape. A fresh pattern places 0-3
// rests on non-salient slots (with contagion: neighbors of a rest are more
// likely to rest too), then marks slot 0, every post-rest slot, and most
// salient slots as attacks; everything else sustains.
//
// Degrees next: every attack draws from the current chord's guide/shell/
// color sets, weighted by metric position (guide tones on strong slots,
// shell on even, color on odd) and boosted hard toward degrees near the
// previous sounding note. Color tones are suppressed right before a rest so
// phrases don't end hanging on a tension.
//
// Resolution last: a degree becomes a spelled pitch via the chord's root and
// spelling table; sustains copy the previous slot's resolved value; rests
// become the rest sentinel.

use rand::Rng;
use serde::Serialize;

use loopsmith_theory::family::Catalog;
use loopsmith_theory::note::Key;

use crate::grid::{Compressed, Grid, Role, SLOTS_PER_MEASURE, Step};
use crate::harmony::HarmonyTrack;
use crate::loops::Loop;

/// Scale-degree slot value: semitone offset from the chord root, or `REST`.
pub type Degree = i8;

/// Degree sentinel for a resting slot.
pub const REST: Degree = -1;

/// All melody grid stages for one loop.
#[derive(Debug, Clone, Serialize)]
pub struct MelodyTrack {
    pub rhythm: Grid<Role>,
    pub degrees: Grid<Degree>,
    pub notes: Grid<Step>,
    pub compressed: Compressed<Step>,
}

/// Build the full melody track.
pub fn construct_melody(
    lp: &Loop,
    catalog: &Catalog,
    harmony: &HarmonyTrack,
    rng: &mut impl Rng,
) -> MelodyTrack {
    let mut rhythm: Grid<Role> = Grid::new(lp.measures);
    for measure in 0..lp.measures {
        if measure % 4 == 0 || measure % 4 == 3 || measure == lp.measures - 1 {
            assign_rests(&mut rhythm, measure, &lp.accents, rng);
            assign_attacks(&mut rhythm, measure, &lp.accents, rng);
        } else {
            rhythm.copy_measure(measure - 1, measure);
        }
    }

    let mut degrees: Grid<Degree> = Grid::new(lp.measures);
    for index in 0..lp.slot_count() {
        melody_degree(lp, harmony, &rhythm, &mut degrees, index, rng);
    }

    let notes = resolve_degrees(&lp.key, catalog, harmony, &rhythm, &degrees);
    let compressed = notes.compress();

    MelodyTrack {
        rhythm,
        degrees,
        notes,
        compressed,
    }
}

/// Scatter 0-3 rests over a measure's empty slots, avoiding salient slots.
/// A placed rest makes its neighbors likelier to rest as well.
fn assign_rests(
    rhythm: &mut Grid<Role>,
    measure: usize,
    accents: &[bool; SLOTS_PER_MEASURE],
    rng: &mut impl Rng,
) {
    let base = measure * SLOTS_PER_MEASURE;
    let target = rng.random_range(0..=3);
    let mut placed = 0;

    while placed < target {
        for offset in 0..SLOTS_PER_MEASURE {
            let index = base + offset;

            if rhythm.get(index).is_none() && rng.random_range(0..=10) == 0 && !accents[offset] {
                rhythm.set(index, Role::Rest);
                placed += 1;
            }

            // Contagion: spread to the following and preceding slot.
            if rhythm.get(index) == Some(&Role::Rest)
                && rng.random_range(0..=4) == 0
                && offset != SLOTS_PER_MEASURE - 1
                && !accents[offset + 1]
                && rng.random_range(0..=2) > 0
            {
                rhythm.set(index + 1, Role::Rest);
                placed += 1;
            }
            if rhythm.get(index) == Some(&Role::Rest)
                && rng.random_range(0..=4) == 0
                && offset != 0
                && !accents[offset - 1]
                && rng.random_range(0..=2) > 0
            {
                rhythm.set(index - 1, Role::Rest);
                placed += 1;
            }

            if placed == target {
                return;
            }
        }
    }
}

/// Fill a measure's remaining slots with attacks and sustains.
fn assign_attacks(
    rhythm: &mut Grid<Role>,
    measure: usize,
    accents: &[bool; SLOTS_PER_MEASURE],
    rng: &mut impl Rng,
) {
    let base = measure * SLOTS_PER_MEASURE;
    for offset in 0..SLOTS_PER_MEASURE {
        let index = base + offset;
        if rhythm.get(index) == Some(&Role::Rest) {
            continue;
        }
        let role = if offset == 0 {
            Role::Attack
        } else if rhythm.get(index - 1) == Some(&Role::Rest) {
            Role::Attack
        } else if accents[offset] && rng.random_range(0..=2) != 0 {
            Role::Attack
        } else {
            Role::Sustain
        };
        rhythm.set(index, role);
    }
}

/// Pick the scale degree for one slot.
fn melody_degree(
    lp: &Loop,
    harmony: &HarmonyTrack,
    rhythm: &Grid<Role>,
    degrees: &mut Grid<Degree>,
    index: usize,
    rng: &mut impl Rng,
) {
    match rhythm.value(index) {
        Role::Sustain => {
            let copied = *degrees.value(index - 1);
            degrees.set(index, copied);
        }
        Role::Rest => degrees.set(index, REST),
        Role::Attack => {
            let chord = &harmony.passing.value(index).chord;
            let scale = chord.scale(lp.key.quality, lp.depth);
            let guide: Vec<Degree> = scale.guide.iter().map(|&d| d as Degree).collect();
            let shell: Vec<Degree> = scale.shell.iter().map(|&d| d as Degree).collect();
            let color: Vec<Degree> = scale.color.iter().map(|&d| d as Degree).collect();

            let mut options: Vec<Degree> = Vec::new();
            options.extend(&guide);
            options.extend(&shell);
            options.extend(&color);

            // Metric weighting: guide tones carry strong slots, shell tones
            // the other even slots, color tones the off-beats.
            let boosted = if index % 4 == 0 {
                &guide
            } else if index % 2 == 0 {
                &shell
            } else {
                &color
            };
            for _ in 0..2 {
                options.extend(boosted);
            }

            // Heavy preference for degrees close to the previous sounding
            // note (skipping over rests).
            let has_previous_attack = (0..index).any(|j| rhythm.value(j) == &Role::Attack);
            if has_previous_attack {
                let mut j = index - 1;
                while rhythm.value(j) == &Role::Rest {
                    j -= 1;
                }
                let prev_degree = *degrees.value(j);
                for &candidate in guide.iter().chain(&shell).chain(&color) {
                    if candidate == prev_degree {
                        continue;
                    }
                    let raw = (prev_degree - candidate).abs() as i32;
                    let folded = raw.min(12 - raw);
                    let boost = (5 - folded) * (5 - folded);
                    for _ in 0..boost {
                        options.push(candidate);
                    }
                }
            }

            // Avoid hanging a phrase on a color tone: if the next non-sustain
            // slot is a rest, knock color tones down to a single copy each.
            let mut before_rest = false;
            for j in index + 1..rhythm.len() {
                match rhythm.value(j) {
                    Role::Rest => {
                        before_rest = true;
                        break;
                    }
                    Role::Attack => break,
                    Role::Sustain => {}
                }
            }
            if before_rest {
                options.retain(|d| !color.contains(d));
                options.extend(&color);
            }

            let degree = options[rng.random_range(0..options.len())];
            degrees.set(index, degree);
        }
    }
}

/// Resolve a degree grid to spelled pitches against the passing-chord grid.
/// Shared with the bass engine.
pub fn resolve_degrees(
    key: &Key,
    catalog: &Catalog,
    harmony: &HarmonyTrack,
    rhythm: &Grid<Role>,
    degrees: &Grid<Degree>,
) -> Grid<Step> {
    let mut notes: Grid<Step> = Grid::new(degrees.measures());
    for index in 0..degrees.len() {
        let step = match rhythm.value(index) {
            Role::Sustain => *notes.value(index - 1),
            Role::Rest => Step::Rest,
            Role::Attack => {
                let chord = &harmony.passing.value(index).chord;
                let degree = *degrees.value(index);
                debug_assert!(degree >= 0, "attack slot {index} holds a rest degree");
                let pc = (key.root_pc + degree as u8 + chord.interval) % 12;
                let table = catalog.chord_accidental(chord, key).table();
                Step::Note(table[pc as usize])
            }
        };
        notes.set(index, step);
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmony::construct_harmony;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate(seed: u64, measures: usize, tension: u8, depth: u8) -> (Loop, MelodyTrack) {
        let catalog = Catalog::default_catalog();
        let mut rng = StdRng::seed_from_u64(seed);
        let lp = Loop::new(measures, tension, depth, &mut rng);
        let harmony = construct_harmony(&lp, &catalog, &mut rng);
        let melody = construct_melody(&lp, &catalog, &harmony, &mut rng);
        (lp, melody)
    }

    #[test]
    fn every_stage_covers_all_slots() {
        for seed in 0..16 {
            let (lp, melody) = generate(seed, 4, 2, 2);
            for index in 0..lp.slot_count() {
                assert!(melody.rhythm.get(index).is_some());
                assert!(melody.degrees.get(index).is_some());
                assert!(melody.notes.get(index).is_some());
            }
            assert_eq!(melody.compressed.total_len(), lp.slot_count());
        }
    }

    #[test]
    fn middle_measures_copy_their_predecessor() {
        for seed in 0..32 {
            let (_, melody) = generate(seed, 8, 2, 2);
            for measure in [1usize, 2, 5, 6] {
                for offset in 0..SLOTS_PER_MEASURE {
                    let index = measure * SLOTS_PER_MEASURE + offset;
                    assert_eq!(
                        melody.rhythm.value(index),
                        melody.rhythm.value(index - SLOTS_PER_MEASURE),
                        "seed {seed}: measure {measure} is not a copy"
                    );
                }
            }
        }
    }

    #[test]
    fn attacks_follow_rests_and_open_measures() {
        for seed in 0..64 {
            let (lp, melody) = generate(seed, 4, 2, 2);
            for index in 0..lp.slot_count() {
                let role = melody.rhythm.value(index);
                if index % SLOTS_PER_MEASURE == 0 {
                    assert_ne!(role, &Role::Sustain, "seed {seed}: measure opens sustained");
                }
                if index > 0
                    && melody.rhythm.value(index - 1) == &Role::Rest
                    && role != &Role::Rest
                {
                    assert_eq!(role, &Role::Attack, "seed {seed}: no attack after rest");
                }
            }
        }
    }

    #[test]
    fn attack_degrees_come_from_the_slot_chord_scale() {
        let catalog = Catalog::default_catalog();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let lp = Loop::new(4, 3, 2, &mut rng);
            let harmony = construct_harmony(&lp, &catalog, &mut rng);
            let melody = construct_melody(&lp, &catalog, &harmony, &mut rng);
            for index in 0..lp.slot_count() {
                if melody.rhythm.value(index) != &Role::Attack {
                    continue;
                }
                let chord = &harmony.passing.value(index).chord;
                let scale = chord.scale(lp.key.quality, lp.depth);
                let degree = *melody.degrees.value(index) as u8;
                assert!(
                    scale.guide.contains(&degree)
                        || scale.shell.contains(&degree)
                        || scale.color.contains(&degree),
                    "seed {seed}: degree {degree} is not in {:?}'s scale",
                    chord.name
                );
            }
        }
    }

    #[test]
    fn sustains_copy_and_rests_are_rests() {
        for seed in 0..32 {
            let (lp, melody) = generate(seed, 4, 1, 1);
            for index in 0..lp.slot_count() {
                match melody.rhythm.value(index) {
                    Role::Sustain => {
                        assert_eq!(melody.degrees.value(index), melody.degrees.value(index - 1));
                        assert_eq!(melody.notes.value(index), melody.notes.value(index - 1));
                    }
                    Role::Rest => {
                        assert_eq!(melody.degrees.value(index), &REST);
                        assert_eq!(melody.notes.value(index), &Step::Rest);
                    }
                    Role::Attack => {
                        assert!(matches!(melody.notes.value(index), Step::Note(_)));
                    }
                }
            }
        }
    }

    #[test]
    fn rests_never_land_on_salient_slots() {
        for seed in 0..64 {
            let (lp, melody) = generate(seed, 4, 2, 2);
            for index in 0..lp.slot_count() {
                if lp.accents[index % SLOTS_PER_MEASURE] {
                    assert_ne!(
                        melody.rhythm.value(index),
                        &Role::Rest,
                        "seed {seed}: rest on salient slot {index}"
                    );
                }
            }
        }
    }
}
