// Passing-chord decoration.
//
// After the shell chords are fixed, each measure gets at most one of three
// treatments:
// - Last measure: maybe a turnaround dominant on beats 3-4 (slots 6-7),
//   optionally preceded by the relative ii of V7 on slots 4-5, so the loop
//   repeats smoothly.
// - Dominant shell: 50% chance to prefix its relative ii on slots 0-3,
//   turning the measure into a ii-V.
// - Otherwise: 50% chance to anticipate the next measure's shell chord with
//   a preparatory dominant (or, at low tension, laid-back diatonic/borrowed
//   chords) on the back of the measure.
//
// The relative ii is minor, or half-diminished when the resolution target is
// minor. Its voicing, like every inserted chord's, voice-leads from the
// measure's opening voicing.

use rand::Rng;

use loopsmith_theory::chord::{self, Chord, ChordName, Quality};
use loopsmith_theory::family::{Catalog, FamilyName};
use loopsmith_theory::note::KeyQuality;

use crate::grid::{Grid, SLOTS_PER_MEASURE};
use crate::harmony::HarmonyCell;
use crate::loops::Loop;
use crate::voicing::voice_chord;

/// Decorate one measure of the passing grid.
pub fn passing_chords(
    lp: &Loop,
    catalog: &Catalog,
    passing: &mut Grid<HarmonyCell>,
    measure: usize,
    rng: &mut impl Rng,
) {
    let base = measure * SLOTS_PER_MEASURE;
    let shell = passing.value(base).clone();
    let last_measure = measure == lp.measures - 1;

    if last_measure {
        // Turnaround back into the top of the loop.
        if rng.random_range(0..3) == 0 && lp.tension >= 2 {
            let add = if rng.random_range(0..2) == 0 {
                chord::SUB_V7_OF_I
            } else {
                chord::V_7
            };
            insert(lp, catalog, passing, base, 6, 8, add, rng);

            if rng.random_range(0..2) == 0 {
                let factor = match lp.key.quality {
                    KeyQuality::Major => Quality::Major,
                    KeyQuality::Minor => Quality::Minor,
                };
                relative_two(lp, catalog, passing, base, 4, 6, factor, &chord::V_7, -5, rng);
            }
        }
    } else if shell.chord.quality == Quality::Dominant {
        // Complete a ii-V: the relative ii takes the front of the measure.
        if rng.random_range(0..2) == 0 {
            let delta = if !shell.chord.name.is_tritone_sub() {
                *pick(&[-5, -5, -5, 1], rng)
            } else {
                *pick(&[1, 1, 1, -5], rng)
            };
            let next_shell = passing.value((measure + 1) * SLOTS_PER_MEASURE).chord;
            relative_two(
                lp,
                catalog,
                passing,
                base,
                0,
                4,
                next_shell.quality,
                &shell.chord,
                delta,
                rng,
            );
        }
    } else if rng.random_range(0..2) == 0 {
        let next_shell = passing.value((measure + 1) * SLOTS_PER_MEASURE).chord;

        if lp.tension < 2 {
            // Laid-back variety instead of functional dominants: two draws,
            // so beats 3 and 4 may end up with distinct chords.
            let mut options: Vec<Chord> = Vec::new();
            for name in [
                FamilyName::DiatonicMajor,
                FamilyName::DiatonicMinor,
                FamilyName::MinorKeyMajor,
                FamilyName::MinorKeyMinor,
            ] {
                options.extend(catalog.family(name).chords.iter().copied());
            }
            for _ in 0..2 {
                let add = *pick(&options, rng);
                let start = *pick(&[4, 6], rng);
                insert(lp, catalog, passing, base, start, 8, add, rng);
            }
            return;
        }

        // A substitute dominant resolves down a half step, a secondary
        // dominant down a fifth; the first catalog chord that lands on the
        // next shell chord wins.
        let sub_families = [
            FamilyName::MajorSubstituteDominants,
            FamilyName::MinorSubstituteDominants,
        ];
        let sec_families = [
            FamilyName::MajorSecondaryDominants,
            FamilyName::MinorSecondaryDominants,
        ];
        for (families, step) in [(sub_families, 11u8), (sec_families, 5u8)] {
            for family in families {
                for add in &catalog.family(family).chords {
                    if (add.interval + step) % 12 != next_shell.interval {
                        continue;
                    }
                    let start = *pick(&[4, 6], rng);
                    insert(lp, catalog, passing, base, start, 8, *add, rng);
                    if rng.random_range(0..3) == 0 {
                        relative_two(
                            lp,
                            catalog,
                            passing,
                            base,
                            4,
                            6,
                            next_shell.quality,
                            add,
                            1,
                            rng,
                        );
                    }
                    return;
                }
            }
        }
    }
}

/// Insert the relative ii of a dominant on `start..stop`: a minor chord
/// `delta` semitones from the dominant's root, half-diminished when the
/// resolution target is minor.
#[allow(clippy::too_many_arguments)]
fn relative_two(
    lp: &Loop,
    catalog: &Catalog,
    passing: &mut Grid<HarmonyCell>,
    base: usize,
    start: usize,
    stop: usize,
    factor: Quality,
    relative_v: &Chord,
    delta: i8,
    rng: &mut impl Rng,
) {
    let interval = (relative_v.interval as i8 + delta).rem_euclid(12) as u8;
    let name = match factor {
        Quality::Major | Quality::Dominant => ChordName::RelTwo,
        Quality::Minor => ChordName::RelTwoHalfDim,
    };
    let add = Chord::new(name, Quality::Minor, interval);
    insert(lp, catalog, passing, base, start, stop, add, rng);
}

/// Voice `add` against the measure's opening voicing and write it over
/// slots `start..stop`.
#[allow(clippy::too_many_arguments)]
fn insert(
    lp: &Loop,
    catalog: &Catalog,
    passing: &mut Grid<HarmonyCell>,
    base: usize,
    start: usize,
    stop: usize,
    add: Chord,
    rng: &mut impl Rng,
) {
    let prev = passing.value(base).voicing.clone();
    let voicing = voice_chord(&add, &lp.key, lp.depth, catalog, Some(&prev), rng);
    for offset in start..stop {
        passing.set(
            base + offset,
            HarmonyCell {
                chord: add,
                voicing: voicing.clone(),
            },
        );
    }
}

fn pick<'a, T>(items: &'a [T], rng: &mut impl Rng) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmony::construct_harmony;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn tracks(seed: u64, measures: usize, tension: u8) -> (Loop, crate::harmony::HarmonyTrack) {
        let catalog = Catalog::default_catalog();
        let mut rng = StdRng::seed_from_u64(seed);
        let lp = Loop::new(measures, tension, 2, &mut rng);
        let track = construct_harmony(&lp, &catalog, &mut rng);
        (lp, track)
    }

    #[test]
    fn low_tension_loops_get_no_turnaround_dominants() {
        for seed in 0..64 {
            let (lp, track) = tracks(seed, 4, 0);
            let base = (lp.measures - 1) * SLOTS_PER_MEASURE;
            for offset in 0..SLOTS_PER_MEASURE {
                let cell = track.passing.value(base + offset);
                assert_eq!(
                    cell, track.shell.value(base + offset),
                    "seed {seed}: turnaround inserted at tension 0"
                );
            }
        }
    }

    #[test]
    fn turnaround_chords_are_the_expected_dominants() {
        for seed in 0..128 {
            let (lp, track) = tracks(seed, 4, 4);
            let base = (lp.measures - 1) * SLOTS_PER_MEASURE;
            for offset in 6..8 {
                let cell = track.passing.value(base + offset);
                if cell != track.shell.value(base + offset) {
                    assert!(
                        matches!(cell.chord.name, ChordName::SubV7OfI | ChordName::V7),
                        "seed {seed}: unexpected turnaround {:?}",
                        cell.chord.name
                    );
                }
            }
            // Slots 4-5 of the last measure only ever hold the relative ii
            // of V7 (root a fourth below V, i.e. interval 2).
            for offset in 4..6 {
                let cell = track.passing.value(base + offset);
                if cell != track.shell.value(base + offset) {
                    assert!(matches!(
                        cell.chord.name,
                        ChordName::RelTwo | ChordName::RelTwoHalfDim
                    ));
                    assert_eq!(cell.chord.interval, 2);
                }
            }
        }
    }

    #[test]
    fn relative_two_prefix_sits_before_its_dominant() {
        for seed in 0..128 {
            let (lp, track) = tracks(seed, 8, 4);
            for measure in 0..lp.measures - 1 {
                let base = measure * SLOTS_PER_MEASURE;
                let shell = track.shell.value(base);
                let front = track.passing.value(base);
                if front == shell {
                    continue;
                }
                // The front of a measure is only rewritten for ii-V
                // completion over a dominant shell.
                assert_eq!(shell.chord.quality, Quality::Dominant);
                assert!(matches!(
                    front.chord.name,
                    ChordName::RelTwo | ChordName::RelTwoHalfDim
                ));
                // The dominant keeps the back of the measure.
                for offset in 4..8 {
                    assert_eq!(track.passing.value(base + offset), shell);
                }
                // The ii sits a fourth below its dominant or a half step
                // above it (tritone-substitute pairing).
                let delta = (front.chord.interval + 12 - shell.chord.interval) % 12;
                assert!(
                    matches!(delta, 7 | 1),
                    "seed {seed}: relative ii at delta {delta}"
                );
            }
        }
    }

    #[test]
    fn preparatory_dominants_resolve_into_the_next_measure() {
        for seed in 0..128 {
            let (lp, track) = tracks(seed, 8, 3);
            for measure in 0..lp.measures - 1 {
                let base = measure * SLOTS_PER_MEASURE;
                let shell = track.shell.value(base);
                if shell.chord.quality == Quality::Dominant {
                    continue;
                }
                let next_shell = track.shell.value((measure + 1) * SLOTS_PER_MEASURE);
                for offset in 6..8 {
                    let cell = track.passing.value(base + offset);
                    if cell == track.shell.value(base + offset) {
                        continue;
                    }
                    let add = &cell.chord;
                    let resolves = if add.name.is_tritone_sub() {
                        (add.interval + 11) % 12 == next_shell.chord.interval
                    } else {
                        (add.interval + 5) % 12 == next_shell.chord.interval
                    };
                    assert!(
                        resolves,
                        "seed {seed}: {:?} does not prepare {:?}",
                        add.name, next_shell.chord.name
                    );
                }
            }
        }
    }
}
