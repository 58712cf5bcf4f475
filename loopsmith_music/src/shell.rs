// Shell (block) chord selection.
//
// One shell chord governs each measure. Selection is a small state machine
// over (previous chord, measure index, loop tension):
//
// 1. Measure 0, or the previous chord was bVIImaj/bVII7: the tonic. This is
//    the reset state that keeps the loop anchored.
// 2. Final measure at high tension, with no conflicting dominant pending:
//    the primary dominant, so the loop turns around into its own repeat.
// 3. Previous chord was a dominant: resolve it (down a fifth, up a second,
//    or down a half step).
// 4. Final measure otherwise: resample until the family's lead chord is not
//    an unresolvable dominant.
// 5. Default: weighted family draw, then weighted chord draw by interval
//    distance from the previous chord.
//
// Family weights come from `Family::weight`; zero-weight families are
// excluded from the draw outright. Retry loops that resample families are
// logically unbounded, but a stuck catalog is a data bug, so they bail out
// loudly after a large fixed cap.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use loopsmith_theory::chord::{Chord, ChordName, I_MAJ, I_MIN, Quality, V_7};
use loopsmith_theory::family::{Catalog, Family};
use loopsmith_theory::note::KeyQuality;

use crate::loops::Loop;

/// Cap for the logically-unbounded family resampling loops. Hitting it means
/// the catalog cannot satisfy a constraint at all.
const MAX_RESAMPLES: usize = 10_000;

/// Weight table for chord selection by folded interval distance from the
/// previous chord: near motion and fourth/fifth motion are favored,
/// whole-step and tritone motion discouraged.
const DISTANCE_WEIGHTS: [u32; 7] = [1, 4, 2, 3, 3, 4, 1];

/// Pick the shell chord for a measure.
pub fn shell_chord(
    lp: &Loop,
    catalog: &Catalog,
    measure: usize,
    prev: Option<&Chord>,
    rng: &mut impl Rng,
) -> Chord {
    let tonic = match lp.key.quality {
        KeyQuality::Major => I_MAJ,
        KeyQuality::Minor => I_MIN,
    };

    let Some(prev) = prev else {
        return tonic;
    };

    // bVII chords resolve to the tonic.
    if matches!(prev.name, ChordName::FlatViiMaj | ChordName::FlatVii7) {
        return tonic;
    }

    let last_measure = measure == lp.measures - 1;

    // High-tension loops end on the primary dominant, unless a pending
    // dominant other than V7/V or subV7/V would be left hanging.
    if lp.tension > 2
        && last_measure
        && (prev.quality != Quality::Dominant
            || prev.name == ChordName::V7OfV
            || prev.name == ChordName::SubV7OfV)
    {
        return V_7;
    }

    if prev.quality == Quality::Dominant {
        return dominant_resolution(lp, catalog, measure, prev, rng);
    }

    if last_measure {
        // The loop must not end on a dominant it cannot resolve; only V7
        // itself is allowed to lead a final-measure family.
        for _ in 0..MAX_RESAMPLES {
            let family = choose_family(lp, catalog, rng);
            let lead = &family.chords[0];
            if lead.quality != Quality::Dominant || lead.name == ChordName::V7 {
                return choose_chord(family, prev, rng);
            }
        }
        panic!("no non-dominant chord family available for the final measure");
    }

    choose_chord(choose_family(lp, catalog, rng), prev, rng)
}

/// Resolve a dominant chord: candidates a fifth below (strong), a major
/// second above (weak, keeps searching), or a half step below (strong).
/// Tritone substitutes flip the strong weighting from the fifth to the half
/// step. The family draw repeats until a strong candidate terminates it.
fn dominant_resolution(
    lp: &Loop,
    catalog: &Catalog,
    measure: usize,
    prev: &Chord,
    rng: &mut impl Rng,
) -> Chord {
    let last_measure = measure == lp.measures - 1;
    let from_sub = prev.name.is_tritone_sub();

    for _ in 0..MAX_RESAMPLES {
        let family = choose_family(lp, catalog, rng);

        let mut candidates: Vec<Chord> = Vec::new();
        let mut weights: Vec<u32> = Vec::new();
        let mut terminated = false;

        for chord in &family.chords {
            match (prev.interval + 12 - chord.interval) % 12 {
                7 => {
                    terminated = true;
                    candidates.push(*chord);
                    weights.push(if from_sub { 1 } else { 4 });
                }
                10 => {
                    candidates.push(*chord);
                    weights.push(1);
                }
                1 => {
                    terminated = true;
                    candidates.push(*chord);
                    weights.push(if from_sub { 4 } else { 1 });
                }
                _ => {}
            }
        }

        if candidates.is_empty() {
            continue;
        }
        let dist = WeightedIndex::new(&weights).expect("resolution weights are positive");
        let chosen = candidates[dist.sample(rng)];

        if !terminated {
            continue;
        }
        // Never end the loop on an unresolved dominant.
        if last_measure && chosen.quality == Quality::Dominant && chosen.name != ChordName::V7 {
            continue;
        }
        return chosen;
    }

    panic!(
        "no resolution target found for {:?} after {MAX_RESAMPLES} family draws",
        prev.name
    );
}

/// Weighted-random chord family for this loop's key and tension.
/// Zero-weight families carry no mass and cannot be drawn.
pub fn choose_family<'a>(lp: &Loop, catalog: &'a Catalog, rng: &mut impl Rng) -> &'a Family {
    let weighted: Vec<(&Family, u32)> = catalog
        .families
        .iter()
        .map(|f| (f, f.weight(lp.key.quality, lp.tension)))
        .filter(|&(_, w)| w > 0)
        .collect();

    let dist = WeightedIndex::new(weighted.iter().map(|&(_, w)| w))
        .expect("at least one chord family must have positive weight");
    weighted[dist.sample(rng)].0
}

/// Weighted-random chord from a family, weighted by the folded mod-12
/// interval distance from the previous chord.
pub fn choose_chord(family: &Family, prev: &Chord, rng: &mut impl Rng) -> Chord {
    let weights: Vec<u32> = family
        .chords
        .iter()
        .map(|chord| {
            let mut distance = (chord.interval as i32 - prev.interval as i32).abs();
            if distance > 6 {
                distance = 12 - distance;
            }
            DISTANCE_WEIGHTS[distance as usize]
        })
        .collect();

    let dist = WeightedIndex::new(&weights).expect("distance weights are positive");
    family.chords[dist.sample(rng)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopsmith_theory::note::KeyQuality;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_loop(seed: u64, measures: usize, tension: u8) -> (Loop, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let lp = Loop::new(measures, tension, 2, &mut rng);
        (lp, rng)
    }

    /// Walk the shell state machine the way construct_harmony does.
    fn shell_progression(lp: &Loop, catalog: &Catalog, rng: &mut impl Rng) -> Vec<Chord> {
        let mut chords = Vec::new();
        let mut prev: Option<Chord> = None;
        for measure in 0..lp.measures {
            let chord = shell_chord(lp, catalog, measure, prev.as_ref(), rng);
            prev = Some(chord);
            chords.push(chord);
        }
        chords
    }

    #[test]
    fn first_measure_is_always_the_tonic() {
        let catalog = Catalog::default_catalog();
        for seed in 0..64 {
            for tension in 0..=4 {
                let (lp, mut rng) = test_loop(seed, 4, tension);
                let chords = shell_progression(&lp, &catalog, &mut rng);
                let expected = match lp.key.quality {
                    KeyQuality::Major => ChordName::IMaj,
                    KeyQuality::Minor => ChordName::IMin,
                };
                assert_eq!(chords[0].name, expected);
            }
        }
    }

    #[test]
    fn final_measure_never_holds_an_unresolved_dominant() {
        let catalog = Catalog::default_catalog();
        for seed in 0..128 {
            for tension in 0..=4 {
                let (lp, mut rng) = test_loop(seed, 4, tension);
                let chords = shell_progression(&lp, &catalog, &mut rng);
                let last = chords.last().unwrap();
                assert!(
                    last.quality != Quality::Dominant || last.name == ChordName::V7,
                    "seed {seed} tension {tension} ended on {:?}",
                    last.name
                );
            }
        }
    }

    #[test]
    fn dominants_resolve_by_fifth_second_or_half_step() {
        let catalog = Catalog::default_catalog();
        for seed in 0..128 {
            let (lp, mut rng) = test_loop(seed, 8, 4);
            let chords = shell_progression(&lp, &catalog, &mut rng);
            for pair in chords.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                if prev.quality != Quality::Dominant {
                    continue;
                }
                // bVII7 resolves via the tonic reset instead.
                if prev.name == ChordName::FlatVii7 {
                    continue;
                }
                let distance = (prev.interval + 12 - next.interval) % 12;
                assert!(
                    matches!(distance, 7 | 10 | 1) || next.name == ChordName::V7,
                    "seed {seed}: {:?} moved to {:?} (distance {distance})",
                    prev.name,
                    next.name
                );
            }
        }
    }

    #[test]
    fn chosen_families_always_have_positive_weight() {
        let catalog = Catalog::default_catalog();
        for seed in 0..32 {
            for tension in 0..=4 {
                let (lp, mut rng) = test_loop(seed, 4, tension);
                for _ in 0..50 {
                    let family = choose_family(&lp, &catalog, &mut rng);
                    assert!(
                        family.weight(lp.key.quality, lp.tension) > 0,
                        "drew zero-weight family {:?} at tension {tension}",
                        family.name
                    );
                }
            }
        }
    }

    #[test]
    fn chord_choice_comes_from_the_given_family() {
        let catalog = Catalog::default_catalog();
        let mut rng = StdRng::seed_from_u64(1);
        let family = catalog.family(loopsmith_theory::family::FamilyName::DiatonicMinor);
        let prev = loopsmith_theory::chord::I_MAJ;
        for _ in 0..50 {
            let chord = choose_chord(family, &prev, &mut rng);
            assert!(family.chords.contains(&chord));
        }
    }
}
