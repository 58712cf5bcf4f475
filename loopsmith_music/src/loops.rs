// The Loop aggregate and the generation pipeline.
//
// A `Loop` owns the invariable attributes of one generated loop: measure
// count, key, tension, depth, and the 8-slot accent mask that all
// instrumental layers consult for loose rhythmic coordination. The variable
// content (grids per layer) is produced by `generate`, which runs the
// engines in their required dependency order: harmony first, then melody and
// bass (both read the harmony grids), then percussion.
//
// Attribute ranges are the caller's contract: tension and depth must already
// be in 0..=4 (debug-asserted here, not validated).

use rand::Rng;
use serde::Serialize;

use loopsmith_theory::family::Catalog;
use loopsmith_theory::note::{Key, KeyQuality, NOTES_FLAT, NOTES_SHARP};

use crate::bass::{BassTrack, construct_bass};
use crate::grid::SLOTS_PER_MEASURE;
use crate::harmony::{HarmonyTrack, construct_harmony};
use crate::melody::{MelodyTrack, construct_melody};
use crate::percussion::{DrumTrack, construct_percussion};

/// Fundamental attributes of one loop. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Loop {
    pub measures: usize,
    pub key: Key,
    /// How much dominant/chromatic harmony, 0..=4.
    pub tension: u8,
    /// How extended the chord voicings are, 0..=4.
    pub depth: u8,
    /// Salient-beat mask shared by all layers: true slots are metrically
    /// important and the layers bias attacks toward (or away from) them.
    pub accents: [bool; SLOTS_PER_MEASURE],
}

impl Loop {
    /// Construct a loop with a random key and accent mask.
    pub fn new(measures: usize, tension: u8, depth: u8, rng: &mut impl Rng) -> Self {
        debug_assert!(tension <= 4, "tension out of range: {tension}");
        debug_assert!(depth <= 4, "depth out of range: {depth}");
        Loop {
            measures,
            key: random_key(rng),
            tension,
            depth,
            accents: accent_mask(rng),
        }
    }

    /// Construct a loop from a single intensity rating: tension and depth
    /// each land within one step of the intensity, independently.
    pub fn from_intensity(measures: usize, intensity: u8, rng: &mut impl Rng) -> Self {
        debug_assert!(intensity <= 4, "intensity out of range: {intensity}");
        let key = random_key(rng);
        let depth = jitter(intensity, rng);
        let tension = jitter(intensity, rng);
        Loop {
            measures,
            key,
            tension,
            depth,
            accents: accent_mask(rng),
        }
    }

    /// Total slot count of every uncompressed grid stage.
    pub fn slot_count(&self) -> usize {
        self.measures * SLOTS_PER_MEASURE
    }

    /// Run the whole pipeline and return the finished layer grids.
    pub fn generate(&self, catalog: &Catalog, rng: &mut impl Rng) -> LoopTracks {
        let harmony = construct_harmony(self, catalog, rng);
        let melody = construct_melody(self, catalog, &harmony, rng);
        let bass = construct_bass(self, catalog, &harmony, rng);
        let drums = construct_percussion(self, rng);
        LoopTracks {
            harmony,
            melody,
            bass,
            drums,
        }
    }
}

/// All generated layer grids for one loop.
#[derive(Debug, Clone, Serialize)]
pub struct LoopTracks {
    pub harmony: HarmonyTrack,
    pub melody: MelodyTrack,
    pub bass: BassTrack,
    pub drums: DrumTrack,
}

/// Draw a random key: a flat-spelled major key (Gb excluded) or a
/// sharp-spelled minor key (A# and D# excluded), 50/50.
fn random_key(rng: &mut impl Rng) -> Key {
    loop {
        if rng.random_range(0..2) == 0 {
            let pc = rng.random_range(0..12u8);
            if NOTES_FLAT[pc as usize] != "Gb" {
                return Key::new(pc, KeyQuality::Major);
            }
        } else {
            let pc = rng.random_range(0..12u8);
            let name = NOTES_SHARP[pc as usize];
            if name != "A#" && name != "D#" {
                return Key::new(pc, KeyQuality::Minor);
            }
        }
    }
}

fn jitter(intensity: u8, rng: &mut impl Rng) -> u8 {
    (intensity as i8 + rng.random_range(-1..=1)).clamp(0, 4) as u8
}

/// Draw the salient-beat mask: 1-4 marked slots (3 is the most likely
/// count), scattered by repeated low-probability sweeps so the mask has no
/// bias toward the front of the measure.
fn accent_mask(rng: &mut impl Rng) -> [bool; SLOTS_PER_MEASURE] {
    let counts = [1, 2, 2, 3, 3, 3, 3, 3, 3, 4, 4];
    let target = counts[rng.random_range(0..counts.len())];

    let mut mask = [false; SLOTS_PER_MEASURE];
    let mut hits = 0;
    loop {
        for slot in mask.iter_mut() {
            if hits == target {
                return mask;
            }
            if rng.random_range(0..=100) == 77 {
                *slot = true;
                hits += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn key_is_a_deterministic_function_of_the_seed() {
        for seed in 0..32 {
            let mut a = StdRng::seed_from_u64(seed);
            let mut b = StdRng::seed_from_u64(seed);
            assert_eq!(Loop::new(4, 2, 2, &mut a).key, Loop::new(4, 2, 2, &mut b).key);
        }
    }

    #[test]
    fn excluded_keys_are_never_drawn() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let key = random_key(&mut rng);
            assert!(!matches!(key.root_name(), "Gb" | "A#" | "D#"));
            match key.quality {
                KeyQuality::Major => assert!(NOTES_FLAT.contains(&key.root_name())),
                KeyQuality::Minor => assert!(NOTES_SHARP.contains(&key.root_name())),
            }
        }
    }

    #[test]
    fn accent_mask_marks_one_to_four_slots() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let mask = accent_mask(&mut rng);
            let hits = mask.iter().filter(|&&h| h).count();
            assert!((1..=4).contains(&hits), "unexpected accent count {hits}");
        }
    }

    #[test]
    fn intensity_jitter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(17);
        for intensity in 0..=4u8 {
            for _ in 0..100 {
                let lp = Loop::from_intensity(4, intensity, &mut rng);
                assert!(lp.tension <= 4);
                assert!(lp.depth <= 4);
                assert!((lp.tension as i8 - intensity as i8).abs() <= 1);
                assert!((lp.depth as i8 - intensity as i8).abs() <= 1);
            }
        }
    }
}
