// Voicing selection and voice leading.
//
// Given a chord and the loop's depth, pick a concrete spelling: start from a
// fresh copy of the quality's voicing table, retune it for exceptional
// chords, keep only voicings of exactly the loop's depth, and pick one at
// random. The result is an ordered pitch-class list; spelled names are only
// derived at render time.
//
// If a previous voicing exists, the best inversion (cyclic rotation of the
// voice list) is chosen greedily: rotations that put a half step between the
// bottom two or top two voices are penalized out, then the rotation with the
// smallest summed per-voice motion wins. Each chord change is resolved
// independently; there is no look-ahead.

use rand::Rng;
use serde::Serialize;

use loopsmith_theory::chord::{Chord, ChordName};
use loopsmith_theory::family::Catalog;
use loopsmith_theory::note::{Accidental, Key, KeyQuality};
use loopsmith_theory::voicing::{Voicing, fresh_voicings};

/// A chord voiced to concrete pitch classes, with the spelling style its
/// names use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicedChord {
    /// Ordered pitch classes (semitones above A), bottom voice first.
    pub pcs: Vec<u8>,
    pub style: Accidental,
}

impl VoicedChord {
    /// Spelled note names, bottom voice first.
    pub fn names(&self) -> Vec<&'static str> {
        let table = self.style.table();
        self.pcs.iter().map(|&pc| table[pc as usize]).collect()
    }
}

/// Voice a chord for the loop's depth, resolving the inversion against the
/// previous voicing when there is one.
pub fn voice_chord(
    chord: &Chord,
    key: &Key,
    depth: u8,
    catalog: &Catalog,
    prev: Option<&VoicedChord>,
    rng: &mut impl Rng,
) -> VoicedChord {
    let tables = fresh_voicings();
    let mut options: Vec<Voicing> = tables.for_quality(chord.quality).to_vec();

    // Exceptional chords edit their fresh copy of the table before the
    // depth filter.
    match chord.name {
        ChordName::IMaj => {
            // The tonic major never plays a raised 11th.
            options.remove(8);
            options.remove(7);
            options.remove(4);
        }
        ChordName::IiiMin => {
            // III- also avoids the raised 4th relative to the key.
            options[5].offsets[0] = 0;
            options.remove(3);
        }
        ChordName::V7OfIi => {
            // 13 -> b13.
            options[1].offsets[1] = 8;
            options[3].offsets[2] = 8;
            options[4].offsets[3] = 8;
            options[4].offsets[2] = 6;
        }
        ChordName::V7OfIii | ChordName::V7OfVi => {
            retune_altered_dominant(&mut options, rng);
        }
        ChordName::V7 if key.quality == KeyQuality::Minor => {
            retune_altered_dominant(&mut options, rng);
        }
        _ => {}
    }

    let candidates: Vec<&Voicing> = options.iter().filter(|v| v.depth == depth).collect();
    assert!(
        !candidates.is_empty(),
        "no depth-{depth} voicing available for {:?}",
        chord.name
    );
    let voicing = candidates[rng.random_range(0..candidates.len())];

    let style = catalog.chord_accidental(chord, key);
    let root_pc = (key.root_pc + chord.interval) % 12;
    let pcs: Vec<u8> = voicing
        .offsets
        .iter()
        .map(|&offset| (root_pc + offset) % 12)
        .collect();

    let pcs = match prev {
        Some(prev) => best_inversion(&pcs, &prev.pcs),
        None => pcs,
    };

    VoicedChord { pcs, style }
}

/// 9 -> b9/#9 and 13 -> b13, for dominants resolving to minor-flavored
/// targets.
fn retune_altered_dominant(options: &mut [Voicing], rng: &mut impl Rng) {
    options[1].offsets[1] = 8;
    options[3].offsets[2] = 8;
    options[3].offsets[0] = if rng.random_range(0..2) == 0 { 1 } else { 3 };
    options[4].offsets[3] = 8;
    options[4].offsets[2] = 6;
    options[4].offsets[0] = if rng.random_range(0..2) == 0 { 1 } else { 3 };
}

/// Pick the cyclic rotation of `pcs` closest to `prev` by summed per-voice
/// motion. Deterministic: ties go to the earliest rotation.
pub fn best_inversion(pcs: &[u8], prev: &[u8]) -> Vec<u8> {
    let voices = pcs.len();
    debug_assert_eq!(voices, prev.len(), "voice counts must match across chords");

    let mut best: Option<(i32, Vec<u8>)> = None;
    for rotation in 0..voices {
        let candidate: Vec<u8> = (0..voices)
            .map(|i| pcs[(rotation + i) % voices])
            .collect();

        let mut distance = 0i32;
        // Half steps at the very top or bottom of a voicing sound muddy;
        // push those rotations out of contention.
        if voices > 3 {
            let low = (candidate[0] as i32 - candidate[1] as i32).abs();
            let high = (candidate[2] as i32 - candidate[3] as i32).abs();
            if low == 1 || high == 1 {
                distance += 100;
            }
        }

        for (&voice, &prev_voice) in candidate.iter().zip(prev) {
            let mut interval = (voice as i32 - prev_voice as i32).abs();
            if interval > 6 {
                interval = 12 - interval;
            }
            distance += interval;
        }

        match &best {
            Some((best_distance, _)) if *best_distance <= distance => {}
            _ => best = Some((distance, candidate)),
        }
    }

    best.expect("voicing has at least one voice").1
}
