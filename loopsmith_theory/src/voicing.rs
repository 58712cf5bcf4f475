// Voicing tables.
//
// A voicing is a set of semitone offsets from the chord root, tagged with a
// depth rating (0 = bare two-voice shell, 4 = five-voice extended). The
// tables are indexed by chord quality; the voicing engine filters to the
// loop's exact depth and may retune individual offsets for exceptional
// chords before picking.
//
// `fresh_voicings()` allocates new tables on every call. Callers own the
// result outright and may edit it destructively; edits can never bleed into
// another chord or a later generation run.

use serde::{Deserialize, Serialize};

use crate::chord::Quality;

/// One chord spelling: 2-5 semitone offsets from the root, plus how extended
/// it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voicing {
    pub offsets: Vec<u8>,
    pub depth: u8,
}

impl Voicing {
    pub fn new(offsets: Vec<u8>, depth: u8) -> Self {
        Voicing { offsets, depth }
    }
}

/// Per-quality voicing tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicingTables {
    pub major: Vec<Voicing>,
    pub minor: Vec<Voicing>,
    pub dominant: Vec<Voicing>,
}

impl VoicingTables {
    pub fn for_quality(&self, quality: Quality) -> &[Voicing] {
        match quality {
            Quality::Major => &self.major,
            Quality::Minor => &self.minor,
            Quality::Dominant => &self.dominant,
        }
    }
}

/// Build a fresh, independent copy of the voicing tables.
pub fn fresh_voicings() -> VoicingTables {
    VoicingTables {
        major: vec![
            Voicing::new(vec![4, 7], 0),
            Voicing::new(vec![2, 4, 7], 1),
            Voicing::new(vec![4, 7, 9], 1),
            Voicing::new(vec![0, 4, 7, 11], 2),
            Voicing::new(vec![4, 6, 7, 11], 3),
            Voicing::new(vec![4, 7, 9, 11], 3),
            Voicing::new(vec![2, 4, 7, 11], 3),
            Voicing::new(vec![4, 6, 7, 9, 11], 4),
            Voicing::new(vec![2, 4, 6, 7, 11], 4),
            Voicing::new(vec![2, 4, 7, 9, 11], 4),
        ],
        minor: vec![
            Voicing::new(vec![3, 7], 0),
            Voicing::new(vec![0, 3, 7], 1),
            Voicing::new(vec![0, 3, 7, 10], 2),
            Voicing::new(vec![2, 3, 7, 10], 3),
            Voicing::new(vec![3, 5, 7, 10], 3),
            Voicing::new(vec![2, 3, 5, 7, 10], 4),
        ],
        dominant: vec![
            Voicing::new(vec![4, 10], 0),
            Voicing::new(vec![4, 7, 10], 1),
            Voicing::new(vec![0, 4, 7, 10], 2),
            Voicing::new(vec![2, 4, 9, 10], 3),
            Voicing::new(vec![2, 4, 7, 9, 10], 4),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tables_are_independent() {
        let a = fresh_voicings();
        let mut b = fresh_voicings();
        assert_eq!(a, b);

        // Destructive edits to one copy must not show up in the other.
        b.dominant[1].offsets[1] = 8;
        b.major.remove(4);
        let c = fresh_voicings();
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn every_depth_is_available_per_quality() {
        let tables = fresh_voicings();
        for quality in [Quality::Major, Quality::Minor, Quality::Dominant] {
            for depth in 0..=4u8 {
                assert!(
                    tables.for_quality(quality).iter().any(|v| v.depth == depth),
                    "{quality:?} has no depth-{depth} voicing"
                );
            }
        }
    }

    #[test]
    fn voice_count_is_determined_by_depth() {
        // Voice-leading rotation matches voices pairwise between successive
        // chords, so every voicing of a given depth must have the same size.
        let tables = fresh_voicings();
        let expected = |depth: u8| match depth {
            0 => 2,
            1 => 3,
            2 | 3 => 4,
            _ => 5,
        };
        for table in [&tables.major, &tables.minor, &tables.dominant] {
            for voicing in table {
                assert_eq!(voicing.offsets.len(), expected(voicing.depth));
            }
        }
    }
}
