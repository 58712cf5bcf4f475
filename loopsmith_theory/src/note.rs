// Note spelling and key selection.
//
// Both chromatic tables are rooted at A, so an index into either table is a
// pitch class (semitones above A). Spelling a pitch class means picking one
// of the two tables; which table applies is a fixed set-membership rule over
// the key's (or chord's) root name crossed with its quality.
//
// The non-diatonic spelling convention downstream (major key -> flats,
// minor key -> sharps) is a deliberate simplification of enharmonic practice
// and is relied on by the voicing and rendering code. Keep it as-is.

use serde::{Deserialize, Serialize};

/// Flat-side chromatic spelling, rooted at A.
pub const NOTES_FLAT: [&str; 12] = [
    "A", "Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab",
];

/// Sharp-side chromatic spelling, rooted at A.
pub const NOTES_SHARP: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Major-key roots that take the sharp table; everything else spells flat.
const MAJOR_SHARP_ROOTS: [&str; 11] = [
    "C", "D", "E", "G", "A", "B", "C#", "D#", "F#", "G#", "A#",
];

/// Minor-key roots that take the sharp table; everything else spells flat.
const MINOR_SHARP_ROOTS: [&str; 7] = ["E", "B", "F#", "C#", "G#", "D#", "A#"];

/// Which of the two spelling tables a key or chord uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    /// The spelling table for this accidental style.
    pub fn table(self) -> &'static [&'static str; 12] {
        match self {
            Accidental::Sharp => &NOTES_SHARP,
            Accidental::Flat => &NOTES_FLAT,
        }
    }
}

/// Major or minor. Chords additionally know `Quality::Dominant`; keys never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyQuality {
    Major,
    Minor,
}

/// The key of a loop: a root pitch class plus major/minor quality.
/// Immutable once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Pitch class of the root (semitones above A).
    pub root_pc: u8,
    pub quality: KeyQuality,
}

impl Key {
    pub fn new(root_pc: u8, quality: KeyQuality) -> Self {
        Key {
            root_pc: root_pc % 12,
            quality,
        }
    }

    /// The spelled root name. Major keys are drawn from the flat table,
    /// minor keys from the sharp table.
    pub fn root_name(&self) -> &'static str {
        match self.quality {
            KeyQuality::Major => NOTES_FLAT[self.root_pc as usize],
            KeyQuality::Minor => NOTES_SHARP[self.root_pc as usize],
        }
    }

    /// Whether this key spells with sharps or flats.
    pub fn accidental(&self) -> Accidental {
        spelling_style(self.root_name(), self.quality)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quality = match self.quality {
            KeyQuality::Major => "major",
            KeyQuality::Minor => "minor",
        };
        write!(f, "{} {}", self.root_name(), quality)
    }
}

/// Sharp-or-flat spelling style for a root name and quality.
///
/// The membership sets cover enharmonic spellings too, so this also answers
/// for pseudo-keys built from a chord's spelled root.
pub fn spelling_style(root: &str, quality: KeyQuality) -> Accidental {
    let sharp = match quality {
        KeyQuality::Major => MAJOR_SHARP_ROOTS.contains(&root),
        KeyQuality::Minor => MINOR_SHARP_ROOTS.contains(&root),
    };
    if sharp { Accidental::Sharp } else { Accidental::Flat }
}

/// Pitch class (semitones above A) of a spelled note name, from either table.
pub fn pitch_class(name: &str) -> Option<u8> {
    NOTES_FLAT
        .iter()
        .position(|&n| n == name)
        .or_else(|| NOTES_SHARP.iter().position(|&n| n == name))
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_share_pitch_classes() {
        // Naturals sit at the same index in both tables.
        for name in ["A", "B", "C", "D", "E", "F", "G"] {
            let flat = NOTES_FLAT.iter().position(|&n| n == name);
            let sharp = NOTES_SHARP.iter().position(|&n| n == name);
            assert_eq!(flat, sharp, "{name} should share an index");
        }
        // Enharmonic pairs share an index across tables.
        assert_eq!(pitch_class("Bb"), pitch_class("A#"));
        assert_eq!(pitch_class("Db"), pitch_class("C#"));
        assert_eq!(pitch_class("Gb"), pitch_class("F#"));
    }

    #[test]
    fn key_spelling_styles() {
        let c_major = Key::new(pitch_class("C").unwrap(), KeyQuality::Major);
        assert_eq!(c_major.accidental(), Accidental::Sharp);

        let ab_major = Key::new(pitch_class("Ab").unwrap(), KeyQuality::Major);
        assert_eq!(ab_major.accidental(), Accidental::Flat);

        let e_minor = Key::new(pitch_class("E").unwrap(), KeyQuality::Minor);
        assert_eq!(e_minor.accidental(), Accidental::Sharp);

        let d_minor = Key::new(pitch_class("D").unwrap(), KeyQuality::Minor);
        assert_eq!(d_minor.accidental(), Accidental::Flat);
    }

    #[test]
    fn root_names_follow_key_quality() {
        // Major keys spell from the flat table, minor keys from the sharp table.
        let pc = pitch_class("Bb").unwrap();
        assert_eq!(Key::new(pc, KeyQuality::Major).root_name(), "Bb");
        assert_eq!(Key::new(pc, KeyQuality::Minor).root_name(), "A#");
    }

    #[test]
    fn display_formats_key() {
        let key = Key::new(pitch_class("Eb").unwrap(), KeyQuality::Major);
        assert_eq!(key.to_string(), "Eb major");
    }
}
