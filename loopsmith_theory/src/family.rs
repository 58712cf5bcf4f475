// Chord families and the catalog.
//
// A family groups chords that share a harmonic function, plus a tritone
// affinity (0..=4) describing how much dominant-flavored tension the family
// carries. The loop's tension knob is matched against that affinity to
// weight the family draw.
//
// `Catalog::default_catalog()` builds the whole immutable registry once; the
// generator takes it by reference everywhere (no module-level mutable state).

use serde::{Deserialize, Serialize};

use crate::chord::{self, Chord, ChordName, Quality};
use crate::note::{Accidental, Key, KeyQuality, NOTES_FLAT, NOTES_SHARP, spelling_style};

/// The ten functional families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyName {
    DiatonicMajor,
    PrimaryDominant,
    DiatonicMinor,
    MajorSecondaryDominants,
    MinorSecondaryDominants,
    MinorKeyMajor,
    MinorKeyMinor,
    MinorKeyDominant,
    MajorSubstituteDominants,
    MinorSubstituteDominants,
}

/// A named group of chords sharing a harmonic function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub name: FamilyName,
    pub chords: Vec<Chord>,
    /// Tension affinity, 0 (plain diatonic) to 4 (chromatic dominant).
    pub tritone: u8,
}

impl Family {
    /// Selection weight for this family given the loop's key quality and
    /// tension. Never negative: families the formula pushes below zero get
    /// zero mass and must be excluded from the draw.
    ///
    /// The base curve rewards families whose tritone affinity sits near the
    /// requested tension; the named overrides keep diatonic material
    /// minimally present at high tension and suppress dominants at low
    /// tension.
    pub fn weight(&self, key_quality: KeyQuality, tension: u8) -> u32 {
        let diff = self.tritone as f64 - tension as f64;
        let mut weight = (15.0 - diff * diff * 2.5) as i64;

        match key_quality {
            KeyQuality::Major => {
                if matches!(
                    self.name,
                    FamilyName::PrimaryDominant
                        | FamilyName::DiatonicMajor
                        | FamilyName::DiatonicMinor
                ) && tension > 2
                {
                    weight = 2;
                }
                if matches!(
                    self.name,
                    FamilyName::MinorKeyDominant | FamilyName::PrimaryDominant
                ) {
                    weight = if tension < 2 { 0 } else { 2 };
                }
                if self.name == FamilyName::MinorSecondaryDominants {
                    weight = 1;
                }
            }
            KeyQuality::Minor => {
                if matches!(self.name, FamilyName::MinorKeyMinor | FamilyName::MinorKeyMajor) {
                    weight = 2;
                }
                if matches!(
                    self.name,
                    FamilyName::DiatonicMajor
                        | FamilyName::DiatonicMinor
                        | FamilyName::MajorSecondaryDominants
                ) {
                    weight = 1;
                }
            }
        }

        weight.max(0) as u32
    }
}

/// The immutable chord/family registry. Built once, shared by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub families: Vec<Family>,
}

impl Catalog {
    /// The built-in catalog: ten families over 28 chords.
    pub fn default_catalog() -> Self {
        let families = vec![
            Family {
                name: FamilyName::DiatonicMajor,
                chords: vec![chord::I_MAJ, chord::IV_MAJ],
                tritone: 0,
            },
            Family {
                name: FamilyName::PrimaryDominant,
                chords: vec![chord::V_7],
                tritone: 2,
            },
            Family {
                name: FamilyName::DiatonicMinor,
                chords: vec![chord::II_MIN, chord::III_MIN, chord::VI_MIN],
                tritone: 0,
            },
            Family {
                name: FamilyName::MajorSecondaryDominants,
                chords: vec![
                    chord::V7_OF_II,
                    chord::V7_OF_III,
                    chord::V7_OF_IV,
                    chord::V7_OF_V,
                    chord::V7_OF_VI,
                ],
                tritone: 4,
            },
            Family {
                name: FamilyName::MinorSecondaryDominants,
                chords: vec![chord::V7_OF_FLAT_VI, chord::V7_OF_FLAT_II],
                tritone: 4,
            },
            Family {
                name: FamilyName::MinorKeyMajor,
                chords: vec![
                    chord::FLAT_II_MAJ,
                    chord::FLAT_III_MAJ,
                    chord::FLAT_VI_MAJ,
                    chord::FLAT_VII_MAJ,
                ],
                tritone: 1,
            },
            Family {
                name: FamilyName::MinorKeyMinor,
                chords: vec![chord::I_MIN, chord::IV_MIN, chord::V_MIN],
                tritone: 1,
            },
            Family {
                name: FamilyName::MinorKeyDominant,
                chords: vec![chord::FLAT_VII_7],
                tritone: 2,
            },
            Family {
                name: FamilyName::MajorSubstituteDominants,
                chords: vec![
                    chord::SUB_V7_OF_I,
                    chord::SUB_V7_OF_II,
                    chord::SUB_V7_OF_IV,
                    chord::SUB_V7_OF_V,
                ],
                tritone: 4,
            },
            Family {
                name: FamilyName::MinorSubstituteDominants,
                chords: vec![
                    chord::SUB_V7_OF_I,
                    chord::SUB_V7_OF_II,
                    chord::SUB_V7_OF_FLAT_III,
                    chord::SUB_V7_OF_IV,
                    chord::SUB_V7_OF_V,
                    chord::SUB_V7_OF_FLAT_VI,
                    chord::SUB_V7_OF_FLAT_II,
                ],
                tritone: 4,
            },
        ];
        Catalog { families }
    }

    pub fn family(&self, name: FamilyName) -> &Family {
        self.families
            .iter()
            .find(|f| f.name == name)
            .expect("catalog is missing a built-in family")
    }

    /// Whether the chord is diatonic to the given key quality.
    ///
    /// Major keys own the two diatonic families, the primary dominant, and
    /// the major secondary dominants; minor keys own the borrowed
    /// major/minor/dominant families and the minor secondary dominants. The
    /// ad-hoc relative-ii chords belong to no family and are never diatonic.
    pub fn is_diatonic(&self, chord: &Chord, key_quality: KeyQuality) -> bool {
        let family_names: [FamilyName; 4] = match key_quality {
            KeyQuality::Major => [
                FamilyName::DiatonicMajor,
                FamilyName::DiatonicMinor,
                FamilyName::PrimaryDominant,
                FamilyName::MajorSecondaryDominants,
            ],
            KeyQuality::Minor => [
                FamilyName::MinorKeyMajor,
                FamilyName::MinorKeyMinor,
                FamilyName::MinorKeyDominant,
                FamilyName::MinorSecondaryDominants,
            ],
        };
        family_names
            .iter()
            .any(|&name| self.family(name).chords.contains(chord))
    }

    /// The spelled root name of a chord in a key.
    ///
    /// Diatonic chords spell in the key's own style. Non-diatonic chords
    /// spell flat in major keys and sharp in minor keys; this asymmetry is a
    /// deliberate simplification and applies to the vast majority of cases.
    pub fn chord_root_name(&self, chord: &Chord, key: &Key) -> &'static str {
        let pc = ((key.root_pc + chord.interval) % 12) as usize;
        if self.is_diatonic(chord, key.quality) {
            key.accidental().table()[pc]
        } else {
            match key.quality {
                KeyQuality::Major => NOTES_FLAT[pc],
                KeyQuality::Minor => NOTES_SHARP[pc],
            }
        }
    }

    /// The concrete chord symbol in a key, e.g. "G7", "Ebmaj", "D-7b5".
    pub fn chord_symbol(&self, chord: &Chord, key: &Key) -> String {
        let root = self.chord_root_name(chord, key);
        let mut suffix = match chord.quality {
            Quality::Dominant => "7".to_string(),
            Quality::Major => "maj".to_string(),
            Quality::Minor => "-".to_string(),
        };
        if chord.name == ChordName::RelTwoHalfDim {
            suffix.push_str("7b5");
        }
        format!("{root}{suffix}")
    }

    /// Which spelling table a chord's notes use in a key.
    ///
    /// Diatonic chords inherit the key's style; non-diatonic chords take the
    /// style of the pseudo-key built from their spelled root (dominants count
    /// as major for this purpose).
    pub fn chord_accidental(&self, chord: &Chord, key: &Key) -> Accidental {
        if self.is_diatonic(chord, key.quality) {
            return key.accidental();
        }
        let quality = match chord.quality {
            Quality::Minor => KeyQuality::Minor,
            Quality::Major | Quality::Dominant => KeyQuality::Major,
        };
        spelling_style(self.chord_root_name(chord, key), quality)
    }
}
