// Chords and chord scales.
//
// A `Chord` is a value object: a symbolic name, a quality, and the distance
// in semitones between its root and the tonic. The catalog chords live here
// as constants; `family.rs` groups them into functional families.
//
// `Chord::scale` derives the melodic material for a chord: guide tones (the
// quality-defining 3rd and 7th), shell tones (root and 5th), and color tones
// (available tensions). A handful of chords retune or drop individual tones.

use serde::{Deserialize, Serialize};

use crate::note::KeyQuality;

/// Chord quality. Dominant is kept distinct from major because resolution
/// logic and chord scales treat it differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Major,
    Minor,
    Dominant,
}

/// Symbolic chord identity, named relative to the tonic.
///
/// `RelTwo` and `RelTwoHalfDim` are the ad-hoc relative-ii chords inserted in
/// front of dominants during passing-chord decoration; they never appear in
/// the family catalog and carry whatever interval the insertion computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordName {
    IMaj,
    IvMaj,
    V7,
    IiMin,
    IiiMin,
    ViMin,
    V7OfIi,
    V7OfIii,
    V7OfIv,
    V7OfV,
    V7OfVi,
    V7OfFlatVi,
    V7OfFlatIi,
    FlatIiMaj,
    FlatIiiMaj,
    FlatViMaj,
    FlatViiMaj,
    IMin,
    IvMin,
    VMin,
    FlatVii7,
    SubV7OfI,
    SubV7OfIi,
    SubV7OfIv,
    SubV7OfV,
    SubV7OfFlatIi,
    SubV7OfFlatIii,
    SubV7OfFlatVi,
    RelTwo,
    RelTwoHalfDim,
}

impl ChordName {
    /// True for the tritone-substitute dominants (subV7/x).
    pub fn is_tritone_sub(self) -> bool {
        matches!(
            self,
            ChordName::SubV7OfI
                | ChordName::SubV7OfIi
                | ChordName::SubV7OfIv
                | ChordName::SubV7OfV
                | ChordName::SubV7OfFlatIi
                | ChordName::SubV7OfFlatIii
                | ChordName::SubV7OfFlatVi
        )
    }

    /// Roman-numeral style symbol, as used in progression displays.
    pub fn symbol(self) -> &'static str {
        match self {
            ChordName::IMaj => "Imaj",
            ChordName::IvMaj => "IVmaj",
            ChordName::V7 => "V7",
            ChordName::IiMin => "II-",
            ChordName::IiiMin => "III-",
            ChordName::ViMin => "VI-",
            ChordName::V7OfIi => "V7/II",
            ChordName::V7OfIii => "V7/III",
            ChordName::V7OfIv => "V7/IV",
            ChordName::V7OfV => "V7/V",
            ChordName::V7OfVi => "V7/VI",
            ChordName::V7OfFlatVi => "V7/bVI",
            ChordName::V7OfFlatIi => "V7/bII",
            ChordName::FlatIiMaj => "bIImaj",
            ChordName::FlatIiiMaj => "bIIImaj",
            ChordName::FlatViMaj => "bVImaj",
            ChordName::FlatViiMaj => "bVIImaj",
            ChordName::IMin => "I-",
            ChordName::IvMin => "IV-",
            ChordName::VMin => "V-",
            ChordName::FlatVii7 => "bVII7",
            ChordName::SubV7OfI => "subV7/I",
            ChordName::SubV7OfIi => "subV7/II",
            ChordName::SubV7OfIv => "subV7/IV",
            ChordName::SubV7OfV => "subV7/V",
            ChordName::SubV7OfFlatIi => "subV7/bII",
            ChordName::SubV7OfFlatIii => "subV7/bIII",
            ChordName::SubV7OfFlatVi => "subV7/bVI",
            ChordName::RelTwo => "relII-",
            ChordName::RelTwoHalfDim => "relII-7b5",
        }
    }
}

/// A chord: symbolic name, quality, and semitone interval from the tonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub name: ChordName,
    pub quality: Quality,
    pub interval: u8,
}

impl Chord {
    pub const fn new(name: ChordName, quality: Quality, interval: u8) -> Self {
        Chord {
            name,
            quality,
            interval,
        }
    }

    /// The chord's melodic material, as semitone offsets from its root.
    ///
    /// Weighting between the three sets is the melody/bass engines' business;
    /// this only decides which degrees are available.
    pub fn scale(&self, key_quality: KeyQuality, depth: u8) -> ChordScale {
        let mut scale = match self.quality {
            Quality::Major => ChordScale {
                guide: vec![4, 11],
                shell: vec![0, 7],
                color: vec![2, 6, 9],
            },
            Quality::Minor => ChordScale {
                guide: vec![3, 10],
                shell: vec![0, 7],
                color: vec![2, 5, 9],
            },
            Quality::Dominant => ChordScale {
                guide: vec![4, 10],
                shell: vec![0, 7],
                color: vec![2, 9],
            },
        };

        match self.quality {
            Quality::Major => {
                // The tonic major avoids the raised 11th.
                if self.name == ChordName::IMaj {
                    scale.color.retain(|&d| d != 6);
                }
                // At higher depth the root is left to the bass.
                if depth >= 2 {
                    scale.shell.retain(|&d| d != 0);
                }
            }
            Quality::Minor => {
                if matches!(
                    self.name,
                    ChordName::IiMin | ChordName::RelTwo | ChordName::VMin | ChordName::IMin
                ) {
                    scale.color.retain(|&d| d != 9);
                }
                if self.name == ChordName::IiiMin {
                    scale.color.retain(|&d| d != 2);
                }
                if self.name == ChordName::RelTwoHalfDim {
                    scale.shell = vec![0, 6];
                    scale.color = vec![5, 8];
                }
            }
            Quality::Dominant => {
                if self.name == ChordName::V7OfIi {
                    scale.color = vec![2, 8];
                } else if matches!(self.name, ChordName::V7OfIii | ChordName::V7OfVi)
                    || (self.name == ChordName::V7 && key_quality == KeyQuality::Minor)
                {
                    scale.color = vec![1, 3, 8];
                }
            }
        }

        scale
    }
}

/// Scale-degree material for one chord: guide, shell, and color tone sets,
/// each as semitone offsets from the chord root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordScale {
    pub guide: Vec<u8>,
    pub shell: Vec<u8>,
    pub color: Vec<u8>,
}

// The chord catalog. Grouped into families in family.rs.

pub const I_MAJ: Chord = Chord::new(ChordName::IMaj, Quality::Major, 0);
pub const IV_MAJ: Chord = Chord::new(ChordName::IvMaj, Quality::Major, 5);

pub const V_7: Chord = Chord::new(ChordName::V7, Quality::Dominant, 7);

pub const II_MIN: Chord = Chord::new(ChordName::IiMin, Quality::Minor, 2);
pub const III_MIN: Chord = Chord::new(ChordName::IiiMin, Quality::Minor, 4);
pub const VI_MIN: Chord = Chord::new(ChordName::ViMin, Quality::Minor, 9);

pub const V7_OF_II: Chord = Chord::new(ChordName::V7OfIi, Quality::Dominant, 9);
pub const V7_OF_III: Chord = Chord::new(ChordName::V7OfIii, Quality::Dominant, 11);
pub const V7_OF_IV: Chord = Chord::new(ChordName::V7OfIv, Quality::Dominant, 0);
pub const V7_OF_V: Chord = Chord::new(ChordName::V7OfV, Quality::Dominant, 2);
pub const V7_OF_VI: Chord = Chord::new(ChordName::V7OfVi, Quality::Dominant, 4);

pub const V7_OF_FLAT_VI: Chord = Chord::new(ChordName::V7OfFlatVi, Quality::Dominant, 3);
pub const V7_OF_FLAT_II: Chord = Chord::new(ChordName::V7OfFlatIi, Quality::Dominant, 8);

pub const FLAT_II_MAJ: Chord = Chord::new(ChordName::FlatIiMaj, Quality::Major, 1);
pub const FLAT_III_MAJ: Chord = Chord::new(ChordName::FlatIiiMaj, Quality::Major, 3);
pub const FLAT_VI_MAJ: Chord = Chord::new(ChordName::FlatViMaj, Quality::Major, 8);
pub const FLAT_VII_MAJ: Chord = Chord::new(ChordName::FlatViiMaj, Quality::Major, 10);

pub const I_MIN: Chord = Chord::new(ChordName::IMin, Quality::Minor, 0);
pub const IV_MIN: Chord = Chord::new(ChordName::IvMin, Quality::Minor, 5);
pub const V_MIN: Chord = Chord::new(ChordName::VMin, Quality::Minor, 7);

pub const FLAT_VII_7: Chord = Chord::new(ChordName::FlatVii7, Quality::Dominant, 10);

pub const SUB_V7_OF_I: Chord = Chord::new(ChordName::SubV7OfI, Quality::Dominant, 1);
pub const SUB_V7_OF_II: Chord = Chord::new(ChordName::SubV7OfIi, Quality::Dominant, 3);
pub const SUB_V7_OF_IV: Chord = Chord::new(ChordName::SubV7OfIv, Quality::Dominant, 6);
pub const SUB_V7_OF_V: Chord = Chord::new(ChordName::SubV7OfV, Quality::Dominant, 8);

pub const SUB_V7_OF_FLAT_II: Chord = Chord::new(ChordName::SubV7OfFlatIi, Quality::Dominant, 2);
pub const SUB_V7_OF_FLAT_III: Chord = Chord::new(ChordName::SubV7OfFlatIii, Quality::Dominant, 4);
pub const SUB_V7_OF_FLAT_VI: Chord = Chord::new(ChordName::SubV7OfFlatVi, Quality::Dominant, 9);
