// Loopsmith music-theory catalog.
//
// Static reference data consumed by the loop generator: chromatic note
// spelling tables, key selection and sharp/flat spelling rules, the chord
// and chord-family catalog, per-chord scale-degree sets, and the voicing
// tables.
//
// Everything here is immutable lookup data. The one exception to "lookup" is
// `voicing::fresh_voicings()`, which returns newly allocated tables on every
// call: the voicing engine is allowed to destructively retune a chord's
// voicing list per invocation (e.g. b9/b13 substitutions), and those edits
// must never leak into the next chord or the next generation run.
//
// Architecture:
// - note.rs: spelling tables, `Accidental`, `Key`, sharp/flat style rules
// - chord.rs: `Quality`, `ChordName`, `Chord`, chord scales (guide/shell/color)
// - family.rs: `Family`, the ten-family `Catalog`, weights, symbol rendering
// - voicing.rs: `Voicing` and the quality-indexed voicing tables

pub mod chord;
pub mod family;
pub mod note;
pub mod voicing;
