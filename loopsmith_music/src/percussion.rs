// Percussion generation.
//
// Four independent lanes over the same slot grid: kick, snare, closed hat,
// open hat. Each lane generates a fresh pattern for measure 0, the final
// measure, and (50% of the time, decided per lane) the halfway measure;
// every other measure copies measure 0 verbatim, which keeps the kit
// locked-in while the edges of the loop breathe.
//
// The kick couples to the shared accent mask through its hit probability;
// the open hat can land on an accented slot. Snare and closed hat ignore
// the mask entirely.

use rand::Rng;
use serde::Serialize;

use crate::grid::{Grid, SLOTS_PER_MEASURE};
use crate::loops::Loop;

/// The four drum lanes. `true` slots are hits.
#[derive(Debug, Clone, Serialize)]
pub struct DrumTrack {
    pub kick: Grid<bool>,
    pub snare: Grid<bool>,
    pub closed_hat: Grid<bool>,
    pub open_hat: Grid<bool>,
}

/// Build all four drum lanes.
pub fn construct_percussion(lp: &Loop, rng: &mut impl Rng) -> DrumTrack {
    DrumTrack {
        kick: build_lane(lp, rng, write_kicks),
        snare: build_lane(lp, rng, |_, grid, measure, _| write_snares(grid, measure)),
        closed_hat: build_lane(lp, rng, |_, grid, measure, rng| {
            write_closed_hats(grid, measure, rng)
        }),
        open_hat: build_lane(lp, rng, write_open_hats),
    }
}

/// One lane: fresh patterns at the loop's edges (and maybe the midpoint),
/// measure-0 copies everywhere else.
fn build_lane<R: Rng>(
    lp: &Loop,
    rng: &mut R,
    write: impl Fn(&Loop, &mut Grid<bool>, usize, &mut R),
) -> Grid<bool> {
    let mut grid: Grid<bool> = Grid::new(lp.measures);
    for measure in 0..lp.measures {
        let fresh = measure == 0
            || measure == lp.measures - 1
            || ((measure + 1) * 2 == lp.measures && rng.random_range(0..2) == 0);
        if fresh {
            write(lp, &mut grid, measure, rng);
        } else {
            grid.copy_measure(0, measure);
        }
    }
    grid
}

/// Kick: beats 1 and 3 (slots 0 and 4) always hit; slots 2 and 6 never do;
/// the rest hit probabilistically, with the draw range widened on
/// non-accented slots.
fn write_kicks(lp: &Loop, grid: &mut Grid<bool>, measure: usize, rng: &mut impl Rng) {
    let base = measure * SLOTS_PER_MEASURE;
    for offset in 0..SLOTS_PER_MEASURE {
        let spread = if lp.accents[offset] { 2 } else { 4 };
        let hit = if offset == 0 || offset == 4 {
            true
        } else {
            offset != 2 && offset != 6 && rng.random_range(0..=spread) < 2
        };
        grid.set(base + offset, hit);
    }
}

/// Snare: a fixed backbeat on slots 2 and 6.
fn write_snares(grid: &mut Grid<bool>, measure: usize) {
    let base = measure * SLOTS_PER_MEASURE;
    for offset in 0..SLOTS_PER_MEASURE {
        grid.set(base + offset, offset == 2 || offset == 6);
    }
}

/// Closed hat: even or odd eighths (50/50), overridden to straight eighths
/// a third of the time.
fn write_closed_hats(grid: &mut Grid<bool>, measure: usize, rng: &mut impl Rng) {
    let base = measure * SLOTS_PER_MEASURE;
    let parity = if rng.random_range(0..2) == 0 { 0 } else { 1 };
    let mut hits = [false; SLOTS_PER_MEASURE];
    for (offset, hit) in hits.iter_mut().enumerate() {
        *hit = offset % 2 == parity;
    }
    if rng.random_range(0..=2) == 0 {
        hits = [true; SLOTS_PER_MEASURE];
    }
    for (offset, hit) in hits.iter().enumerate() {
        grid.set(base + offset, *hit);
    }
}

/// Open hat: at most one accent hit per fresh measure, on a fixed slot or on
/// a slot from the accent mask.
fn write_open_hats(lp: &Loop, grid: &mut Grid<bool>, measure: usize, rng: &mut impl Rng) {
    let base = measure * SLOTS_PER_MEASURE;
    let mut hits = [false; SLOTS_PER_MEASURE];

    if rng.random_range(0..=4) < 2 {
        let slots = [0, 3, 4, 7];
        hits[slots[rng.random_range(0..slots.len())]] = true;
    } else if rng.random_range(0..=4) < 2 {
        let accented: Vec<usize> = (0..SLOTS_PER_MEASURE).filter(|&i| lp.accents[i]).collect();
        hits[accented[rng.random_range(0..accented.len())]] = true;
    }

    for (offset, hit) in hits.iter().enumerate() {
        grid.set(base + offset, *hit);
    }
}
