// The slot grid: the central timeline representation for loop generation.
//
// A grid is an arena of `measures x 8` slots at eighth-note resolution,
// addressed by absolute index, so neighbor lookups are plain index
// arithmetic and the logical timeline spans measure boundaries. Slots start
// empty and are filled in one pass per generation stage; a later stage reads
// the previous stage's grid and writes its own.
//
// `compress` run-length encodes a fully filled grid. Runs never cross a
// measure boundary: a chord held over a bar line stays two runs, one per
// measure. The slot-count invariant holds at every stage: an uncompressed
// grid has measures x 8 slots, and a compressed grid's run lengths sum to
// the same.

use serde::{Deserialize, Serialize};

/// Slots per 4/4 measure, i.e. eighth-note resolution.
pub const SLOTS_PER_MEASURE: usize = 8;

/// Rhythmic role of a slot: a new note, a continuation, or silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Attack,
    Sustain,
    Rest,
}

/// A resolved slot value: a spelled pitch name or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    Rest,
    Note(&'static str),
}

/// A grid of optional slot values spanning the whole loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    measures: usize,
    slots: Vec<Option<T>>,
}

impl<T> Grid<T> {
    /// Create an empty grid for the given measure count.
    pub fn new(measures: usize) -> Self {
        let mut slots = Vec::with_capacity(measures * SLOTS_PER_MEASURE);
        slots.resize_with(measures * SLOTS_PER_MEASURE, || None);
        Grid { measures, slots }
    }

    pub fn measures(&self) -> usize {
        self.measures
    }

    /// Total slot count (= measures x 8).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Absolute indices of one measure's slots.
    pub fn measure_range(&self, measure: usize) -> std::ops::Range<usize> {
        let start = measure * SLOTS_PER_MEASURE;
        start..start + SLOTS_PER_MEASURE
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots[index].as_ref()
    }

    pub fn set(&mut self, index: usize, value: T) {
        self.slots[index] = Some(value);
    }

    /// The value at a slot that an earlier stage must already have filled.
    pub fn value(&self, index: usize) -> &T {
        self.slots[index]
            .as_ref()
            .unwrap_or_else(|| panic!("slot {index} read before being filled"))
    }
}

impl<T: Clone> Grid<T> {
    /// Copy one measure's slot values onto another measure.
    pub fn copy_measure(&mut self, from: usize, to: usize) {
        for offset in 0..SLOTS_PER_MEASURE {
            self.slots[to * SLOTS_PER_MEASURE + offset] =
                self.slots[from * SLOTS_PER_MEASURE + offset].clone();
        }
    }
}

impl<T: Clone + PartialEq> Grid<T> {
    /// Run-length compress a fully filled grid. Adjacent equal values merge
    /// within a measure; a run is cut at every measure boundary.
    pub fn compress(&self) -> Compressed<T> {
        let mut runs = Vec::new();
        for measure in 0..self.measures {
            let range = self.measure_range(measure);
            let start = range.start;
            let mut run_start = start;
            for index in range {
                let next = index + 1;
                let boundary = next % SLOTS_PER_MEASURE == 0;
                if boundary || self.value(next) != self.value(index) {
                    runs.push(Run {
                        value: self.value(index).clone(),
                        start: run_start,
                        len: next - run_start,
                    });
                    run_start = next;
                }
            }
        }
        Compressed {
            measures: self.measures,
            runs,
        }
    }
}

/// One run of equal-valued slots in a compressed grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run<T> {
    pub value: T,
    /// Absolute slot index where the run begins.
    pub start: usize,
    /// Duration in eighth-note slots.
    pub len: usize,
}

/// A run-length compressed grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compressed<T> {
    measures: usize,
    runs: Vec<Run<T>>,
}

impl<T> Compressed<T> {
    pub fn measures(&self) -> usize {
        self.measures
    }

    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Sum of run lengths (= measures x 8 for any compressed grid).
    pub fn total_len(&self) -> usize {
        self.runs.iter().map(|r| r.len).sum()
    }
}

impl<T: Clone + PartialEq> Compressed<T> {
    /// Re-compress, merging any adjacent equal-valued runs within a measure.
    /// Compressing an already-compressed grid is a no-op.
    pub fn compress(&self) -> Compressed<T> {
        let mut runs: Vec<Run<T>> = Vec::with_capacity(self.runs.len());
        for run in &self.runs {
            if let Some(last) = runs.last_mut() {
                if last.value == run.value
                    && last.start + last.len == run.start
                    && run.start % SLOTS_PER_MEASURE != 0
                {
                    last.len += run.len;
                    continue;
                }
            }
            runs.push(run.clone());
        }
        Compressed {
            measures: self.measures,
            runs,
        }
    }
}
