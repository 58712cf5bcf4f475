// Timeline assembly: the sequencer-facing output.
//
// Everything a player needs and nothing it has to understand: per part, an
// ordered list of (spelled pitch or rest, duration in eighth notes). The
// block chords are split into one line per voice so an N-voice pad is N
// monophonic parts; drum lanes carry their instrument name instead of a
// pitch. Chord symbols ride along for display.
//
// `Timeline::summary` renders the compact text view the CLI prints, in the
// spirit of a tracker pattern dump.

use serde::Serialize;

use loopsmith_theory::family::Catalog;

use crate::grid::Step;
use crate::loops::{Loop, LoopTracks};

/// One run of a monophonic part: a spelled pitch (or `None` for a rest) and
/// its duration in eighth notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedNote {
    pub pitch: Option<String>,
    pub eighths: usize,
}

/// A drum lane: the instrument name and one entry per eighth-note slot.
#[derive(Debug, Clone, Serialize)]
pub struct DrumLane {
    pub instrument: String,
    pub steps: Vec<TimedNote>,
}

/// The finished, fully resolved loop timeline.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub key: String,
    pub measures: usize,
    pub tension: u8,
    pub depth: u8,
    /// Chord symbols with durations, for display.
    pub chord_symbols: Vec<TimedNote>,
    /// One monophonic line per chord voice, bottom voice first.
    pub chord_voices: Vec<Vec<TimedNote>>,
    pub melody: Vec<TimedNote>,
    pub bass: Vec<TimedNote>,
    pub drums: Vec<DrumLane>,
}

/// Assemble the timeline from a loop's generated tracks.
pub fn render(lp: &Loop, catalog: &Catalog, tracks: &LoopTracks) -> Timeline {
    let harmony = &tracks.harmony.compressed;

    let voices = harmony.runs()[0].value.voicing.pcs.len();
    let mut chord_voices: Vec<Vec<TimedNote>> = vec![Vec::new(); voices];
    for run in harmony.runs() {
        let names = run.value.voicing.names();
        for (voice, line) in chord_voices.iter_mut().enumerate() {
            line.push(TimedNote {
                pitch: Some(names[voice].to_string()),
                eighths: run.len,
            });
        }
    }

    let chord_symbols = harmony
        .runs()
        .iter()
        .map(|run| TimedNote {
            pitch: Some(catalog.chord_symbol(&run.value.chord, &lp.key)),
            eighths: run.len,
        })
        .collect();

    let part = |compressed: &crate::grid::Compressed<Step>| -> Vec<TimedNote> {
        compressed
            .runs()
            .iter()
            .map(|run| TimedNote {
                pitch: match run.value {
                    Step::Rest => None,
                    Step::Note(name) => Some(name.to_string()),
                },
                eighths: run.len,
            })
            .collect()
    };

    let drum_lane = |name: &str, grid: &crate::grid::Grid<bool>| -> DrumLane {
        DrumLane {
            instrument: name.to_string(),
            steps: (0..grid.len())
                .map(|index| TimedNote {
                    pitch: grid.value(index).then(|| name.to_string()),
                    eighths: 1,
                })
                .collect(),
        }
    };

    Timeline {
        key: lp.key.to_string(),
        measures: lp.measures,
        tension: lp.tension,
        depth: lp.depth,
        chord_symbols,
        chord_voices,
        melody: part(&tracks.melody.compressed),
        bass: part(&tracks.bass.compressed),
        drums: vec![
            drum_lane("kick", &tracks.drums.kick),
            drum_lane("snare", &tracks.drums.snare),
            drum_lane("closed_hat", &tracks.drums.closed_hat),
            drum_lane("open_hat", &tracks.drums.open_hat),
        ],
    }
}

impl Timeline {
    /// Compact text view: one line per part, runs as `name(eighths)`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "key: {}  measures: {}  tension: {}  depth: {}\n",
            self.key, self.measures, self.tension, self.depth
        ));
        out.push_str(&format!("chords: {}\n", format_part(&self.chord_symbols)));
        out.push_str(&format!("melody: {}\n", format_part(&self.melody)));
        out.push_str(&format!("bass:   {}\n", format_part(&self.bass)));
        for lane in &self.drums {
            let pattern: String = lane
                .steps
                .iter()
                .map(|s| if s.pitch.is_some() { 'x' } else { '.' })
                .collect();
            out.push_str(&format!("{:>10}: {}\n", lane.instrument, pattern));
        }
        out
    }
}

fn format_part(notes: &[TimedNote]) -> String {
    notes
        .iter()
        .map(|n| {
            let name = n.pitch.as_deref().unwrap_or("r");
            format!("{}({})", name, n.eighths)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn timeline(seed: u64, measures: usize, tension: u8, depth: u8) -> Timeline {
        let catalog = Catalog::default_catalog();
        let mut rng = StdRng::seed_from_u64(seed);
        let lp = Loop::new(measures, tension, depth, &mut rng);
        let tracks = lp.generate(&catalog, &mut rng);
        render(&lp, &catalog, &tracks)
    }

    fn total_eighths(notes: &[TimedNote]) -> usize {
        notes.iter().map(|n| n.eighths).sum()
    }

    #[test]
    fn every_part_spans_the_whole_loop() {
        for seed in 0..16 {
            let tl = timeline(seed, 4, 2, 2);
            let slots = tl.measures * 8;
            assert_eq!(total_eighths(&tl.chord_symbols), slots);
            assert_eq!(total_eighths(&tl.melody), slots);
            assert_eq!(total_eighths(&tl.bass), slots);
            for line in &tl.chord_voices {
                assert_eq!(total_eighths(line), slots);
            }
            for lane in &tl.drums {
                assert_eq!(total_eighths(&lane.steps), slots);
            }
        }
    }

    #[test]
    fn chord_voice_count_follows_depth() {
        for (depth, voices) in [(0u8, 2usize), (1, 3), (2, 4), (3, 4), (4, 5)] {
            let tl = timeline(depth as u64 + 1, 4, 2, depth);
            assert_eq!(tl.chord_voices.len(), voices);
        }
    }

    #[test]
    fn drums_are_four_named_lanes() {
        let tl = timeline(9, 2, 1, 1);
        let names: Vec<&str> = tl.drums.iter().map(|l| l.instrument.as_str()).collect();
        assert_eq!(names, vec!["kick", "snare", "closed_hat", "open_hat"]);
    }

    #[test]
    fn same_seed_reproduces_the_loop_byte_for_byte() {
        for seed in [0u64, 7, 42, 1234] {
            let a = serde_json::to_string(&timeline(seed, 4, 3, 2)).unwrap();
            let b = serde_json::to_string(&timeline(seed, 4, 3, 2)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn summary_lists_every_part() {
        let tl = timeline(3, 4, 2, 2);
        let summary = tl.summary();
        for needle in ["chords:", "melody:", "bass:", "kick", "snare", "closed_hat", "open_hat"] {
            assert!(summary.contains(needle), "summary is missing {needle}");
        }
    }
}
