//! Nonlinear note-timing stretch.
//!
//! Each step maps a note event's delta `t` with key `n` to
//! `floor(t + d + (60 / n²) · (t^1.1 + n^1.9))`, where `d` is 50 for
//! note-off events and 0 otherwise. Low notes stretch more than high ones.

use midly::num::u28;

use super::Mutator;
use crate::error::{RapidsError, Result};
use crate::midi::{note_of, MessageKind, MidiDocument, MAX_DELTA};

/// Extra ticks added to every note-off per step
pub const NOTE_OFF_DELAY: u64 = 50;

/// The default mutator
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMutator;

impl SimpleMutator {
    pub fn new() -> Self {
        Self
    }
}

/// Apply one timing step to a delta-time.
///
/// Evaluated as `(t + d) + (60 / n²) * (t^1.1 + n^1.9)` in `f64`, then
/// truncated toward zero. Output depends on this exact evaluation order.
pub fn alter_time(time: u64, note: u8, kind: MessageKind) -> Result<u64> {
    if note == 0 {
        return Err(RapidsError::InvalidArgument(
            "Cannot mutate a note event with key 0".to_string(),
        ));
    }

    let delay = if kind == MessageKind::NoteOff {
        NOTE_OFF_DELAY
    } else {
        0
    };

    let key = u32::from(note);
    let scale = 60.0 / f64::from(key * key);
    let stretch = (time as f64).powf(1.1) + f64::from(key).powf(1.9);
    let altered = time.saturating_add(delay) as f64 + scale * stretch;

    Ok(altered as u64)
}

impl Mutator for SimpleMutator {
    fn name(&self) -> &str {
        "simple"
    }

    fn mutate<'a>(
        &self,
        document: &MidiDocument<'a>,
        number_steps: i64,
    ) -> Result<MidiDocument<'a>> {
        if number_steps < 0 {
            return Err(RapidsError::InvalidArgument(format!(
                "Number of steps must be non-negative, got {}",
                number_steps
            )));
        }

        let mut mutated = document.clone();

        for (track_idx, track) in mutated.tracks_mut().iter_mut().enumerate() {
            for (event_idx, event) in track.iter_mut().enumerate() {
                let kind = MessageKind::of(&event.kind);
                let Some(note) = note_of(event) else {
                    continue;
                };

                let mut time = u64::from(event.delta.as_int());
                for step in 0..number_steps {
                    time = alter_time(time, note, kind)?;

                    // Every step grows the delta, so stop at the first overflow
                    if time > u64::from(MAX_DELTA) {
                        return Err(RapidsError::InvalidArgument(format!(
                            "Mutated delta {} of event {} in track {} exceeds the MIDI limit of {} after {} step(s)",
                            time,
                            event_idx,
                            track_idx,
                            MAX_DELTA,
                            step + 1
                        )));
                    }
                }

                event.delta = u28::new(time as u32);
            }
        }

        Ok(mutated)
    }
}
