//! Mutators rewrite the note timing of a decoded MIDI document.
//!
//! A mutator never touches the stored bytes; it returns a new document with
//! the same tracks and events in the same order.

pub mod simple;

use crate::error::Result;
use crate::midi::MidiDocument;

pub use simple::SimpleMutator;

/// Trait for timing mutators
pub trait Mutator: Send + Sync {
    /// Human-readable mutator name
    fn name(&self) -> &str;

    /// Produce a mutated copy of `document`, applying the timing step
    /// `number_steps` times. Negative step counts are rejected.
    fn mutate<'a>(
        &self,
        document: &MidiDocument<'a>,
        number_steps: i64,
    ) -> Result<MidiDocument<'a>>;
}
