//! Decoded MIDI documents.
//!
//! Wraps a `midly` Standard MIDI File so the rest of the crate deals in
//! tracks of timed events rather than raw bytes. Encoding and decoding are
//! delegated entirely to `midly`.

use midly::{MidiMessage, Smf, Track, TrackEvent, TrackEventKind};

use crate::error::{RapidsError, Result};

/// Largest delta-time a variable-length quantity can carry (28 bits)
pub const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// Kind of a track event, as far as mutation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    ControlChange,
    ProgramChange,
    /// Channel pressure
    AfterTouch,
    /// Per-key pressure
    PolyAfterTouch,
    PitchBend,
    SysEx,
    Meta,
}

impl MessageKind {
    /// Classify a track event
    pub fn of(kind: &TrackEventKind<'_>) -> Self {
        match kind {
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { .. } => MessageKind::NoteOn,
                MidiMessage::NoteOff { .. } => MessageKind::NoteOff,
                MidiMessage::Controller { .. } => MessageKind::ControlChange,
                MidiMessage::ProgramChange { .. } => MessageKind::ProgramChange,
                MidiMessage::ChannelAftertouch { .. } => MessageKind::AfterTouch,
                MidiMessage::Aftertouch { .. } => MessageKind::PolyAfterTouch,
                MidiMessage::PitchBend { .. } => MessageKind::PitchBend,
            },
            TrackEventKind::SysEx(_) | TrackEventKind::Escape(_) => MessageKind::SysEx,
            TrackEventKind::Meta(_) => MessageKind::Meta,
        }
    }

    /// Whether this kind has its timing mutated
    pub fn is_note(self) -> bool {
        matches!(self, MessageKind::NoteOn | MessageKind::NoteOff)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::NoteOn => "Note On",
            MessageKind::NoteOff => "Note Off",
            MessageKind::ControlChange => "Control Change",
            MessageKind::ProgramChange => "Program Change",
            MessageKind::AfterTouch => "After Touch",
            MessageKind::PolyAfterTouch => "Poly After Touch",
            MessageKind::PitchBend => "Pitch Bend Change",
            MessageKind::SysEx => "System Exclusive",
            MessageKind::Meta => "Meta",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Key number of a note-on or note-off event
pub fn note_of(event: &TrackEvent<'_>) -> Option<u8> {
    match event.kind {
        TrackEventKind::Midi {
            message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
            ..
        } => Some(key.as_int()),
        _ => None,
    }
}

/// A decoded MIDI file: ordered tracks of ordered events
#[derive(Debug, Clone, PartialEq)]
pub struct MidiDocument<'a> {
    smf: Smf<'a>,
}

impl<'a> MidiDocument<'a> {
    /// Decode a Standard MIDI File. The document borrows from `bytes`.
    pub fn decode(bytes: &'a [u8]) -> Result<Self> {
        let smf = Smf::parse(bytes).map_err(|e| RapidsError::Decode(e.to_string()))?;
        Ok(Self { smf })
    }

    /// Wrap an already-built file
    pub fn from_smf(smf: Smf<'a>) -> Self {
        Self { smf }
    }

    /// Encode back to Standard MIDI File bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.smf
            .write_std(&mut buf)
            .map_err(|e| RapidsError::Encode(e.to_string()))?;
        Ok(buf)
    }

    pub fn tracks(&self) -> &[Track<'a>] {
        &self.smf.tracks
    }

    /// Mutable access to events. Tracks cannot be added or removed through it.
    pub fn tracks_mut(&mut self) -> &mut [Track<'a>] {
        &mut self.smf.tracks
    }

    pub fn track_count(&self) -> usize {
        self.smf.tracks.len()
    }

    /// Total number of events across all tracks
    pub fn event_count(&self) -> usize {
        self.smf.tracks.iter().map(|track| track.len()).sum()
    }
}
