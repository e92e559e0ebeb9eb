//! Shared MIDI fixtures for integration tests.

#![allow(dead_code)]

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use sha1::{Digest, Sha1};

pub fn midi(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

pub fn note_on(delta: u32, key: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(100),
        },
    )
}

pub fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        },
    )
}

pub fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// Two-track file: a tempo track and a short melody.
///
/// `program` varies the content so different calls hash differently.
pub fn melody(program: u8) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(480)),
    ));

    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000))),
        },
        end_of_track(),
    ]);

    smf.tracks.push(vec![
        midi(
            0,
            MidiMessage::ProgramChange {
                program: u7::new(program),
            },
        ),
        note_on(0, 60),
        midi(
            5,
            MidiMessage::Controller {
                controller: u7::new(7),
                value: u7::new(100),
            },
        ),
        note_off(480, 60),
        note_on(10, 72),
        note_off(240, 72),
        end_of_track(),
    ]);

    let mut buf = Vec::new();
    smf.write_std(&mut buf).unwrap();
    buf
}

/// Deltas of every event in a track of an encoded file
pub fn track_deltas(bytes: &[u8], track: usize) -> Vec<u32> {
    let smf = Smf::parse(bytes).unwrap();
    smf.tracks[track]
        .iter()
        .map(|event| event.delta.as_int())
        .collect()
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
