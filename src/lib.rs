//! magenta-rapids - Content-addressed MIDI archive with timing mutation
//!
//! Stores MIDI files under the SHA-1 of their content and rewrites the note
//! timing of everything stored with a deterministic, repeatable transform.
//!
//! # Architecture
//!
//! - Backends persist raw bytes in an `unprocessed/` area and write
//!   mutation output to a `processed/` area
//! - Mutators turn one decoded MIDI document into another
//! - An `Environment` wires one backend to one mutator
//!
//! # Modules
//!
//! - `backends`: Storage trait and the local filesystem backend
//! - `mutators`: Mutator trait and the default timing stretch
//! - `midi`: Decoded MIDI documents
//! - `environment`: Coordinator
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! magenta-rapids init -e ./env
//! magenta-rapids store -e ./env -f song.mid
//! magenta-rapids mutate -e ./env -n 2
//! ```
//!
//! Concurrent invocations against the same environment are not supported;
//! no locking is performed.

pub mod backends;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod midi;
pub mod mutators;

// Re-export main types at crate root for convenience
pub use backends::{Backend, Entries, LocalFileBackend, RetrievedFile};
pub use environment::{Environment, MutationReport};
pub use error::{RapidsError, Result};
pub use midi::{MessageKind, MidiDocument};
pub use mutators::{Mutator, SimpleMutator};
