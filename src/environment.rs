//! The environment delegates to a backend and a mutator.
//!
//! Both are injected on construction; the environment itself holds no
//! transform logic and no state beyond that wiring.

use std::path::PathBuf;

use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument};

use crate::backends::{Backend, Entries};
use crate::error::{RapidsError, Result};
use crate::midi::{MessageKind, MidiDocument};
use crate::mutators::Mutator;

/// Outcome of a `mutate_all` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    /// Paths written in the processed area, in save order
    pub files: Vec<PathBuf>,

    /// Note events whose timing was rewritten
    pub events_mutated: usize,
}

/// A storage environment: one backend plus one mutator
pub struct Environment<B, M> {
    backend: B,
    mutator: M,
}

impl<B: Backend, M: Mutator> Environment<B, M> {
    /// Create an environment from its collaborators
    pub fn new(backend: B, mutator: M) -> Self {
        Self { backend, mutator }
    }

    /// Prepare the backend's storage areas
    #[instrument(skip(self), fields(root = %self.backend.path().display()))]
    pub async fn initialize(&self) -> Result<()> {
        self.backend.initialize().await?;
        info!("Environment initialized");
        Ok(())
    }

    /// Store new content; fails if identical content is already stored
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(&self, bytes: &[u8], extension: &str) -> Result<PathBuf> {
        let path = self.backend.store(bytes, extension).await?;
        info!(path = %path.display(), "Stored file");
        Ok(path)
    }

    /// Mutate every unprocessed file and save the results.
    ///
    /// Every file is read and mutated before anything is saved, so a failure
    /// while decoding or mutating leaves the processed area untouched.
    #[instrument(skip(self), fields(mutator = %self.mutator.name()))]
    pub async fn mutate_all(&self, number_steps: i64) -> Result<MutationReport> {
        if number_steps < 0 {
            return Err(RapidsError::InvalidArgument(format!(
                "Number of steps must be non-negative, got {}",
                number_steps
            )));
        }

        let mut mutated: Vec<(String, Vec<u8>)> = Vec::new();
        let mut events_mutated = 0;

        let mut entries = self.backend.retrieve_all().await?;
        while let Some(mut entry) = entries.next_entry().await? {
            let mut bytes = Vec::new();
            entry
                .reader
                .read_to_end(&mut bytes)
                .await
                .map_err(RapidsError::io("read", &entry.path))?;
            drop(entry.reader);

            let document = MidiDocument::decode(&bytes)?;
            let output = self.mutator.mutate(&document, number_steps)?;
            if number_steps > 0 {
                events_mutated += count_note_events(&document);
            }

            debug!(filename = %entry.filename, events = document.event_count(), "Mutated file");
            mutated.push((entry.filename, output.encode()?));
        }
        drop(entries);

        let mut files = Vec::with_capacity(mutated.len());
        for (filename, bytes) in mutated {
            files.push(self.backend.save(&bytes, &filename).await?);
        }

        info!(files = files.len(), events_mutated, "Mutation complete");

        Ok(MutationReport {
            files,
            events_mutated,
        })
    }
}

fn count_note_events(document: &MidiDocument<'_>) -> usize {
    document
        .tracks()
        .iter()
        .flatten()
        .filter(|event| MessageKind::of(&event.kind).is_note())
        .count()
}
