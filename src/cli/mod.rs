//! Command-line interface for magenta-rapids.
//!
//! Provides commands for initializing an environment, storing MIDI files
//! into it, mutating everything stored, and inspecting configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::backends::LocalFileBackend;
use crate::environment::Environment;
use crate::mutators::SimpleMutator;

pub mod validate;

/// magenta-rapids - Content-addressed MIDI archive with timing mutation
#[derive(Parser, Debug)]
#[command(name = "magenta-rapids")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an environment in an existing, empty directory
    Init {
        /// Root directory for the new environment
        #[arg(short, long = "environment")]
        environment: Option<PathBuf>,
    },

    /// Store a MIDI file in an environment
    Store {
        /// Root directory of the environment
        #[arg(short, long = "environment")]
        environment: Option<PathBuf>,

        /// MIDI file to store
        #[arg(short, long)]
        file: PathBuf,

        /// Extension for the stored file
        #[arg(long)]
        extension: Option<String>,
    },

    /// Mutate every MIDI file stored in an environment
    Mutate {
        /// Root directory of the environment
        #[arg(short, long = "environment")]
        environment: Option<PathBuf>,

        /// Number of times to mutate
        #[arg(
            short,
            long = "number-steps",
            alias = "number_steps",
            allow_negative_numbers = true
        )]
        number_steps: Option<i64>,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Init { environment } => init(environment).await,
            Commands::Store {
                environment,
                file,
                extension,
            } => store(environment, file, extension).await,
            Commands::Mutate {
                environment,
                number_steps,
            } => mutate(environment, number_steps).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the standard environment for a root directory
fn open_environment(root: PathBuf) -> Environment<LocalFileBackend, SimpleMutator> {
    Environment::new(LocalFileBackend::new(root), SimpleMutator::new())
}

/// Use the given root or fall back to configuration
fn environment_root(environment: Option<PathBuf>) -> Result<PathBuf> {
    match environment {
        Some(path) => Ok(path),
        None => Ok(crate::config::config()?.environment.clone()),
    }
}

/// Initialize a new environment
async fn init(environment: Option<PathBuf>) -> Result<()> {
    let root = validate::empty_directory(&environment_root(environment)?)
        .context("Cannot initialize environment")?;

    println!("Initializing a new environment in {}", root.display());
    open_environment(root).initialize().await?;

    Ok(())
}

/// Store a file in an existing environment
async fn store(
    environment: Option<PathBuf>,
    file: PathBuf,
    extension: Option<String>,
) -> Result<()> {
    let root = validate::existing_directory(&environment_root(environment)?)
        .context("Environment does not exist")?;
    let file = validate::existing_file(&file).context("File does not exist at source")?;
    let extension = match extension {
        Some(extension) => extension,
        None => crate::config::config()?.extension.clone(),
    };

    println!("Storing {} in {}", file.display(), root.display());

    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let stored = open_environment(root).store(&bytes, &extension).await?;

    println!("Successfully stored file {}", stored.display());

    Ok(())
}

/// Mutate everything stored in an environment
async fn mutate(environment: Option<PathBuf>, number_steps: Option<i64>) -> Result<()> {
    let root = validate::existing_directory(&environment_root(environment)?)
        .context("Environment does not exist")?;
    let number_steps = match number_steps {
        Some(steps) => steps,
        None => crate::config::config()?.steps,
    };

    println!("Mutating files for environment in {}", root.display());

    let report = open_environment(root).mutate_all(number_steps).await?;

    for path in &report.files {
        println!("  {}", path.display());
    }
    println!(
        "Mutated {} file(s), {} note event(s)",
        report.files.len(),
        report.events_mutated
    );

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = crate::config::reload_config()?;

    println!("Environment: {}", config.environment.display());
    println!("Extension:   {}", config.extension);
    println!("Steps:       {}", config.steps);
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{PROCESSED_DIRECTORY, UNPROCESSED_DIRECTORY};
    use crate::midi::MidiDocument;
    use midly::num::{u15, u28, u4, u7};
    use midly::{
        Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
    };
    use tempfile::TempDir;

    fn short_song() -> Vec<u8> {
        let note = |delta: u32, message: MidiMessage| TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        };

        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(480)),
        ));
        smf.tracks.push(vec![
            note(
                0,
                MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(100),
                },
            ),
            note(
                480,
                MidiMessage::NoteOff {
                    key: u7::new(60),
                    vel: u7::new(0),
                },
            ),
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);

        MidiDocument::from_smf(smf).encode().unwrap()
    }

    fn files_in(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_parse_mutate_accepts_underscore_flag() {
        let cli = Cli::try_parse_from([
            "magenta-rapids",
            "mutate",
            "-e",
            "/tmp/env",
            "--number_steps",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Mutate { number_steps, .. } => assert_eq!(number_steps, Some(3)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_init_creates_both_areas() {
        let temp = TempDir::new().unwrap();

        init(Some(temp.path().to_path_buf())).await.unwrap();

        assert!(temp.path().join(PROCESSED_DIRECTORY).is_dir());
        assert!(temp.path().join(UNPROCESSED_DIRECTORY).is_dir());
    }

    #[tokio::test]
    async fn test_init_refuses_non_empty_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"occupied").unwrap();

        let result = init(Some(temp.path().to_path_buf())).await;

        assert!(result.is_err());
        assert!(!temp.path().join(UNPROCESSED_DIRECTORY).exists());
    }

    #[tokio::test]
    async fn test_store_then_mutate_through_commands() {
        let env = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let song = source.path().join("song.mid");
        std::fs::write(&song, short_song()).unwrap();

        let root = env.path().to_path_buf();
        init(Some(root.clone())).await.unwrap();
        store(Some(root.clone()), song, Some("mid".to_string()))
            .await
            .unwrap();

        let stored = files_in(&root.join(UNPROCESSED_DIRECTORY));
        assert_eq!(stored.len(), 1);

        mutate(Some(root.clone()), Some(1)).await.unwrap();

        let processed = files_in(&root.join(PROCESSED_DIRECTORY));
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].file_name(), stored[0].file_name());

        let output = std::fs::read(&processed[0]).unwrap();
        let document = MidiDocument::decode(&output).unwrap();
        let deltas: Vec<u32> = document.tracks()[0]
            .iter()
            .map(|event| event.delta.as_int())
            .collect();
        assert_eq!(deltas, vec![39, 584, 0]);
    }

    #[tokio::test]
    async fn test_commands_require_existing_environment() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let song = temp.path().join("song.mid");
        std::fs::write(&song, short_song()).unwrap();

        assert!(init(Some(missing.clone())).await.is_err());
        assert!(store(Some(missing.clone()), song, Some("mid".to_string()))
            .await
            .is_err());
        assert!(mutate(Some(missing), Some(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_store_rejects_missing_source_file() {
        let env = TempDir::new().unwrap();
        let root = env.path().to_path_buf();
        init(Some(root.clone())).await.unwrap();

        let result = store(
            Some(root.clone()),
            env.path().join("absent.mid"),
            Some("mid".to_string()),
        )
        .await;

        assert!(result.is_err());
        assert!(files_in(&root.join(UNPROCESSED_DIRECTORY)).is_empty());
    }

    #[test]
    fn test_parse_mutate_with_negative_steps() {
        let cli = Cli::try_parse_from([
            "magenta-rapids",
            "mutate",
            "-e",
            "/tmp/env",
            "-n",
            "-2",
        ])
        .unwrap();

        match cli.command {
            Commands::Mutate {
                environment,
                number_steps,
            } => {
                assert_eq!(environment, Some(PathBuf::from("/tmp/env")));
                assert_eq!(number_steps, Some(-2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_store_requires_file() {
        assert!(Cli::try_parse_from(["magenta-rapids", "store", "-e", "/tmp/env"]).is_err());

        let cli = Cli::try_parse_from([
            "magenta-rapids",
            "store",
            "--environment",
            "/tmp/env",
            "--file",
            "song.mid",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Store { .. }));
    }
}
