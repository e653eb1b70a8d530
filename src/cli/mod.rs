//! CLI Module
//!
//! Command-line interface for inspecting and editing saved sections and
//! dry-running an A/B loop over a WAV file.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Riffloop - A/B loop practice tool
#[derive(Parser, Debug)]
#[command(name = "riffloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the documents directory from the config
    #[arg(long, global = true)]
    pub documents_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tracks that have saved sections
    #[command(name = "tracks")]
    Tracks,

    /// Show the saved sections of a track
    #[command(name = "sections")]
    Sections {
        /// Track display name, e.g. "Etude.mp3"
        track: String,
    },

    /// Save a new section for a track
    #[command(name = "add-section")]
    AddSection {
        /// Track display name
        track: String,

        /// Start of the section in ms
        #[arg(short, long)]
        a: u64,

        /// End of the section in ms
        #[arg(short, long)]
        b: u64,
    },

    /// Replace the memo of a section
    #[command(name = "memo")]
    Memo {
        /// Track display name
        track: String,

        /// Section index
        index: usize,

        /// New memo text
        text: String,
    },

    /// Attach a recording to a section
    #[command(name = "attach")]
    Attach {
        /// Track display name
        track: String,

        /// Section index
        index: usize,

        /// Recording URI
        uri: String,
    },

    /// Record a WAV file as the personal take of a section
    #[command(name = "import-take")]
    ImportTake {
        /// Track display name
        track: String,

        /// Section index
        index: usize,

        /// WAV file holding the take
        wav: PathBuf,
    },

    /// Print the duration of a WAV file
    #[command(name = "info")]
    Info {
        /// WAV file
        path: PathBuf,
    },

    /// Simulate looping between A and B over a WAV file
    #[command(name = "practice")]
    Practice {
        /// WAV file
        path: PathBuf,

        /// Loop start in ms
        #[arg(short, long)]
        a: u64,

        /// Loop end in ms
        #[arg(short, long)]
        b: u64,

        /// Playback rate (0.4, 0.6, 0.8 or 1.0)
        #[arg(short, long, default_value_t = 1.0)]
        rate: f32,

        /// Simulated wall time to run for, in seconds
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
    },

    /// Write the effective config to a file
    #[command(name = "write-config")]
    WriteConfig {
        /// Destination path
        path: PathBuf,
    },
}
