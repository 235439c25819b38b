//! Command-line interface

use clap::{Parser, Subcommand};
use percept_core::SessionPhase;
use std::path::PathBuf;

/// Scores perceptual-illusion sessions from recorded or simulated responses
#[derive(Parser, Debug)]
#[command(name = "percept")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recorded response captures against a stimulus manifest
    Replay {
        /// Stimulus manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Captures file: JSON array of `{stimulus, key?, pointer?, reaction_time_ms, ...}`
        #[arg(long)]
        captures: PathBuf,

        /// Session phase the captures belong to
        #[arg(short, long, default_value = "part1")]
        phase: SessionPhase,

        /// Write trial records here (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a simulated participant through a manifest
    Simulate {
        /// Stimulus manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Session phase to simulate
        #[arg(short, long, default_value = "part1")]
        phase: SessionPhase,

        /// RNG seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Probability of a correct answer
        #[arg(short, long, default_value = "0.8")]
        accuracy: f64,

        /// Mean reaction time in ms
        #[arg(long, default_value = "800")]
        mean_rt: f64,

        /// Share of trials answered by clicking
        #[arg(long, default_value = "0.1")]
        pointer_rate: f64,

        /// Write trial records here (JSON)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
