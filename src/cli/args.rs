//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    calibrate::CalibrateArgs, completions::CompletionsArgs, measure::MeasureArgs, play::PlayArgs,
    questions::QuestionsArgs, refs::RefsArgs, scores::ScoresCommands,
};

/// Measure Quest - calibrate a camera against a known object, then measure
/// lengths and angles against target values
#[derive(Parser, Debug)]
#[command(name = "mq", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file layered over the user config
    #[arg(long, short = 'c', global = true, env = "MQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Log debug details to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, text for single results
    Auto,
    Table,
    Text,
    Json,
    Yaml,
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted measuring session
    Play(PlayArgs),

    /// Measure a length or angle between two pixel points
    Measure(MeasureArgs),

    /// Compute a calibration factor from two points and a reference
    Calibrate(CalibrateArgs),

    /// List the questions of a round
    Questions(QuestionsArgs),

    /// List configured reference objects
    Refs(RefsArgs),

    /// Leaderboard and score management
    #[command(subcommand)]
    Scores(ScoresCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
