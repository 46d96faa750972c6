use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::signals::{
    BcrpSeriesDir, JsonSignalFile, SignalSource, TrafficSnapshotFile, WeatherPayloadFile,
};

#[derive(Debug, Parser)]
#[command(
    name = "riskcards",
    version,
    about = "Operational risk cards for a restaurant site"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score all cards, build the feed and write outputs.
    Run(RunArgs),
    /// Check an existing feed file.
    Validate(ValidateArgs),
    /// Print the merged signal set without scoring.
    Signals(SignalsArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    #[arg(long, help = "Site config JSON (defaults to the built-in site)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        default_value = "signals.json",
        help = "Signal file: {\"as_of\": ..., \"signals\": {name: number}}"
    )]
    pub signals: PathBuf,

    #[arg(long, help = "Traffic snapshot history (JSON array, .gz accepted)")]
    pub traffic: Option<PathBuf>,

    #[arg(long, help = "Weather payload with current and hourly forecast")]
    pub weather: Option<PathBuf>,

    #[arg(long, help = "Directory of BCRP series exports named <code>.csv")]
    pub bcrp_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Sources in merge order; later ones override earlier ones.
    pub fn sources(&self) -> Vec<Box<dyn SignalSource>> {
        let mut sources: Vec<Box<dyn SignalSource>> = Vec::new();
        if let Some(dir) = &self.bcrp_dir {
            sources.push(Box::new(BcrpSeriesDir::new(dir.clone())));
        }
        if let Some(path) = &self.weather {
            sources.push(Box::new(WeatherPayloadFile::new(path.clone())));
        }
        if let Some(path) = &self.traffic {
            sources.push(Box::new(TrafficSnapshotFile::new(path.clone())));
        }
        sources.push(Box::new(JsonSignalFile::new(self.signals.clone())));
        sources
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[arg(long, default_value = "outputs")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false, help = "Also write cards.tsv")]
    pub tsv: bool,

    #[arg(long, default_value_t = false, help = "Score and validate without writing files")]
    pub no_write: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, default_value = "outputs/feed.json")]
    pub feed: PathBuf,
}

#[derive(Debug, Args)]
pub struct SignalsArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}
