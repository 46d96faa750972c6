use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::config::SiteConfig;
use crate::schema::v1::{Feed, RiskCard};
use crate::signals::{SignalSet, SignalSource};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub cards_dir: PathBuf,
    pub feed_path: PathBuf,
    pub tsv_path: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            cards_dir: out_dir.join("cards"),
            feed_path: out_dir.join("feed.json"),
            tsv_path: out_dir.join("cards.tsv"),
            out_dir,
        }
    }
}

/// State of one run, filled in stage by stage.
#[derive(Debug)]
pub struct Ctx {
    pub config_path: Option<PathBuf>,
    pub sources: Vec<Box<dyn SignalSource>>,
    pub write_outputs: bool,
    pub write_tsv: bool,
    pub tool_version: String,
    /// Fixed generation time; `None` means now, in the site offset.
    pub generated_at: Option<DateTime<FixedOffset>>,
    pub config: Option<SiteConfig>,
    pub signals: SignalSet,
    pub cards: Vec<RiskCard>,
    pub feed: Option<Feed>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
}

impl Ctx {
    pub fn new(
        config_path: Option<PathBuf>,
        sources: Vec<Box<dyn SignalSource>>,
        out_dir: PathBuf,
        write_outputs: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        Self {
            config_path,
            sources,
            write_outputs,
            write_tsv,
            tool_version: tool_version.to_string(),
            generated_at: None,
            config: None,
            signals: SignalSet::new(),
            cards: Vec::new(),
            feed: None,
            warnings: Vec::new(),
            output: OutputPaths::new(out_dir),
        }
    }
}
