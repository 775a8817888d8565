use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mediaconv_core::FetchKind;

#[derive(Debug, Parser)]
#[command(name = "mediaconv")]
#[command(about = "Submit media conversions to a conversion server and collect the results", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the RON configuration file (default: ./mediaconv.ron when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the conversion server
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Directory receiving downloads and the batch report
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Stop once every job finished instead of downloading the results
    #[arg(long, global = true)]
    pub no_deliver: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert one file, several files, or every file below a directory
    Convert {
        /// Files and/or directories (directories are walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format, e.g. png, mp4, glb
        #[arg(long, short = 't')]
        target: Option<String>,
    },

    /// Download and extract media from a remote page
    Fetch {
        url: String,

        #[arg(long, value_enum, default_value = "video")]
        kind: KindArg,

        /// Quality, e.g. best, 720p, 128k
        #[arg(long, short = 'q')]
        quality: Option<String>,
    },

    /// Print the current state of one task
    Status { task_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Video,
    Audio,
}

impl From<KindArg> for FetchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Video => FetchKind::Video,
            KindArg::Audio => FetchKind::Audio,
        }
    }
}
