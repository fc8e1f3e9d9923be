use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "scanview")]
#[command(about = "Follow scan jobs and their matches from the terminal")]
pub struct Args {
    /// Location to open: `/` to compose, `/query/{hash}` to follow a job.
    #[arg(default_value = "/")]
    pub route: String,
    /// Root of the service API, e.g. http://mquery.local/api
    #[arg(long, env = "SCANVIEW_BASE_URL")]
    pub base_url: Option<String>,
    /// RON configuration file.
    #[arg(long, env = "SCANVIEW_CONFIG")]
    pub config: Option<PathBuf>,
    /// Compile the query in FILE and print the plan.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["submit", "backend"])]
    pub compile: Option<PathBuf>,
    /// Submit the query in FILE and follow the new job.
    #[arg(long, value_name = "FILE", conflicts_with = "backend")]
    pub submit: Option<PathBuf>,
    /// Restrict compile/submit to datasets carrying this taint.
    #[arg(long)]
    pub taint: Option<String>,
    /// Show backend worker status instead of following a job.
    #[arg(long)]
    pub backend: bool,
    /// Matches requested per page.
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Also write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
    /// Repeat for more log output.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
