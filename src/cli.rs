//! CLI argument parsing for recfill

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use recfill::FillOptions;

/// Fill a text template from a JSON record
#[derive(Parser, Debug)]
#[command(name = "recfill")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["template", "inline"])))]
pub struct Cli {
    /// Template file to fill
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Template text given directly on the command line
    #[arg(short, long, value_name = "TEXT")]
    pub inline: Option<String>,

    /// JSON record file (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Fill from one entry of a top-level JSON object, e.g. a story id in
    /// a bulk index
    #[arg(short, long)]
    pub key: Option<String>,

    /// Maximum join iterations across the whole template
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Maximum expression-node evaluations across the whole template
    #[arg(long)]
    pub max_nodes: Option<u64>,

    /// Maximum length of the filled text in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_output_bytes: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn fill_options(&self) -> FillOptions {
        let mut options = FillOptions::new();
        if let Some(limit) = self.max_iterations {
            options = options.max_iterations(limit);
        }
        if let Some(limit) = self.max_nodes {
            options = options.max_node_evaluations(limit);
        }
        if let Some(limit) = self.max_output_bytes {
            options = options.max_output_bytes(limit);
        }
        options
    }
}
