use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "diffsel",
    version,
    about = "Select tests affected by a git diff",
    after_help = r#"Examples:
  diffsel select --repo . --graph .diffsel/graph.json
  diffsel select HEAD~3.. --repo . --graph .diffsel/graph.json --json
  diffsel changed-lines main...feature --repo .
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Select affected tests for a diff.
    Select {
        /// Argument passed to `git diff`.
        #[arg(default_value = "HEAD")]
        selector: String,
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Call graph export produced by the external analyzer.
        #[arg(long)]
        graph: PathBuf,
        /// Print the full result as JSON instead of one test name per line.
        #[arg(long)]
        json: bool,
    },
    /// Show the changed-line map for a diff.
    ChangedLines {
        /// Argument passed to `git diff`.
        #[arg(default_value = "HEAD")]
        selector: String,
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}
