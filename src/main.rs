use anyhow::Result;
use clap::Parser;
use diffsel::{cli, diff, provider, select};
use std::collections::BTreeMap;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Select {
            selector,
            repo,
            graph,
            json,
        } => {
            let mut provider = provider::JsonGraphProvider::open(&graph)?;
            let result = select::select_tests(&repo, &selector, &mut provider)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for test in &result.tests {
                    println!("{test}");
                }
            }
            Ok(())
        }
        cli::Command::ChangedLines { selector, repo } => {
            let changed = diff::changed_lines(&repo, &selector)?;
            // Print in path order so repeated runs compare cleanly.
            let ordered: BTreeMap<_, _> = changed.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&ordered)?);
            Ok(())
        }
    }
}
