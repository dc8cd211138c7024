//! Diff translation
//!
//! Turns a `git diff` selector into a per-file set of changed line numbers.
//! Every source-side line marked removed and every target-side line marked
//! added counts as "changed"; the two sides are unioned per file, so the
//! scanner only ever asks "does this span overlap a changed line".
//!
//! Parsing failures are fatal. An incomplete changed-line set would silently
//! under-select tests, which is the one failure mode this tool must not have.

use crate::model::ChangedLines;
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

/// Run `git diff --no-prefix <selector>` under `repo_root` and translate the
/// output. The selector is passed through verbatim (`HEAD`, `HEAD~3..`,
/// `main...feature`, a commit sha, ...).
pub fn changed_lines(repo_root: &Path, selector: &str) -> Result<ChangedLines> {
    let output = Command::new("git")
        .arg("diff")
        .arg("--no-prefix")
        .arg(selector)
        .current_dir(repo_root)
        .output()
        .context("Failed to run git diff")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git diff {} failed: {}", selector, stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_unified_diff(&stdout)
}

/// Per-hunk cursor. The hunk header carries both side lengths, so content
/// lines are classified by prefix until both counters drain; this keeps
/// removed lines that happen to start with `--` from being misread as file
/// headers.
struct Hunk {
    source_line: u32,
    target_line: u32,
    source_left: u32,
    target_left: u32,
}

impl Hunk {
    fn done(&self) -> bool {
        self.source_left == 0 && self.target_left == 0
    }
}

/// Parse standard unified-diff output into a changed-line map.
///
/// Files deleted by the diff have `/dev/null` as their target side and key
/// their removed lines under the source path; everything else keys under the
/// target path.
pub fn parse_unified_diff(diff: &str) -> Result<ChangedLines> {
    let mut changed = ChangedLines::new();
    let mut source_path: Option<String> = None;
    let mut current: Option<String> = None;
    let mut hunk: Option<Hunk> = None;

    for line in diff.lines() {
        if let Some(state) = hunk.as_mut() {
            if !state.done() {
                match line.as_bytes().first() {
                    Some(b'\\') => {} // "\ No newline at end of file"
                    Some(b'-') => {
                        record(&mut changed, current.as_deref(), state.source_line)?;
                        state.source_line += 1;
                        state.source_left = state.source_left.saturating_sub(1);
                    }
                    Some(b'+') => {
                        record(&mut changed, current.as_deref(), state.target_line)?;
                        state.target_line += 1;
                        state.target_left = state.target_left.saturating_sub(1);
                    }
                    Some(b' ') | None => {
                        state.source_line += 1;
                        state.target_line += 1;
                        state.source_left = state.source_left.saturating_sub(1);
                        state.target_left = state.target_left.saturating_sub(1);
                    }
                    _ => bail!("unexpected line inside hunk: {line}"),
                }
                continue;
            }
            hunk = None;
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            source_path = parse_file_path(rest);
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            // Pure deletions have no target side; fall back to the source.
            current = parse_file_path(rest).or_else(|| source_path.clone());
        } else if let Some(header) = line.strip_prefix("@@ ") {
            let parsed =
                parse_hunk_header(header).with_context(|| format!("malformed hunk header: {line}"))?;
            hunk = Some(parsed);
        }
        // "diff --git", "index", mode and rename lines are not line-bearing.
    }

    Ok(changed)
}

fn record(changed: &mut ChangedLines, file: Option<&str>, line: u32) -> Result<()> {
    let Some(file) = file else {
        bail!("hunk content before any file header");
    };
    changed
        .entry(file.to_string())
        .or_insert_with(BTreeSet::new)
        .insert(line);
    Ok(())
}

/// Extract the path from a `---`/`+++` header tail. With `--no-prefix` the
/// path is verbatim; a trailing tab separates an optional timestamp.
/// `/dev/null` means "no file on this side".
fn parse_file_path(rest: &str) -> Option<String> {
    let path = rest.split('\t').next().unwrap_or(rest).trim();
    if path.is_empty() || path == "/dev/null" {
        None
    } else {
        Some(path.to_string())
    }
}

/// Parse `-a,b +c,d @@ ...` (the part after `@@ `). Omitted lengths default
/// to 1 per the unified-diff format.
fn parse_hunk_header(header: &str) -> Result<Hunk> {
    let mut parts = header.split_whitespace();
    let source = parts
        .next()
        .and_then(|value| value.strip_prefix('-'))
        .context("missing source range")?;
    let target = parts
        .next()
        .and_then(|value| value.strip_prefix('+'))
        .context("missing target range")?;

    let (source_line, source_left) = parse_range(source)?;
    let (target_line, target_left) = parse_range(target)?;
    Ok(Hunk {
        source_line,
        target_line,
        source_left,
        target_left,
    })
}

fn parse_range(range: &str) -> Result<(u32, u32)> {
    match range.split_once(',') {
        Some((start, len)) => Ok((
            start.parse().context("bad range start")?,
            len.parse().context("bad range length")?,
        )),
        None => Ok((range.parse().context("bad range start")?, 1)),
    }
}
