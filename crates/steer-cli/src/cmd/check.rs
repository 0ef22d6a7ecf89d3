use anyhow::{bail, Context};
use std::io::Read;
use std::path::Path;
use steer_core::check::run_checks;
use steer_core::context::{EditedFile, MatchContext};
use steer_core::store::RuleStore;

use crate::output::print_json;

pub fn run(root: &Path, files: &[String], json: bool) -> anyhow::Result<()> {
    let edited = gather_files(files)?;
    let store = RuleStore::load(root).context("failed to load rules")?;

    if store.checks().is_empty() {
        if !json {
            println!("no check tools configured");
        }
        return Ok(());
    }

    let report = run_checks(root, store.checks(), &edited);

    if json {
        print_json(&report)?;
    } else {
        for skipped in &report.skipped_tools {
            println!("skip  {} ({})", skipped.tool, skipped.reason);
        }
        for result in &report.results {
            let status = if result.passed { "pass" } else { "FAIL" };
            println!(
                "{status}  {} {} ({}ms)",
                result.tool, result.path, result.duration_ms
            );
            if !result.passed && !result.output.trim().is_empty() {
                for line in result.output.trim_end().lines() {
                    println!("      {line}");
                }
            }
        }
    }

    if !report.passed {
        bail!("one or more checks failed");
    }
    Ok(())
}

fn gather_files(files: &[String]) -> anyhow::Result<Vec<EditedFile>> {
    if !files.is_empty() {
        return Ok(files.iter().map(|p| EditedFile::new(p.as_str())).collect());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read context from stdin")?;
    let ctx: MatchContext =
        serde_json::from_str(&buf).context("invalid context JSON on stdin")?;
    Ok(ctx.edited_files)
}
