use anyhow::Context;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use steer_core::augment::augment;
use steer_core::context::{EditedFile, MatchContext};
use steer_core::matcher::{MatchResult, Matcher, SkippedRule};
use steer_core::store::RuleStore;

use crate::output::print_json;

#[derive(Serialize)]
struct AugmentOutput<'a> {
    augmented_prompt: &'a str,
    results: &'a [MatchResult],
    skipped: &'a [SkippedRule],
}

pub fn run(root: &Path, prompt: Option<&str>, files: &[String], json: bool) -> anyhow::Result<()> {
    let ctx = build_context(prompt, files)?;
    let store = RuleStore::load(root).context("failed to load rules")?;
    let outcome = Matcher::new(&store).evaluate(&ctx);
    let augmented = augment(&ctx.prompt, &outcome.results);

    if json {
        print_json(&AugmentOutput {
            augmented_prompt: &augmented,
            results: &outcome.results,
            skipped: &outcome.skipped,
        })?;
    } else {
        println!("{augmented}");
    }
    Ok(())
}

/// Build the match context from flags, or from a JSON document on stdin
/// when no `--prompt` was given (the hook invocation path). Flag parsing
/// rejects `--file` without `--prompt`, so `files` is empty on the stdin
/// path.
fn build_context(prompt: Option<&str>, files: &[String]) -> anyhow::Result<MatchContext> {
    if let Some(prompt) = prompt {
        let edited = files.iter().map(|spec| parse_file_spec(spec)).collect();
        return Ok(MatchContext::with_files(prompt, edited));
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read context from stdin")?;
    let ctx: MatchContext =
        serde_json::from_str(&buf).context("invalid context JSON on stdin")?;
    Ok(ctx)
}

fn parse_file_spec(spec: &str) -> EditedFile {
    match spec.split_once('=') {
        Some((path, content)) => EditedFile::with_content(path, content),
        None => EditedFile::new(spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_spec_without_content() {
        let f = parse_file_spec("app/models/post.rb");
        assert_eq!(f.path, "app/models/post.rb");
        assert!(f.content_snapshot.is_none());
    }

    #[test]
    fn file_spec_with_content() {
        let f = parse_file_spec("a.rb=class A; end");
        assert_eq!(f.path, "a.rb");
        assert_eq!(f.content_snapshot.as_deref(), Some("class A; end"));
    }

    #[test]
    fn flags_build_context() {
        let ctx = build_context(Some("hello"), &["a.rb".to_string()]).unwrap();
        assert_eq!(ctx.prompt, "hello");
        assert_eq!(ctx.edited_files.len(), 1);
    }
}
