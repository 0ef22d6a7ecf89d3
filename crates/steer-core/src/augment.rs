//! Renders ranked match results into an instruction block and injects it
//! into the prompt.

use crate::error::{Result, SteerError};
use crate::matcher::MatchResult;
use crate::types::Enforcement;
use regex::Regex;
use std::sync::OnceLock;

const MANDATORY_HEADING: &str =
    "## Mandatory project instructions\nYou must follow these before proceeding:";
const SUGGESTED_HEADING: &str = "## Suggested project guidance\nConsider the following:";

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").unwrap())
}

// ---------------------------------------------------------------------------
// Payload rendering
// ---------------------------------------------------------------------------

/// Expand `{{rule_id}}` and `{{matched_files}}` placeholders in a payload.
/// An unrecognized placeholder is a render error.
fn expand_payload(result: &MatchResult) -> Result<String> {
    let re = placeholder_re();
    let mut out = String::with_capacity(result.payload.len());
    let mut last = 0;
    for caps in re.captures_iter(&result.payload) {
        let whole = caps.get(0).expect("capture 0 always present");
        let value = match &caps[1] {
            "rule_id" => result.rule_id.clone(),
            "matched_files" => result.matched_paths.join(", "),
            other => {
                return Err(SteerError::Render {
                    rule: result.rule_id.clone(),
                    reason: format!("unknown placeholder '{{{{{other}}}}}'"),
                })
            }
        };
        out.push_str(&result.payload[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&result.payload[last..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// render / augment
// ---------------------------------------------------------------------------

/// Render the ranked results into an instruction block, or `None` when
/// nothing matched. Results arrive ranked, so every `block` section
/// precedes every `suggest` section.
pub fn render(results: &[MatchResult]) -> Result<Option<String>> {
    if results.is_empty() {
        return Ok(None);
    }

    let mut out = String::new();
    let mut current: Option<Enforcement> = None;
    for result in results {
        if current != Some(result.enforcement) {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(match result.enforcement {
                Enforcement::Block => MANDATORY_HEADING,
                Enforcement::Suggest => SUGGESTED_HEADING,
            });
            current = Some(result.enforcement);
        }
        let payload = expand_payload(result)?;
        out.push_str(&format!("\n- [{}] {}", result.rule_id, payload));
    }
    Ok(Some(out))
}

/// Produce the augmented prompt. The common no-match case is the identity
/// transform; a render failure degrades to the original prompt rather than
/// emitting a partial augmentation.
pub fn augment(prompt: &str, results: &[MatchResult]) -> String {
    match render(results) {
        Ok(None) => prompt.to_string(),
        Ok(Some(block)) => format!("{block}\n\n{prompt}"),
        Err(e) => {
            tracing::warn!(error = %e, "render failed, returning prompt unmodified");
            prompt.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, MatchedOn, Priority};

    fn result(id: &str, enforcement: Enforcement, payload: &str) -> MatchResult {
        MatchResult {
            rule_id: id.to_string(),
            classification: Classification::Domain,
            enforcement,
            priority: Priority::Medium,
            matched_on: vec![MatchedOn::PromptKeyword],
            matched_paths: vec![],
            payload: payload.to_string(),
        }
    }

    #[test]
    fn no_matches_is_identity() {
        let prompt = "just fix the typo";
        assert_eq!(augment(prompt, &[]), prompt);
        assert!(render(&[]).unwrap().is_none());
    }

    #[test]
    fn block_rendered_before_suggest() {
        let results = vec![
            result("must", Enforcement::Block, "read the migration guide"),
            result("may", Enforcement::Suggest, "consider splitting the PR"),
        ];
        let text = augment("do the thing", &results);
        let block_pos = text.find("read the migration guide").unwrap();
        let suggest_pos = text.find("consider splitting the PR").unwrap();
        assert!(block_pos < suggest_pos);
        assert!(text.find("Mandatory").unwrap() < text.find("Suggested").unwrap());
        assert!(text.ends_with("do the thing"));
    }

    #[test]
    fn headings_emitted_once_per_section() {
        let results = vec![
            result("a", Enforcement::Block, "one"),
            result("b", Enforcement::Block, "two"),
            result("c", Enforcement::Suggest, "three"),
        ];
        let text = render(&results).unwrap().unwrap();
        assert_eq!(text.matches("Mandatory project instructions").count(), 1);
        assert_eq!(text.matches("Suggested project guidance").count(), 1);
    }

    #[test]
    fn placeholders_expanded() {
        let mut r = result(
            "migrations",
            Enforcement::Suggest,
            "rule {{rule_id}} fired for {{matched_files}}",
        );
        r.matched_paths = vec!["db/migrate/a.rb".to_string(), "db/migrate/b.rb".to_string()];
        let text = render(&[r]).unwrap().unwrap();
        assert!(text.contains("rule migrations fired for db/migrate/a.rb, db/migrate/b.rb"));
    }

    #[test]
    fn unknown_placeholder_is_render_error() {
        let r = result("typo", Enforcement::Suggest, "see {{no_such_thing}}");
        let err = render(std::slice::from_ref(&r)).unwrap_err();
        assert!(matches!(err, SteerError::Render { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn render_error_degrades_to_original_prompt() {
        let r = result("typo", Enforcement::Block, "see {{no_such_thing}}");
        let prompt = "original prompt text";
        assert_eq!(augment(prompt, &[r]), prompt);
    }

    #[test]
    fn rendering_is_deterministic() {
        let results = vec![
            result("a", Enforcement::Block, "one"),
            result("b", Enforcement::Suggest, "two"),
        ];
        assert_eq!(augment("p", &results), augment("p", &results));
    }
}
