//! Per-rule trigger evaluation: a pure function of (rule, context).

use crate::context::MatchContext;
use crate::error::{Result, SteerError};
use crate::rule::Rule;
use crate::types::MatchedOn;

/// What one rule matched on. Empty `categories` means no match.
#[derive(Debug, Clone, Default)]
pub struct RuleMatch {
    /// Every trigger category that fired, in the stable order
    /// keyword, intent, path, content.
    pub categories: Vec<MatchedOn>,
    /// The edited-file paths that satisfied a path pattern, in context
    /// order. Empty unless `FilePath` fired.
    pub matched_paths: Vec<String>,
}

impl RuleMatch {
    pub fn is_match(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Evaluate one rule against the context. Categories are OR-ed: the rule
/// matches if any trigger in any category fires, and every firing category
/// is recorded.
///
/// The only error path is a pattern that failed lenient-mode compilation;
/// strict-mode stores never error here.
pub fn evaluate_rule(rule: &Rule, ctx: &MatchContext) -> Result<RuleMatch> {
    let mut out = RuleMatch::default();

    // Prompt keywords: case-insensitive substring containment.
    if !rule.keywords.is_empty() {
        let prompt_lower = ctx.prompt.to_lowercase();
        if rule.keywords.iter().any(|kw| prompt_lower.contains(kw)) {
            out.categories.push(MatchedOn::PromptKeyword);
        }
    }

    // Intent patterns: regex search over the raw prompt.
    for pat in &rule.intent_patterns {
        let re = pat.get().map_err(|reason| evaluation_error(rule, &reason))?;
        if re.is_match(&ctx.prompt) {
            out.categories.push(MatchedOn::PromptIntent);
            break;
        }
    }

    // Path patterns: every edited file against every glob.
    if !rule.path_patterns.is_empty() && !ctx.edited_files.is_empty() {
        for file in &ctx.edited_files {
            for pat in &rule.path_patterns {
                let glob = pat.get().map_err(|reason| evaluation_error(rule, &reason))?;
                if glob.is_match(&file.path) {
                    out.matched_paths.push(file.path.clone());
                    break;
                }
            }
        }
        if !out.matched_paths.is_empty() {
            out.categories.push(MatchedOn::FilePath);
        }
    }

    // Content patterns: only files that carry a snapshot. A missing
    // snapshot skips the file, it does not count as a failed match.
    'content: for pat in &rule.content_patterns {
        let re = pat.get().map_err(|reason| evaluation_error(rule, &reason))?;
        for file in &ctx.edited_files {
            if let Some(snapshot) = &file.content_snapshot {
                if re.is_match(snapshot) {
                    out.categories.push(MatchedOn::FileContent);
                    break 'content;
                }
            }
        }
    }

    Ok(out)
}

fn evaluation_error(rule: &Rule, reason: &str) -> SteerError {
    SteerError::Evaluation {
        rule: rule.id.clone(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
