use crate::context::MatchContext;
use crate::evaluate::evaluate_rule;
use crate::rule::Rule;
use crate::store::RuleStore;
use crate::types::{Classification, Enforcement, MatchedOn, Priority};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MatchResult / MatchOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub rule_id: String,
    pub classification: Classification,
    pub enforcement: Enforcement,
    pub priority: Priority,
    pub matched_on: Vec<MatchedOn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_paths: Vec<String>,
    pub payload: String,
}

impl MatchResult {
    fn new(rule: &Rule, matched_on: Vec<MatchedOn>, matched_paths: Vec<String>) -> Self {
        Self {
            rule_id: rule.id.clone(),
            classification: rule.classification,
            enforcement: rule.enforcement,
            priority: rule.priority,
            matched_on,
            matched_paths,
            payload: rule.payload.clone(),
        }
    }
}

/// A rule whose evaluation failed and was skipped. Recorded for diagnostics
/// rather than propagated; one bad rule never blocks the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRule {
    pub rule_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub results: Vec<MatchResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRule>,
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

pub struct Matcher<'a> {
    store: &'a RuleStore,
}

impl<'a> Matcher<'a> {
    pub fn new(store: &'a RuleStore) -> Self {
        Self { store }
    }

    /// Evaluate every rule in store order against the context.
    ///
    /// Results are ranked by priority (high first) then enforcement
    /// (`block` before `suggest`); the sort is stable, so ties keep store
    /// order and identical inputs always produce identical output.
    pub fn evaluate(&self, ctx: &MatchContext) -> MatchOutcome {
        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for rule in self.store.rules() {
            match evaluate_rule(rule, ctx) {
                Ok(m) if m.is_match() => {
                    results.push(MatchResult::new(rule, m.categories, m.matched_paths));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(rule = %rule.id, error = %e, "skipping rule");
                    skipped.push(SkippedRule {
                        rule_id: rule.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        results.sort_by_key(|r| (r.priority, r.enforcement));
        MatchOutcome { results, skipped }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::CompileMode;
    use crate::store::RuleStore;

    fn store_from(yaml: &str) -> RuleStore {
        RuleStore::compile(&RuleStore::parse(yaml).unwrap(), CompileMode::Strict).unwrap()
    }

    const RANKED: &str = r#"
rules:
  low-suggest:
    classification: domain
    enforcement: suggest
    priority: low
    prompt_triggers:
      keywords: [deploy]
    payload: low suggest
  high-suggest:
    classification: domain
    enforcement: suggest
    priority: high
    prompt_triggers:
      keywords: [deploy]
    payload: high suggest
  high-block:
    classification: guardrail
    enforcement: block
    priority: high
    prompt_triggers:
      keywords: [deploy]
    payload: high block
  medium-block:
    classification: guardrail
    enforcement: block
    priority: medium
    prompt_triggers:
      keywords: [deploy]
    payload: medium block
"#;

    #[test]
    fn no_match_yields_empty_outcome() {
        let store = store_from(RANKED);
        let outcome = Matcher::new(&store).evaluate(&MatchContext::new("write a poem"));
        assert!(outcome.results.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn ranking_priority_then_enforcement() {
        let store = store_from(RANKED);
        let outcome = Matcher::new(&store).evaluate(&MatchContext::new("deploy the app"));
        let ids: Vec<&str> = outcome.results.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            ["high-block", "high-suggest", "medium-block", "low-suggest"]
        );
    }

    #[test]
    fn ties_keep_store_order() {
        let store = store_from(
            r#"
rules:
  second:
    classification: domain
    enforcement: suggest
    priority: medium
    prompt_triggers:
      keywords: [x]
    payload: a
  first:
    classification: domain
    enforcement: suggest
    priority: medium
    prompt_triggers:
      keywords: [x]
    payload: b
"#,
        );
        let outcome = Matcher::new(&store).evaluate(&MatchContext::new("x marks the spot"));
        let ids: Vec<&str> = outcome.results.iter().map(|r| r.rule_id.as_str()).collect();
        // "second" is declared before "first" in the document.
        assert_eq!(ids, ["second", "first"]);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let store = store_from(RANKED);
        let ctx = MatchContext::new("deploy the app");
        let a = serde_json::to_string(&Matcher::new(&store).evaluate(&ctx)).unwrap();
        let b = serde_json::to_string(&Matcher::new(&store).evaluate(&ctx)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_rule_skipped_others_still_match() {
        let file = RuleStore::parse(
            r#"
rules:
  broken:
    classification: domain
    enforcement: suggest
    prompt_triggers:
      intent_patterns: ['[unclosed']
    payload: x
  working:
    classification: domain
    enforcement: suggest
    prompt_triggers:
      keywords: [deploy]
    payload: y
"#,
        )
        .unwrap();
        let store = RuleStore::compile(&file, CompileMode::Lenient).unwrap();
        let outcome = Matcher::new(&store).evaluate(&MatchContext::new("deploy it"));

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].rule_id, "working");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].rule_id, "broken");
    }

    #[test]
    fn matched_on_serialized_snake_case() {
        let store = store_from(RANKED);
        let outcome = Matcher::new(&store).evaluate(&MatchContext::new("deploy"));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"prompt_keyword\""));
    }
}
