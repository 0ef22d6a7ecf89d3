use crate::error::{Result, SteerError};
use crate::paths::validate_rule_id;
use crate::types::{Classification, Enforcement, Priority};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Raw definition (as written in .steer/rules.yaml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptTriggers {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub intent_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileTriggers {
    #[serde(default)]
    pub path_patterns: Vec<String>,
    #[serde(default)]
    pub content_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub classification: Classification,
    pub enforcement: Enforcement,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_triggers: Option<PromptTriggers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_triggers: Option<FileTriggers>,
    pub payload: String,
}

fn default_priority() -> Priority {
    Priority::Medium
}

// ---------------------------------------------------------------------------
// Lazily-compiled patterns
// ---------------------------------------------------------------------------

/// A regex compiled on first use. Strict store loading forces compilation
/// up front; lenient loading defers it to evaluation, where a bad pattern
/// skips only its own rule.
#[derive(Debug)]
pub struct LazyRegex {
    raw: String,
    compiled: OnceLock<std::result::Result<Regex, regex::Error>>,
}

impl LazyRegex {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn get(&self) -> std::result::Result<&Regex, String> {
        self.compiled
            .get_or_init(|| Regex::new(&self.raw))
            .as_ref()
            .map_err(|e| e.to_string())
    }
}

/// Glob counterpart of [`LazyRegex`]. `literal_separator` keeps `*` inside
/// one path segment; `**` crosses segments.
#[derive(Debug)]
pub struct LazyGlob {
    raw: String,
    compiled: OnceLock<std::result::Result<GlobMatcher, globset::Error>>,
}

impl LazyGlob {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn get(&self) -> std::result::Result<&GlobMatcher, String> {
        self.compiled
            .get_or_init(|| {
                GlobBuilder::new(&self.raw)
                    .literal_separator(true)
                    .build()
                    .map(|g| g.compile_matcher())
            })
            .as_ref()
            .map_err(|e| e.to_string())
    }
}

// ---------------------------------------------------------------------------
// CompileMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Compile every pattern at load time; any failure is a config error
    /// naming the rule and field. The CLI default.
    #[default]
    Strict,
    /// Keep rules with uncompilable patterns; the failure surfaces at
    /// evaluation time, where the matcher skips that rule and logs it.
    Lenient,
}

// ---------------------------------------------------------------------------
// Rule (validated, compiled)
// ---------------------------------------------------------------------------

/// One validated rule from the store. Keywords are stored lowercased;
/// regexes and globs are wrapped in lazy compilers.
#[derive(Debug)]
pub struct Rule {
    pub id: String,
    pub classification: Classification,
    pub enforcement: Enforcement,
    pub priority: Priority,
    pub keywords: Vec<String>,
    pub intent_patterns: Vec<LazyRegex>,
    pub path_patterns: Vec<LazyGlob>,
    pub content_patterns: Vec<LazyRegex>,
    pub payload: String,
}

impl Rule {
    pub fn compile(id: &str, def: &RuleDef, mode: CompileMode) -> Result<Rule> {
        validate_rule_id(id)?;

        let has_prompt = def
            .prompt_triggers
            .as_ref()
            .is_some_and(|t| !t.keywords.is_empty() || !t.intent_patterns.is_empty());
        let has_file = def
            .file_triggers
            .as_ref()
            .is_some_and(|t| !t.path_patterns.is_empty() || !t.content_patterns.is_empty());
        if !has_prompt && !has_file {
            return Err(SteerError::Config {
                rule: id.to_string(),
                field: "triggers".to_string(),
                reason: "at least one of prompt_triggers or file_triggers must be non-empty"
                    .to_string(),
            });
        }

        let mut keywords = Vec::new();
        let mut intent_patterns = Vec::new();
        if let Some(pt) = &def.prompt_triggers {
            for kw in &pt.keywords {
                if kw.trim().is_empty() {
                    // An empty keyword is a substring of everything.
                    return Err(SteerError::Config {
                        rule: id.to_string(),
                        field: "prompt_triggers.keywords".to_string(),
                        reason: "keyword must not be empty".to_string(),
                    });
                }
                keywords.push(kw.to_lowercase());
            }
            for pat in &pt.intent_patterns {
                intent_patterns.push(LazyRegex::new(pat));
            }
        }

        let mut path_patterns = Vec::new();
        let mut content_patterns = Vec::new();
        if let Some(ft) = &def.file_triggers {
            for pat in &ft.path_patterns {
                path_patterns.push(LazyGlob::new(pat));
            }
            for pat in &ft.content_patterns {
                content_patterns.push(LazyRegex::new(pat));
            }
        }

        let rule = Rule {
            id: id.to_string(),
            classification: def.classification,
            enforcement: def.enforcement,
            priority: def.priority,
            keywords,
            intent_patterns,
            path_patterns,
            content_patterns,
            payload: def.payload.clone(),
        };

        if mode == CompileMode::Strict {
            rule.force_compile()?;
        }
        Ok(rule)
    }

    /// Compile every pattern now, converting the first failure into a
    /// config error naming this rule and the offending field.
    fn force_compile(&self) -> Result<()> {
        for pat in &self.intent_patterns {
            pat.get().map_err(|reason| SteerError::Config {
                rule: self.id.clone(),
                field: format!("prompt_triggers.intent_patterns[{}]", pat.raw()),
                reason,
            })?;
        }
        for pat in &self.path_patterns {
            pat.get().map_err(|reason| SteerError::Config {
                rule: self.id.clone(),
                field: format!("file_triggers.path_patterns[{}]", pat.raw()),
                reason,
            })?;
        }
        for pat in &self.content_patterns {
            pat.get().map_err(|reason| SteerError::Config {
                rule: self.id.clone(),
                field: format!("file_triggers.content_patterns[{}]", pat.raw()),
                reason,
            })?;
        }
        Ok(())
    }

    /// Short human summary of this rule's triggers, for listings.
    pub fn trigger_summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.keywords.is_empty() {
            parts.push(format!("{} keyword(s)", self.keywords.len()));
        }
        if !self.intent_patterns.is_empty() {
            parts.push(format!("{} intent(s)", self.intent_patterns.len()));
        }
        if !self.path_patterns.is_empty() {
            parts.push(format!("{} path(s)", self.path_patterns.len()));
        }
        if !self.content_patterns.is_empty() {
            parts.push(format!("{} content(s)", self.content_patterns.len()));
        }
        parts.join(", ")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
