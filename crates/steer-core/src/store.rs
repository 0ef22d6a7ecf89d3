use crate::check::CheckTool;
use crate::error::{Result, SteerError};
use crate::paths;
use crate::rule::{CompileMode, Rule, RuleDef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// RuleFile (on-disk document)
// ---------------------------------------------------------------------------

/// The parsed `.steer/rules.yaml` document. YAML is a superset of JSON, so
/// a JSON rule document loads through the same path. Rule iteration order
/// is the document's insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, deserialize_with = "unique_rule_ids")]
    pub rules: IndexMap<String, RuleDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckTool>,
}

fn default_version() -> u32 {
    1
}

/// Deserialize the rule map rejecting duplicate ids. `IndexMap`'s own serde
/// impl silently keeps the last definition, which would let a config typo
/// replace a guardrail without any diagnostic.
fn unique_rule_ids<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, RuleDef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct RulesVisitor;

    impl<'de> serde::de::Visitor<'de> for RulesVisitor {
        type Value = IndexMap<String, RuleDef>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map of rule id to rule definition")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut rules = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, def)) = access.next_entry::<String, RuleDef>()? {
                if rules.insert(id.clone(), def).is_some() {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate rule id '{id}'"
                    )));
                }
            }
            Ok(rules)
        }
    }

    deserializer.deserialize_map(RulesVisitor)
}

// ---------------------------------------------------------------------------
// RuleStore
// ---------------------------------------------------------------------------

/// Validated, compiled rule set. Read-only after construction; iteration
/// preserves document order so matching is deterministic.
#[derive(Debug)]
pub struct RuleStore {
    rules: Vec<Rule>,
    checks: Vec<CheckTool>,
}

impl RuleStore {
    /// Load and strictly validate the rule file under `root`. Any invalid
    /// rule fails the whole load; no partial store is produced.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_with_mode(root, CompileMode::Strict)
    }

    pub fn load_with_mode(root: &Path, mode: CompileMode) -> Result<Self> {
        let path = paths::rules_path(root);
        if !path.exists() {
            return Err(SteerError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let file = Self::parse(&data)?;
        Self::compile(&file, mode)
    }

    pub fn parse(text: &str) -> Result<RuleFile> {
        let file: RuleFile = serde_yaml::from_str(text)?;
        Ok(file)
    }

    pub fn compile(file: &RuleFile, mode: CompileMode) -> Result<Self> {
        let mut rules = Vec::with_capacity(file.rules.len());
        for (id, def) in &file.rules {
            rules.push(Rule::compile(id, def, mode)?);
        }
        Ok(Self {
            rules,
            checks: file.checks.clone(),
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn checks(&self) -> &[CheckTool] {
        &self.checks
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
