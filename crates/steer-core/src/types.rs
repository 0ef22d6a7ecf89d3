use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Guardrail,
    Domain,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Guardrail => "guardrail",
            Classification::Domain => "domain",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = crate::error::SteerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guardrail" => Ok(Classification::Guardrail),
            "domain" => Ok(Classification::Domain),
            _ => Err(crate::error::SteerError::UnknownValue {
                field: "classification",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Whether a matched rule's guidance is mandatory or optional.
///
/// Declaration order is the ranking order: `Block` sorts before `Suggest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    Block,
    Suggest,
}

impl Enforcement {
    pub fn as_str(self) -> &'static str {
        match self {
            Enforcement::Block => "block",
            Enforcement::Suggest => "suggest",
        }
    }
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Enforcement {
    type Err = crate::error::SteerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(Enforcement::Block),
            "suggest" => Ok(Enforcement::Suggest),
            _ => Err(crate::error::SteerError::UnknownValue {
                field: "enforcement",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Tie-break ordering for matched rules. Declaration order ranks `High`
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::SteerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(crate::error::SteerError::UnknownValue {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchedOn
// ---------------------------------------------------------------------------

/// The trigger categories a rule matched on. A result accumulates every
/// category that fired, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedOn {
    PromptKeyword,
    PromptIntent,
    FilePath,
    FileContent,
}

impl MatchedOn {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchedOn::PromptKeyword => "prompt_keyword",
            MatchedOn::PromptIntent => "prompt_intent",
            MatchedOn::FilePath => "file_path",
            MatchedOn::FileContent => "file_content",
        }
    }
}

impl fmt::Display for MatchedOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn priority_ranks_high_first() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn enforcement_ranks_block_first() {
        assert!(Enforcement::Block < Enforcement::Suggest);
    }

    #[test]
    fn enum_roundtrips() {
        for p in [Priority::High, Priority::Medium, Priority::Low] {
            assert_eq!(Priority::from_str(p.as_str()).unwrap(), p);
        }
        for e in [Enforcement::Block, Enforcement::Suggest] {
            assert_eq!(Enforcement::from_str(e.as_str()).unwrap(), e);
        }
        for c in [Classification::Guardrail, Classification::Domain] {
            assert_eq!(Classification::from_str(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn unknown_values_rejected() {
        assert!(Priority::from_str("urgent").is_err());
        assert!(Enforcement::from_str("warn").is_err());
        assert!(Classification::from_str("misc").is_err());
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&MatchedOn::PromptKeyword).unwrap();
        assert_eq!(json, "\"prompt_keyword\"");
        let json = serde_json::to_string(&Enforcement::Block).unwrap();
        assert_eq!(json, "\"block\"");
    }
}
