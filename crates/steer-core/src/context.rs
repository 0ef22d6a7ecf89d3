use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EditedFile
// ---------------------------------------------------------------------------

/// One file the assistant touched during the current session. The content
/// snapshot is optional; without it, content triggers are skipped for this
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snapshot: Option<String>,
}

impl EditedFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_snapshot: None,
        }
    }

    pub fn with_content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_snapshot: Some(content.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchContext
// ---------------------------------------------------------------------------

/// The per-request input bundle: the raw prompt plus the session's edited
/// files. Created fresh per prompt submission and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchContext {
    pub prompt: String,
    #[serde(default)]
    pub edited_files: Vec<EditedFile>,
}

impl MatchContext {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            edited_files: Vec::new(),
        }
    }

    pub fn with_files(prompt: impl Into<String>, edited_files: Vec<EditedFile>) -> Self {
        Self {
            prompt: prompt.into(),
            edited_files,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_json_roundtrip() {
        let ctx = MatchContext::with_files(
            "update the model",
            vec![
                EditedFile::new("app/models/post.rb"),
                EditedFile::with_content("app/models/user.rb", "class User\nend\n"),
            ],
        );
        let json = serde_json::to_string(&ctx).unwrap();
        let parsed: MatchContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.prompt, "update the model");
        assert_eq!(parsed.edited_files.len(), 2);
        assert!(parsed.edited_files[0].content_snapshot.is_none());
    }

    #[test]
    fn files_default_to_empty() {
        let parsed: MatchContext = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert!(parsed.edited_files.is_empty());
    }

    #[test]
    fn missing_snapshot_not_serialized() {
        let ctx = MatchContext::with_files("p", vec![EditedFile::new("a.rs")]);
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(!json.contains("content_snapshot"));
    }
}
