//! Sequential formatter / type-checker invocation over edited files.
//!
//! Each configured tool runs once per matching edited file as a `sh -c`
//! subprocess. A failing or unspawnable command records a failed result and
//! the loop continues to the next file; one broken tool never aborts the
//! batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::context::EditedFile;

// ---------------------------------------------------------------------------
// CheckTool
// ---------------------------------------------------------------------------

/// One external check command from the `checks:` section of the rule file.
///
/// `{file}` in `command` is replaced with the edited file's path; if the
/// placeholder is absent the path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckTool {
    pub name: String,
    pub command: String,
    /// File extensions this tool applies to (no leading dot). Empty means
    /// every edited file.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl CheckTool {
    fn applies_to(&self, path: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|want| want == ext))
            .unwrap_or(false)
    }

    fn command_for(&self, path: &str) -> String {
        if self.command.contains("{file}") {
            self.command.replace("{file}", path)
        } else {
            format!("{} {}", self.command, path)
        }
    }

    /// The binary the command starts with, used for the availability probe.
    fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}

// ---------------------------------------------------------------------------
// CheckResult / CheckReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub tool: String,
    pub path: String,
    pub passed: bool,
    pub output: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTool {
    pub tool: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_tools: Vec<SkippedTool>,
    pub passed: bool,
}

// ---------------------------------------------------------------------------
// run_checks
// ---------------------------------------------------------------------------

/// Run every applicable tool against every edited file, sequentially.
/// Subprocesses run with `root` as the working directory.
pub fn run_checks(root: &Path, tools: &[CheckTool], files: &[EditedFile]) -> CheckReport {
    let mut results = Vec::new();
    let mut skipped_tools = Vec::new();

    for tool in tools {
        // Probe once per tool so an absent binary is reported once, not
        // once per file.
        match tool.program() {
            Some(program) => {
                if which::which(program).is_err() {
                    tracing::warn!(tool = %tool.name, %program, "check tool not found, skipping");
                    skipped_tools.push(SkippedTool {
                        tool: tool.name.clone(),
                        reason: format!("'{program}' not found on PATH"),
                    });
                    continue;
                }
            }
            None => {
                skipped_tools.push(SkippedTool {
                    tool: tool.name.clone(),
                    reason: "empty command".to_string(),
                });
                continue;
            }
        }

        for file in files {
            if !tool.applies_to(&file.path) {
                continue;
            }
            results.push(run_one(root, tool, &file.path));
        }
    }

    let passed = results.iter().all(|r| r.passed);
    CheckReport {
        generated_at: Utc::now(),
        results,
        skipped_tools,
        passed,
    }
}

fn run_one(root: &Path, tool: &CheckTool, path: &str) -> CheckResult {
    let command = tool.command_for(path);
    tracing::debug!(tool = %tool.name, %command, "running check");

    let start = Instant::now();
    let output = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(root)
        .stdin(Stdio::null())
        .output();
    let duration_ms = start.elapsed().as_millis() as u64;

    match output {
        Ok(out) => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !stderr.trim().is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(stderr.trim_end());
            }
            CheckResult {
                tool: tool.name.clone(),
                path: path.to_string(),
                passed: out.status.success(),
                output: text,
                duration_ms,
            }
        }
        Err(e) => CheckResult {
            tool: tool.name.clone(),
            path: path.to_string(),
            passed: false,
            output: format!("failed to spawn: {e}"),
            duration_ms,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool(name: &str, command: &str, extensions: &[&str]) -> CheckTool {
        CheckTool {
            name: name.to_string(),
            command: command.to_string(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn extension_filter() {
        let t = tool("rubocop", "rubocop {file}", &["rb"]);
        assert!(t.applies_to("app/models/post.rb"));
        assert!(!t.applies_to("src/main.rs"));
        assert!(!t.applies_to("Makefile"));
    }

    #[test]
    fn no_extensions_means_all_files() {
        let t = tool("fmt", "fmt", &[]);
        assert!(t.applies_to("anything.xyz"));
        assert!(t.applies_to("Makefile"));
    }

    #[test]
    fn file_placeholder_substituted() {
        let t = tool("tc", "tsc --noEmit {file}", &[]);
        assert_eq!(t.command_for("src/a.ts"), "tsc --noEmit src/a.ts");
    }

    #[test]
    fn path_appended_without_placeholder() {
        let t = tool("tc", "rubocop", &[]);
        assert_eq!(t.command_for("a.rb"), "rubocop a.rb");
    }

    #[test]
    fn passing_and_failing_commands_both_recorded() {
        let dir = TempDir::new().unwrap();
        let tools = vec![tool("ok", "true", &[]), tool("bad", "false", &[])];
        let files = vec![EditedFile::new("a.txt")];

        let report = run_checks(dir.path(), &tools, &files);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].passed);
        assert!(!report.results[1].passed);
        assert!(!report.passed);
    }

    #[test]
    fn failing_tool_does_not_abort_batch() {
        let dir = TempDir::new().unwrap();
        let tools = vec![tool("bad", "false", &[])];
        let files = vec![EditedFile::new("a.txt"), EditedFile::new("b.txt")];

        let report = run_checks(dir.path(), &tools, &files);
        // Both files still ran despite the first failure.
        assert_eq!(report.results.len(), 2);
    }

    #[test]
    fn missing_binary_reported_once() {
        let dir = TempDir::new().unwrap();
        let tools = vec![tool("ghost", "definitely-not-a-real-binary-xyz", &[])];
        let files = vec![EditedFile::new("a.txt"), EditedFile::new("b.txt")];

        let report = run_checks(dir.path(), &tools, &files);
        assert!(report.results.is_empty());
        assert_eq!(report.skipped_tools.len(), 1);
        assert!(report.skipped_tools[0].reason.contains("not found"));
        // No results, so nothing failed.
        assert!(report.passed);
    }

    #[test]
    fn output_captures_stdout_and_stderr() {
        let dir = TempDir::new().unwrap();
        let tools = vec![tool("echo", "sh -c 'echo out; echo err >&2' --", &[])];
        let files = vec![EditedFile::new("a.txt")];

        let report = run_checks(dir.path(), &tools, &files);
        assert!(report.results[0].output.contains("out"));
        assert!(report.results[0].output.contains("err"));
    }

    #[test]
    fn check_tool_yaml_defaults() {
        let yaml = "name: lint\ncommand: cargo clippy\n";
        let t: CheckTool = serde_yaml::from_str(yaml).unwrap();
        assert!(t.extensions.is_empty());
    }
}
