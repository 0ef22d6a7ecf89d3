use std::path::Path;
use steer_core::{io, paths};

const STARTER_RULES: &str = r#"# steer rule set.
#
# Each rule maps an id to a set of triggers and a payload. When a prompt or
# an edited file matches the triggers, the payload is injected into the
# prompt before it reaches the model. Run `steer rules validate` after
# editing this file.
version: 1

rules:
  no-force-push:
    classification: guardrail
    enforcement: block
    priority: high
    prompt_triggers:
      keywords: [force push, hard reset]
      intent_patterns: ['(?i)git\s+push\s+.*--force']
    payload: Never force-push or hard-reset shared branches.

  migrations:
    classification: domain
    enforcement: suggest
    file_triggers:
      path_patterns: ['db/migrate/**/*.rb']
    payload: Migrations must be reversible; include a down method.

# External commands run by `steer check` against edited files. `{file}` is
# replaced with the file path; without it the path is appended.
checks: []
"#;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let path = paths::rules_path(root);
    let written = io::write_if_missing(&path, STARTER_RULES.as_bytes())?;
    let display = path
        .strip_prefix(root)
        .unwrap_or(&path)
        .display()
        .to_string();
    if written {
        println!("created: {display}");
    } else {
        println!("exists: {display}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_core::store::RuleStore;
    use tempfile::TempDir;

    #[test]
    fn starter_rules_validate_cleanly() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).unwrap();
        let store = RuleStore::load(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.checks().is_empty());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).unwrap();
        let path = dir.path().join(".steer/rules.yaml");
        std::fs::write(&path, "version: 1\n").unwrap();
        run(dir.path()).unwrap();
        // Second init must not clobber the edited file.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1\n");
    }
}
