use anyhow::bail;
use clap::Subcommand;
use serde::Serialize;
use std::path::Path;
use steer_core::store::RuleStore;
use steer_core::SteerError;

use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum RulesSubcommand {
    /// List the configured rules
    List,
    /// Validate the rule file and report errors
    Validate,
}

pub fn run(root: &Path, subcommand: RulesSubcommand, json: bool) -> anyhow::Result<()> {
    match subcommand {
        RulesSubcommand::List => list(root, json),
        RulesSubcommand::Validate => validate(root, json),
    }
}

#[derive(Serialize)]
struct RuleSummary {
    id: String,
    classification: String,
    enforcement: String,
    priority: String,
    triggers: String,
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = RuleStore::load(root)?;
    let summaries: Vec<RuleSummary> = store
        .rules()
        .iter()
        .map(|r| RuleSummary {
            id: r.id.clone(),
            classification: r.classification.to_string(),
            enforcement: r.enforcement.to_string(),
            priority: r.priority.to_string(),
            triggers: r.trigger_summary(),
        })
        .collect();

    if json {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("no rules configured");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = summaries
        .into_iter()
        .map(|s| vec![s.id, s.classification, s.enforcement, s.priority, s.triggers])
        .collect();
    print_table(
        &["ID", "CLASS", "ENFORCEMENT", "PRIORITY", "TRIGGERS"],
        &rows,
    );
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    match RuleStore::load(root) {
        Ok(store) => {
            if json {
                print_json(&serde_json::json!({
                    "valid": true,
                    "rules": store.len(),
                    "checks": store.checks().len(),
                }))?;
            } else {
                println!(
                    "ok: {} rule(s), {} check tool(s)",
                    store.len(),
                    store.checks().len()
                );
            }
            Ok(())
        }
        Err(SteerError::NotInitialized) => bail!("{}", SteerError::NotInitialized),
        Err(e) => {
            if json {
                print_json(&serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                }))?;
            }
            bail!("invalid rule file: {e}")
        }
    }
}
