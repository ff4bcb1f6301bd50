//! File loading shared by the subcommands. The format is picked from the
//! file extension: `.yaml` / `.yml` are YAML, anything else is JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use lqp_core::VerificationConfig;
use lqp_ledger::RawContract;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Deserialize a YAML or JSON document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    }
}

/// Load the raw contract feed.
pub fn load_contracts(path: &Path) -> Result<Vec<RawContract>> {
    load_document(path)
}

/// Load and validate a verification config.
pub fn load_config(path: &Path) -> Result<VerificationConfig> {
    let content = read(path)?;
    let config = if is_yaml(path) {
        VerificationConfig::from_yaml_str(&content)
    } else {
        VerificationConfig::from_json_str(&content)
    };
    config.with_context(|| format!("invalid config: {}", path.display()))
}
