use crate::error::{Result, TypoError};
use crate::rules::Rule;
use std::fs;
use std::path::Path;

/// Parse a JSON rule set (`[{original, suggestion, enabled}]`).
///
/// The whole document must parse or nothing is returned. Entries with an
/// empty side are dropped.
pub fn import_rules(path: &Path) -> Result<Vec<Rule>> {
    let content = fs::read_to_string(path).map_err(|e| TypoError::io(path, e))?;
    let rules: Vec<Rule> = serde_json::from_str(&content).map_err(|e| TypoError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let total = rules.len();
    let rules: Vec<Rule> = rules.into_iter().filter(Rule::is_valid).collect();
    if rules.len() < total {
        log::warn!(
            "ignored {} rules with an empty phrase in {}",
            total - rules.len(),
            path.display()
        );
    }

    Ok(rules)
}

pub fn to_json(rules: &[Rule]) -> String {
    // Vec<Rule> of plain strings and bools always serializes.
    serde_json::to_string_pretty(rules).unwrap_or_else(|_| "[]".to_string())
}

pub fn export_rules(path: &Path, rules: &[Rule]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| TypoError::io(parent, e))?;
        }
    }
    fs::write(path, to_json(rules)).map_err(|e| TypoError::io(path, e))
}
