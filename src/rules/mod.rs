pub mod loader;
pub mod transfer;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One trigger phrase → correction mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    pub fn new(original: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            suggestion: suggestion.into(),
            enabled: true,
        }
    }

    pub fn disabled(original: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(original, suggestion)
        }
    }

    /// Both sides must be non-empty for a rule to be usable.
    pub fn is_valid(&self) -> bool {
        !self.original.is_empty() && !self.suggestion.is_empty()
    }
}

/// Ordered set of rules keyed by `original`.
///
/// Holds at most one rule per trigger phrase. Insertion order is kept so that
/// listings and exports are stable, but it carries no precedence meaning:
/// precedence comes from the order in which layers are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<Rule>,
    positions: HashMap<String, usize>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, or overwrite `suggestion` and `enabled` of the rule with
    /// the same `original`. Returns `true` when the key was new. Rules with an
    /// empty side are ignored.
    pub fn upsert(&mut self, rule: Rule) -> bool {
        if !rule.is_valid() {
            return false;
        }
        match self.positions.get(&rule.original) {
            Some(&idx) => {
                let existing = &mut self.rules[idx];
                existing.suggestion = rule.suggestion;
                existing.enabled = rule.enabled;
                false
            }
            None => {
                self.positions.insert(rule.original.clone(), self.rules.len());
                self.rules.push(rule);
                true
            }
        }
    }

    /// Upsert every incoming rule; later rules win for a shared key.
    pub fn merge<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = Rule>,
    {
        let mut added = 0;
        let mut updated = 0;
        for rule in incoming {
            if !rule.is_valid() {
                log::warn!(
                    "ignoring rule with an empty phrase: {:?} → {:?}",
                    rule.original,
                    rule.suggestion
                );
                continue;
            }
            if self.upsert(rule) {
                added += 1;
            } else {
                updated += 1;
            }
        }
        log::debug!("merged rules: {} added, {} updated", added, updated);
    }

    pub fn remove(&mut self, original: &str) -> Option<Rule> {
        let idx = self.positions.remove(original)?;
        let removed = self.rules.remove(idx);
        for pos in self.positions.values_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
        Some(removed)
    }

    pub fn find(&self, original: &str) -> Option<&Rule> {
        self.positions.get(original).map(|&idx| &self.rules[idx])
    }

    /// Flip the enabled flag of an existing rule. Returns `false` if absent.
    pub fn set_enabled(&mut self, original: &str, enabled: bool) -> bool {
        match self.positions.get(original) {
            Some(&idx) => {
                self.rules[idx].enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn filter_enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.positions.clear();
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }
}

impl FromIterator<Rule> for RuleStore {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut store = RuleStore::new();
        store.merge(iter);
        store
    }
}

/// Merge `incoming` on top of `existing` and return the combined list.
pub fn merge_rules(existing: &[Rule], incoming: &[Rule]) -> Vec<Rule> {
    let mut store: RuleStore = existing.iter().cloned().collect();
    store.merge(incoming.iter().cloned());
    store.into_rules()
}
