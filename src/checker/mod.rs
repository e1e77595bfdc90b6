pub mod corrector;
pub mod diagnostics;
pub mod dictionary;
pub mod scanner;

use crate::document::LineIndex;
use crate::error::{Result, TypoError};
use crate::rules::{loader, Rule, RuleStore};
use crate::{CheckResult, Config, TypoItem};
use anyhow::Context;
use diagnostics::Diagnostic;
use dictionary::DictionaryIndex;
use scanner::MatchOccurrence;
use std::fs;
use std::path::Path;

/// A rule store and the index derived from it.
///
/// Read access is shared freely; every mutation rebuilds the index so the two
/// never drift apart.
#[derive(Debug, Clone, Default)]
pub struct TypoChecker {
    rules: RuleStore,
    index: DictionaryIndex,
}

/// Build the rule store for `config`: bundled defaults (if enabled), then
/// configured custom rules, then the custom dictionary file. Later layers
/// win for a shared phrase.
pub fn load_rules(config: &Config) -> Result<RuleStore> {
    let mut store = RuleStore::new();

    if config.use_default_rules {
        store.merge(loader::default_rules());
    }

    store.merge(config.custom_rules.iter().cloned());

    if let Some(path) = &config.custom_dictionary {
        if path.exists() {
            store.merge(loader::load_file(path)?);
        }
    }

    log::debug!("{} rules loaded", store.len());
    Ok(store)
}

impl TypoChecker {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::from_store(load_rules(config)?))
    }

    pub fn from_rules<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        Self::from_store(rules.into_iter().collect())
    }

    fn from_store(rules: RuleStore) -> Self {
        let index = DictionaryIndex::rebuild(rules.iter());
        Self { rules, index }
    }

    /// Clear and reload every rule source. On failure the rules loaded before
    /// stay in place.
    pub fn reload(&mut self, config: &Config) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn index(&self) -> &DictionaryIndex {
        &self.index
    }

    pub fn merge_rules<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = Rule>,
    {
        self.rules.merge(incoming);
        self.rebuild();
    }

    pub fn set_enabled(&mut self, original: &str, enabled: bool) -> bool {
        let found = self.rules.set_enabled(original, enabled);
        if found {
            self.rebuild();
        }
        found
    }

    fn rebuild(&mut self) {
        self.index = DictionaryIndex::rebuild(self.rules.iter());
    }

    pub fn scan(&self, text: &str) -> Vec<MatchOccurrence> {
        scanner::scan(text, &self.index)
    }

    pub fn fix_all(&self, text: &str) -> String {
        corrector::fix_all(text, &self.scan(text))
    }

    pub fn check_file(&self, file_path: &Path) -> anyhow::Result<CheckResult> {
        let content = read(file_path)?;
        let errors = self.items(&content);

        Ok(CheckResult {
            path: file_path.to_path_buf(),
            error_count: errors.len(),
            fixed_count: 0,
            errors,
        })
    }

    pub fn fix_auto(&self, file_path: &Path) -> anyhow::Result<CheckResult> {
        self.fix_with(file_path, |items| Ok((0..items.len()).collect()))
    }

    /// Fix the occurrences picked by `select`, which receives every
    /// occurrence in the file and returns the indices to apply.
    pub fn fix_with<F>(&self, file_path: &Path, select: F) -> anyhow::Result<CheckResult>
    where
        F: FnOnce(&[TypoItem]) -> anyhow::Result<Vec<usize>>,
    {
        let content = read(file_path)?;
        let occurrences = self.scan(&content);
        if occurrences.is_empty() {
            return Ok(CheckResult::new(file_path));
        }

        let items = to_items(&content, &occurrences);
        let chosen = select(&items)?;
        let selected: Vec<&MatchOccurrence> =
            chosen.iter().filter_map(|&i| occurrences.get(i)).collect();

        let edits = corrector::plan(&content, selected);
        let fixed_count = edits.len();
        if fixed_count > 0 {
            write(file_path, &corrector::apply(&content, &edits))?;
        }

        // whatever is left after the rewrite
        let remaining = if fixed_count > 0 {
            self.items(&read(file_path)?)
        } else {
            items
        };

        Ok(CheckResult {
            path: file_path.to_path_buf(),
            error_count: remaining.len(),
            fixed_count,
            errors: remaining,
        })
    }

    fn items(&self, content: &str) -> Vec<TypoItem> {
        to_items(content, &self.scan(content))
    }
}

fn to_items(content: &str, occurrences: &[MatchOccurrence]) -> Vec<TypoItem> {
    let lines = LineIndex::new(content);
    occurrences
        .iter()
        .map(|occ| TypoItem {
            original: occ.original.clone(),
            suggestion: occ.suggestion.clone(),
            line: occ.range.start.line + 1,
            column: occ.range.start.column + 1,
            offset: occ.offset,
            context: lines
                .line_text(occ.range.start.line)
                .unwrap_or_default()
                .to_string(),
            diagnostic: Diagnostic::from(occ),
        })
        .collect()
}

/// Error out when a correction command has nothing to work on.
pub fn require_targets<T>(targets: &[T]) -> Result<()> {
    if targets.is_empty() {
        return Err(TypoError::NoActiveTarget);
    }
    Ok(())
}

/// Replace every occurrence of `original` in a file, whether or not it is a
/// known rule. Returns the number of replacements.
pub fn replace_in_file(
    file_path: &Path,
    original: &str,
    suggestion: &str,
) -> anyhow::Result<usize> {
    let content = read(file_path)?;
    let count = if original.is_empty() {
        0
    } else {
        content.matches(original).count()
    };

    if count > 0 {
        write(file_path, &corrector::fix_one(&content, original, suggestion))?;
    }

    Ok(count)
}

fn read(file_path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(file_path)
        .map_err(|e| TypoError::io(file_path, e))
        .with_context(|| format!("Failed to read file: {}", file_path.display()))
}

fn write(file_path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(file_path, content)
        .map_err(|e| TypoError::io(file_path, e))
        .with_context(|| format!("Failed to write file: {}", file_path.display()))
}
