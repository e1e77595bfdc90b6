use crate::rules::Rule;
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashMap;

/// Lookup over the enabled rules: trigger phrase → correction, plus a
/// compiled automaton over all trigger phrases.
///
/// Always rebuilt wholesale from a rule snapshot, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    // (trigger, correction) in first-seen order; pattern ids index into this
    entries: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
    matcher: Option<AhoCorasick>,
}

impl DictionaryIndex {
    pub fn rebuild<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for rule in rules {
            if !rule.enabled || !rule.is_valid() {
                continue;
            }
            match lookup.get(&rule.original) {
                Some(&idx) => entries[idx].1 = rule.suggestion.clone(),
                None => {
                    lookup.insert(rule.original.clone(), entries.len());
                    entries.push((rule.original.clone(), rule.suggestion.clone()));
                }
            }
        }

        let matcher = if entries.is_empty() {
            None
        } else {
            build_matcher(&entries)
        };

        log::debug!("dictionary index rebuilt with {} triggers", entries.len());

        Self {
            entries,
            lookup,
            matcher,
        }
    }

    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.lookup
            .get(trigger)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, trigger: &str) -> bool {
        self.lookup.contains_key(trigger)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(trigger, correction)| (trigger.as_str(), correction.as_str()))
    }

    pub(crate) fn entry(&self, id: usize) -> (&str, &str) {
        let (trigger, correction) = &self.entries[id];
        (trigger.as_str(), correction.as_str())
    }

    pub(crate) fn matcher(&self) -> Option<&AhoCorasick> {
        self.matcher.as_ref()
    }
}

fn build_matcher(entries: &[(String, String)]) -> Option<AhoCorasick> {
    let patterns = entries.iter().map(|(trigger, _)| trigger.as_str());

    // Standard semantics are required for overlapping search.
    match AhoCorasick::builder()
        .match_kind(MatchKind::Standard)
        .build(patterns)
    {
        Ok(matcher) => Some(matcher),
        Err(e) => {
            log::warn!("falling back to per-phrase search: {}", e);
            None
        }
    }
}
