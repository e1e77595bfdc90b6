use crate::checker::scanner::MatchOccurrence;
use serde::Serialize;
use std::ops::Range;

/// Replace the bytes in `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Turn occurrences into an ascending, non-overlapping list of edits for
/// `text`.
///
/// When two occurrences overlap the one starting first is kept (the longer
/// one on a tie). Occurrences whose span no longer holds their phrase in
/// `text` belong to another snapshot and are dropped.
pub fn plan<'a, I>(text: &str, occurrences: I) -> Vec<TextEdit>
where
    I: IntoIterator<Item = &'a MatchOccurrence>,
{
    let mut candidates: Vec<&MatchOccurrence> = occurrences.into_iter().collect();
    candidates.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut edits: Vec<TextEdit> = Vec::with_capacity(candidates.len());
    let mut covered = 0;

    for occ in candidates {
        if text.get(occ.span.clone()) != Some(occ.original.as_str()) {
            log::warn!(
                "stale occurrence of {:?} at offset {} skipped",
                occ.original,
                occ.offset
            );
            continue;
        }
        if occ.span.start < covered {
            log::debug!(
                "overlapping occurrence of {:?} at offset {} skipped",
                occ.original,
                occ.offset
            );
            continue;
        }
        covered = occ.span.end;
        edits.push(TextEdit {
            range: occ.span.clone(),
            replacement: occ.suggestion.clone(),
        });
    }

    edits
}

/// Splice ascending, non-overlapping edits into `text`.
pub fn apply(text: &str, edits: &[TextEdit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_end = 0;

    for edit in edits {
        out.push_str(&text[prev_end..edit.range.start]);
        out.push_str(&edit.replacement);
        prev_end = edit.range.end;
    }
    out.push_str(&text[prev_end..]);

    out
}

pub fn fix_all(text: &str, occurrences: &[MatchOccurrence]) -> String {
    fix_selected(text, occurrences)
}

/// Apply only the given occurrences; everything else is left untouched.
pub fn fix_selected<'a, I>(text: &str, selected: I) -> String
where
    I: IntoIterator<Item = &'a MatchOccurrence>,
{
    apply(text, &plan(text, selected))
}

/// Replace every literal occurrence of `original` with `suggestion`.
pub fn fix_one(text: &str, original: &str, suggestion: &str) -> String {
    if original.is_empty() {
        return text.to_string();
    }
    text.replace(original, suggestion)
}
