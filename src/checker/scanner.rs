use crate::checker::dictionary::DictionaryIndex;
use crate::document::{LineIndex, TextRange};
use serde::Serialize;
use std::ops::Range;

/// One located instance of a trigger phrase in a text snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOccurrence {
    pub original: String,
    pub suggestion: String,
    /// Character index of the match.
    pub offset: usize,
    /// Character length of `original`.
    pub length: usize,
    /// Byte span in the scanned text.
    #[serde(skip)]
    pub span: Range<usize>,
    pub range: TextRange,
}

// Raw hit before positions are resolved.
struct Hit {
    pattern: usize,
    span: Range<usize>,
}

/// Find every occurrence of every trigger phrase in `text`.
///
/// Each trigger is matched left to right without overlapping itself.
/// Occurrences of different triggers may overlap and are all reported.
/// The result is ordered by start offset.
pub fn scan(text: &str, index: &DictionaryIndex) -> Vec<MatchOccurrence> {
    if text.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let mut hits = match index.matcher() {
        Some(_) => automaton_hits(text, index),
        None => per_trigger_hits(text, index),
    };
    hits.sort_by(|a, b| {
        (a.span.start, a.span.end, a.pattern).cmp(&(b.span.start, b.span.end, b.pattern))
    });

    let lines = LineIndex::new(text);
    let occurrences: Vec<MatchOccurrence> = hits
        .into_iter()
        .map(|hit| {
            let (original, suggestion) = index.entry(hit.pattern);
            MatchOccurrence {
                original: original.to_string(),
                suggestion: suggestion.to_string(),
                offset: lines.char_offset(hit.span.start),
                length: original.chars().count(),
                range: TextRange {
                    start: lines.position(hit.span.start),
                    end: lines.position(hit.span.end),
                },
                span: hit.span,
            }
        })
        .collect();

    log::debug!(
        "scanned {} bytes against {} triggers: {} occurrences",
        text.len(),
        index.len(),
        occurrences.len()
    );

    occurrences
}

// Single overlapping pass over all triggers. Overlapping search reports a
// trigger at every position it occurs, so self-overlaps are dropped here to
// keep per-trigger left-to-right semantics. Matches arrive ordered by end
// offset, which for a fixed-length trigger is also start order.
fn automaton_hits(text: &str, index: &DictionaryIndex) -> Vec<Hit> {
    let Some(matcher) = index.matcher() else {
        return Vec::new();
    };

    let mut last_end = vec![0usize; index.len()];
    let mut hits = Vec::new();

    for mat in matcher.find_overlapping_iter(text) {
        let pattern = mat.pattern().as_usize();
        if mat.start() < last_end[pattern] {
            continue;
        }
        last_end[pattern] = mat.end();
        hits.push(Hit {
            pattern,
            span: mat.start()..mat.end(),
        });
    }

    hits
}

fn per_trigger_hits(text: &str, index: &DictionaryIndex) -> Vec<Hit> {
    let mut hits = Vec::new();

    for (pattern, (trigger, _)) in index.iter().enumerate() {
        if trigger.is_empty() {
            continue;
        }
        for (start, found) in text.match_indices(trigger) {
            hits.push(Hit {
                pattern,
                span: start..start + found.len(),
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;
    use crate::rules::Rule;

    fn index(pairs: &[(&str, &str)]) -> DictionaryIndex {
        let rules: Vec<Rule> = pairs.iter().map(|(o, s)| Rule::new(*o, *s)).collect();
        DictionaryIndex::rebuild(&rules)
    }

    fn summary(occurrences: &[MatchOccurrence]) -> Vec<(&str, &str, usize)> {
        occurrences
            .iter()
            .map(|o| (o.original.as_str(), o.suggestion.as_str(), o.offset))
            .collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(scan("", &index(&[("帮忙", "帮助")])).is_empty());
    }

    #[test]
    fn test_empty_index() {
        assert!(scan("请帮忙处理", &DictionaryIndex::default()).is_empty());
    }

    #[test]
    fn test_single_match_offset_is_in_characters() {
        let found = scan("请帮忙处理", &index(&[("帮忙", "帮助")]));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].original, "帮忙");
        assert_eq!(found[0].suggestion, "帮助");
        assert_eq!(found[0].offset, 1);
        assert_eq!(found[0].length, 2);
        assert_eq!(found[0].span, 3..9);
    }

    #[test]
    fn test_results_sorted_by_offset() {
        let found = scan(
            "因为因为他的的错",
            &index(&[("的的", "的"), ("因为因为", "因为")]),
        );

        assert_eq!(
            summary(&found),
            vec![("因为因为", "因为", 0), ("的的", "的", 5)]
        );
    }

    #[test]
    fn test_overlapping_triggers_both_reported() {
        let found = scan("ABC", &index(&[("AB", "X"), ("BC", "Y")]));
        assert_eq!(summary(&found), vec![("AB", "X", 0), ("BC", "Y", 1)]);
    }

    #[test]
    fn test_trigger_does_not_overlap_itself() {
        let found = scan("aaaaa", &index(&[("aa", "b")]));
        let offsets: Vec<_> = found.iter().map(|o| o.offset).collect();
        assert_eq!(offsets, vec![0, 2]);
    }

    #[test]
    fn test_nested_triggers() {
        let found = scan("一股作气", &index(&[("一股作气", "一鼓作气"), ("股作", "鼓作")]));
        assert_eq!(
            summary(&found),
            vec![("一股作气", "一鼓作气", 0), ("股作", "鼓作", 1)]
        );
    }

    #[test]
    fn test_special_characters_match_literally() {
        let found = scan("a.*b (x) a.*b", &index(&[(".*", "?"), ("(x)", "[x]")]));
        assert_eq!(
            summary(&found),
            vec![(".*", "?", 1), ("(x)", "[x]", 5), (".*", "?", 10)]
        );
    }

    #[test]
    fn test_line_and_column() {
        let found = scan("第一行\n请帮忙处理\n帮忙", &index(&[("帮忙", "帮助")]));

        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].range.start,
            Position { line: 1, column: 1 }
        );
        assert_eq!(found[0].range.end, Position { line: 1, column: 3 });
        assert_eq!(found[1].range.start, Position { line: 2, column: 0 });
        assert_eq!(found[1].offset, 10);
    }

    #[test]
    fn test_automaton_agrees_with_per_trigger_search() {
        let idx = index(&[
            ("AB", "X"),
            ("BC", "Y"),
            ("aa", "b"),
            ("的的", "的"),
            ("的", "地"),
        ]);
        let text = "ABCaaa的的的 ABC aaaa";

        let mut fast = automaton_hits(text, &idx);
        let mut slow = per_trigger_hits(text, &idx);
        let key = |h: &Hit| (h.span.start, h.span.end, h.pattern);
        fast.sort_by_key(key);
        slow.sort_by_key(key);

        let fast: Vec<_> = fast.iter().map(key).collect();
        let slow: Vec<_> = slow.iter().map(key).collect();
        assert_eq!(fast, slow);
    }
}
