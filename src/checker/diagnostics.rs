use crate::checker::scanner::MatchOccurrence;
use crate::document::TextRange;
use serde::Serialize;

pub const SOURCE: &str = "中文错别字检查";
pub const CODE: &str = "chinese-typo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

/// A problem-list entry for one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: TextRange,
    pub severity: Severity,
    pub message: String,
    pub source: &'static str,
    pub code: &'static str,
}

impl From<&MatchOccurrence> for Diagnostic {
    fn from(occ: &MatchOccurrence) -> Self {
        Self {
            range: occ.range,
            severity: Severity::Warning,
            message: format!("建议修改为：{}", occ.suggestion),
            source: SOURCE,
            code: CODE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::DictionaryIndex;
    use crate::checker::scanner::scan;
    use crate::rules::Rule;

    #[test]
    fn test_one_warning_per_occurrence() {
        let rules = [Rule::new("帮忙", "帮助")];
        let found = scan("帮忙\n请帮忙", &DictionaryIndex::rebuild(&rules));
        let diags: Vec<Diagnostic> = found.iter().map(Diagnostic::from).collect();

        assert_eq!(diags.len(), 2);
        assert_eq!(diags[1].range, found[1].range);
        assert_eq!(diags[1].message, "建议修改为：帮助");
        assert_eq!(diags[1].severity, Severity::Warning);
        assert_eq!(diags[1].code, CODE);
    }
}
