pub mod checker;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod rules;

pub use checker::corrector::{fix_all, fix_one, fix_selected, TextEdit};
pub use checker::dictionary::DictionaryIndex;
pub use checker::scanner::{scan, MatchOccurrence};
pub use checker::TypoChecker;
pub use config::Config;
pub use error::TypoError;
pub use rules::{merge_rules, Rule, RuleStore};

use checker::diagnostics::Diagnostic;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub path: PathBuf,
    pub error_count: usize,
    pub fixed_count: usize,
    pub errors: Vec<TypoItem>,
}

impl CheckResult {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }
}

/// An occurrence as shown to the user: 1-based line and column.
#[derive(Debug, Clone)]
pub struct TypoItem {
    pub original: String,
    pub suggestion: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub context: String,
    pub diagnostic: Diagnostic,
}
