use crate::error::{Result, TypoError};
use crate::rules::Rule;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Separator between the erroneous and the corrected phrase (U+FF1A).
pub const SEPARATOR: char = '：';

const DEFAULT_DICTIONARY: &str = include_str!("../../resources/typo_dict.txt");

/// Parse dictionary text, one `错误词：正确词` per line.
///
/// Blank lines and `#` comments are ignored. Lines without a separator or with
/// an empty side are skipped so hand-edited files never fail to load.
pub fn parse(content: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut skipped = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Some(rule) => rules.push(rule),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("skipped {} malformed dictionary lines", skipped);
    }

    rules
}

fn parse_line(line: &str) -> Option<Rule> {
    let mut fields = line.split(SEPARATOR);
    let original = fields.next()?.trim();
    let suggestion = fields.next()?.trim();

    if original.is_empty() || suggestion.is_empty() {
        return None;
    }

    Some(Rule::new(original, suggestion))
}

/// Render rules in dictionary format. The enabled flag is not representable
/// and every rule reads back as enabled.
pub fn serialize(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&format_line(rule));
    }
    out
}

fn format_line(rule: &Rule) -> String {
    format!("{}{}{}\n", rule.original, SEPARATOR, rule.suggestion)
}

pub fn load_file(path: &Path) -> Result<Vec<Rule>> {
    let content = fs::read_to_string(path).map_err(|e| TypoError::io(path, e))?;
    let rules = parse(&content);
    log::debug!("loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Write rules in dictionary format. Disabled rules are left out since the
/// format cannot express them.
pub fn save_file(path: &Path, rules: &[Rule]) -> Result<()> {
    let enabled: Vec<Rule> = rules.iter().filter(|r| r.enabled).cloned().collect();
    fs::write(path, serialize(&enabled)).map_err(|e| TypoError::io(path, e))
}

/// Drop every line defining `original` from a dictionary file. Comments and
/// other lines are kept as written. Returns whether anything was removed.
pub fn remove_rule(path: &Path, original: &str) -> Result<bool> {
    let content = fs::read_to_string(path).map_err(|e| TypoError::io(path, e))?;

    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        let defines = !trimmed.starts_with('#')
            && parse_line(trimmed).is_some_and(|rule| rule.original == original);
        if defines {
            removed += 1;
        } else {
            kept.push_str(line);
        }
    }

    if removed == 0 {
        return Ok(false);
    }

    log::debug!("removed {} lines for {:?} from {}", removed, original, path.display());
    fs::write(path, kept).map_err(|e| TypoError::io(path, e))?;
    Ok(true)
}

/// Append a single rule to a dictionary file, creating it if needed.
pub fn append_rule(path: &Path, rule: &Rule) -> Result<()> {
    let needs_newline = match fs::read_to_string(path) {
        Ok(content) => !content.is_empty() && !content.ends_with('\n'),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(TypoError::io(path, e)),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TypoError::io(path, e))?;

    let mut line = String::new();
    if needs_newline {
        line.push('\n');
    }
    line.push_str(&format_line(rule));

    file.write_all(line.as_bytes())
        .map_err(|e| TypoError::io(path, e))
}

/// The dictionary bundled with the binary.
pub fn default_rules() -> Vec<Rule> {
    parse(DEFAULT_DICTIONARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_skips_comments_and_malformed_lines() {
        let content = "# 注释\n\n按装：安装\n没有分隔符\n：空的\n空的：\n  帐号 ： 账号  \n";
        let rules = parse(content);

        assert_eq!(
            rules,
            vec![Rule::new("按装", "安装"), Rule::new("帐号", "账号")]
        );
    }

    #[test]
    fn test_parse_ignores_ascii_colon() {
        assert!(parse("按装:安装").is_empty());
    }

    #[test]
    fn test_parse_takes_first_two_fields() {
        let rules = parse("甲：乙：丙");
        assert_eq!(rules, vec![Rule::new("甲", "乙")]);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let rules = parse("按装：安装\r\n帐号：账号\r\n");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].suggestion, "账号");
    }

    #[test]
    fn test_serialize_round_trip() {
        let rules = vec![
            Rule::new("按装", "安装"),
            Rule::disabled("帐号", "账号"),
        ];
        let loaded = parse(&serialize(&rules));

        let expected: Vec<_> = rules
            .into_iter()
            .map(|r| Rule { enabled: true, ..r })
            .collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, TypoError::Io { .. }));
    }

    #[test]
    fn test_append_rule() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        fs::write(&path, "按装：安装").unwrap();

        append_rule(&path, &Rule::new("帐号", "账号")).unwrap();
        append_rule(&path, &Rule::new("部份", "部分")).unwrap();

        let rules = load_file(&path).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2], Rule::new("部份", "部分"));
    }

    #[test]
    fn test_remove_rule_keeps_other_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        fs::write(&path, "# 自定义\n按装：安装\n帐号：账号\n按装：安裝\n").unwrap();

        assert!(remove_rule(&path, "按装").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# 自定义\n帐号：账号\n");

        assert!(!remove_rule(&path, "按装").unwrap());
        assert_eq!(load_file(&path).unwrap(), vec![Rule::new("帐号", "账号")]);
    }

    #[test]
    fn test_save_file_skips_disabled_rules() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        save_file(&path, &[Rule::new("按装", "安装"), Rule::disabled("帐号", "账号")]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "按装：安装\n");
    }

    #[test]
    fn test_default_rules_are_bundled() {
        let rules = default_rules();
        assert!(!rules.is_empty());
        assert!(rules.iter().all(Rule::is_valid));
        assert!(rules.iter().any(|r| r.original == "按装" && r.suggestion == "安装"));
    }
}
