use crate::checker::diagnostics::Diagnostic;
use crate::rules::Rule;
use crate::{CheckResult, TypoItem};
use anyhow::Result;
use colored::*;
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::MultiSelect;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonTypo<'a> {
    file: String,
    line: usize,
    column: usize,
    offset: usize,
    original: &'a str,
    suggestion: &'a str,
    context: &'a str,
    diagnostic: &'a Diagnostic,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    total_fixed: usize,
    errors: Vec<JsonTypo<'a>>,
}

pub fn print_results(results: &[CheckResult], colored_output: bool, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            for result in results {
                print_text_errors(&result.path, result, colored_output);
            }
        }
        OutputFormat::Json => print_json_errors(results),
    }
}

fn print_text_errors(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &result.errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {} {}",
                line_info.blue().bold(),
                error.original.red().bold(),
                "→".dimmed(),
                error.suggestion.green()
            );
            println!(
                "    {}",
                format_context(&error.context, &error.original, colored_output)
            );
        } else {
            println!("  {} {} → {}", line_info, error.original, error.suggestion);
            println!("    {}", error.context);
        }
    }
}

fn print_json_errors(results: &[CheckResult]) {
    let json_errors: Vec<JsonTypo> = results
        .iter()
        .flat_map(|result| {
            result.errors.iter().map(move |e| JsonTypo {
                file: result.path.display().to_string(),
                line: e.line,
                column: e.column,
                offset: e.offset,
                original: &e.original,
                suggestion: &e.suggestion,
                context: &e.context,
                diagnostic: &e.diagnostic,
            })
        })
        .collect();

    let output = JsonOutput {
        files_checked: results.len(),
        total_errors: results.iter().map(|r| r.error_count).sum(),
        total_fixed: results.iter().map(|r| r.fixed_count).sum(),
        errors: json_errors,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to render JSON output: {}", e),
    }
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No typos found!".green().bold());
        } else {
            println!("✓ No typos found!");
        }
    } else {
        let error_word = if total_errors == 1 { "typo" } else { "typos" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                error_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 { "correction" } else { "corrections" };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total_fixed,
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

/// Let the user tick the occurrences to correct. All are ticked initially;
/// Esc or `q` applies nothing.
pub fn prompt_selection(file_path: &Path, items: &[TypoItem]) -> Result<Vec<usize>> {
    let term = Term::stderr();
    if !term.is_term() {
        anyhow::bail!("Interactive mode requires a terminal");
    }

    let labels: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "{}:{}  {} → {}  {}",
                item.line, item.column, item.original, item.suggestion, item.context
            )
        })
        .collect();
    let defaults = vec![true; items.len()];

    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Corrections for {}", file_path.display()))
        .items(&labels)
        .defaults(&defaults)
        .interact_on_opt(&term)?;

    Ok(chosen.unwrap_or_default())
}

pub fn print_rules<'a, I>(rules: I, show_disabled: bool, colored: bool)
where
    I: IntoIterator<Item = &'a Rule>,
{
    for rule in rules {
        if !rule.enabled && !show_disabled {
            continue;
        }

        let status = if rule.enabled { "✓" } else { "✗" };
        if colored {
            let status = if rule.enabled {
                status.green()
            } else {
                status.red()
            };
            println!(
                "  {} {} {} {}",
                status,
                rule.original.yellow(),
                "→".dimmed(),
                rule.suggestion.cyan()
            );
        } else {
            println!("  {} {} → {}", status, rule.original, rule.suggestion);
        }
    }
}

/// Progress over files; hidden for JSON output and single files.
pub fn progress_bar(len: usize, format: &OutputFormat) -> ProgressBar {
    if len < 2 || *format == OutputFormat::Json {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message("checking");
    pb
}
