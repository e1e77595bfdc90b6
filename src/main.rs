use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use rayon::prelude::*;
use std::io;
use std::path::PathBuf;
use typochk::checker::{self, TypoChecker};
use typochk::cli::output::{self, OutputFormat};
use typochk::config::{ConfigLayer, LOCAL_CONFIG_FILE};
use typochk::rules::{loader, transfer, Rule};
use typochk::{document, CheckResult, Config, TypoError};

#[derive(Parser, Debug)]
#[command(name = "typochk")]
#[command(version, about = "A fast Chinese typo checker", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "PATHS")]
    paths: Vec<PathBuf>,

    /// Fix typos in place
    #[arg(short, long)]
    fix: bool,

    /// Choose which corrections to apply
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit with code 0 even if typos are found
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Do not load the bundled dictionary
    #[arg(long, global = true)]
    no_default_rules: bool,

    /// Custom dictionary file (one "错误词：正确词" per line)
    #[arg(short, long, value_name = "FILE", env = "TYPOCHK_DICTIONARY", global = true)]
    dictionary: Option<PathBuf>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Replace every occurrence of a phrase in the given files
    Replace {
        original: String,
        suggestion: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rule management
    Rules {
        #[command(subcommand)]
        action: RulesCommands,
    },
}

#[derive(Parser, Debug)]
enum RulesCommands {
    /// List active rules
    List {
        /// Include disabled rules
        #[arg(long)]
        all: bool,
    },
    /// Export all rules as JSON
    Export {
        /// Write to a file instead of stdout (a .txt file gets dictionary lines)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a JSON rule set into the config
    Import {
        file: PathBuf,
        /// Write to the local config instead of the global one
        #[arg(long)]
        local: bool,
    },
    /// Append a rule to the custom dictionary
    Add { original: String, suggestion: String },
    /// Enable a rule
    Enable {
        original: String,
        #[arg(long)]
        local: bool,
    },
    /// Disable a rule without deleting it
    Disable {
        original: String,
        #[arg(long)]
        local: bool,
    },
    /// Show config and dictionary locations
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "typochk", &mut io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = Config::load(cli.dictionary.clone(), cli.no_default_rules)?;
    let colored = !cli.no_color;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, &config, colored);
    }

    // Validate input paths
    if cli.paths.is_empty() {
        if cli.fix {
            return Err(TypoError::NoActiveTarget.into());
        }
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let mut files = Vec::new();
    for path in document::collect_files(&cli.paths, &config.supported_file_types) {
        if path.exists() {
            files.push(path);
        } else {
            eprintln!("Error: File not found: {}", path.display());
        }
    }
    if cli.fix {
        checker::require_targets(&files)?;
    }

    // Initialize checker
    let checker = TypoChecker::new(&config)?;

    // Process files
    let outcomes: Vec<Result<CheckResult>> = if cli.interactive {
        files
            .iter()
            .map(|file| checker.fix_with(file, |items| output::prompt_selection(file, items)))
            .collect()
    } else {
        let pb = output::progress_bar(files.len(), &cli.format);
        let outcomes = files
            .par_iter()
            .map(|file| {
                let outcome = if cli.fix {
                    checker.fix_auto(file)
                } else {
                    checker.check_file(file)
                };
                pb.inc(1);
                outcome
            })
            .collect();
        pb.finish_and_clear();
        outcomes
    };

    let mut results = Vec::new();
    let mut failed = false;
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                failed = true;
            }
        }
    }

    let total_errors: usize = results.iter().map(|r| r.error_count).sum();
    let total_fixed: usize = results.iter().map(|r| r.fixed_count).sum();

    if cli.fix {
        if cli.format == OutputFormat::Json {
            output::print_results(&results, colored, &cli.format);
        } else {
            output::print_fix_summary(total_fixed, &files, colored);
        }
    } else {
        output::print_results(&results, colored, &cli.format);
        if cli.format == OutputFormat::Text {
            output::print_check_summary(total_errors, &files, colored);
        }
    }

    // Exit with appropriate code
    if failed || (total_errors > 0 && !cli.no_fail && !cli.fix) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn handle_command(command: Commands, config: &Config, colored: bool) -> Result<()> {
    match command {
        Commands::Replace {
            original,
            suggestion,
            files,
        } => {
            if original.is_empty() {
                anyhow::bail!("The phrase to replace must not be empty");
            }
            checker::require_targets(&files)?;

            let mut total = 0;
            for file in &files {
                total += checker::replace_in_file(file, &original, &suggestion)?;
            }
            output::print_fix_summary(total, &files, colored);
        }
        Commands::Rules { action } => handle_rules(action, config, colored)?,
    }
    Ok(())
}

fn handle_rules(action: RulesCommands, config: &Config, colored: bool) -> Result<()> {
    match action {
        RulesCommands::List { all } => {
            let checker = TypoChecker::new(config)?;
            output::print_rules(checker.rules().iter(), all, colored);
        }
        RulesCommands::Export { output } => {
            let checker = TypoChecker::new(config)?;
            let rules: Vec<Rule> = checker.rules().iter().cloned().collect();
            match output {
                Some(path) => {
                    if document::is_supported(&path, &["txt".to_string()]) {
                        loader::save_file(&path, &rules)?;
                    } else {
                        transfer::export_rules(&path, &rules)?;
                    }
                    println!("Exported {} rules to {}", rules.len(), path.display());
                }
                None => println!("{}", transfer::to_json(&rules)),
            }
        }
        RulesCommands::Import { file, local } => {
            // parse fully before touching any config
            let rules = transfer::import_rules(&file)?;
            let count = rules.len();
            let target = config_target(local)?;
            ConfigLayer::update_file(&target, |layer| layer.merge_rules(rules))?;
            println!("Imported {} rules into {}", count, target.display());
        }
        RulesCommands::Add {
            original,
            suggestion,
        } => {
            let rule = Rule::new(original.trim(), suggestion.trim());
            if !rule.is_valid()
                || rule.original.contains(loader::SEPARATOR)
                || rule.suggestion.contains(loader::SEPARATOR)
            {
                anyhow::bail!(
                    "Both phrases must be non-empty and must not contain '{}'",
                    loader::SEPARATOR
                );
            }
            let path = config
                .custom_dictionary
                .as_deref()
                .context("No custom dictionary configured")?;
            loader::append_rule(path, &rule)?;
            println!(
                "Added {}{}{} to {}",
                rule.original,
                loader::SEPARATOR,
                rule.suggestion,
                path.display()
            );
        }
        RulesCommands::Enable { original, local } => set_rule_enabled(config, &original, true, local)?,
        RulesCommands::Disable { original, local } => {
            set_rule_enabled(config, &original, false, local)?
        }
        RulesCommands::Path => {
            if let Some(path) = Config::global_config_path() {
                println!("Global config:     {}", path.display());
            }
            println!("Local config:      {}", LOCAL_CONFIG_FILE);
            if let Some(path) = &config.custom_dictionary {
                println!("Custom dictionary: {}", path.display());
            }
        }
    }
    Ok(())
}

fn set_rule_enabled(config: &Config, original: &str, enabled: bool, local: bool) -> Result<()> {
    let checker = TypoChecker::new(config)?;
    let rule = checker
        .rules()
        .find(original)
        .with_context(|| format!("No rule for '{}'", original))?;

    let update = Rule {
        enabled,
        ..rule.clone()
    };
    let target = config_target(local)?;
    ConfigLayer::update_file(&target, |layer| layer.merge_rules(vec![update]))?;

    // a dictionary line outranks every config layer
    if !enabled {
        if let Some(dict) = config.custom_dictionary.as_deref() {
            if dict.exists() && loader::remove_rule(dict, original)? {
                println!("Moved {} out of {}", original, dict.display());
            }
        }
    }

    println!(
        "{} {} in {}",
        if enabled { "Enabled" } else { "Disabled" },
        original,
        target.display()
    );
    Ok(())
}

fn config_target(local: bool) -> Result<PathBuf> {
    if local {
        return Ok(PathBuf::from(LOCAL_CONFIG_FILE));
    }
    Config::global_config_path().context("Failed to determine config directory")
}
