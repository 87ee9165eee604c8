//! Manifest Validator CLI
//!
//! A thin front end over the library: reads a manifest JSON file, runs the
//! validator and prints the findings.

use anyhow::{bail, Context, Result};
use manifest_validator::prelude::*;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("manifest-validator");

    if args.len() < 2 {
        print_usage(program);
        return ExitCode::from(2);
    }

    let outcome = match args[1].as_str() {
        "validate" => parse_options(&args[2..]).and_then(|opts| validate(&opts)),
        "rules" => parse_options(&args[2..]).and_then(|opts| list_rules(&opts).map(|_| true)),
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(true)
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            return ExitCode::from(2);
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn print_usage(program: &str) {
    println!("Manifest Validator v{}", manifest_validator::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  validate <manifest.json>   Validate a manifest");
    println!("  rules                      List the rules that would run");
    println!("  help                       Show this help message");
    println!();
    println!("Options:");
    println!("  --platform <tag>           Validate for a platform (repeatable)");
    println!("  --rules <dir>              Common rule directory (default: bundled rules)");
    println!("  --source <tag>=<dir>       Add a platform rule source backed by a directory");
    println!("  --config <file>            Read settings from a TOML file");
    println!("  --format <tag>             Format tag of the manifest (default: w3c)");
    println!("  --sequential               Run rules on the calling thread");
    println!("  --json                     Print the report as JSON");
}

#[derive(Debug, Default)]
struct Options {
    manifest: Option<PathBuf>,
    platforms: Vec<String>,
    rules_dir: Option<PathBuf>,
    sources: Vec<(String, PathBuf)>,
    config: Option<PathBuf>,
    format: Option<String>,
    sequential: bool,
    json: bool,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    let mut i = 0;

    let value = |i: usize, flag: &str| -> Result<String> {
        args.get(i + 1)
            .cloned()
            .with_context(|| format!("{} expects a value", flag))
    };

    while i < args.len() {
        match args[i].as_str() {
            "--platform" => {
                opts.platforms.push(value(i, "--platform")?);
                i += 2;
            }
            "--rules" => {
                opts.rules_dir = Some(PathBuf::from(value(i, "--rules")?));
                i += 2;
            }
            "--source" => {
                let pair = value(i, "--source")?;
                let (platform, dir) = pair
                    .split_once('=')
                    .with_context(|| format!("--source expects <tag>=<dir>, got '{}'", pair))?;
                opts.sources.push((platform.to_string(), PathBuf::from(dir)));
                i += 2;
            }
            "--config" => {
                opts.config = Some(PathBuf::from(value(i, "--config")?));
                i += 2;
            }
            "--format" => {
                opts.format = Some(value(i, "--format")?);
                i += 2;
            }
            "--sequential" => {
                opts.sequential = true;
                i += 1;
            }
            "--json" => {
                opts.json = true;
                i += 1;
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            path => {
                if opts.manifest.is_some() {
                    bail!("Unexpected argument: {}", path);
                }
                opts.manifest = Some(PathBuf::from(path));
                i += 1;
            }
        }
    }

    Ok(opts)
}

/// Build the effective configuration: file first, flags on top.
fn effective_config(opts: &Options) -> Result<ValidatorConfig> {
    let mut config = match &opts.config {
        Some(path) => ValidatorConfig::load(path)?,
        None => ValidatorConfig::default(),
    };

    if let Some(dir) = &opts.rules_dir {
        config.rules_dir = dir.clone();
    }
    if !opts.platforms.is_empty() {
        config.platforms = opts.platforms.clone();
    }
    if opts.sequential {
        config.execution.parallel = false;
    }
    if config.rules_dir.as_path() == Path::new(BUNDLED_RULES_DIR) && !config.rules_dir.is_dir() {
        if let Some(dir) = rules_next_to_executable() {
            debug!("Bundled rules not found, using {}", dir.display());
            config.rules_dir = dir;
        }
    }
    Ok(config)
}

/// A `rules/` directory beside the running binary, if there is one.
fn rules_next_to_executable() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join("rules");
    dir.is_dir().then_some(dir)
}

fn platform_sources(opts: &Options, validator: &ManifestValidator) -> Vec<SharedSource> {
    opts.sources
        .iter()
        .map(|(platform, dir)| {
            Arc::new(DirectoryRuleSource::new(platform, dir, validator.loader().clone())) as SharedSource
        })
        .collect()
}

fn validate(opts: &Options) -> Result<bool> {
    let path = opts.manifest.as_ref().context("validate expects a manifest file")?;
    let config = effective_config(opts)?;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read manifest {}", path.display()))?;
    let manifest = Manifest::from_json_str(&text)
        .with_context(|| format!("{} is not a valid manifest", path.display()))?;
    let format = opts.format.clone().unwrap_or_else(|| BASE_FORMAT.to_string());
    let info = ManifestInfo::new(manifest, format);

    let validator = ManifestValidator::from_config(&config);
    let sources = platform_sources(opts, &validator);
    let report = validator.validate(&info, &sources, &config.platforms)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(!report.has_errors())
}

fn print_report(report: &ValidationReport) {
    for record in &report.results {
        let marker = match record.level {
            Level::Error => "✗",
            Level::Warning => "⚠",
        };
        println!("{} {}", marker, record);
    }
    for failure in &report.failures {
        println!("! rule '{}' did not run: {}", failure.rule, failure.error);
    }
    if !report.results.is_empty() || !report.failures.is_empty() {
        println!();
    }
    println!("{}", report.summary());
}

fn list_rules(opts: &Options) -> Result<()> {
    let config = effective_config(opts)?;
    let validator = ManifestValidator::from_config(&config);

    let common = validator
        .loader()
        .load(validator.rules_dir(), &config.platforms)?;
    println!("Common rules from {} ({}):", validator.rules_dir().display(), common.len());
    for rule in &common {
        println!("  • {}", rule.name());
    }

    for source in platform_sources(opts, &validator) {
        match source.validation_rules(&config.platforms) {
            Ok(rules) => {
                println!();
                println!("Platform '{}' ({}):", source.platform(), rules.len());
                for rule in &rules {
                    println!("  • {}", rule.name());
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    let registry = validator.loader().registry();
    println!();
    println!("Registered rule ids ({}):", registry.len());
    for id in registry.rule_ids() {
        println!("  • {}", id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bundled_rules_used_inside_checkout() {
        let opts = parse_options(&args(&["manifest.json"])).unwrap();
        let config = effective_config(&opts).unwrap();
        assert_eq!(config.rules_dir, PathBuf::from(BUNDLED_RULES_DIR));
    }

    #[test]
    fn test_flags_override_config() {
        let opts = parse_options(&args(&[
            "--rules",
            "/tmp/custom-rules",
            "--platform",
            "android",
            "--sequential",
            "--source",
            "ios=/tmp/ios",
        ]))
        .unwrap();
        let config = effective_config(&opts).unwrap();

        assert_eq!(config.rules_dir, PathBuf::from("/tmp/custom-rules"));
        assert_eq!(config.platforms, vec!["android"]);
        assert!(!config.execution.parallel);
        assert_eq!(opts.sources, vec![("ios".to_string(), PathBuf::from("/tmp/ios"))]);
    }

    #[test]
    fn test_bad_source_pair_is_rejected() {
        assert!(parse_options(&args(&["--source", "ios"])).is_err());
    }
}
