//! uvchunk CLI Entry Point
//!
//! Expands update-verify job templates from a YAML file into chunk tasks.
//!
//! # Usage
//!
//! ```bash
//! # Print chunks as YAML
//! uvchunk jobs.yml --deps config-tasks.yml
//!
//! # Write JSON to a file
//! uvchunk jobs.yml --deps config-tasks.yml --format json --output chunks.json
//!
//! # Override expansion constants
//! uvchunk jobs.yml --deps config-tasks.yml --config staging.yml
//! ```

use std::env;
use std::fs;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info};

use uvchunk::taskgraph::parser::render_chunks;
use uvchunk::taskgraph::{load_config, load_jobs, load_kind_dependencies, ExpandConfig, OutputFormat};
use uvchunk::transforms::{expand_all, TransformContext};
use uvchunk::{APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    jobs_path: Option<String>,
    deps_path: Option<String>,
    config_path: Option<String>,
    output_path: Option<String>,
    format: OutputFormat,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    eprintln!();
    eprintln!("{} v{}", APP_NAME, VERSION);
    eprintln!("Release update-verify chunk expansion");
    eprintln!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: uvchunk [OPTIONS] --deps <DEPS_FILE> <JOBS_FILE>");
    println!();
    println!("Arguments:");
    println!("  <JOBS_FILE>         YAML list of update-verify job templates");
    println!();
    println!("Options:");
    println!("  --deps PATH         YAML list of resolved kind-dependency tasks (required)");
    println!("  --config PATH       YAML overrides for expansion constants");
    println!("  --output PATH       Write chunks to a file instead of stdout");
    println!("  --format FORMAT     Output format: yaml or json (default: yaml)");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  uvchunk jobs.yml --deps config-tasks.yml");
    println!("  uvchunk jobs.yml --deps config-tasks.yml --format json --output chunks.json");
}

/// Takes the value following an option.
fn option_value(args: &[String], i: &mut usize, option: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", option))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--deps" => config.deps_path = Some(option_value(args, &mut i, "--deps")?),
            "--config" => config.config_path = Some(option_value(args, &mut i, "--config")?),
            "--output" | "-o" => {
                config.output_path = Some(option_value(args, &mut i, "--output")?)
            }
            "--format" => config.format = option_value(args, &mut i, "--format")?.parse()?,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.jobs_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.jobs_path = Some(arg.clone());
            }
        }
        i += 1;
    }

    if config.jobs_path.is_none() {
        return Err("Missing jobs file".to_string());
    }
    if config.deps_path.is_none() {
        return Err("--deps is required".to_string());
    }

    Ok(config)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let expand_config = match &config.config_path {
        Some(path) => load_config(path)?,
        None => ExpandConfig::default(),
    };

    let (Some(jobs_path), Some(deps_path)) = (&config.jobs_path, &config.deps_path) else {
        return Err("jobs and dependency files are required".into());
    };

    let deps = load_kind_dependencies(deps_path).map_err(|e| {
        error!("Failed to load dependencies: {}", e);
        format!("Could not load dependencies from '{}': {}", deps_path, e)
    })?;

    let jobs = load_jobs(jobs_path).map_err(|e| {
        error!("Failed to load jobs: {}", e);
        format!("Could not load jobs from '{}': {}", jobs_path, e)
    })?;
    let job_count = jobs.len();

    let ctx = TransformContext::new(deps).with_config(expand_config);
    let chunks = expand_all(&ctx, jobs)?;

    let rendered = render_chunks(&chunks, config.format)?;
    match &config.output_path {
        Some(path) => {
            fs::write(path, rendered)?;
            info!("Chunks written to: {}", path);
        }
        None => print!("{}", rendered),
    }

    eprintln!(
        "{} {} chunks from {} jobs",
        "Expanded".green().bold(),
        chunks.len(),
        job_count
    );

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_arguments_minimal() {
        let config = parse_arguments(&args(&["uvchunk", "jobs.yml", "--deps", "deps.yml"])).unwrap();
        assert_eq!(config.jobs_path.as_deref(), Some("jobs.yml"));
        assert_eq!(config.deps_path.as_deref(), Some("deps.yml"));
        assert_eq!(config.format, OutputFormat::Yaml);
        assert!(!config.verbose);
    }

    #[test]
    fn test_parse_arguments_all_options() {
        let config = parse_arguments(&args(&[
            "uvchunk", "--deps", "d.yml", "--config", "c.yml", "--output", "out.json",
            "--format", "json", "--verbose", "jobs.yml",
        ]))
        .unwrap();
        assert_eq!(config.config_path.as_deref(), Some("c.yml"));
        assert_eq!(config.output_path.as_deref(), Some("out.json"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.verbose);
    }

    #[test]
    fn test_parse_arguments_requires_deps() {
        assert!(parse_arguments(&args(&["uvchunk", "jobs.yml"])).is_err());
    }

    #[test]
    fn test_parse_arguments_missing_value() {
        assert!(parse_arguments(&args(&["uvchunk", "jobs.yml", "--deps"])).is_err());
    }

    #[test]
    fn test_parse_arguments_unknown_option() {
        let err = parse_arguments(&args(&["uvchunk", "--chunks", "3"])).unwrap_err();
        assert!(err.contains("Unknown option"));
    }

    #[test]
    fn test_parse_arguments_bad_format() {
        assert!(parse_arguments(&args(&["uvchunk", "j.yml", "--deps", "d", "--format", "xml"])).is_err());
    }
}
