//! confbind CLI - inspect layered configuration from the command line
//!
//! Usage:
//!   confbind get base.yaml local.json database.host
//!   confbind dump base.yaml local.toml --format json
//!   confbind check base.yaml local.json

use clap::{Parser, Subcommand};
use colored::Colorize;
use confbind_core::decode::{self, Format};
use confbind_core::{Config, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// confbind - Layered configuration for typed values
#[derive(Parser)]
#[command(name = "confbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the merged configuration
    Dump {
        /// Configuration file(s), merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: yaml, json
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Get a specific value from the merged configuration
    Get {
        /// Configuration file(s) followed by the path to the value
        /// (e.g., base.yaml local.json database.host)
        #[arg(required = true, num_args = 2..)]
        args: Vec<String>,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Default value if the path is not found
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Check that each file decodes
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump {
            files,
            format,
            output,
        } => cmd_dump(files, &format, output),

        Commands::Get {
            mut args,
            format,
            default,
        } => {
            // num_args = 2.. guarantees a path after at least one file
            let path = args.pop().unwrap_or_default();
            let files = args.into_iter().map(PathBuf::from).collect();
            cmd_get(files, &path, &format, default)
        }

        Commands::Check { files } => cmd_check(files),
    }
}

fn load_config(files: &[PathBuf]) -> Result<Config, String> {
    if files.is_empty() {
        return Err("No configuration files specified".to_string());
    }

    let mut config = Config::new();
    for file in files {
        config
            .load([file])
            .map_err(|e| format!("Failed to load {}: {}", file.display(), e))?;
    }
    Ok(config)
}

fn render(value: &Value, format: &str) -> Result<String, String> {
    match format {
        "json" => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        "text" => match value {
            Value::Sequence(_) | Value::Mapping(_) => {
                serde_yaml::to_string(value).map_err(|e| e.to_string())
            }
            scalar => Ok(format!("{}\n", scalar)),
        },
        other => Err(format!(
            "Unsupported format: {}. Use text, json, or yaml.",
            other
        )),
    }
}

fn cmd_dump(files: Vec<PathBuf>, format: &str, output: Option<PathBuf>) -> ExitCode {
    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = match format {
        "json" => config.to_json().map(|s| s + "\n"),
        "yaml" => config.to_yaml(),
        other => {
            eprintln!("Unsupported format: {}. Use yaml or json.", other);
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(content) => {
            if let Some(output_path) = output {
                if let Err(e) = std::fs::write(&output_path, &content) {
                    eprintln!("{}: {}", "Error writing file".red(), e);
                    return ExitCode::from(2);
                }
                eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
            } else {
                print!("{}", content);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn cmd_get(files: Vec<PathBuf>, path: &str, format: &str, default: Option<String>) -> ExitCode {
    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    match config.get(path) {
        Some(value) => match render(value, format) {
            Ok(content) => {
                print!("{}", content);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                ExitCode::from(1)
            }
        },
        None => {
            if let Some(default_val) = default {
                println!("{}", default_val);
                ExitCode::SUCCESS
            } else {
                eprintln!("{}: Path '{}' not found", "Error".red(), path);
                ExitCode::from(1)
            }
        }
    }
}

fn check_file(file: &Path) -> Result<Format, String> {
    let format = Format::from_path(file).map_err(|e| e.to_string())?;
    let content = std::fs::read_to_string(file).map_err(|e| e.to_string())?;
    decode::decode(format, &content)
        .map(|_| format)
        .map_err(|e| format!("Invalid {:?}: {}", format, e))
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        match check_file(&file) {
            Ok(format) => {
                println!(
                    "{} {}: valid {}",
                    "✓".green(),
                    file.display(),
                    format!("{:?}", format).to_uppercase()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
