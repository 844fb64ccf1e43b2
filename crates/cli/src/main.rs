//! ldif2json command-line converter.
//!
//! Converts LDIF directory exports into JSON, optionally nesting entries by
//! distinguished name, and manages the optional TOML configuration file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ldif2json_core::config::{ConvertConfig, MAX_INDENT};
use ldif2json_core::convert::Converter;
use ldif2json_core::DEFAULT_PARENT_ATTRIBUTE;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Convert LDIF files to JSON.
#[derive(Parser, Debug)]
#[command(
    name = "ldif2json",
    version,
    about = "Convert LDIF directory exports into JSON"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an LDIF file to JSON.
    Convert(ConvertArgs),

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file.
    Validate,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// LDIF input file (`-` for stdin).
    input: PathBuf,

    /// JSON output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Nest entries by DN, optionally naming the child-list attribute.
    #[arg(
        short,
        long,
        value_name = "ATTR",
        num_args = 0..=1,
        default_missing_value = DEFAULT_PARENT_ATTRIBUTE
    )]
    nest: Option<String>,

    /// Keep `::` values Base64-encoded instead of decoding them.
    #[arg(long)]
    no_decode: bool,

    /// Skip malformed lines with a warning instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Write compact JSON.
    #[arg(long, conflicts_with = "indent")]
    compact: bool,

    /// Spaces per indentation level for pretty output.
    #[arg(long)]
    indent: Option<usize>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { output } => cmd_init(output.as_deref()),
        Commands::Validate => {
            let config = load_config(cli.config.as_deref())?;
            init_logging(&config, cli.verbose);
            cmd_validate(&config)
        }
        Commands::Convert(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_overrides(&mut config, &args);
            config.validate().context("invalid configuration")?;
            init_logging(&config, cli.verbose);
            cmd_convert(config, &args)
        }
    }
}

fn init_logging(config: &ConvertConfig, verbose: u8) {
    let level = match verbose {
        0 => config.logging.level.to_ascii_lowercase(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// Load the explicit config file, else the default one if present, else the
/// built-in defaults.
fn load_config(path: Option<&Path>) -> Result<ConvertConfig> {
    if let Some(path) = path {
        return ConvertConfig::load_from_file(path).context("failed to load configuration file");
    }
    match ConvertConfig::default_path() {
        Some(path) if path.exists() => {
            ConvertConfig::load_from_file(&path).context("failed to load configuration file")
        }
        _ => Ok(ConvertConfig::default()),
    }
}

fn apply_overrides(config: &mut ConvertConfig, args: &ConvertArgs) {
    if let Some(ref attr) = args.nest {
        config.nest.enabled = true;
        config.nest.parent_attribute = attr.clone();
    }
    if args.no_decode {
        config.parse.decode_base64 = false;
    }
    if args.lenient {
        config.parse.lenient = true;
    }
    if args.compact {
        config.output.pretty = false;
    }
    if let Some(indent) = args.indent {
        config.output.pretty = true;
        config.output.indent = indent;
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_convert(config: ConvertConfig, args: &ConvertArgs) -> Result<()> {
    debug!(?config, "effective configuration");
    let converter = Converter::new(config);
    converter
        .run(Some(args.input.as_path()), args.output.as_deref())
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    Ok(())
}

fn cmd_init(output: Option<&Path>) -> Result<()> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => ConvertConfig::default_path()
            .context("could not determine the platform config directory; pass --output")?,
    };

    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    let rendered = ConvertConfig::default()
        .to_toml_string()
        .context("failed to render default configuration")?;
    let contents = format!("# ldif2json configuration\n\n{rendered}");

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, contents).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the config file to taste");
    println!(
        "  2. Validate with: ldif2json validate --config {}",
        output.display()
    );
    println!(
        "  3. Convert with: ldif2json convert --config {} <input.ldif>",
        output.display()
    );

    Ok(())
}

fn cmd_validate(config: &ConvertConfig) -> Result<()> {
    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Decode base64   : {}", config.parse.decode_base64);
    println!("  Lenient parsing : {}", config.parse.lenient);
    println!(
        "  Nesting         : {}",
        if config.nest.enabled {
            format!("on (key '{}')", config.nest.parent_attribute)
        } else {
            "off".to_string()
        }
    );
    println!(
        "  Output          : {}",
        if config.output.pretty {
            format!("pretty, indent {} (max {})", config.output.indent, MAX_INDENT)
        } else {
            "compact".to_string()
        }
    );
    println!("  Log level       : {}", config.logging.level);
    println!();
    println!("Configuration is valid.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_args(argv: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Convert(args) => args,
            other => panic!("expected convert, got {other:?}"),
        }
    }

    #[test]
    fn test_nest_flag_without_value_uses_default_key() {
        let args = convert_args(&["ldif2json", "convert", "in.ldif", "--nest"]);
        assert_eq!(args.nest.as_deref(), Some("subEntries"));

        let mut config = ConvertConfig::default();
        apply_overrides(&mut config, &args);
        assert!(config.nest.enabled);
        assert_eq!(config.nest.parent_attribute, "subEntries");
    }

    #[test]
    fn test_nest_flag_with_custom_key() {
        let args = convert_args(&["ldif2json", "convert", "--nest", "children", "in.ldif"]);
        assert_eq!(args.nest.as_deref(), Some("children"));
    }

    #[test]
    fn test_overrides_leave_config_alone_when_absent() {
        let args = convert_args(&["ldif2json", "convert", "in.ldif"]);
        let mut config = ConvertConfig::default();
        config.nest.enabled = true;
        apply_overrides(&mut config, &args);
        assert!(config.nest.enabled);
        assert!(config.parse.decode_base64);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_flag_overrides() {
        let args = convert_args(&[
            "ldif2json",
            "convert",
            "in.ldif",
            "--no-decode",
            "--lenient",
            "--compact",
            "-o",
            "out.json",
        ]);
        let mut config = ConvertConfig::default();
        apply_overrides(&mut config, &args);
        assert!(!config.parse.decode_base64);
        assert!(config.parse.lenient);
        assert!(!config.output.pretty);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_compact_conflicts_with_indent() {
        let result =
            Cli::try_parse_from(["ldif2json", "convert", "in.ldif", "--compact", "--indent", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["ldif2json", "validate", "--config", "cfg.toml", "-vv"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        cmd_init(Some(path.as_path())).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config, ConvertConfig::default());

        // Refuses to overwrite.
        assert!(cmd_init(Some(path.as_path())).is_err());
    }
}
