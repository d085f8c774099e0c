//! Binary to generate Rust client libraries from discovery documents.
//!
//! Usage: `discoverygen --discovery-dir docs --output src calendar:v3 drive:v3`
//!
//! Reads `<discovery-dir>/<name>.<version>.json` for every selected API and
//! writes the generated modules under the output directory.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use discovery_codegen::{ApiSelector, CodegenError, GenerateSettings, generate_all};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate typed Rust clients from REST API discovery documents
#[derive(Parser, Debug)]
#[command(name = "discoverygen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `<name>.<version>.json` discovery documents
    #[arg(long, default_value = ".")]
    discovery_dir: PathBuf,

    /// Output directory for generated sources
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Dotted package every API module is nested in
    #[arg(long, default_value = "generated")]
    base_package: String,

    /// Path of the client runtime crate used by generated code
    #[arg(long, default_value = "discovery_runtime")]
    runtime_crate: String,

    /// Increase verbosity (-v, -vv, -vvv); `RUST_LOG` takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// APIs to generate, as `name:version`
    #[arg(required = true)]
    apis: Vec<ApiSelector>,
}

fn init_tracing(verbose: u8) {
    let level: &str = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CodegenError> {
    let settings: GenerateSettings = GenerateSettings {
        base_package: cli.base_package,
        output_dir: cli.output,
        runtime_crate: cli.runtime_crate,
    };
    let written: Vec<PathBuf> = generate_all(&cli.discovery_dir, &cli.apis, &settings)?;
    info!(
        apis = cli.apis.len(),
        files = written.len(),
        output = %settings.output_dir.display(),
        "generation finished"
    );
    Ok(())
}

fn main() {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selectors_and_defaults() {
        let cli: Cli = Cli::try_parse_from(["discoverygen", "-vv", "calendar:v3", "drive:v3"])
            .expect("valid arguments");
        assert_eq!(2, cli.verbose);
        assert_eq!(PathBuf::from("generated"), cli.output);
        assert_eq!("discovery_runtime", cli.runtime_crate);
        let actual: Vec<String> = cli.apis.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["calendar:v3", "drive:v3"], actual);
    }

    #[test]
    fn rejects_malformed_selector() {
        let result: Result<Cli, clap::Error> = Cli::try_parse_from(["discoverygen", "calendar"]);
        assert!(result.is_err(), "selector without version must be rejected");
    }

    #[test]
    fn requires_at_least_one_api() {
        assert!(Cli::try_parse_from(["discoverygen", "--output", "src"]).is_err());
    }
}
