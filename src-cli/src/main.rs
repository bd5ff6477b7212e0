//! Depthrec Command-Line Interface
//!
//! Records timestamped RGB-D sensor frames into session directories and
//! inspects the results, without requiring a GUI.

mod colors;
mod commands;
mod exit_codes;

use clap::{Parser, Subcommand};
use exit_codes::ExitCode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Depthrec - RGB-D frame recording CLI
#[derive(Parser, Debug)]
#[command(name = "depthrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose output (live status while recording)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a session from the built-in synthetic frame source
    Record {
        #[command(flatten)]
        options: RecordOptions,
    },
    /// Summarize a recorded session directory
    Inspect {
        /// Session directory (or a meta.json path)
        session: PathBuf,
    },
    /// Show the effective configuration
    Config,
    /// Show version information
    Version,
}

#[derive(Parser, Debug, Clone)]
pub struct RecordOptions {
    /// Output directory for session directories (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Auto-stop after this many recorded frames
    #[arg(short = 'n', long)]
    pub frames: Option<u64>,

    /// Auto-stop after duration (seconds)
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Target capture rate in frames per second (overrides config)
    #[arg(short, long)]
    pub rate: Option<f64>,

    /// Minimum interval between accepted frames in seconds (overrides config)
    #[arg(short, long, conflicts_with = "rate")]
    pub interval: Option<f64>,

    /// Delivery rate of the frame source in frames per second
    #[arg(long, default_value_t = 30.0)]
    pub source_fps: f64,

    /// Capture color only, without depth and confidence maps
    #[arg(long)]
    pub no_depth: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging with RUST_LOG env var support
    let default_filter = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Build the async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let exit_code = runtime.block_on(run(cli));
    std::process::exit(exit_code.as_i32());
}

async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Record { options } => {
            commands::record(options, cli.json, cli.quiet, cli.verbose).await
        }
        Commands::Inspect { session } => commands::inspect(session, cli.json, cli.quiet),
        Commands::Config => {
            commands::config(cli.json);
            ExitCode::Success
        }
        Commands::Version => {
            commands::version(cli.json);
            ExitCode::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Verify the CLI definition is valid
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    /// Test parsing 'record' with defaults
    #[test]
    fn parse_record_defaults() {
        let cli = Cli::try_parse_from(["depthrec", "record"]).unwrap();
        assert!(!cli.json);
        assert!(!cli.quiet);
        match cli.command {
            Commands::Record { options } => {
                assert!(options.output.is_none());
                assert!(options.frames.is_none());
                assert!(options.duration.is_none());
                assert!(options.rate.is_none());
                assert!(options.interval.is_none());
                assert_eq!(options.source_fps, 30.0);
                assert!(!options.no_depth);
            }
            _ => panic!("Expected Record command"),
        }
    }

    /// Test parsing 'record' with all options
    #[test]
    fn parse_record_with_options() {
        let cli = Cli::try_parse_from([
            "depthrec",
            "record",
            "-o",
            "/tmp/sessions",
            "-n",
            "120",
            "-d",
            "10",
            "-r",
            "15",
            "--source-fps",
            "60",
            "--no-depth",
        ])
        .unwrap();
        match cli.command {
            Commands::Record { options } => {
                assert_eq!(options.output, Some(PathBuf::from("/tmp/sessions")));
                assert_eq!(options.frames, Some(120));
                assert_eq!(options.duration, Some(10));
                assert_eq!(options.rate, Some(15.0));
                assert_eq!(options.source_fps, 60.0);
                assert!(options.no_depth);
            }
            _ => panic!("Expected Record command"),
        }
    }

    /// Test that --interval conflicts with --rate
    #[test]
    fn parse_interval_conflicts_with_rate() {
        let cli = Cli::try_parse_from(["depthrec", "record", "-i", "0.05"]).unwrap();
        match cli.command {
            Commands::Record { options } => {
                assert_eq!(options.interval, Some(0.05));
                assert!(options.rate.is_none());
            }
            _ => panic!("Expected Record command"),
        }
        assert!(Cli::try_parse_from(["depthrec", "record", "-i", "0.05", "-r", "20"]).is_err());
    }

    /// Test parsing 'inspect' command
    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from(["depthrec", "inspect", "/tmp/20260101-120000.000"]).unwrap();
        match cli.command {
            Commands::Inspect { session } => {
                assert_eq!(session, PathBuf::from("/tmp/20260101-120000.000"));
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    /// Test that global flags work after subcommand
    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["depthrec", "record", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
    }

    /// Test parsing 'config' and 'version' commands
    #[test]
    fn parse_config_and_version() {
        assert!(matches!(
            Cli::try_parse_from(["depthrec", "config"]).unwrap().command,
            Commands::Config
        ));
        assert!(matches!(
            Cli::try_parse_from(["depthrec", "version"]).unwrap().command,
            Commands::Version
        ));
    }

    /// Test missing inspect argument returns error
    #[test]
    fn parse_missing_inspect_path() {
        assert!(Cli::try_parse_from(["depthrec", "inspect"]).is_err());
    }

    /// Test invalid command returns error
    #[test]
    fn parse_invalid_command() {
        assert!(Cli::try_parse_from(["depthrec", "invalid"]).is_err());
    }
}
