//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Provider;

/// Top-level CLI parser for `testsmith`.
#[derive(Debug, Parser)]
#[command(name = "testsmith", version, about = "Generate a test file for every source file in a tree")]
pub struct Cli {
    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse Python sources and write placeholder `unittest` stubs.
    Stubs(StubsArgs),
    /// Ask a hosted model to write tests for each source file.
    Llm(LlmArgs),
}

/// Options shared by both pipelines.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root to walk.
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Directory receiving the generated files.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Source file extension to pick up (without the dot).
    #[arg(long)]
    pub extension: Option<String>,
    /// Extra directory name to skip wherever it appears (repeatable).
    #[arg(long = "skip-dir", value_name = "NAME")]
    pub skip_dirs: Vec<String>,
    /// Discover and inspect files without writing or calling anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Exit with an error status if any file failed.
    #[arg(long)]
    pub strict: bool,
    /// Write the run report as YAML to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
    /// Config file (defaults to `testsmith.yaml` when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for `testsmith stubs`.
#[derive(Debug, Clone, Default, Args)]
pub struct StubsArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
    /// Leave existing output files untouched instead of regenerating them.
    #[arg(long)]
    pub skip_existing: bool,
}

/// Arguments for `testsmith llm`.
#[derive(Debug, Clone, Default, Args)]
pub struct LlmArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
    /// Hosted model provider.
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,
    /// Model identifier sent with each request.
    #[arg(long)]
    pub model: Option<String>,
    /// Environment variable holding the API key.
    #[arg(long, value_name = "VAR")]
    pub api_key_env: Option<String>,
    /// Request ceiling; sets the pause between consecutive calls.
    #[arg(long, value_name = "N")]
    pub requests_per_minute: Option<u32>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
    /// Maximum tokens the model may generate per file.
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Regenerate files whose output already exists.
    #[arg(long)]
    pub overwrite: bool,
    /// Record every model interaction to this cassette file.
    #[arg(long, value_name = "CASSETTE", conflicts_with = "replay")]
    pub record: Option<PathBuf>,
    /// Serve model responses from this cassette instead of the network.
    #[arg(long, value_name = "CASSETTE")]
    pub replay: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::config::Provider;
    use clap::Parser;

    #[test]
    fn parses_stubs_subcommand() {
        let cli = Cli::parse_from(["testsmith", "stubs", "--root", "src", "--skip-existing"]);
        let Command::Stubs(args) = cli.command else {
            panic!("expected stubs");
        };
        assert_eq!(args.common.root.as_deref(), Some(std::path::Path::new("src")));
        assert!(args.skip_existing);
    }

    #[test]
    fn parses_llm_subcommand() {
        let cli = Cli::parse_from([
            "testsmith",
            "-vv",
            "llm",
            "--provider",
            "anthropic",
            "--requests-per-minute",
            "30",
            "--skip-dir",
            "vendor",
            "--skip-dir",
            "storage",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Llm(args) = cli.command else {
            panic!("expected llm");
        };
        assert_eq!(args.provider, Some(Provider::Anthropic));
        assert_eq!(args.requests_per_minute, Some(30));
        assert_eq!(args.common.skip_dirs, vec!["vendor", "storage"]);
    }

    #[test]
    fn record_and_replay_conflict() {
        let result =
            Cli::try_parse_from(["testsmith", "llm", "--record", "a.yaml", "--replay", "b.yaml"]);
        assert!(result.is_err());
    }
}
