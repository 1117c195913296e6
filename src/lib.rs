//! Core library entry for the `testsmith` CLI.
//!
//! Two pipelines share one skeleton: walk a source tree, derive a flat
//! output name per file, skip what is already there, produce test text and
//! write it. `stubs` derives the text from the Python syntax tree; `llm`
//! asks a hosted model for it.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod walk;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.verbose);
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_prints_help() {
        assert!(run(["testsmith", "--help"]).is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["testsmith", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_executes_stubs_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.py"), "def f():\n    pass\n").unwrap();
        let config = dir.path().join("testsmith.yaml");
        std::fs::write(&config, "").unwrap();
        let out = dir.path().join("generated_tests");
        let root = dir.path().to_string_lossy().into_owned();
        let output = out.to_string_lossy().into_owned();
        let config = config.to_string_lossy().into_owned();

        let result = run([
            "testsmith", "stubs", "--root", &root, "--output", &output, "--config", &config,
            "--dry-run",
        ]);

        assert!(result.is_ok());
        assert!(!out.exists());
    }
}
