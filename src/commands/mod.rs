//! Command dispatch and handlers.

pub mod llm;
pub mod stubs;

use std::path::Path;

use tracing::info;

use crate::cli::Command;
use crate::context::ServiceContext;
use crate::report::RunReport;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, or if `--strict` is
/// set and at least one file failed.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Stubs(args) => stubs::run(args),
        Command::Llm(args) => llm::run(args),
    }
}

/// Closes a run: stamps and prints the summary, writes the optional YAML
/// report and saves the cassette, then applies `--strict`.
fn conclude(
    ctx: ServiceContext,
    mut report: RunReport,
    report_path: Option<&Path>,
    strict: bool,
) -> Result<(), String> {
    report.finish(ctx.clock.now());
    print!("{}", report.summary());

    if let Some(path) = report_path {
        let yaml = report.to_yaml()?;
        ctx.fs
            .write(path, &yaml)
            .map_err(|e| format!("Failed to write report {}: {e}", path.display()))?;
        info!(report = %path.display(), "report written");
    }

    if let Some(cassette) = ctx.finish()? {
        eprintln!("Recording saved to: {}", cassette.display());
    }

    if strict && report.has_failures() {
        return Err(format!("{} file(s) failed", report.failed));
    }
    Ok(())
}
