//! Python sources to placeholder `unittest` stubs.

use std::path::Path;

use tracing::debug;

use super::{claim_slot, read_source, write_output, Slot};
use crate::config::StubSettings;
use crate::context::ServiceContext;
use crate::error::{ConfigError, FileFailure};
use crate::extract::python::PythonExtractor;
use crate::output::unittest::render_suite;
use crate::output::OutputRegistry;
use crate::report::RunReport;
use crate::walk::SourceWalker;

/// Walks `settings.root` and writes one stub suite per Python file.
///
/// Per-file problems land in `report`; only a grammar that cannot be loaded
/// aborts the run.
///
/// # Errors
///
/// Returns [`ConfigError::Grammar`] if the Python parser cannot be built.
pub fn run(
    ctx: &ServiceContext,
    settings: &StubSettings,
    report: &mut RunReport,
) -> Result<(), ConfigError> {
    let mut extractor = PythonExtractor::new()?;
    let mut registry = OutputRegistry::default();
    let walker = SourceWalker::new(&settings.root, &settings.extension, settings.skip.clone())
        .exclude(&settings.output_dir);

    for source in &walker {
        debug!(source = %source.display(), "candidate");
        if let Err(failure) = process(ctx, settings, &mut extractor, &mut registry, &source, report)
        {
            report.record_failure(&failure);
        }
    }
    Ok(())
}

fn process(
    ctx: &ServiceContext,
    settings: &StubSettings,
    extractor: &mut PythonExtractor,
    registry: &mut OutputRegistry,
    source: &Path,
    report: &mut RunReport,
) -> Result<(), FileFailure> {
    let dirs = (settings.root.as_path(), settings.output_dir.as_path());
    let output = match claim_slot(ctx, registry, &settings.naming, dirs, source, settings.policy)? {
        Slot::Open(output) => output,
        Slot::Taken => {
            report.record_skipped(source, "output exists");
            return Ok(());
        }
    };

    let text = read_source(ctx, source)?;
    let declarations = extractor.extract(source, &text)?;
    if settings.dry_run {
        report.record_planned(source, &output.path);
        return Ok(());
    }

    let suite = render_suite(&output.stem, &declarations);
    write_output(ctx, source, &output.path, &suite)?;
    report.record_generated(source, &output.path);
    Ok(())
}
