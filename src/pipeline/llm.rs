//! Source files to model-written tests.

use std::path::Path;

use tracing::debug;

use super::{claim_slot, read_source, write_output, Slot};
use crate::config::LlmSettings;
use crate::context::ServiceContext;
use crate::error::FileFailure;
use crate::output::OutputRegistry;
use crate::ports::llm::CompletionRequest;
use crate::report::RunReport;
use crate::walk::SourceWalker;

/// Walks `settings.root`, asks the model for a test file per source file and
/// writes the answer.
///
/// Requests are strictly sequential, separated by `settings.pause` on the
/// context clock. Existing outputs are detected before the source is read,
/// so a rerun over a finished tree makes no remote calls.
pub async fn run(ctx: &ServiceContext, settings: &LlmSettings, report: &mut RunReport) {
    let mut registry = OutputRegistry::default();
    let mut requests_sent = 0_usize;
    let walker = SourceWalker::new(&settings.root, &settings.extension, settings.skip.clone())
        .exclude(&settings.output_dir);

    for source in &walker {
        debug!(source = %source.display(), "candidate");
        let result =
            process(ctx, settings, &mut registry, &source, report, &mut requests_sent).await;
        if let Err(failure) = result {
            report.record_failure(&failure);
        }
    }
}

async fn process(
    ctx: &ServiceContext,
    settings: &LlmSettings,
    registry: &mut OutputRegistry,
    source: &Path,
    report: &mut RunReport,
    requests_sent: &mut usize,
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
    if text.trim().is_empty() {
        report.record_skipped(source, "source is empty");
        return Ok(());
    }
    if settings.dry_run {
        report.record_planned(source, &output.path);
        return Ok(());
    }

    if *requests_sent > 0 && !settings.pause.is_zero() {
        debug!(pause_ms = settings.pause.as_millis(), "rate limit pause");
        ctx.clock.sleep(settings.pause).await;
    }
    *requests_sent += 1;

    let relative = source.strip_prefix(&settings.root).unwrap_or(source);
    let request = CompletionRequest {
        model: settings.model.clone(),
        prompt: settings.prompt.render(&relative.to_string_lossy(), &text),
        max_tokens: settings.max_tokens,
    };
    let response = ctx.llm.complete(&request).await.map_err(|e| {
        FileFailure::RemoteGeneration { path: source.to_path_buf(), reason: e.to_string() }
    })?;
    debug!(
        prompt_tokens = response.prompt_tokens,
        completion_tokens = response.completion_tokens,
        "model answered"
    );

    let generated = response.text.trim();
    if generated.is_empty() {
        return Err(FileFailure::EmptyResponse { path: source.to_path_buf() });
    }
    write_output(ctx, source, &output.path, generated)?;
    report.record_generated(source, &output.path);
    Ok(())
}
