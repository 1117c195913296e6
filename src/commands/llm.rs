//! `testsmith llm` command.

use std::time::Duration;

use tracing::info;

use super::conclude;
use crate::adapters::live;
use crate::cli::LlmArgs;
use crate::config::{self, ConfigFile, LlmSettings};
use crate::context::ServiceContext;
use crate::pipeline;
use crate::report::RunReport;

/// Execute the `llm` command.
///
/// # Errors
///
/// Returns an error string on configuration problems (including a missing
/// API key), or on per-file failures when `--strict` is set.
pub fn run(args: &LlmArgs) -> Result<(), String> {
    let file = ConfigFile::load(args.common.config.as_deref()).map_err(|e| e.to_string())?;
    let mut settings = LlmSettings::resolve(args, &file.llm).map_err(|e| e.to_string())?;
    if args.replay.is_some() {
        // Replayed answers come from disk; there is no quota to respect.
        settings.pause = Duration::ZERO;
    }
    info!(
        root = %settings.root.display(),
        output = %settings.output_dir.display(),
        provider = ?settings.provider,
        model = %settings.model,
        dry_run = settings.dry_run,
        "generating tests with a hosted model"
    );

    let ctx = build_context(args, &settings)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let mut report = RunReport::new("llm", ctx.clock.now());
    runtime.block_on(pipeline::llm::run(&ctx, &settings, &mut report));

    conclude(ctx, report, args.common.report.as_deref(), args.common.strict)
}

/// Picks the model source: a cassette, nothing (dry run), or the live API.
fn build_context(args: &LlmArgs, settings: &LlmSettings) -> Result<ServiceContext, String> {
    if let Some(cassette) = &args.replay {
        return ServiceContext::replaying(cassette).map_err(|e| e.to_string());
    }
    if settings.dry_run {
        return Ok(ServiceContext::offline());
    }

    let key = config::api_key(&settings.api_key_env).map_err(|e| e.to_string())?;
    let client = live::llm_client(settings.provider, key, settings.timeout)
        .map_err(|e| e.to_string())?;
    Ok(match &args.record {
        Some(cassette) => ServiceContext::recording(client, cassette),
        None => ServiceContext::live(client),
    })
}
