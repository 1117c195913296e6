//! Generation pipelines.
//!
//! Both pipelines are strictly sequential: a file is read, turned into test
//! text and written before the next candidate is looked at. Per-file failures
//! are recorded in the [`RunReport`](crate::report::RunReport) and never stop
//! the run.

pub mod llm;
pub mod prompt;
pub mod stubs;

use std::path::Path;

use crate::context::ServiceContext;
use crate::error::FileFailure;
use crate::output::{NamingConvention, OutputName, OutputRegistry};

/// What to do when a candidate's output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Regenerate and replace the existing file.
    Overwrite,
    /// Treat the existing file as a skip-marker and leave it untouched.
    SkipExisting,
}

/// Where a candidate stands after naming and the skip-marker check.
pub(crate) enum Slot {
    /// The candidate should be processed into this output.
    Open(OutputName),
    /// The output exists and the policy says to leave it.
    Taken,
}

/// Derives and claims the output for `source`, then applies `policy`.
pub(crate) fn claim_slot(
    ctx: &ServiceContext,
    registry: &mut OutputRegistry,
    naming: &NamingConvention,
    (root, out_dir): (&Path, &Path),
    source: &Path,
    policy: WritePolicy,
) -> Result<Slot, FileFailure> {
    let output = naming.derive(root, source, out_dir);
    registry.claim(&output, source)?;
    if policy == WritePolicy::SkipExisting && ctx.fs.exists(&output.path) {
        return Ok(Slot::Taken);
    }
    Ok(Slot::Open(output))
}

pub(crate) fn read_source(ctx: &ServiceContext, source: &Path) -> Result<String, FileFailure> {
    ctx.fs
        .read_to_string(source)
        .map_err(|e| FileFailure::Read { path: source.to_path_buf(), reason: e.to_string() })
}

pub(crate) fn write_output(
    ctx: &ServiceContext,
    source: &Path,
    output: &Path,
    contents: &str,
) -> Result<(), FileFailure> {
    ctx.fs.write(output, contents).map_err(|e| FileFailure::Write {
        path: source.to_path_buf(),
        output: output.to_path_buf(),
        reason: e.to_string(),
    })
}
