//! `testsmith stubs` command.

use tracing::info;

use super::conclude;
use crate::cli::StubsArgs;
use crate::config::{ConfigFile, StubSettings};
use crate::context::ServiceContext;
use crate::pipeline;
use crate::report::RunReport;

/// Execute the `stubs` command.
///
/// # Errors
///
/// Returns an error string on configuration problems, or on per-file
/// failures when `--strict` is set.
pub fn run(args: &StubsArgs) -> Result<(), String> {
    let file = ConfigFile::load(args.common.config.as_deref()).map_err(|e| e.to_string())?;
    let settings = StubSettings::resolve(args, &file.stubs).map_err(|e| e.to_string())?;
    info!(
        root = %settings.root.display(),
        output = %settings.output_dir.display(),
        dry_run = settings.dry_run,
        "generating unittest stubs"
    );

    let ctx = ServiceContext::offline();
    let mut report = RunReport::new("stubs", ctx.clock.now());
    pipeline::stubs::run(&ctx, &settings, &mut report).map_err(|e| e.to_string())?;

    conclude(ctx, report, args.common.report.as_deref(), args.common.strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CommonArgs;

    #[test]
    fn writes_stubs_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calc.py"), "def add(a, b):\n    return a + b\n").unwrap();
        let out = dir.path().join("generated_tests");

        let args = StubsArgs {
            common: CommonArgs {
                root: Some(dir.path().to_path_buf()),
                output: Some(out.clone()),
                config: Some(write_empty_config(dir.path())),
                ..CommonArgs::default()
            },
            skip_existing: false,
        };
        run(&args).unwrap();

        let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn strict_run_fails_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.py"), "def broken(:\n").unwrap();

        let args = StubsArgs {
            common: CommonArgs {
                root: Some(dir.path().to_path_buf()),
                output: Some(dir.path().join("out")),
                config: Some(write_empty_config(dir.path())),
                strict: true,
                ..CommonArgs::default()
            },
            skip_existing: false,
        };

        assert_eq!(run(&args).unwrap_err(), "1 file(s) failed");
    }

    fn write_empty_config(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("testsmith.yaml");
        std::fs::write(&path, "").unwrap();
        path
    }
}
