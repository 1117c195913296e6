//! Property-based tests for output naming, tree walking and prompts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use testsmith::output::{sanitize, NamingConvention};
use testsmith::pipeline::prompt::PromptTemplate;
use testsmith::walk::{SkipSet, SourceWalker, DEFAULT_SKIP_DIRS};

/// One path segment: letters, digits, spaces, dots, dashes and a little unicode.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._\\-é中]{1,12}".prop_filter("not a special directory", |s| s != "." && s != "..")
}

fn relative_path() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| {
        let mut path: PathBuf = segments.iter().collect();
        path.set_extension("py");
        path
    })
}

fn is_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

proptest! {
    // ========================
    // Sanitization
    // ========================

    #[test]
    fn sanitize_yields_identifier_chars(s in "\\PC*") {
        let clean = sanitize(&s);
        prop_assert!(is_identifier(&clean), "{:?} -> {:?}", s, clean);
        prop_assert_eq!(clean.chars().count(), s.chars().count());
    }

    #[test]
    fn sanitize_is_idempotent(s in "\\PC*") {
        let once = sanitize(&s);
        prop_assert_eq!(sanitize(&once), once.clone());
    }

    // ========================
    // Output naming
    // ========================

    #[test]
    fn output_names_are_safe_and_flat(relative in relative_path()) {
        let root = Path::new("/project");
        let out = NamingConvention::python_stubs()
            .derive(root, &root.join(&relative), Path::new("generated_tests"));

        prop_assert!(is_identifier(&out.stem));
        prop_assert_eq!(out.path.parent(), Some(Path::new("generated_tests")));
        prop_assert!(out.file_name.starts_with("test_"));
        prop_assert!(out.file_name.ends_with(".py"));
    }

    #[test]
    fn distinct_sources_get_distinct_outputs(
        paths in prop::collection::hash_set(relative_path(), 1..24)
    ) {
        let root = Path::new("/project");
        let naming = NamingConvention::python_stubs();
        let names: HashSet<PathBuf> = paths
            .iter()
            .map(|p| naming.derive(root, &root.join(p), Path::new("out")).path)
            .collect();
        prop_assert_eq!(names.len(), paths.len());
    }

    // ========================
    // Prompt rendering
    // ========================

    #[test]
    fn prompt_embeds_source_verbatim(source in "\\PC*") {
        let prompt = PromptTemplate::pest().render("app/Thing.php", &source);
        prop_assert!(prompt.contains(&source));
    }
}

/// Directory segment that is sometimes a skipped name.
fn dir_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}",
        1 => prop::sample::select(DEFAULT_SKIP_DIRS.to_vec()).prop_map(str::to_string),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // ========================
    // Tree walking
    // ========================

    #[test]
    fn walker_yields_exactly_the_unskipped_files(
        dirs in prop::collection::vec(prop::collection::vec(dir_segment(), 0..4), 1..12)
    ) {
        let tree = tempfile::tempdir().unwrap();
        let skip = SkipSet::default();
        let mut expected = HashSet::new();
        for (index, segments) in dirs.iter().enumerate() {
            let mut relative: PathBuf = segments.iter().collect();
            relative.push(format!("m{index}.py"));
            let path = tree.path().join(&relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "").unwrap();
            if !segments.iter().any(|segment| skip.contains(segment)) {
                expected.insert(relative);
            }
        }

        let walker = SourceWalker::new(tree.path(), "py", skip.clone());
        let found: HashSet<PathBuf> = walker
            .iter()
            .map(|path| path.strip_prefix(tree.path()).unwrap().to_path_buf())
            .collect();

        for path in &found {
            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            prop_assert!(
                parent.iter().all(|segment| !skip.contains(&segment.to_string_lossy())),
                "walked into a skipped directory: {:?}", path
            );
        }
        prop_assert_eq!(found, expected);
    }
}
