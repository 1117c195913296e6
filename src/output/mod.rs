//! Output naming and rendering.
//!
//! Every candidate file maps to exactly one output file in a flat output
//! directory. The output stem is the dotted module path with every character
//! outside `[A-Za-z0-9_]` replaced by `_`, followed by a short BLAKE3 digest of
//! the relative source path so that inputs whose readable stems coincide
//! (`a/b.py` and `a_b.py`) still get distinct files.

pub mod unittest;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{ConfigError, FileFailure};

/// Hex digits of the path digest appended to each stem.
const DIGEST_LEN: usize = 8;

/// Default prefix of generated `unittest` stub files.
pub const STUB_PREFIX: &str = "test_";
/// Extension of generated `unittest` stub files.
pub const STUB_EXTENSION: &str = "py";

/// How output file names are assembled around the sanitized stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    prefix: String,
    suffix: String,
    extension: String,
}

/// A derived output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    /// Identifier-safe stem, without prefix, suffix or extension.
    pub stem: String,
    /// Full file name (`prefix + stem + suffix + "." + extension`).
    pub file_name: String,
    /// File name joined onto the output directory.
    pub path: PathBuf,
}

impl NamingConvention {
    /// Creates a convention after checking that every affix is identifier-safe.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAffix`] if the prefix or suffix contains a
    /// character outside `[A-Za-z0-9_]`, or the extension is empty or does.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        let extension = extension.into();
        check_affix("prefix", &prefix)?;
        check_affix("suffix", &suffix)?;
        if extension.is_empty() {
            return Err(ConfigError::InvalidAffix { field: "extension", value: extension });
        }
        check_affix("extension", &extension)?;
        Ok(Self { prefix, suffix, extension })
    }

    /// `test_<stem>.py`, the layout used for generated `unittest` stubs.
    #[must_use]
    pub fn python_stubs() -> Self {
        Self {
            prefix: STUB_PREFIX.into(),
            suffix: String::new(),
            extension: STUB_EXTENSION.into(),
        }
    }

    /// Derives the output location for `source`, which lives under `root`.
    #[must_use]
    pub fn derive(&self, root: &Path, source: &Path, out_dir: &Path) -> OutputName {
        let relative = source.strip_prefix(root).unwrap_or(source);
        let stem = format!("{}_{}", sanitize(&module_name(relative)), path_digest(relative));
        let file_name = format!("{}{stem}{}.{}", self.prefix, self.suffix, self.extension);
        let path = out_dir.join(&file_name);
        OutputName { stem, file_name, path }
    }
}

fn check_affix(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.chars().all(is_identifier_char) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAffix { field, value: value.to_string() })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Dotted module name: path components joined with `.`, extension dropped.
#[must_use]
pub fn module_name(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars().map(|c| if is_identifier_char(c) { c } else { '_' }).collect()
}

/// Leading hex digits of the BLAKE3 digest of the component sequence.
fn path_digest(relative: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    for (index, component) in relative.components().enumerate() {
        if index > 0 {
            hasher.update(b"/");
        }
        hasher.update(component.as_os_str().as_encoded_bytes());
    }
    hasher.finalize().to_hex()[..DIGEST_LEN].to_string()
}

/// Tracks which source claimed which output during one run.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    claimed: HashMap<PathBuf, PathBuf>,
}

impl OutputRegistry {
    /// Claims `output` for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`FileFailure::OutputCollision`] if a different source already
    /// claimed the same output path in this run.
    pub fn claim(&mut self, output: &OutputName, source: &Path) -> Result<(), FileFailure> {
        match self.claimed.get(&output.path) {
            Some(owner) if owner != source => Err(FileFailure::OutputCollision {
                path: source.to_path_buf(),
                output: output.path.clone(),
                claimed_by: owner.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(output.path.clone(), source.to_path_buf());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_prefixed_module_stem() {
        let naming = NamingConvention::python_stubs();
        let out = naming.derive(
            Path::new("/project"),
            Path::new("/project/saleor/core/utils.py"),
            Path::new("generated_tests"),
        );

        assert!(out.stem.starts_with("saleor_core_utils_"));
        assert_eq!(out.stem.len(), "saleor_core_utils_".len() + DIGEST_LEN);
        assert_eq!(out.file_name, format!("test_{}.py", out.stem));
        assert_eq!(out.path, Path::new("generated_tests").join(&out.file_name));
    }

    #[test]
    fn derivation_is_deterministic() {
        let naming = NamingConvention::python_stubs();
        let a = naming.derive(Path::new("/r"), Path::new("/r/x/y.py"), Path::new("out"));
        let b = naming.derive(Path::new("/r"), Path::new("/r/x/y.py"), Path::new("out"));
        assert_eq!(a, b);
    }

    #[test]
    fn readable_stem_collisions_are_disambiguated() {
        let naming = NamingConvention::python_stubs();
        let root = Path::new("/r");
        let nested = naming.derive(root, Path::new("/r/a/b.py"), Path::new("out"));
        let flat = naming.derive(root, Path::new("/r/a_b.py"), Path::new("out"));
        let dotted = naming.derive(root, Path::new("/r/a.b.py"), Path::new("out"));

        assert!(nested.stem.starts_with("a_b_"));
        assert!(flat.stem.starts_with("a_b_"));
        assert!(dotted.stem.starts_with("a_b_"));
        assert_ne!(nested.file_name, flat.file_name);
        assert_ne!(nested.file_name, dotted.file_name);
        assert_ne!(flat.file_name, dotted.file_name);
    }

    #[test]
    fn module_name_joins_components_and_drops_extension() {
        assert_eq!(module_name(Path::new("pkg/sub/mod.py")), "pkg.sub.mod");
        assert_eq!(module_name(Path::new("app/Http/User.php")), "app.Http.User");
    }

    #[test]
    fn sanitize_replaces_non_identifier_chars() {
        assert_eq!(sanitize("my pkg.naïve-mod"), "my_pkg_na_ve_mod");
    }

    #[test]
    fn rejects_unsafe_affixes() {
        assert!(NamingConvention::new("test-", "", "py").is_err());
        assert!(NamingConvention::new("", "_Test", "").is_err());
        assert!(NamingConvention::new("", "-Test", "php").is_err());
        assert!(NamingConvention::new("", "_Test", "php").is_ok());
    }

    #[test]
    fn registry_rejects_second_owner() {
        let naming = NamingConvention::python_stubs();
        let name = naming.derive(Path::new("/r"), Path::new("/r/a.py"), Path::new("out"));
        let mut registry = OutputRegistry::default();

        registry.claim(&name, Path::new("/r/a.py")).unwrap();
        registry.claim(&name, Path::new("/r/a.py")).unwrap();
        let err = registry.claim(&name, Path::new("/r/other.py")).unwrap_err();

        assert!(matches!(err, FileFailure::OutputCollision { .. }));
    }
}
