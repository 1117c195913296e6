//! Run configuration.
//!
//! Settings are layered: built-in defaults, then the optional YAML config
//! file, then command-line flags. The resolved [`StubSettings`] and
//! [`LlmSettings`] are what the pipelines consume.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::{CommonArgs, LlmArgs, StubsArgs};
use crate::error::ConfigError;
use crate::output::{NamingConvention, STUB_EXTENSION};
use crate::pipeline::prompt::PromptTemplate;
use crate::pipeline::WritePolicy;
use crate::walk::SkipSet;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "testsmith.yaml";

const STUBS_ROOT: &str = ".";
const STUBS_OUTPUT: &str = "generated_tests";
const STUBS_EXTENSION: &str = "py";

const LLM_ROOT: &str = "../app";
const LLM_OUTPUT: &str = "Unit-Testing";
const LLM_EXTENSION: &str = "php";
const LLM_SUFFIX: &str = "_Test";
const LLM_REQUESTS_PER_MINUTE: u32 = 10;
const LLM_TIMEOUT_SECS: u64 = 120;
const LLM_MAX_TOKENS: u32 = 8192;

/// Hosted text-generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini `generateContent`.
    #[default]
    Gemini,
    /// Anthropic messages API.
    Anthropic,
}

impl Provider {
    /// Model used when none is configured.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    /// Environment variable consulted for the API key when none is configured.
    #[must_use]
    pub fn default_api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Contents of a `testsmith.yaml` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Settings for `testsmith stubs`.
    pub stubs: StubsSection,
    /// Settings for `testsmith llm`.
    pub llm: LlmSection,
}

/// `stubs:` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StubsSection {
    /// Project root.
    pub root: Option<PathBuf>,
    /// Output directory.
    pub output: Option<PathBuf>,
    /// Source extension.
    pub extension: Option<String>,
    /// Replaces the default skip set.
    pub skip_dirs: Option<Vec<String>>,
    /// Output file name prefix.
    pub prefix: Option<String>,
    /// Keep existing outputs instead of regenerating them.
    pub skip_existing: Option<bool>,
}

/// `llm:` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    /// Project root.
    pub root: Option<PathBuf>,
    /// Output directory.
    pub output: Option<PathBuf>,
    /// Source extension.
    pub extension: Option<String>,
    /// Replaces the default skip set.
    pub skip_dirs: Option<Vec<String>>,
    /// Output file name prefix.
    pub prefix: Option<String>,
    /// Output file name suffix (before the extension).
    pub suffix: Option<String>,
    /// Hosted model provider.
    pub provider: Option<Provider>,
    /// Model identifier.
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Request ceiling per minute.
    pub requests_per_minute: Option<u32>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Maximum generated tokens per file.
    pub max_tokens: Option<u32>,
    /// Prompt template with `{source}` and optional `{path}` placeholders.
    pub prompt_template: Option<String>,
    /// Regenerate files whose output already exists.
    pub overwrite: Option<bool>,
}

impl ConfigFile {
    /// Loads the config file named by `explicit`, or `testsmith.yaml` from
    /// the working directory if it exists, or the empty default.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or if the
    /// chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Unreadable { path: path.clone(), reason: e.to_string() })?;
        Self::from_yaml(&path, &text)
    }

    /// Parses config file text; `path` is only used in diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on malformed YAML or unknown keys.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| ConfigError::Invalid { path: path.to_path_buf(), reason: e.to_string() })
    }
}

/// Resolved settings for the stub pipeline.
#[derive(Debug, Clone)]
pub struct StubSettings {
    /// Project root to walk.
    pub root: PathBuf,
    /// Flat output directory.
    pub output_dir: PathBuf,
    /// Source extension without the dot.
    pub extension: String,
    /// Directory names to prune.
    pub skip: SkipSet,
    /// Output file naming.
    pub naming: NamingConvention,
    /// What to do when an output already exists.
    pub policy: WritePolicy,
    /// Inspect only; never write.
    pub dry_run: bool,
}

impl StubSettings {
    /// Merges CLI flags over the config file section over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the output naming affixes are not identifier-safe.
    pub fn resolve(args: &StubsArgs, file: &StubsSection) -> Result<Self, ConfigError> {
        let common = &args.common;
        let extension = pick(&common.extension, &file.extension, STUBS_EXTENSION);
        let naming = match &file.prefix {
            Some(prefix) => NamingConvention::new(prefix.clone(), "", STUB_EXTENSION)?,
            None => NamingConvention::python_stubs(),
        };
        let skip_existing = args.skip_existing || file.skip_existing.unwrap_or(false);

        Ok(Self {
            root: pick_path(common.root.as_ref(), file.root.as_ref(), STUBS_ROOT),
            output_dir: pick_path(common.output.as_ref(), file.output.as_ref(), STUBS_OUTPUT),
            extension,
            skip: skip_set(file.skip_dirs.as_deref(), common),
            naming,
            policy: if skip_existing { WritePolicy::SkipExisting } else { WritePolicy::Overwrite },
            dry_run: common.dry_run,
        })
    }
}

/// Resolved settings for the model-backed pipeline.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Project root to walk.
    pub root: PathBuf,
    /// Flat output directory.
    pub output_dir: PathBuf,
    /// Source extension without the dot.
    pub extension: String,
    /// Directory names to prune.
    pub skip: SkipSet,
    /// Output file naming.
    pub naming: NamingConvention,
    /// What to do when an output already exists.
    pub policy: WritePolicy,
    /// Hosted model provider.
    pub provider: Provider,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Wait between consecutive remote calls.
    pub pause: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum generated tokens per file.
    pub max_tokens: u32,
    /// Prompt sent with each file.
    pub prompt: PromptTemplate,
    /// Inspect only; never call the model or write.
    pub dry_run: bool,
}

impl LlmSettings {
    /// Merges CLI flags over the config file section over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero request rate, a prompt template without
    /// `{source}`, or unsafe naming affixes.
    pub fn resolve(args: &LlmArgs, file: &LlmSection) -> Result<Self, ConfigError> {
        let common = &args.common;
        let provider = args.provider.or(file.provider).unwrap_or_default();
        let extension = pick(&common.extension, &file.extension, LLM_EXTENSION);
        let naming = NamingConvention::new(
            file.prefix.clone().unwrap_or_default(),
            file.suffix.clone().unwrap_or_else(|| LLM_SUFFIX.to_string()),
            extension.clone(),
        )?;

        let rate = args
            .requests_per_minute
            .or(file.requests_per_minute)
            .unwrap_or(LLM_REQUESTS_PER_MINUTE);
        if rate == 0 {
            return Err(ConfigError::InvalidRate);
        }

        let prompt = match &file.prompt_template {
            Some(template) => PromptTemplate::new(template.clone())?,
            None => PromptTemplate::pest(),
        };
        let overwrite = args.overwrite || file.overwrite.unwrap_or(false);

        Ok(Self {
            root: pick_path(common.root.as_ref(), file.root.as_ref(), LLM_ROOT),
            output_dir: pick_path(common.output.as_ref(), file.output.as_ref(), LLM_OUTPUT),
            extension,
            skip: skip_set(file.skip_dirs.as_deref(), common),
            naming,
            policy: if overwrite { WritePolicy::Overwrite } else { WritePolicy::SkipExisting },
            provider,
            model: pick(&args.model, &file.model, provider.default_model()),
            api_key_env: pick(&args.api_key_env, &file.api_key_env, provider.default_api_key_env()),
            pause: Duration::from_secs_f64(60.0 / f64::from(rate)),
            timeout: Duration::from_secs(
                args.timeout_secs.or(file.timeout_secs).unwrap_or(LLM_TIMEOUT_SECS),
            ),
            max_tokens: args.max_tokens.or(file.max_tokens).unwrap_or(LLM_MAX_TOKENS),
            prompt,
            dry_run: common.dry_run,
        })
    }
}

/// Reads the API key from `var`, loading `.env` first.
///
/// # Errors
///
/// Returns [`ConfigError::MissingApiKey`] if the variable is unset or blank.
pub fn api_key(var: &str) -> Result<String, ConfigError> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    match env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingApiKey { var: var.to_string() }),
    }
}

fn pick(flag: &Option<String>, file: &Option<String>, default: &str) -> String {
    flag.clone().or_else(|| file.clone()).unwrap_or_else(|| default.to_string())
}

fn pick_path(flag: Option<&PathBuf>, file: Option<&PathBuf>, default: &str) -> PathBuf {
    flag.or(file).cloned().unwrap_or_else(|| PathBuf::from(default))
}

fn skip_set(file: Option<&[String]>, common: &CommonArgs) -> SkipSet {
    let mut skip = match file {
        Some(names) => SkipSet::new(names.iter().cloned()),
        None => SkipSet::default(),
    };
    for name in &common.skip_dirs {
        skip.insert(name.clone());
    }
    skip
}
