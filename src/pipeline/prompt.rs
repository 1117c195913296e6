//! Prompt construction for the model-backed pipeline.

use crate::error::ConfigError;

/// Placeholder replaced by the full source text.
pub const SOURCE_PLACEHOLDER: &str = "{source}";
/// Placeholder replaced by the source path relative to the root.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Default instructions: white-box Pest unit tests for a PHP file.
const PEST_TEMPLATE: &str = "
You are an expert Laravel/PHP developer and tester specializing in white-box unit testing. \
Your task is to generate comprehensive Pest PHP unit tests for the functions and methods in the provided file.

Requirements:
- The tests MUST use the Pest PHP syntax (e.g., test('...')).
- Focus ONLY on unit-level white-box testing of the class/functions/methods. Do NOT generate tests \
for HTTP endpoints, routes, middleware, authorization, or full database/framework integration.
- Cover all public, protected, and private methods/functions (using reflection or appropriate mock \
strategies where necessary).
- Include comprehensive branch, condition, and logic coverage.
- Include success, failure, and edge case tests for input parameters and internal state changes.
- Use mocks (e.g., Mockery) and stubs extensively to isolate the class under test from its dependencies.
- Return ONLY the clean, runnable PHP Pest test code block (no markdown code fences, no explanations, \
no extra text, and no imports or opening/closing PHP tags unless necessary for Pest).

FILE: {path}

FILE CONTENT:
{source}
";

/// Instruction text wrapped around each source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Wraps a custom template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPromptTemplate`] if `{source}` is absent.
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        if !template.contains(SOURCE_PLACEHOLDER) {
            return Err(ConfigError::InvalidPromptTemplate);
        }
        Ok(Self { template })
    }

    /// The built-in Pest PHP template.
    #[must_use]
    pub fn pest() -> Self {
        Self { template: PEST_TEMPLATE.to_string() }
    }

    /// Substitutes the placeholders in a single pass, so placeholder-like
    /// text inside the source or path is never expanded again.
    #[must_use]
    pub fn render(&self, path: &str, source: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + source.len() + path.len());
        let mut rest = self.template.as_str();
        loop {
            let next = [(SOURCE_PLACEHOLDER, source), (PATH_PLACEHOLDER, path)]
                .into_iter()
                .filter_map(|(marker, value)| rest.find(marker).map(|at| (at, marker, value)))
                .min_by_key(|(at, _, _)| *at);
            let Some((at, marker, value)) = next else {
                out.push_str(rest);
                return out;
            };
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + marker.len()..];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pest_template_embeds_file() {
        let prompt = PromptTemplate::pest().render("app/Models/User.php", "<?php class User {}");

        assert!(prompt.contains("Pest PHP unit tests"));
        assert!(prompt.contains("FILE: app/Models/User.php"));
        assert!(prompt.trim_end().ends_with("FILE CONTENT:\n<?php class User {}"));
    }

    #[test]
    fn placeholders_inside_source_are_left_alone() {
        let template = PromptTemplate::new("[{path}] {source} [{path}]").unwrap();
        let prompt = template.render("a.php", "echo '{path}{source}';");
        assert_eq!(prompt, "[a.php] echo '{path}{source}'; [a.php]");
    }

    #[test]
    fn template_must_mention_source() {
        assert!(PromptTemplate::new("only {path}").is_err());
    }
}
