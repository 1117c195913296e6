//! Python declaration extraction backed by tree-sitter.
//!
//! Only module-level declarations are collected: functions defined at the top
//! of the module and classes defined there, each with the methods found
//! directly in its body. Decorated definitions are unwrapped. Anything nested
//! deeper (inner functions, nested classes, definitions under `if` blocks)
//! is ignored.
//!
//! The bundled grammar covers Python syntax up to roughly 3.9: annotations,
//! walrus, positional-only parameters, `async`, f-strings. Newer constructs
//! such as PEP 695 type parameters (`def f[T](x)`) or PEP 701 nested-quote
//! f-strings are reported as parse failures.

use std::path::Path;

use tree_sitter::{Node, Parser};

use super::{ClassDecl, Declarations};
use crate::error::{ConfigError, FileFailure};

/// Longest source excerpt quoted in a parse diagnostic.
const SNIPPET_LIMIT: usize = 40;

/// Extracts top-level functions and classes from Python source.
pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    /// Creates an extractor with the Python grammar loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Grammar`] if the grammar is incompatible with
    /// the linked tree-sitter runtime.
    pub fn new() -> Result<Self, ConfigError> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_python::language())
            .map_err(|e| ConfigError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parses `source` and returns its module-level declarations.
    ///
    /// # Errors
    ///
    /// Returns [`FileFailure::Parse`] if the tree contains any syntax error,
    /// pointing at the first one in document order.
    pub fn extract(&mut self, path: &Path, source: &str) -> Result<Declarations, FileFailure> {
        let tree = self.parser.parse(source, None).ok_or_else(|| FileFailure::Parse {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
            reason: "parser produced no syntax tree".into(),
        })?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column, reason) = match first_error(root) {
                Some(node) => {
                    let at = node.start_position();
                    (at.row + 1, at.column + 1, describe_error(node, source))
                }
                None => (1, 1, "invalid syntax".to_string()),
            };
            return Err(FileFailure::Parse { path: path.to_path_buf(), line, column, reason });
        }

        let bytes = source.as_bytes();
        let mut declarations = Declarations::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let Some(definition) = unwrap_decorated(child) else {
                continue;
            };
            match definition.kind() {
                "function_definition" => {
                    if let Some(name) = name_of(definition, bytes) {
                        declarations.add_function(name);
                    }
                }
                "class_definition" => {
                    if let Some(name) = name_of(definition, bytes) {
                        let methods = methods_of(definition, bytes);
                        declarations.add_class(ClassDecl { name, methods });
                    }
                }
                _ => {}
            }
        }
        Ok(declarations)
    }
}

/// Returns the definition wrapped by a decorator, or the node itself.
fn unwrap_decorated(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition")
    } else {
        Some(node)
    }
}

fn name_of(definition: Node<'_>, source: &[u8]) -> Option<String> {
    definition
        .child_by_field_name("name")
        .and_then(|name| name.utf8_text(source).ok())
        .map(str::to_string)
}

/// Method names declared directly in a class body, deduplicated in order.
fn methods_of(class: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut methods: Vec<String> = Vec::new();
    let Some(body) = class.child_by_field_name("body") else {
        return methods;
    };
    let mut cursor = body.walk();
    for statement in body.named_children(&mut cursor) {
        let Some(definition) = unwrap_decorated(statement) else {
            continue;
        };
        if definition.kind() != "function_definition" {
            continue;
        }
        if let Some(name) = name_of(definition, source) {
            if !methods.contains(&name) {
                methods.push(name);
            }
        }
    }
    methods
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn describe_error(node: Node<'_>, source: &str) -> String {
    if node.is_missing() {
        return format!("missing {:?}", node.kind());
    }
    let excerpt = source
        .get(node.byte_range())
        .and_then(|text| text.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or_default();
    if excerpt.is_empty() {
        return "invalid syntax".to_string();
    }
    let clipped: String = excerpt.chars().take(SNIPPET_LIMIT).collect();
    format!("invalid syntax near {clipped:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Result<Declarations, FileFailure> {
        PythonExtractor::new().unwrap().extract(Path::new("sample.py"), source)
    }

    #[test]
    fn finds_function_and_class_with_methods() {
        let source = "\
def foo():
    return 1


class Bar:
    def baz(self):
        pass

    def qux(self, x):
        return x
";
        let decls = extract(source).unwrap();

        assert_eq!(decls.functions, vec!["foo"]);
        assert_eq!(
            decls.classes,
            vec![ClassDecl { name: "Bar".into(), methods: vec!["baz".into(), "qux".into()] }]
        );
    }

    #[test]
    fn empty_source_has_no_declarations() {
        let decls = extract("").unwrap();
        assert!(decls.is_empty());
    }

    #[test]
    fn only_module_level_declarations_are_collected() {
        let source = "\
def outer():
    def inner():
        pass
    class Local:
        def hidden(self):
            pass
    return inner


class Shell:
    class Nested:
        def deep(self):
            pass

    def visible(self):
        def helper():
            pass
        return helper


if True:
    def conditional():
        pass
";
        let decls = extract(source).unwrap();

        assert_eq!(decls.functions, vec!["outer"]);
        assert_eq!(decls.classes.len(), 1);
        assert_eq!(decls.classes[0].name, "Shell");
        assert_eq!(decls.classes[0].methods, vec!["visible"]);
    }

    #[test]
    fn decorated_and_async_definitions_are_unwrapped() {
        let source = "\
import functools


@functools.lru_cache(maxsize=None)
def cached():
    return 1


async def fetch():
    return 2


@dataclass
class Point:
    @property
    def norm(self):
        return 0

    @norm.setter
    def norm(self, value):
        pass

    @staticmethod
    async def load():
        pass
";
        let decls = extract(source).unwrap();

        assert_eq!(decls.functions, vec!["cached", "fetch"]);
        assert_eq!(decls.classes[0].name, "Point");
        assert_eq!(decls.classes[0].methods, vec!["norm", "load"]);
    }

    #[test]
    fn redefined_function_is_listed_once() {
        let decls = extract("def f():\n    pass\n\ndef g():\n    pass\n\ndef f():\n    pass\n")
            .unwrap();
        assert_eq!(decls.functions, vec!["f", "g"]);
    }

    #[test]
    fn invalid_syntax_reports_position() {
        let err = extract("def ok():\n    pass\n\ndef broken(:\n    pass\n").unwrap_err();

        match err {
            FileFailure::Parse { line, reason, .. } => {
                assert_eq!(line, 4);
                assert!(!reason.is_empty());
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn truncated_class_is_a_parse_failure() {
        assert!(matches!(extract("class Broken(\n"), Err(FileFailure::Parse { .. })));
    }

    #[test]
    fn accepts_modern_syntax_covered_by_grammar() {
        let source = "\
from __future__ import annotations


def first(items: list[int], /, *, default: int = 0) -> int:
    if (n := len(items)) > 0:
        return items[0]
    return default


async def fetch(url: str) -> str:
    async with session(url) as response:
        return f\"{url}: {response.status}\"


class Config:
    retries: int = 3

    @property
    def label(self) -> str:
        return f'{self.retries} retries'
";
        let decls = extract(source).unwrap();

        assert_eq!(decls.functions, vec!["first", "fetch"]);
        assert_eq!(decls.classes[0].methods, vec!["label"]);
    }

    #[test]
    fn type_parameter_syntax_is_not_supported() {
        let result = extract("def first[T](items: list[T]) -> T:\n    return items[0]\n");
        assert!(matches!(result, Err(FileFailure::Parse { .. })));
    }
}
