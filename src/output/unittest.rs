//! Renders placeholder `unittest` suites from extracted declarations.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::extract::Declarations;

/// Body shared by every placeholder test method.
const PLACEHOLDER_BODY: &str = "        self.assertTrue(True)\n\n";

/// Renders a runnable `unittest` module for one source file.
///
/// Emits one `test_function_<name>` per function, and per class one
/// `test_class_<Class>_exists` plus one `test_<Class>_<method>` per method.
/// A file without declarations gets a single `test_placeholder`. Method names
/// that would clash inside the test class get a numeric suffix.
#[must_use]
pub fn render_suite(stem: &str, declarations: &Declarations) -> String {
    let mut out = String::new();
    let mut names = TestNames::default();

    out.push_str("import unittest\n\n\n");
    let _ = writeln!(out, "class Test_{stem}(unittest.TestCase):\n");

    if declarations.is_empty() {
        push_test(&mut out, &names.claim("test_placeholder".into()));
    }

    for function in &declarations.functions {
        push_test(&mut out, &names.claim(format!("test_function_{function}")));
    }

    for class in &declarations.classes {
        push_test(&mut out, &names.claim(format!("test_class_{}_exists", class.name)));
        for method in &class.methods {
            push_test(&mut out, &names.claim(format!("test_{}_{method}", class.name)));
        }
    }

    out.push_str("\nif __name__ == '__main__':\n");
    out.push_str("    unittest.main()\n");
    out
}

fn push_test(out: &mut String, name: &str) {
    let _ = writeln!(out, "    def {name}(self):");
    out.push_str(PLACEHOLDER_BODY);
}

/// Hands out test method names that are unique within one suite.
#[derive(Default)]
struct TestNames {
    taken: HashSet<String>,
}

impl TestNames {
    fn claim(&mut self, wanted: String) -> String {
        if self.taken.insert(wanted.clone()) {
            return wanted;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{wanted}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
