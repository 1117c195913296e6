//! Static declaration extraction.
//!
//! Source files are parsed into a syntax tree and inspected without ever
//! being executed.

pub mod python;

pub use python::PythonExtractor;

/// A class and the methods declared directly in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Class name.
    pub name: String,
    /// Method names in declaration order.
    pub methods: Vec<String>,
}

/// Declarations discovered in one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    /// Module-level function names in declaration order.
    pub functions: Vec<String>,
    /// Module-level classes in declaration order.
    pub classes: Vec<ClassDecl>,
}

impl Declarations {
    /// Returns `true` if the file declares no functions and no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }

    /// Records a function; a redefinition keeps the first position.
    pub fn add_function(&mut self, name: String) {
        if !self.functions.contains(&name) {
            self.functions.push(name);
        }
    }

    /// Records a class; a redefinition keeps the first position but takes
    /// the methods of the later, shadowing definition.
    pub fn add_class(&mut self, class: ClassDecl) {
        match self.classes.iter_mut().find(|existing| existing.name == class.name) {
            Some(existing) => existing.methods = class.methods,
            None => self.classes.push(class),
        }
    }
}
