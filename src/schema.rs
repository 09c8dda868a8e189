//! Parsed schema types
//!
//! A schema is a list of class declarations. Each class names at most one
//! parent and carries an ordered list of typed properties.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parser::Span;

/// A `*name Range;` line inside a class block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    pub range: String,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
        }
    }
}

/// A single `class ... .` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    /// Class name, unique within a [`ClassMapping`]
    pub name: String,
    /// Declared superclass; `None` for the short form `class Name .`
    pub parent: Option<String>,
    /// Properties in order of appearance, duplicates preserved
    pub properties: Vec<PropertyDeclaration>,
    /// Byte range of the declaration in the source text
    pub span: Span,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>, parent: Option<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            parent,
            properties: Vec::new(),
            span,
        }
    }

    pub fn with_properties(mut self, properties: Vec<PropertyDeclaration>) -> Self {
        self.properties = properties;
        self
    }

    /// True when the class is declared without an `extends` clause
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Class name -> declaration, in order of first appearance.
///
/// Re-declaring a class replaces the stored declaration but keeps the
/// position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMapping {
    classes: IndexMap<String, ClassDeclaration>,
}

impl ClassMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration, returning the one it replaced
    pub fn insert(&mut self, declaration: ClassDeclaration) -> Option<ClassDeclaration> {
        match self.classes.entry(declaration.name.clone()) {
            Entry::Occupied(mut slot) => Some(slot.insert(declaration)),
            Entry::Vacant(slot) => {
                slot.insert(declaration);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ClassDeclaration> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Declarations in mapping order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDeclaration> {
        self.classes.values()
    }

    /// Class names in mapping order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl FromIterator<ClassDeclaration> for ClassMapping {
    fn from_iter<I: IntoIterator<Item = ClassDeclaration>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for declaration in iter {
            mapping.insert(declaration);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, parent: &str) -> ClassDeclaration {
        ClassDeclaration::new(name, Some(parent.to_string()), Span::default())
    }

    #[test]
    fn test_redeclaration_overwrites_in_place() {
        let mut mapping = ClassMapping::new();
        assert!(mapping.insert(decl("Dog", "Animal")).is_none());
        mapping.insert(decl("Cat", "Animal"));

        let replaced = mapping.insert(decl("Dog", "Pet")).unwrap();
        assert_eq!(replaced.parent.as_deref(), Some("Animal"));

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["Dog", "Cat"]);
        assert_eq!(mapping.get("Dog").unwrap().parent.as_deref(), Some("Pet"));
    }

    #[test]
    fn test_short_form_is_root() {
        let declaration = ClassDeclaration::new("Thing", None, Span::default());
        assert!(declaration.is_root());
        assert!(!decl("Dog", "Animal").is_root());
    }
}
