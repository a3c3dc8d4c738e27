//! AST node model for C declarations and expressions.
//!
//! Every node kind is a closed sum type (one variant per grammar production)
//! with exhaustive-match rendering.  Nodes are immutable once built and can
//! render themselves in three modes:
//!
//! - [`Render::Canonical`]: normalized source text; reparsing it yields a
//!   structurally equal AST.
//! - [`Render::Display`]: human-facing documentation text, with anonymous
//!   names spelled `[anonymous]` and declarations carrying their
//!   object-keyword prefix (`struct`, `typedef`, and so on).
//! - [`Render::IdText`]: the type encoding used by identifier mangling;
//!   declarator names and attributes are omitted so that spelling-only
//!   differences (parameter names) do not change identifiers.

pub mod decl;
pub mod expr;

pub use decl::*;
pub use expr::*;

use std::fmt;

/// Rendering mode threaded through every node's `write` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    Canonical,
    Display,
    IdText,
}

/// A single name component, possibly anonymous (`@a`, `@1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Anonymous entities are spelled with a leading `@`.
    pub fn is_anonymous(&self) -> bool {
        self.name.starts_with('@')
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub(crate) fn write(&self, out: &mut String, mode: Render) {
        if mode == Render::Display && self.is_anonymous() {
            out.push_str("[anonymous]");
        } else {
            out.push_str(&self.name);
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dot-separated name path, e.g. `PyTypeObject.tp_bases` or `@a.A`.
/// A leading dot (`.a`) roots the name at the global scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NestedName {
    pub rooted: bool,
    pub names: Vec<Identifier>,
}

impl NestedName {
    pub fn new(rooted: bool, names: Vec<Identifier>) -> Self {
        debug_assert!(!names.is_empty());
        Self { rooted, names }
    }

    /// The innermost (declared) component.
    pub fn last(&self) -> &Identifier {
        self.names.last().expect("nested name has at least one component")
    }

    /// True if any path component is anonymous.
    pub fn has_anonymous(&self) -> bool {
        self.names.iter().any(Identifier::is_anonymous)
    }

    /// The dotted qualified form without the rooting dot, as used in
    /// identifiers: `A.B`, `@a.A`.
    pub fn qualified(&self) -> String {
        let mut out = String::new();
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(name.as_str());
        }
        out
    }

    pub(crate) fn write(&self, out: &mut String, mode: Render) {
        if self.rooted {
            out.push('.');
        }
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            name.write(out, mode);
        }
    }
}

impl fmt::Display for NestedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out, Render::Canonical);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identifier_display() {
        let id = Identifier::new("@a");
        assert!(id.is_anonymous());
        let mut out = String::new();
        id.write(&mut out, Render::Display);
        assert_eq!(out, "[anonymous]");
    }

    #[test]
    fn test_nested_name_rendering() {
        let name = NestedName::new(
            false,
            vec![Identifier::new("@a"), Identifier::new("A")],
        );
        assert_eq!(name.to_string(), "@a.A");
        assert_eq!(name.qualified(), "@a.A");
        let mut out = String::new();
        name.write(&mut out, Render::Display);
        assert_eq!(out, "[anonymous].A");
    }

    #[test]
    fn test_rooted_name_keeps_leading_dot() {
        let name = NestedName::new(true, vec![Identifier::new("a")]);
        assert_eq!(name.to_string(), ".a");
        assert_eq!(name.qualified(), "a");
    }
}
