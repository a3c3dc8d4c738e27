//! The scope tree of declared entities.
//!
//! Symbols live in an arena indexed by [`SymbolId`]; each symbol knows its
//! parent, its children, and a by-name map of the named children.  Adding a
//! declaration walks its qualified name, creating scope-only intermediate
//! symbols on demand, then either creates, completes, merges, or rejects the
//! terminal symbol:
//!
//! - a terminal anonymous name always creates a fresh symbol;
//! - an existing symbol without a declaration (created as an intermediate
//!   scope earlier) is completed in place;
//! - an existing declared symbol is merged when the [`MergePolicy`] finds
//!   the two declarations compatible;
//! - otherwise the earlier declaration wins and a [`DuplicateDeclaration`]
//!   diagnostic is recorded.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ast::{Declaration, Identifier};
use crate::id::MAX_ID_VERSION;

/// Arena index of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// When two declarations of the same qualified name count as one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Compatible when the newest-scheme identifiers match.  Functions with
    /// different prototypes stay distinct; re-stating a prototype merges.
    #[default]
    IdAtMaxVersion,
    /// Additionally require identical canonical text.
    ExactSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("declaration does not declare a name")]
    Unnamed,
}

/// Recorded when a redeclaration is rejected.  The earlier declaration stays
/// authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDeclaration {
    /// Dotted qualified path of the entity.
    pub path: String,
    pub prev_docname: Option<String>,
    pub new_docname: Option<String>,
}

#[derive(Debug)]
struct Symbol {
    parent: Option<SymbolId>,
    ident: Option<Identifier>,
    decl: Option<Declaration>,
    docname: Option<String>,
    children: Vec<SymbolId>,
    named: FxHashMap<String, SymbolId>,
}

impl Symbol {
    fn scope_only(parent: Option<SymbolId>, ident: Option<Identifier>) -> Self {
        Self {
            parent,
            ident,
            decl: None,
            docname: None,
            children: Vec::new(),
            named: FxHashMap::default(),
        }
    }
}

pub struct SymbolTable {
    symbols: Vec<Symbol>,
    diagnostics: Vec<DuplicateDeclaration>,
    policy: MergePolicy,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_policy(MergePolicy::default())
    }

    pub fn with_policy(policy: MergePolicy) -> Self {
        Self {
            symbols: vec![Symbol::scope_only(None, None)],
            diagnostics: Vec::new(),
            policy,
        }
    }

    /// The global scope.
    pub fn root(&self) -> SymbolId {
        SymbolId(0)
    }

    /// Register a declaration under `parent` (names rooted with a leading
    /// dot are registered under the global scope instead).  Returns the
    /// symbol now holding the entity; on a rejected duplicate that is the
    /// earlier symbol, and a diagnostic is recorded.
    pub fn add_declaration(
        &mut self,
        decl: Declaration,
        docname: Option<&str>,
        parent: SymbolId,
    ) -> Result<SymbolId, SymbolError> {
        let name = decl.name().ok_or(SymbolError::Unnamed)?.clone();
        let mut scope = if name.rooted { self.root() } else { parent };
        let (last, intermediate) = name
            .names
            .split_last()
            .ok_or(SymbolError::Unnamed)?;
        for ident in intermediate {
            scope = self.find_or_create_scope(scope, ident);
        }
        if last.is_anonymous() {
            // anonymous entities are never merged
            let id = self.create_child(scope, last.clone(), Some(decl), docname);
            log::debug!("registered '{}'", self.qualified_name(id));
            return Ok(id);
        }
        match self.symbols[scope.0].named.get(last.as_str()).copied() {
            None => {
                let id = self.create_child(scope, last.clone(), Some(decl), docname);
                log::debug!("registered '{}'", self.qualified_name(id));
                Ok(id)
            }
            Some(existing) => {
                if self.symbols[existing.0].decl.is_none() {
                    let sym = &mut self.symbols[existing.0];
                    sym.decl = Some(decl);
                    sym.docname = docname.map(str::to_string);
                    return Ok(existing);
                }
                if self.compatible(existing, &decl) {
                    // same entity restated; remember the newest site
                    self.symbols[existing.0].docname = docname.map(str::to_string);
                    return Ok(existing);
                }
                let path = self.qualified_name(existing);
                let prev_docname = self.symbols[existing.0].docname.clone();
                log::warn!(
                    "duplicate declaration of '{path}' (first declared in {prev_docname:?})"
                );
                self.diagnostics.push(DuplicateDeclaration {
                    path,
                    prev_docname,
                    new_docname: docname.map(str::to_string),
                });
                Ok(existing)
            }
        }
    }

    fn compatible(&self, existing: SymbolId, decl: &Declaration) -> bool {
        let Some(prev) = &self.symbols[existing.0].decl else {
            return false;
        };
        let ids_match = match (prev.get_id(MAX_ID_VERSION), decl.get_id(MAX_ID_VERSION)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        match self.policy {
            MergePolicy::IdAtMaxVersion => ids_match,
            MergePolicy::ExactSignature => ids_match && prev.to_text() == decl.to_text(),
        }
    }

    fn find_or_create_scope(&mut self, scope: SymbolId, ident: &Identifier) -> SymbolId {
        if let Some(&existing) = self.symbols[scope.0].named.get(ident.as_str()) {
            return existing;
        }
        self.create_child(scope, ident.clone(), None, None)
    }

    fn create_child(
        &mut self,
        parent: SymbolId,
        ident: Identifier,
        decl: Option<Declaration>,
        docname: Option<&str>,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        let key = ident.as_str().to_string();
        self.symbols.push(Symbol {
            parent: Some(parent),
            ident: Some(ident),
            decl,
            docname: docname.map(str::to_string),
            children: Vec::new(),
            named: FxHashMap::default(),
        });
        let parent_sym = &mut self.symbols[parent.0];
        parent_sym.children.push(id);
        // of several same-named symbols, lookup goes through the first
        parent_sym.named.entry(key).or_insert(id);
        id
    }

    /// Look a symbol up by dotted qualified path from the global scope.
    pub fn find(&self, path: &str) -> Option<SymbolId> {
        let path = path.strip_prefix('.').unwrap_or(path);
        let mut current = self.root();
        for part in path.split('.') {
            current = *self.symbols[current.0].named.get(part)?;
        }
        Some(current)
    }

    /// Find the symbol whose declaration mangles to `id` under any supported
    /// scheme version.
    pub fn resolve_id(&self, id: &str) -> Option<SymbolId> {
        for (index, symbol) in self.symbols.iter().enumerate() {
            let Some(decl) = &symbol.decl else { continue };
            for version in 1..=MAX_ID_VERSION {
                if decl.get_id(version).as_deref() == Ok(id) {
                    return Some(SymbolId(index));
                }
            }
        }
        None
    }

    /// Dotted qualified path of a symbol, anonymous components spelled with
    /// their `@` names.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(sym_id) = current {
            let symbol = &self.symbols[sym_id.0];
            if let Some(ident) = &symbol.ident {
                parts.push(ident.as_str().to_string());
            }
            current = symbol.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn declaration(&self, id: SymbolId) -> Option<&Declaration> {
        self.symbols[id.0].decl.as_ref()
    }

    pub fn docname(&self, id: SymbolId) -> Option<&str> {
        self.symbols[id.0].docname.as_deref()
    }

    pub fn children(&self, id: SymbolId) -> &[SymbolId] {
        &self.symbols[id.0].children
    }

    /// All duplicate-declaration diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[DuplicateDeclaration] {
        &self.diagnostics
    }
}
