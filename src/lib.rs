//! # Introduction
//!
//! cdomain parses C declarations as they appear in documentation markup,
//! renders them back in a canonical normalized form, computes stable
//! cross-reference identifiers, and registers them in a scope tree for later
//! lookup.  It is the "C domain" core of a documentation generator: the
//! surrounding build pipeline hands it declaration text plus a declaration
//! kind, and gets back an AST, rendered signatures, and a symbol handle.
//!
//! ## Processing pipeline
//!
//! ```text
//! Declaration text → DefinitionParser → Declaration AST
//!                                        ├─ canonical text   (round-trips)
//!                                        ├─ display text     ([anonymous], keyword prefixes)
//!                                        ├─ get_id(version)  (mangled identifiers)
//!                                        └─ SymbolTable::add_declaration
//! ```
//!
//! 1. [`parser`]: recursive-descent parser over a backtracking [`cursor`],
//!    one entry point per declaration kind plus a standalone expression
//!    grammar.
//! 2. [`ast`]: closed sum types for expressions, declarators, attributes,
//!    and declarations, each rendering exhaustively in canonical, display,
//!    and id-encoding modes.
//! 3. [`id`]: the versioned identifier mangling table.
//! 4. [`symbol`]: the scope tree holding registration, redeclaration
//!    merging, duplicate diagnostics, and qualified-name / identifier
//!    lookup.
//!
//! ## Supported grammar subset
//!
//! Declarations: type aliases, members/variables (with bit-fields and
//! initializers), functions, macros (including GNU variadics), struct/union/
//! enum tags, enumerators.  Declarators: pointer chains with qualifiers,
//! arrays (`static`, qualifiers, `*` VLA), function parameters with `...`,
//! parenthesized declarators.  Attributes: `[[...]]`, `__attribute__((...))`,
//! and user-configured identifier/paren attribute keywords.  Expressions:
//! full C operator precedence including the `and`/`or`/`not_eq`-style keyword
//! aliases, `sizeof`/`alignof`, casts, and literals with suffix/prefix/escape
//! grammar.  No preprocessor and no evaluation: literals stay text.

pub mod ast;
pub mod config;
pub mod cursor;
pub mod id;
pub mod parser;
pub mod symbol;

pub use ast::{Declaration, DeclarationKind, Expr};
pub use config::ParserConfig;
pub use id::{IdError, MAX_ID_VERSION};
pub use parser::{DefinitionParser, ParseError};
pub use symbol::{DuplicateDeclaration, MergePolicy, SymbolError, SymbolId, SymbolTable};
