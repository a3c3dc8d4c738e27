//! Host-supplied parser configuration.
//!
//! The surrounding documentation tool lets projects declare macro-like
//! attribute keywords (vendor export macros and the like) that the grammar
//! would otherwise reject.  These arrive here as plain string sets, passed
//! explicitly into [`DefinitionParser::new`](crate::DefinitionParser::new);
//! there is no global configuration state.

/// Configuration snapshot for one parse.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Bare identifiers accepted as attributes in decl-spec or declarator
    /// position, e.g. `LIGHTGBM_C_EXPORT`.
    pub id_attributes: Vec<String>,
    /// Identifiers accepted as attributes when followed by a balanced
    /// parenthesized argument, e.g. `paren_attr(...)`.
    pub paren_attributes: Vec<String>,
    /// Permit a best-effort tolerant parse of expressions the strict grammar
    /// rejects (captured as [`Expr::Fallback`](crate::Expr::Fallback)).
    /// Disabled by default; tests run strict to pin exact error locations.
    pub allow_fallback_expressions: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identifier-style attribute keyword.
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attributes.push(name.into());
        self
    }

    /// Register a paren-style attribute keyword.
    pub fn with_paren_attribute(mut self, name: impl Into<String>) -> Self {
        self.paren_attributes.push(name.into());
        self
    }
}
