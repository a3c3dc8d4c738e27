//! Recursive-descent parser for C declarations and expressions.
//!
//! The grammar alternates between committed and tentative parsing: committed
//! paths report errors with the current offset, tentative paths run through
//! [`DefinitionParser::attempt`], which rolls the cursor back on failure so
//! the caller can try the next alternative.  When several alternatives fail,
//! the error that got furthest into the input wins.
//!
//! The `impl` is split by concern: this module holds the entry points,
//! attribute grammar, and shared token helpers; `declarations` holds
//! decl-specs, declarators, and the per-kind declaration grammars;
//! `expressions` holds the operator-precedence expression grammar and the
//! literal lexers.

mod declarations;
mod expressions;

pub(crate) use declarations::{Named, Outer};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::ast::{
    Attribute, Declaration, DeclarationBody, DeclarationKind, DeclSpecs, Declarator, Expr,
    GnuAttribute, SimpleSpecs, Type,
};
use crate::config::ParserConfig;
use crate::cursor::Cursor;

/// A parse failure, located by byte offset into the declaration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid declaration at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());

/// Words that can never be identifiers.
pub(crate) const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Decimal32", "_Decimal64", "_Decimal128", "_Generic", "_Imaginary", "_Noreturn",
    "_Static_assert", "_Thread_local", "alignof", "bool", "thread_local",
];

/// One-shot parser over a single declaration or expression string.
pub struct DefinitionParser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) config: &'a ParserConfig,
    /// Counter for auto-numbered anonymous names (`@` without a tail).
    pub(crate) anon_count: u32,
}

impl<'a> DefinitionParser<'a> {
    pub fn new(text: &'a str, config: &'a ParserConfig) -> Self {
        Self {
            cursor: Cursor::new(text),
            config,
            anon_count: 0,
        }
    }

    pub(crate) fn fail<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            offset: self.cursor.pos(),
            message: message.into(),
        })
    }

    /// Run a tentative parse.  On failure the cursor and the anonymous-name
    /// counter are restored, so a failed alternative leaves no trace.
    pub(crate) fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let pos = self.cursor.pos();
        let anon_count = self.anon_count;
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.cursor.set_pos(pos);
                self.anon_count = anon_count;
                Err(err)
            }
        }
    }

    /// Of two alternative failures, keep the one that consumed more input.
    pub(crate) fn prefer(first: ParseError, second: ParseError) -> ParseError {
        if second.offset > first.offset {
            second
        } else {
            first
        }
    }

    /// Consume an identifier that is not a keyword.
    pub(crate) fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.cursor.pos();
        match self.cursor.match_regex(&IDENTIFIER_RE) {
            Some(ident) if KEYWORDS.contains(&ident) => {
                self.cursor.set_pos(start);
                self.fail(format!("keyword '{ident}' used as identifier"))
            }
            Some(ident) => Ok(ident.to_string()),
            None => self.fail("expected identifier"),
        }
    }

    /// True when only whitespace (and optionally one `;`) remains.  Does not
    /// consume anything.
    pub(crate) fn at_end(&self, allow_semicolon: bool) -> bool {
        let mut probe = self.cursor.clone();
        probe.skip_ws();
        if allow_semicolon {
            probe.skip_string(";");
            probe.skip_ws();
        }
        probe.eof()
    }

    pub(crate) fn assert_end(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_ws();
        if self.cursor.eof() {
            Ok(())
        } else {
            self.fail("expected end of declaration")
        }
    }

    /// Raw text up to (not including) the first of `end` at bracket depth
    /// zero.  Brackets of all three kinds must nest properly.
    pub(crate) fn parse_balanced_token_seq(&mut self, end: &[char]) -> Result<&'a str, ParseError> {
        let start = self.cursor.pos();
        let mut stack: Vec<char> = Vec::new();
        loop {
            let Some(c) = self.cursor.current_char() else {
                if stack.is_empty() && end.is_empty() {
                    break;
                }
                return self.fail(format!(
                    "expected one of {end:?} before end of input in balanced token sequence"
                ));
            };
            if stack.is_empty() && end.contains(&c) {
                break;
            }
            match c {
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => match stack.pop() {
                    Some(expected) if expected == c => {}
                    _ => return self.fail(format!("unmatched '{c}' in balanced token sequence")),
                },
                _ => {}
            }
            self.cursor.advance(c.len_utf8());
        }
        Ok(self.cursor.slice(start))
    }

    /// One attribute, if one starts here: `[[...]]`, `__attribute__((...))`,
    /// or a configured identifier / paren attribute keyword.
    pub(crate) fn parse_attribute(&mut self) -> Result<Option<Attribute>, ParseError> {
        self.cursor.skip_ws();
        let start = self.cursor.pos();
        if self.cursor.skip_string_and_ws("[") {
            if self.cursor.skip_string("[") {
                let arg = self.parse_balanced_token_seq(&[']'])?;
                let attr = Attribute::Cpp(arg.to_string());
                if !self.cursor.skip_string_and_ws("]") {
                    return self.fail("expected ']' ending attribute");
                }
                if !self.cursor.skip_string("]") {
                    return self.fail("expected ']]' ending attribute");
                }
                return Ok(Some(attr));
            }
            // a lone '[' belongs to an array declarator, not an attribute
            self.cursor.set_pos(start);
            return Ok(None);
        }
        if self.cursor.skip_word_and_ws("__attribute__") {
            if !self.cursor.skip_string_and_ws("(") {
                return self.fail("expected '(' after '__attribute__'");
            }
            if !self.cursor.skip_string_and_ws("(") {
                return self.fail("expected '((' after '__attribute__'");
            }
            let mut attrs = Vec::new();
            loop {
                if let Some(name) = self.cursor.match_regex(&IDENTIFIER_RE) {
                    self.cursor.skip_ws();
                    let args = self.parse_paren_expression_list()?;
                    attrs.push(GnuAttribute {
                        name: name.to_string(),
                        args,
                    });
                }
                if self.cursor.skip_string_and_ws(",") {
                    continue;
                }
                if self.cursor.skip_string_and_ws(")") {
                    break;
                }
                return self.fail("expected ',' or ')' in __attribute__ list");
            }
            if !self.cursor.skip_string(")") {
                return self.fail("expected '))' ending __attribute__");
            }
            return Ok(Some(Attribute::Gnu(attrs)));
        }
        for name in &self.config.id_attributes {
            if self.cursor.skip_word(name) {
                return Ok(Some(Attribute::Id(name.clone())));
            }
        }
        for name in &self.config.paren_attributes {
            if !self.cursor.skip_string(name) {
                continue;
            }
            if !self.cursor.skip_string("(") {
                return self.fail(format!("expected '(' after user-defined attribute '{name}'"));
            }
            let arg = self.parse_balanced_token_seq(&[')'])?;
            let attr = Attribute::Paren {
                name: name.clone(),
                arg: arg.to_string(),
            };
            if !self.cursor.skip_string(")") {
                return self.fail(format!(
                    "expected ')' ending user-defined attribute '{name}'"
                ));
            }
            return Ok(Some(attr));
        }
        Ok(None)
    }

    /// Parse one declaration of the given kind, consuming all input.  A
    /// single trailing `;` is accepted and recorded.
    pub fn parse_declaration(
        &mut self,
        kind: DeclarationKind,
    ) -> Result<Declaration, ParseError> {
        self.cursor.skip_ws();
        let body = match kind {
            DeclarationKind::Type => self.parse_type_alias_body()?,
            DeclarationKind::Member => {
                DeclarationBody::Member(self.parse_type_with_init(Named::Full, Outer::Member)?)
            }
            DeclarationKind::Function => {
                DeclarationBody::Function(self.parse_type(Named::Full, Outer::Function)?)
            }
            DeclarationKind::Macro => DeclarationBody::Macro(self.parse_macro()?),
            DeclarationKind::Struct => DeclarationBody::Tag {
                tag: crate::ast::Tag::Struct,
                name: self.parse_nested_name()?,
            },
            DeclarationKind::Union => DeclarationBody::Tag {
                tag: crate::ast::Tag::Union,
                name: self.parse_nested_name()?,
            },
            DeclarationKind::Enum => DeclarationBody::Tag {
                tag: crate::ast::Tag::Enum,
                name: self.parse_nested_name()?,
            },
            DeclarationKind::Enumerator => self.parse_enumerator_body()?,
        };
        self.cursor.skip_ws();
        let semicolon = self.cursor.skip_string(";");
        self.assert_end()?;
        Ok(Declaration {
            kind,
            body,
            semicolon,
        })
    }

    /// Type aliases come in two shapes: a bare name (`T`) or a full
    /// typedef-like declaration (`typedef unsigned int T`).
    fn parse_type_alias_body(&mut self) -> Result<DeclarationBody, ParseError> {
        let bare = self.attempt(|p| {
            let name = p.parse_nested_name()?;
            if !p.at_end(true) {
                return p.fail("expected end of input after type alias name");
            }
            Ok(DeclarationBody::Type(Type {
                specs: DeclSpecs {
                    left: SimpleSpecs::default(),
                    type_spec: None,
                    right: SimpleSpecs::default(),
                },
                declarator: Declarator::Name {
                    name: Some(name),
                    arrays: Vec::new(),
                    params: None,
                },
            }))
        });
        match bare {
            Ok(body) => Ok(body),
            Err(bare_err) => {
                let typed = self.attempt(|p| p.parse_type(Named::Full, Outer::Type));
                match typed {
                    Ok(ty) => Ok(DeclarationBody::Type(ty)),
                    Err(typed_err) => Err(Self::prefer(bare_err, typed_err)),
                }
            }
        }
    }

    /// Standalone expression entry point, for cross-reference roles and
    /// tests.  The whole input must be consumed.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.cursor.skip_ws();
        let parsed = self.attempt(|p| {
            let expr = p.parse_full_expression()?;
            p.assert_end()?;
            Ok(expr)
        });
        match parsed {
            Ok(expr) => Ok(expr),
            Err(expr_err) => {
                let ty = self.attempt(|p| {
                    let ty = p.parse_type(Named::No, Outer::None)?;
                    p.assert_end()?;
                    Ok(ty)
                });
                match ty {
                    Ok(ty) => Ok(Expr::TypeRef(Box::new(ty))),
                    Err(ty_err) => {
                        let err = Self::prefer(expr_err, ty_err);
                        if self.config.allow_fallback_expressions {
                            self.parse_expression_fallback(&[], err)
                        } else {
                            Err(err)
                        }
                    }
                }
            }
        }
    }

    /// Last-resort tolerant capture: everything balanced up to one of `end`
    /// becomes an opaque expression.  Only reachable when the configuration
    /// opts in.
    pub(crate) fn parse_expression_fallback(
        &mut self,
        end: &[char],
        cause: ParseError,
    ) -> Result<Expr, ParseError> {
        let text = self
            .parse_balanced_token_seq(end)
            .map_err(|e| Self::prefer(cause.clone(), e))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(cause);
        }
        log::warn!(
            "invalid expression, tolerantly keeping '{text}' verbatim: {cause}"
        );
        Ok(Expr::Fallback(text.to_string()))
    }
}
