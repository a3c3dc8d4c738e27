//! Declaration grammar: decl-specs, declarators, parameters, and the
//! per-kind bodies (members, functions, macros, enumerators).
//!
//! The declarator grammar is where most backtracking happens: a `(` can open
//! either a parameter list or a parenthesized declarator, and only a failed
//! tentative parse of the first tells us to try the second.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{
    ArraySuffix, DeclSpecs, DeclarationBody, Declarator, Identifier, Initializer,
    MacroDef, MacroParameter, NestedName, Parameter, Parameters, SimpleSpecs, Tag, Type,
    TypeSpecifier, TypeWithInit,
};

use super::{DefinitionParser, ParseError};

/// Which object kind the type being parsed belongs to.  Storage classes and
/// `inline` are only admitted where the kind allows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outer {
    /// Standalone types: casts, `sizeof`, function parameters.
    None,
    Type,
    Member,
    Function,
}

/// How much of a name a declarator may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Named {
    No,
    /// At most a single optional identifier (function parameters).
    Single,
    /// A required, possibly qualified name.
    Full,
}

/// Whether a parameter list is required or merely allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamMode {
    Type,
    Function,
}

/// Types matched as one word before the multi-word combinations.
const SIMPLE_FUNDAMENTAL_TYPES: &[&str] =
    &["void", "_Bool", "bool", "char", "int", "float", "double", "__int64"];

static ANON_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+").unwrap());

impl<'a> DefinitionParser<'a> {
    /// A possibly rooted, dot-separated name.  `@name` spells an anonymous
    /// component; a bare `@` gets an auto-numbered one.
    pub(crate) fn parse_nested_name(&mut self) -> Result<NestedName, ParseError> {
        self.cursor.skip_ws();
        let rooted = self.cursor.skip_string(".");
        let mut names = Vec::new();
        loop {
            self.cursor.skip_ws();
            if self.cursor.skip_string("@") {
                let name = match self.cursor.match_regex(&ANON_TAIL_RE) {
                    Some(tail) => format!("@{tail}"),
                    None => {
                        self.anon_count += 1;
                        format!("@{}", self.anon_count)
                    }
                };
                names.push(Identifier::new(name));
            } else {
                let ident = self.parse_identifier()?;
                names.push(Identifier::new(ident));
            }
            self.cursor.skip_ws();
            if !self.cursor.skip_string(".") {
                break;
            }
        }
        Ok(NestedName::new(rooted, names))
    }

    pub(crate) fn parse_type(&mut self, named: Named, outer: Outer) -> Result<Type, ParseError> {
        let (named, param_mode) = match outer {
            Outer::Function => (named, ParamMode::Function),
            Outer::Member => (Named::Full, ParamMode::Type),
            Outer::Type | Outer::None => (named, ParamMode::Type),
        };
        let specs = self.parse_decl_specs(outer)?;
        let declarator = self.parse_declarator(named, param_mode)?;
        Ok(Type { specs, declarator })
    }

    pub(crate) fn parse_type_with_init(
        &mut self,
        named: Named,
        outer: Outer,
    ) -> Result<TypeWithInit, ParseError> {
        let ty = self.parse_type(named, outer)?;
        let init = self.parse_initializer(outer)?;
        Ok(TypeWithInit { ty, init })
    }

    fn parse_decl_specs(&mut self, outer: Outer) -> Result<DeclSpecs, ParseError> {
        let left = self.parse_decl_specs_simple(outer)?;
        let type_spec = self.parse_trailing_type_spec()?;
        let right = self.parse_decl_specs_simple(outer)?;
        Ok(DeclSpecs {
            left,
            type_spec: Some(type_spec),
            right,
        })
    }

    fn parse_decl_specs_simple(&mut self, outer: Outer) -> Result<SimpleSpecs, ParseError> {
        let mut specs = SimpleSpecs::default();
        loop {
            self.cursor.skip_ws();
            if specs.storage.is_none() {
                if outer == Outer::Member {
                    if self.cursor.skip_word("auto") {
                        specs.storage = Some("auto");
                        continue;
                    }
                    if self.cursor.skip_word("register") {
                        specs.storage = Some("register");
                        continue;
                    }
                }
                if outer == Outer::Member || outer == Outer::Function {
                    if self.cursor.skip_word("static") {
                        specs.storage = Some("static");
                        continue;
                    }
                    if self.cursor.skip_word("extern") {
                        specs.storage = Some("extern");
                        continue;
                    }
                }
            }
            if outer == Outer::Member && specs.thread_local.is_none() {
                if self.cursor.skip_word("thread_local") {
                    specs.thread_local = Some("thread_local".to_string());
                    continue;
                }
                if self.cursor.skip_word("_Thread_local") {
                    specs.thread_local = Some("_Thread_local".to_string());
                    continue;
                }
            }
            if outer == Outer::Function && !specs.inline && self.cursor.skip_word("inline") {
                specs.inline = true;
                continue;
            }
            if !specs.restrict && self.cursor.skip_word("restrict") {
                specs.restrict = true;
                continue;
            }
            if !specs.volatile && self.cursor.skip_word("volatile") {
                specs.volatile = true;
                continue;
            }
            if !specs.const_ && self.cursor.skip_word("const") {
                specs.const_ = true;
                continue;
            }
            if let Some(attr) = self.parse_attribute()? {
                specs.attrs.push(attr);
                continue;
            }
            break;
        }
        Ok(specs)
    }

    fn parse_trailing_type_spec(&mut self) -> Result<TypeSpecifier, ParseError> {
        self.cursor.skip_ws();
        for &word in SIMPLE_FUNDAMENTAL_TYPES {
            if self.cursor.skip_word(word) {
                return Ok(TypeSpecifier::Fundamental(word.to_string()));
            }
        }
        let mut words: Vec<&str> = Vec::new();
        if self.cursor.skip_word_and_ws("signed") {
            words.push("signed");
        } else if self.cursor.skip_word_and_ws("unsigned") {
            words.push("unsigned");
        }
        loop {
            if self.cursor.skip_word_and_ws("short") {
                words.push("short");
            } else if self.cursor.skip_word_and_ws("long") {
                words.push("long");
            } else {
                break;
            }
        }
        if self.cursor.skip_word_and_ws("char") {
            words.push("char");
        } else if self.cursor.skip_word_and_ws("int") {
            words.push("int");
        } else if self.cursor.skip_word_and_ws("double") {
            words.push("double");
        } else if self.cursor.skip_word_and_ws("__int64") {
            words.push("__int64");
        }
        if !words.is_empty() {
            return Ok(TypeSpecifier::Fundamental(words.join(" ")));
        }
        let mut tag = None;
        for t in [Tag::Struct, Tag::Union, Tag::Enum] {
            if self.cursor.skip_word_and_ws(t.keyword()) {
                tag = Some(t);
                break;
            }
        }
        let name = self.parse_nested_name()?;
        Ok(TypeSpecifier::Named { tag, name })
    }

    fn parse_declarator(
        &mut self,
        named: Named,
        param_mode: ParamMode,
    ) -> Result<Declarator, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.skip_string("*") {
            self.cursor.skip_ws();
            let mut restrict = false;
            let mut volatile = false;
            let mut const_ = false;
            let mut attrs = Vec::new();
            loop {
                self.cursor.skip_ws();
                if !restrict && self.cursor.skip_word_and_ws("restrict") {
                    restrict = true;
                    continue;
                }
                if !volatile && self.cursor.skip_word_and_ws("volatile") {
                    volatile = true;
                    continue;
                }
                if !const_ && self.cursor.skip_word_and_ws("const") {
                    const_ = true;
                    continue;
                }
                if let Some(attr) = self.parse_attribute()? {
                    attrs.push(attr);
                    continue;
                }
                break;
            }
            let inner = self.parse_declarator(named, param_mode)?;
            return Ok(Declarator::Ptr {
                restrict,
                volatile,
                const_,
                attrs,
                inner: Box::new(inner),
            });
        }
        if self.cursor.current_char() == Some('(') {
            // either a parameter list on an abstract declarator, or a
            // parenthesized declarator; try the first, backtrack to the second
            let name_suffix =
                self.attempt(|p| p.parse_declarator_name_suffix(named, param_mode));
            return match name_suffix {
                Ok(declarator) => Ok(declarator),
                Err(suffix_err) => {
                    let paren = self.attempt(|p| {
                        if !p.cursor.skip_string("(") {
                            return p.fail("expected '(' opening parenthesized declarator");
                        }
                        let inner = p.parse_declarator(named, param_mode)?;
                        p.cursor.skip_ws();
                        if !p.cursor.skip_string(")") {
                            return p.fail("expected ')' ending parenthesized declarator");
                        }
                        let suffix = p.parse_declarator(Named::No, ParamMode::Type)?;
                        Ok(Declarator::Paren {
                            inner: Box::new(inner),
                            suffix: Box::new(suffix),
                        })
                    });
                    paren.map_err(|paren_err| Self::prefer(suffix_err, paren_err))
                }
            };
        }
        self.parse_declarator_name_suffix(named, param_mode)
    }

    fn parse_declarator_name_suffix(
        &mut self,
        named: Named,
        param_mode: ParamMode,
    ) -> Result<Declarator, ParseError> {
        self.cursor.skip_ws();
        let name = match named {
            Named::No => None,
            Named::Single => self
                .attempt(|p| p.parse_identifier())
                .ok()
                .map(|ident| NestedName::new(false, vec![Identifier::new(ident)])),
            Named::Full => Some(self.parse_nested_name()?),
        };
        let mut arrays = Vec::new();
        loop {
            self.cursor.skip_ws();
            if !self.cursor.skip_string_and_ws("[") {
                break;
            }
            let mut suffix = ArraySuffix::default();
            loop {
                if !suffix.static_ && self.cursor.skip_word_and_ws("static") {
                    suffix.static_ = true;
                    continue;
                }
                if !suffix.restrict && self.cursor.skip_word_and_ws("restrict") {
                    suffix.restrict = true;
                    continue;
                }
                if !suffix.volatile && self.cursor.skip_word_and_ws("volatile") {
                    suffix.volatile = true;
                    continue;
                }
                if !suffix.const_ && self.cursor.skip_word_and_ws("const") {
                    suffix.const_ = true;
                    continue;
                }
                break;
            }
            if !suffix.static_ && self.cursor.skip_string_and_ws("*") {
                suffix.vla = true;
                if !self.cursor.skip_string("]") {
                    return self.fail("expected ']' ending array declarator");
                }
                arrays.push(suffix);
                continue;
            }
            if self.cursor.skip_string("]") {
                arrays.push(suffix);
                continue;
            }
            let size = self.parse_expr_with_fallback(&[']'], |p| p.parse_full_expression())?;
            suffix.size = Some(size);
            self.cursor.skip_ws();
            if !self.cursor.skip_string("]") {
                return self.fail("expected ']' ending array declarator");
            }
            arrays.push(suffix);
        }
        let params = self.parse_parameters(param_mode)?;
        if params.is_none() && arrays.is_empty() && param_mode == ParamMode::Type {
            if let Some(name) = &name {
                self.cursor.skip_ws();
                if self.cursor.skip_string(":") {
                    self.cursor.skip_ws();
                    let size = self.parse_constant_expression()?;
                    return Ok(Declarator::BitField {
                        name: name.clone(),
                        size,
                    });
                }
            }
        }
        Ok(Declarator::Name {
            name,
            arrays,
            params,
        })
    }

    fn parse_parameters(
        &mut self,
        param_mode: ParamMode,
    ) -> Result<Option<Parameters>, ParseError> {
        self.cursor.skip_ws();
        if !self.cursor.skip_string("(") {
            if param_mode == ParamMode::Function {
                return self.fail("expected '(' opening parameter list");
            }
            return Ok(None);
        }
        let mut params = Vec::new();
        self.cursor.skip_ws();
        if !self.cursor.skip_string(")") {
            loop {
                self.cursor.skip_ws();
                if self.cursor.skip_string("...") {
                    params.push(Parameter {
                        arg: None,
                        ellipsis: true,
                    });
                    self.cursor.skip_ws();
                    if !self.cursor.skip_string(")") {
                        return self.fail("expected ')' after '...' in parameter list");
                    }
                    break;
                }
                let arg = self.parse_type_with_init(Named::Single, Outer::None)?;
                params.push(Parameter {
                    arg: Some(arg),
                    ellipsis: false,
                });
                self.cursor.skip_ws();
                if self.cursor.skip_string(",") {
                    continue;
                }
                if self.cursor.skip_string(")") {
                    break;
                }
                return self.fail("expected ',' or ')' in parameter list");
            }
        }
        let mut attrs = Vec::new();
        while let Some(attr) = self.parse_attribute()? {
            attrs.push(attr);
        }
        Ok(Some(Parameters { params, attrs }))
    }

    fn parse_initializer(&mut self, outer: Outer) -> Result<Option<Initializer>, ParseError> {
        self.cursor.skip_ws();
        if !self.cursor.skip_string("=") {
            return Ok(None);
        }
        self.cursor.skip_ws();
        if let Some(value) = self.parse_braced_init_list()? {
            return Ok(Some(Initializer { value }));
        }
        let end: &[char] = match outer {
            Outer::Member => &[],
            Outer::None => &[',', ')'],
            Outer::Type | Outer::Function => {
                return self.fail("initializer not allowed here");
            }
        };
        let value = self.parse_expr_with_fallback(end, |p| p.parse_assignment_expression())?;
        Ok(Some(Initializer { value }))
    }

    fn parse_braced_init_list(&mut self) -> Result<Option<crate::ast::Expr>, ParseError> {
        use crate::ast::Expr;
        self.cursor.skip_ws();
        if !self.cursor.skip_string("{") {
            return Ok(None);
        }
        let mut exprs = Vec::new();
        let mut trailing_comma = false;
        self.cursor.skip_ws();
        if self.cursor.skip_string("}") {
            return Ok(Some(Expr::BracedInit {
                exprs,
                trailing_comma,
            }));
        }
        loop {
            self.cursor.skip_ws();
            let clause = match self.parse_braced_init_list()? {
                Some(nested) => nested,
                None => self.parse_assignment_expression()?,
            };
            exprs.push(clause);
            self.cursor.skip_ws();
            if self.cursor.skip_string("}") {
                break;
            }
            if !self.cursor.skip_string(",") {
                return self.fail("expected ',' or '}' in braced initializer list");
            }
            self.cursor.skip_ws();
            if self.cursor.skip_string("}") {
                trailing_comma = true;
                break;
            }
        }
        Ok(Some(Expr::BracedInit {
            exprs,
            trailing_comma,
        }))
    }

    pub(crate) fn parse_macro(&mut self) -> Result<MacroDef, ParseError> {
        self.cursor.skip_ws();
        let name = self.parse_nested_name()?;
        if !self.cursor.skip_string_and_ws("(") {
            return Ok(MacroDef { name, params: None });
        }
        let mut params = Vec::new();
        if self.cursor.skip_string(")") {
            return Ok(MacroDef {
                name,
                params: Some(params),
            });
        }
        loop {
            self.cursor.skip_ws();
            if self.cursor.skip_string("...") {
                params.push(MacroParameter {
                    name: None,
                    ellipsis: true,
                    variadic: false,
                });
                self.cursor.skip_ws();
                if !self.cursor.skip_string(")") {
                    return self.fail("expected ')' after '...' in macro parameter list");
                }
                break;
            }
            let ident = self.parse_identifier()?;
            let param_name = NestedName::new(false, vec![Identifier::new(ident)]);
            let variadic = self.cursor.skip_string("...");
            params.push(MacroParameter {
                name: Some(param_name),
                ellipsis: false,
                variadic,
            });
            self.cursor.skip_ws();
            if variadic {
                if !self.cursor.skip_string(")") {
                    return self.fail("expected ')' after '...' in macro parameter list");
                }
                break;
            }
            if self.cursor.skip_string(",") {
                continue;
            }
            if !self.cursor.skip_string(")") {
                return self.fail("expected identifier, ')', or ',' in macro parameter list");
            }
            break;
        }
        Ok(MacroDef {
            name,
            params: Some(params),
        })
    }

    pub(crate) fn parse_enumerator_body(&mut self) -> Result<DeclarationBody, ParseError> {
        let name = self.parse_nested_name()?;
        self.cursor.skip_ws();
        let init = if self.cursor.skip_string("=") {
            self.cursor.skip_ws();
            let value = self.parse_expr_with_fallback(&[], |p| p.parse_constant_expression())?;
            Some(Initializer { value })
        } else {
            None
        };
        Ok(DeclarationBody::Enumerator { name, init })
    }
}
