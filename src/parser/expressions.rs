//! Expression grammar: C operator precedence from assignment down to primary
//! expressions, plus the literal lexers.
//!
//! Alternative spellings (`and`, `bitor`, `not_eq`, ...) are accepted at the
//! same precedence as their symbol forms and preserved verbatim.  Literals
//! are matched with anchored regexes and kept as source text, suffixes and
//! all.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Expr;

use super::{DefinitionParser, Named, Outer, ParseError};

/// Binary operators by precedence level, loosest first.  Single-character
/// entries that prefix a longer operator (`&` in `&&`, `<` in `<<`) are
/// guarded against splitting the longer one.
const BIN_OPS: &[&[&str]] = &[
    &["||", "or"],
    &["&&", "and"],
    &["|", "bitor"],
    &["^", "xor"],
    &["&", "bitand"],
    &["==", "!=", "not_eq"],
    &["<=", ">=", "<", ">"],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Assignment operators, longest spellings first so `>>=` is never read as
/// `>>` plus `=`.
const ASSIGN_OPS: &[&str] = &[
    "*=", "/=", "%=", "+=", "-=", ">>=", "<<=", "&=", "and_eq", "^=", "xor_eq", "|=", "or_eq",
    "=",
];

const UNARY_OPS: &[&str] = &["++", "--", "*", "&", "+", "-", "!", "not", "~", "compl"];

fn op_is_keyword(op: &str) -> bool {
    op.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)^(?:
          [0-9]+[eE][-+]?[0-9]+
        | [0-9]*\.[0-9]+(?:[eE][-+]?[0-9]+)?
        | [0-9]+\.(?:[eE][-+]?[0-9]+)?
        | 0[xX][0-9a-fA-F]+[pP][-+]?[0-9a-fA-F]+
        | 0[xX][0-9a-fA-F]*\.[0-9a-fA-F]+(?:[pP][-+]?[0-9a-fA-F]+)?
        | 0[xX][0-9a-fA-F]+\.(?:[pP][-+]?[0-9a-fA-F]+)?
        )",
    )
    .unwrap()
});
static FLOAT_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[fFlL]\b").unwrap());
static BINARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[bB][01]+").unwrap());
static HEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[xX][0-9a-fA-F]+").unwrap());
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]*").unwrap());
static OCTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[0-7]*").unwrap());
static INT_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[uU](?:ll|LL|l|L)?|(?:ll|LL|l|L)[uU]?)\b").unwrap()
});
static STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"(?:[^"\\]|\\.)*""#).unwrap());
static CHAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)^(?:u8|u|U|L)?'(?:
          [^\\']
        | \\(?:['"?\\abfnrtv]|[0-7]{1,3}|x[0-9a-fA-F]{1,2}|u[0-9a-fA-F]{4}|U[0-9a-fA-F]{8})
        )'"#,
    )
    .unwrap()
});

impl<'a> DefinitionParser<'a> {
    /// The top of the expression grammar (there is no comma operator).
    pub(crate) fn parse_full_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment_expression()
    }

    /// Constant expressions (array sizes, bit-field widths, enumerator
    /// values) exclude assignment.
    pub(crate) fn parse_constant_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional_expression()
    }

    /// Parse an expression that must stop at one of `end` (or at end of
    /// input when `end` is empty).  When strict parsing fails or stops
    /// early and the configuration opts in, the balanced raw text up to
    /// `end` is kept as an opaque expression instead.
    pub(crate) fn parse_expr_with_fallback(
        &mut self,
        end: &[char],
        f: impl FnOnce(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let start = self.cursor.pos();
        match self.attempt(f) {
            Ok(expr) => {
                let stopped_ok = if end.is_empty() {
                    // nothing but an optional declaration-ending `;` may follow
                    self.at_end(true)
                } else {
                    let mut probe = self.cursor.clone();
                    probe.skip_ws();
                    probe.current_char().is_some_and(|c| end.contains(&c))
                };
                if stopped_ok {
                    return Ok(expr);
                }
                let err = ParseError {
                    offset: self.cursor.pos(),
                    message: "expected end of expression".to_string(),
                };
                if !self.config.allow_fallback_expressions {
                    return Err(err);
                }
                self.cursor.set_pos(start);
                self.parse_expression_fallback(end, err)
            }
            Err(err) => {
                if !self.config.allow_fallback_expressions {
                    return Err(err);
                }
                self.parse_expression_fallback(end, err)
            }
        }
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_conditional_expression()?;
        self.cursor.skip_ws();
        if let Some(op) = self.match_op(ASSIGN_OPS) {
            self.cursor.skip_ws();
            let rhs = self.parse_assignment_expression()?;
            return Ok(Expr::Assignment {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn parse_conditional_expression(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary_expression(0)?;
        self.cursor.skip_ws();
        if !self.cursor.skip_string_and_ws("?") {
            return Ok(cond);
        }
        let then = self.parse_full_expression()?;
        self.cursor.skip_ws();
        if !self.cursor.skip_string_and_ws(":") {
            return self.fail("expected ':' in conditional expression");
        }
        let otherwise = self.parse_conditional_expression()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_binary_expression(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == BIN_OPS.len() {
            return self.parse_cast_expression();
        }
        let mut lhs = self.parse_binary_expression(level + 1)?;
        loop {
            self.cursor.skip_ws();
            let before_op = self.cursor.pos();
            let Some(op) = self.match_op(BIN_OPS[level]) else {
                break;
            };
            // An operator that turns out to start an assignment spelling
            // (e.g. `>>` in `>>=`) leaves no operand here; undo and let an
            // outer level pick it up.
            match self.attempt(|p| {
                p.cursor.skip_ws();
                p.parse_binary_expression(level + 1)
            }) {
                Ok(rhs) => {
                    lhs = Expr::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                }
                Err(_) => {
                    self.cursor.set_pos(before_op);
                    break;
                }
            }
        }
        Ok(lhs)
    }

    fn match_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        for &op in ops {
            if op_is_keyword(op) {
                if self.cursor.skip_word(op) {
                    return Some(op);
                }
                continue;
            }
            if op.len() == 1 && matches!(op, "&" | "|" | "<" | ">") {
                let bytes = self.cursor.rest().as_bytes();
                let b = op.as_bytes()[0];
                if bytes.first() == Some(&b) && bytes.get(1) == Some(&b) {
                    continue;
                }
            }
            if self.cursor.skip_string(op) {
                return Some(op);
            }
        }
        None
    }

    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.cursor.skip_ws();
        let start = self.cursor.pos();
        if !self.cursor.skip_string("(") {
            return self.parse_unary_expression();
        }
        let cast = self.attempt(|p| {
            p.cursor.skip_ws();
            let ty = p.parse_type(Named::No, Outer::None)?;
            p.cursor.skip_ws();
            if !p.cursor.skip_string(")") {
                return p.fail("expected ')' ending cast type");
            }
            let operand = p.parse_cast_expression()?;
            Ok(Expr::Cast {
                ty: Box::new(ty),
                operand: Box::new(operand),
            })
        });
        match cast {
            Ok(expr) => Ok(expr),
            Err(cast_err) => {
                self.cursor.set_pos(start);
                self.parse_unary_expression()
                    .map_err(|e| Self::prefer(cast_err, e))
            }
        }
    }

    fn parse_unary_expression(&mut self) -> Result<Expr, ParseError> {
        self.cursor.skip_ws();
        for &op in UNARY_OPS {
            let matched = if op_is_keyword(op) {
                self.cursor.skip_word(op)
            } else {
                self.cursor.skip_string(op)
            };
            if matched {
                let operand = self.parse_cast_expression()?;
                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                });
            }
        }
        if self.cursor.skip_word_and_ws("sizeof") {
            let before_paren = self.cursor.pos();
            if self.cursor.skip_string("(") {
                let ty = self.attempt(|p| {
                    p.cursor.skip_ws();
                    let ty = p.parse_type(Named::No, Outer::None)?;
                    p.cursor.skip_ws();
                    if !p.cursor.skip_string(")") {
                        return p.fail("expected ')' ending 'sizeof' type");
                    }
                    Ok(ty)
                });
                match ty {
                    Ok(ty) => return Ok(Expr::SizeofType(Box::new(ty))),
                    // `sizeof (expr)` with parens: reparse as unary
                    Err(_) => self.cursor.set_pos(before_paren),
                }
            }
            let operand = self.parse_unary_expression()?;
            return Ok(Expr::SizeofExpr(Box::new(operand)));
        }
        for spelling in ["alignof", "_Alignof"] {
            if self.cursor.skip_word_and_ws(spelling) {
                if !self.cursor.skip_string_and_ws("(") {
                    return self.fail(format!("expected '(' after '{spelling}'"));
                }
                let ty = self.parse_type(Named::No, Outer::None)?;
                self.cursor.skip_ws();
                if !self.cursor.skip_string(")") {
                    return self.fail(format!("expected ')' ending '{spelling}' type"));
                }
                return Ok(Expr::AlignofType {
                    spelling: if spelling == "alignof" {
                        "alignof"
                    } else {
                        "_Alignof"
                    },
                    ty: Box::new(ty),
                });
            }
        }
        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expression()?;
        loop {
            self.cursor.skip_ws();
            if self.cursor.skip_string_and_ws("[") {
                let index = self.parse_full_expression()?;
                self.cursor.skip_ws();
                if !self.cursor.skip_string("]") {
                    return self.fail("expected ']' ending subscript");
                }
                expr = Expr::Subscript {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
                continue;
            }
            if self.cursor.skip_string_and_ws("(") {
                let mut args = Vec::new();
                if !self.cursor.skip_string(")") {
                    loop {
                        self.cursor.skip_ws();
                        args.push(self.parse_assignment_expression()?);
                        self.cursor.skip_ws();
                        if self.cursor.skip_string(",") {
                            continue;
                        }
                        if self.cursor.skip_string(")") {
                            break;
                        }
                        return self.fail("expected ',' or ')' in call arguments");
                    }
                }
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
                continue;
            }
            if self.cursor.skip_string("->") {
                self.cursor.skip_ws();
                let member = self.parse_identifier()?;
                expr = Expr::Member {
                    base: Box::new(expr),
                    arrow: true,
                    member,
                };
                continue;
            }
            if self.cursor.skip_string("++") {
                expr = Expr::PostfixUnary {
                    op: "++",
                    operand: Box::new(expr),
                };
                continue;
            }
            if self.cursor.skip_string("--") {
                expr = Expr::PostfixUnary {
                    op: "--",
                    operand: Box::new(expr),
                };
                continue;
            }
            if self.cursor.skip_string(".") {
                self.cursor.skip_ws();
                let member = self.parse_identifier()?;
                expr = Expr::Member {
                    base: Box::new(expr),
                    arrow: false,
                    member,
                };
                continue;
            }
            break;
        }
        Ok(expr)
    }

    /// A parenthesized, comma-separated expression list (GNU attribute
    /// arguments).  Absent when no `(` follows.
    pub(crate) fn parse_paren_expression_list(
        &mut self,
    ) -> Result<Option<Vec<Expr>>, ParseError> {
        if !self.cursor.skip_string("(") {
            return Ok(None);
        }
        let mut exprs = Vec::new();
        self.cursor.skip_ws();
        if self.cursor.skip_string(")") {
            return Ok(Some(exprs));
        }
        loop {
            self.cursor.skip_ws();
            exprs.push(self.parse_assignment_expression()?);
            self.cursor.skip_ws();
            if self.cursor.skip_string(")") {
                break;
            }
            if !self.cursor.skip_string(",") {
                return self.fail("expected ',' or ')' in attribute argument list");
            }
        }
        Ok(Some(exprs))
    }

    fn parse_primary_expression(&mut self) -> Result<Expr, ParseError> {
        self.cursor.skip_ws();
        if let Some(literal) = self.parse_literal() {
            return Ok(literal);
        }
        if self.cursor.skip_string_and_ws("(") {
            let inner = self.parse_full_expression()?;
            self.cursor.skip_ws();
            if !self.cursor.skip_string(")") {
                return self.fail("expected ')' ending parenthesized expression");
            }
            return Ok(Expr::Paren(Box::new(inner)));
        }
        let ident = self.parse_identifier()?;
        Ok(Expr::Ident(ident))
    }

    fn parse_literal(&mut self) -> Option<Expr> {
        if self.cursor.skip_word("true") {
            return Some(Expr::Boolean(true));
        }
        if self.cursor.skip_word("false") {
            return Some(Expr::Boolean(false));
        }
        let start = self.cursor.pos();
        if self.cursor.match_regex(&FLOAT_RE).is_some() {
            self.cursor.match_regex(&FLOAT_SUFFIX_RE);
            return Some(Expr::Number(self.cursor.slice(start).to_string()));
        }
        for re in [&*BINARY_RE, &*HEX_RE, &*INTEGER_RE, &*OCTAL_RE] {
            if self.cursor.match_regex(re).is_some() {
                self.cursor.match_regex(&INT_SUFFIX_RE);
                return Some(Expr::Number(self.cursor.slice(start).to_string()));
            }
        }
        if let Some(s) = self.cursor.match_regex(&STRING_RE) {
            return Some(Expr::Str(s.to_string()));
        }
        if let Some(c) = self.cursor.match_regex(&CHAR_RE) {
            return Some(Expr::Char(c.to_string()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn parse(text: &str) -> Expr {
        let config = ParserConfig::new();
        let mut parser = DefinitionParser::new(text, &config);
        match parser.parse_expression() {
            Ok(expr) => expr,
            Err(err) => panic!("{text:?} failed to parse: {err}"),
        }
    }

    #[test]
    fn test_shift_assign_is_not_split() {
        assert_eq!(parse("a >>= 5").to_text(), "a >>= 5");
        assert_eq!(parse("a >> 5").to_text(), "a >> 5");
    }

    #[test]
    fn test_keyword_operator_spellings_survive() {
        assert_eq!(parse("a and b").to_text(), "a and b");
        assert_eq!(parse("not a").to_text(), "not a");
        assert_eq!(parse("a not_eq b").to_text(), "a not_eq b");
    }

    #[test]
    fn test_hex_float_is_one_literal() {
        assert_eq!(parse("0x1.8p2f").to_text(), "0x1.8p2f");
    }

    #[test]
    fn test_sizeof_paren_expression_falls_back_to_unary() {
        assert_eq!(parse("sizeof(a + b)").to_text(), "sizeof (a + b)");
        assert_eq!(parse("sizeof(int)").to_text(), "sizeof(int)");
    }
}
