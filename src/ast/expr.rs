//! Expression nodes.
//!
//! Expressions appear inside declarations (array sizes, bit-field widths,
//! enumerator values, initializers, attribute arguments) and are never
//! evaluated: literals keep their exact source spelling, including suffixes
//! and escapes.  Operator spellings are preserved too, so `and` does not
//! normalize to `&&`.

use super::decl::Type;
use super::Render;

/// One variant per expression production, literals down to assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Boolean(bool),
    /// Integer or floating literal, suffix included, exactly as written.
    Number(String),
    /// Character literal with optional encoding prefix, quotes included.
    Char(String),
    /// String literal, quotes included.
    Str(String),
    Ident(String),
    Paren(Box<Expr>),
    Unary {
        op: &'static str,
        operand: Box<Expr>,
    },
    /// Postfix `++` / `--`.
    PostfixUnary {
        op: &'static str,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        /// `->` when true, `.` otherwise.
        arrow: bool,
        member: String,
    },
    Cast {
        ty: Box<Type>,
        operand: Box<Expr>,
    },
    SizeofType(Box<Type>),
    SizeofExpr(Box<Expr>),
    /// `alignof(T)` or `_Alignof(T)`, spelling preserved.
    AlignofType {
        spelling: &'static str,
        ty: Box<Type>,
    },
    Binary {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Assignment {
        op: &'static str,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `{a, b}` initializer list; `trailing_comma` keeps a spelled `{a, b,}`.
    BracedInit {
        exprs: Vec<Expr>,
        trailing_comma: bool,
    },
    /// A type in expression position, e.g. `int` in a default argument or a
    /// bare type used where the grammar prefers an expression.
    TypeRef(Box<Type>),
    /// Tolerantly captured text for input the strict grammar rejects.
    Fallback(String),
}

fn op_is_keyword(op: &str) -> bool {
    op.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

impl Expr {
    pub(crate) fn write(&self, out: &mut String, mode: Render) {
        match self {
            Expr::Boolean(true) => out.push_str("true"),
            Expr::Boolean(false) => out.push_str("false"),
            Expr::Number(text) | Expr::Char(text) | Expr::Str(text) | Expr::Ident(text) => {
                out.push_str(text)
            }
            Expr::Paren(inner) => {
                out.push('(');
                inner.write(out, mode);
                out.push(')');
            }
            Expr::Unary { op, operand } => {
                out.push_str(op);
                if op_is_keyword(op) {
                    out.push(' ');
                }
                operand.write(out, mode);
            }
            Expr::PostfixUnary { op, operand } => {
                operand.write(out, mode);
                out.push_str(op);
            }
            Expr::Call { callee, args } => {
                callee.write(out, mode);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.write(out, mode);
                }
                out.push(')');
            }
            Expr::Subscript { base, index } => {
                base.write(out, mode);
                out.push('[');
                index.write(out, mode);
                out.push(']');
            }
            Expr::Member { base, arrow, member } => {
                base.write(out, mode);
                out.push_str(if *arrow { "->" } else { "." });
                out.push_str(member);
            }
            Expr::Cast { ty, operand } => {
                out.push('(');
                ty.write(out, mode);
                out.push(')');
                operand.write(out, mode);
            }
            Expr::SizeofType(ty) => {
                out.push_str("sizeof(");
                ty.write(out, mode);
                out.push(')');
            }
            Expr::SizeofExpr(inner) => {
                out.push_str("sizeof ");
                inner.write(out, mode);
            }
            Expr::AlignofType { spelling, ty } => {
                out.push_str(spelling);
                out.push('(');
                ty.write(out, mode);
                out.push(')');
            }
            Expr::Binary { op, lhs, rhs } => {
                lhs.write(out, mode);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                rhs.write(out, mode);
            }
            Expr::Conditional { cond, then, otherwise } => {
                cond.write(out, mode);
                out.push_str(" ? ");
                then.write(out, mode);
                out.push_str(" : ");
                otherwise.write(out, mode);
            }
            Expr::Assignment { op, lhs, rhs } => {
                lhs.write(out, mode);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                rhs.write(out, mode);
            }
            Expr::BracedInit { exprs, trailing_comma } => {
                out.push('{');
                for (i, e) in exprs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    e.write(out, mode);
                }
                if *trailing_comma {
                    out.push(',');
                }
                out.push('}');
            }
            Expr::TypeRef(ty) => ty.write(out, mode),
            Expr::Fallback(text) => out.push_str(text),
        }
    }

    /// Canonical source text of this expression.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, Render::Canonical);
        out
    }

    /// Human-facing text; identical to the canonical form except for
    /// anonymous names in embedded types.
    pub fn to_display(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, Render::Display);
        out
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_unary_op_gets_a_space() {
        let e = Expr::Unary {
            op: "not",
            operand: Box::new(Expr::Ident("a".into())),
        };
        assert_eq!(e.to_text(), "not a");
        let e = Expr::Unary {
            op: "!",
            operand: Box::new(Expr::Ident("a".into())),
        };
        assert_eq!(e.to_text(), "!a");
    }

    #[test]
    fn test_braced_init_trailing_comma() {
        let e = Expr::BracedInit {
            exprs: vec![Expr::Number("1".into()), Expr::Number("2".into())],
            trailing_comma: true,
        };
        assert_eq!(e.to_text(), "{1, 2,}");
    }
}
