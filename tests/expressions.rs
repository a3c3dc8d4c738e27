use pretty_assertions::assert_eq;

use cdomain::{DefinitionParser, ParserConfig};

/// Parses `input` as a standalone expression and checks that it renders back
/// as `output` in both canonical and display form.
fn expr_check_output(input: &str, output: &str) {
    let config = ParserConfig::new();
    let mut parser = DefinitionParser::new(input, &config);
    let expr = match parser.parse_expression() {
        Ok(expr) => expr,
        Err(err) => panic!("expression {input:?} failed to parse: {err}"),
    };
    assert_eq!(expr.to_text(), output, "canonical text of {input:?}");
    assert_eq!(expr.to_display(), output, "display text of {input:?}");
}

fn expr_check(input: &str) {
    expr_check_output(input, input);
}

fn expr_fail(input: &str) {
    let config = ParserConfig::new();
    let mut parser = DefinitionParser::new(input, &config);
    if let Ok(expr) = parser.parse_expression() {
        panic!("expression {input:?} unexpectedly parsed as {expr:?}");
    }
}

#[test]
fn test_boolean_literals() {
    expr_check("true");
    expr_check("false");
}

#[test]
fn test_integer_literals_with_suffix_combinations() {
    let ints = ["5", "0", "075", "0x0123456789ABCDEF", "0XF", "0b1", "0B1"];
    let unsigned_suffixes = ["", "u", "U"];
    let long_suffixes = ["", "l", "L", "ll", "LL"];
    for i in ints {
        for u in unsigned_suffixes {
            for l in long_suffixes {
                expr_check(&format!("{i}{u}{l}"));
                expr_check(&format!("{i}{l}{u}"));
            }
        }
    }
}

#[test]
fn test_float_literals_with_suffixes() {
    let decimals = [
        "5e42", "5e+42", "5e-42", "5.", "5.e42", "5.e+42", "5.e-42", ".5", ".5e42", ".5e+42",
        ".5e-42", "5.0", "5.0e42", "5.0e+42", "5.0e-42",
    ];
    let hexes = [
        "ApF", "Ap+F", "Ap-F", "A.", "A.pF", "A.p+F", "A.p-F", ".A", ".ApF", ".Ap+F", ".Ap-F",
        "A.B", "A.BpF", "A.Bp+F", "A.Bp-F",
    ];
    for suffix in ["", "f", "F", "l", "L"] {
        for e in decimals {
            expr_check(&format!("{e}{suffix}"));
        }
        for e in hexes {
            expr_check(&format!("0x{e}{suffix}"));
        }
    }
}

#[test]
fn test_string_and_character_literals() {
    expr_check(r#""abc\"cba""#);
    for prefix in ["", "u8", "u", "U", "L"] {
        expr_check(&format!("{prefix}'a'"));
        expr_check(&format!("{prefix}'\\n'"));
        expr_check(&format!("{prefix}'\\012'"));
        expr_check(&format!("{prefix}'\\0'"));
        expr_check(&format!("{prefix}'\\x0a'"));
        expr_check(&format!("{prefix}'\\x0A'"));
        expr_check(&format!("{prefix}'\\u0a42'"));
        expr_check(&format!("{prefix}'\\u0A42'"));
        expr_check(&format!("{prefix}'\\U0001f34c'"));
        expr_check(&format!("{prefix}'\\U0001F34C'"));
    }
    expr_fail("'\\912'");
    expr_fail("'\\xfff'");
}

#[test]
fn test_primary_and_postfix_expressions() {
    expr_check("(5)");
    expr_check("C");
    expr_check("A(2)");
    expr_check("A[2]");
    expr_check("a.b.c");
    expr_check("a->b->c");
    expr_check("i++");
    expr_check("i--");
}

#[test]
fn test_unary_expressions() {
    expr_check("++5");
    expr_check("--5");
    expr_check("*5");
    expr_check("&5");
    expr_check("+5");
    expr_check("-5");
    expr_check("!5");
    expr_check("not 5");
    expr_check("~5");
    expr_check("compl 5");
    expr_check("sizeof(T)");
    expr_check("sizeof -42");
    expr_check("alignof(T)");
    expr_check("_Alignof(T)");
}

#[test]
fn test_cast_expressions() {
    expr_check("(int)2");
    expr_check("(unsigned long long)a");
    expr_check("(struct foo)x");
}

#[test]
fn test_binary_operators_and_keyword_spellings() {
    expr_check("5 || 42");
    expr_check("5 or 42");
    expr_check("5 && 42");
    expr_check("5 and 42");
    expr_check("5 | 42");
    expr_check("5 bitor 42");
    expr_check("5 ^ 42");
    expr_check("5 xor 42");
    expr_check("5 & 42");
    expr_check("5 bitand 42");
    expr_check("5 == 42");
    expr_check("5 != 42");
    expr_check("5 not_eq 42");
    expr_check("5 <= 42");
    expr_check("5 >= 42");
    expr_check("5 < 42");
    expr_check("5 > 42");
    expr_check("5 << 42");
    expr_check("5 >> 42");
    expr_check("5 + 42");
    expr_check("5 - 42");
    expr_check("5 * 42");
    expr_check("5 / 42");
    expr_check("5 % 42");
}

#[test]
fn test_conditional_expressions() {
    expr_check("a ? b : c");
    expr_check("a > b ? a : b");
    expr_check("a ? b : c ? d : e");
}

#[test]
fn test_assignment_expressions() {
    expr_check("a = 5");
    expr_check("a *= 5");
    expr_check("a /= 5");
    expr_check("a %= 5");
    expr_check("a += 5");
    expr_check("a -= 5");
    expr_check("a >>= 5");
    expr_check("a <<= 5");
    expr_check("a &= 5");
    expr_check("a and_eq 5");
    expr_check("a ^= 5");
    expr_check("a xor_eq 5");
    expr_check("a |= 5");
    expr_check("a or_eq 5");
    expr_check("a = b = c");
}

#[test]
fn test_bare_type_in_expression_position() {
    expr_check("int");
    expr_check("unsigned int");
    expr_check("struct foo");
}

#[test]
fn test_whitespace_is_normalized() {
    expr_check_output("5+6", "5 + 6");
    expr_check_output("5   +   6", "5 + 6");
    expr_check_output("!  x", "!x");
}

#[test]
fn test_rejected_expressions() {
    expr_fail("5 +");
    expr_fail("(5");
    expr_fail("a->");
    expr_fail("struct");
}
