use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::multispace0,
    combinator::{map, opt},
    error::ErrorKind,
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::rc::Rc;
use tutor_ast::{Constant, Equation, Expr};

use crate::error::ParseError;

/// Trigonometric function names, including the inverse spellings.
pub const TRIG_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "asin", "acos", "atan", "arcsin", "arccos", "arctan",
];

/// Every function name the evaluator understands.
pub const KNOWN_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "sec", "csc", "cot", "asin", "acos", "atan", "arcsin", "arccos", "arctan",
    "sqrt", "ln", "log", "exp", "abs",
];

pub fn is_known_function(name: &str) -> bool {
    KNOWN_FUNCTIONS.contains(&name)
}

// Intermediate AST for parsing
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
    Function(String, Vec<ParseNode>),
}

impl ParseNode {
    fn lower(self) -> Rc<Expr> {
        match self {
            ParseNode::Number(n) => Expr::rational(n),
            ParseNode::Constant(c) => Rc::new(Expr::Constant(c)),
            ParseNode::Variable(s) => Rc::new(Expr::Variable(s)),
            ParseNode::Add(l, r) => Expr::add(l.lower(), r.lower()),
            ParseNode::Sub(l, r) => Expr::sub(l.lower(), r.lower()),
            ParseNode::Mul(l, r) => Expr::mul(l.lower(), r.lower()),
            ParseNode::Div(l, r) => Expr::div(l.lower(), r.lower()),
            ParseNode::Pow(b, e) => Expr::pow(b.lower(), e.lower()),
            ParseNode::Neg(e) => Expr::neg(e.lower()),
            ParseNode::Function(name, args) => {
                Rc::new(Expr::Function(name, args.into_iter().map(ParseNode::lower).collect()))
            }
        }
    }
}

fn fail<T>(input: &str, kind: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "8." → 8, "123" → 123
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let int_val: BigInt = if integer_part.is_empty() {
        BigInt::from(0)
    } else {
        integer_part.parse().unwrap_or_else(|_| BigInt::from(0))
    };

    if fractional_part.is_empty() {
        return BigRational::from_integer(int_val);
    }

    let denominator = num_traits::pow(BigInt::from(10), fractional_part.len());
    let frac_val: BigInt = fractional_part.parse().unwrap_or_else(|_| BigInt::from(0));

    // BigRational::new reduces the fraction
    BigRational::new(int_val * &denominator + frac_val, denominator)
}

// Numeric literals: 123, 8.2, .5, 8.
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    let (remaining, (int_part, maybe_frac)) = pair(
        take_while(|c: char| c.is_ascii_digit()),
        opt(pair(tag("."), take_while(|c: char| c.is_ascii_digit()))),
    )(input)?;

    let frac_part = maybe_frac.map(|(_, frac)| frac).unwrap_or("");

    // A lone "." is not a number
    if int_part.is_empty() && frac_part.is_empty() {
        return fail(input, ErrorKind::Digit);
    }

    Ok((remaining, ParseNode::Number(decimal_to_rational(int_part, frac_part))))
}

// 'e' and 'pi' must not match prefixes of longer identifiers (e.g. 'exact', 'pivot')
fn parse_constant(input: &str) -> IResult<&str, ParseNode> {
    fn is_word_boundary(remaining: &str) -> bool {
        remaining
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_')
    }

    if let Some(rest) = input.strip_prefix("pi") {
        if is_word_boundary(rest) {
            return Ok((rest, ParseNode::Constant(Constant::Pi)));
        }
    }

    if let Some(rest) = input.strip_prefix('e') {
        if is_word_boundary(rest) {
            return Ok((rest, ParseNode::Constant(Constant::E)));
        }
    }

    fail(input, ErrorKind::Tag)
}

// Identifiers start with a letter or underscore, then letters, digits, underscores.
// Examples: x, x1, theta, x_1
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    match input.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return fail(input, ErrorKind::Alpha),
    }

    let len = input
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(input.len(), |(i, _)| i);

    Ok((&input[len..], &input[..len]))
}

fn parse_variable(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Variable(s.to_string()))(input)
}

fn parse_parens(input: &str) -> IResult<&str, ParseNode> {
    delimited(
        preceded(multispace0, tag("(")),
        parse_expr,
        preceded(multispace0, tag(")")),
    )(input)
}

fn parse_call_args(input: &str) -> IResult<&str, Vec<ParseNode>> {
    let (input, _) = preceded(multispace0, tag("("))(input)?;
    let (input, args) = separated_list0(preceded(multispace0, tag(",")), parse_expr)(input)?;
    let (input, _) = preceded(multispace0, tag(")"))(input)?;
    Ok((input, args))
}

fn build_call(name: &str, mut args: Vec<ParseNode>) -> ParseNode {
    if name == "exp" && args.len() == 1 {
        // exp(x) -> e^x
        let arg = args.remove(0);
        return ParseNode::Pow(Box::new(ParseNode::Constant(Constant::E)), Box::new(arg));
    }
    let canonical = match name {
        "arcsin" => "asin",
        "arccos" => "acos",
        "arctan" => "atan",
        other => other,
    };
    ParseNode::Function(canonical.to_string(), args)
}

// Function calls: sin(x), sqrt(16), log(2, 8)
fn parse_function(input: &str) -> IResult<&str, ParseNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, args) = parse_call_args(input)?;
    Ok((input, build_call(name, args)))
}

// Power written on the function name: sin^2(x) → (sin(x))^2
fn parse_function_power(input: &str) -> IResult<&str, ParseNode> {
    let (rest, name) = parse_identifier(input)?;
    if !is_known_function(name) {
        return fail(input, ErrorKind::Tag);
    }
    let (rest, _) = preceded(multispace0, tag("^"))(rest)?;
    let (rest, exponent) = preceded(multispace0, parse_number)(rest)?;
    let (rest, args) = parse_call_args(rest)?;
    Ok((
        rest,
        ParseNode::Pow(Box::new(build_call(name, args)), Box::new(exponent)),
    ))
}

fn parse_abs(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(
            preceded(multispace0, tag("|")),
            parse_expr,
            preceded(multispace0, tag("|")),
        ),
        |expr| ParseNode::Function("abs".to_string(), vec![expr]),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            parse_number,
            parse_function_power,
            parse_function,
            parse_constant,
            parse_variable,
            parse_parens,
            parse_abs,
        )),
    )(input)
}

// Postfix factorial binds tighter than power: x^y! -> x^(y!)
fn parse_factorial(input: &str) -> IResult<&str, ParseNode> {
    let (input, atom) = parse_atom(input)?;
    fold_many0(
        preceded(multispace0, tag("!")),
        move || atom.clone(),
        |acc, _| ParseNode::Function("fact".to_string(), vec![acc]),
    )(input)
}

// Power - right associative: 2^3^4 = 2^(3^4)
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (input, base) = parse_factorial(input)?;

    let try_caret = preceded::<_, _, _, nom::error::Error<&str>, _, _>(
        multispace0::<_, nom::error::Error<&str>>,
        tag::<_, _, nom::error::Error<&str>>("^"),
    )(input);

    if let Ok((input, _)) = try_caret {
        let (input, exp) = parse_power_exponent(input)?;
        Ok((input, ParseNode::Pow(Box::new(base), Box::new(exp))))
    } else {
        Ok((input, base))
    }
}

// Exponents may carry a sign: x^-2, x^-(a+b)
fn parse_power_exponent(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            map(pair(tag("-"), parse_power_exponent), |(_, expr)| {
                ParseNode::Neg(Box::new(expr))
            }),
            map(pair(tag("+"), parse_power_exponent), |(_, expr)| expr),
            parse_power,
        )),
    )(input)
}

fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(
            pair(preceded(multispace0, tag("-")), parse_unary),
            |(_, expr)| ParseNode::Neg(Box::new(expr)),
        ),
        map(pair(preceded(multispace0, tag("+")), parse_unary), |(_, expr)| expr),
        parse_power,
    ))(input)
}

// Term - explicit * and / plus implicit multiplication (2x, 3(x+1), 2sin(x))
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_unary(input)?;

    let (input, result) = fold_many0(
        pair(preceded(multispace0, alt((tag("*"), tag("/")))), parse_unary),
        move || init.clone(),
        |acc, (op, val)| match op {
            "/" => ParseNode::Div(Box::new(acc), Box::new(val)),
            _ => ParseNode::Mul(Box::new(acc), Box::new(val)),
        },
    )(input)?;

    parse_implicit_mul_chain(input, result)
}

// Implicit multiplication only applies with no whitespace before the next factor
fn parse_implicit_mul_chain(input: &str, acc: ParseNode) -> IResult<&str, ParseNode> {
    let starts_factor = matches!(
        input.chars().next(),
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '('
    );

    if starts_factor && can_implicit_mul(&acc) {
        if let Ok((remaining, next_factor)) = parse_power(input) {
            let new_acc = ParseNode::Mul(Box::new(acc), Box::new(next_factor));
            return parse_implicit_mul_chain(remaining, new_acc);
        }
    }
    Ok((input, acc))
}

// Whether a node can be followed by an implicit factor
fn can_implicit_mul(node: &ParseNode) -> bool {
    match node {
        ParseNode::Number(_) => true,
        ParseNode::Pow(_, _) => true,
        ParseNode::Function(name, args) if name == "fact" && args.len() == 1 => true,
        // -3x is -(3) * x
        ParseNode::Neg(inner) => can_implicit_mul(inner),
        ParseNode::Mul(_, right) | ParseNode::Div(_, right) => can_implicit_mul(right),
        _ => false,
    }
}

fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((tag("+"), tag("-")))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            "-" => ParseNode::Sub(Box::new(acc), Box::new(val)),
            _ => ParseNode::Add(Box::new(acc), Box::new(val)),
        },
    )(input)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Rc<Expr>),
    Equation(Equation),
}

fn parse_equation(input: &str) -> IResult<&str, (ParseNode, ParseNode)> {
    let (input, lhs) = parse_expr(input)?;
    let (input, _) = preceded(multispace0, tag("="))(input)?;
    let (input, rhs) = parse_expr(input)?;
    Ok((input, (lhs, rhs)))
}

pub fn parse(input: &str) -> Result<Rc<Expr>, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let (remaining, expr_node) =
        parse_expr(input).map_err(|e| ParseError::NomError(format!("{}", e)))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }

    Ok(expr_node.lower())
}

pub fn parse_statement(input: &str) -> Result<Statement, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok((remaining, (lhs, rhs))) = parse_equation(input) {
        if remaining.trim().is_empty() {
            return Ok(Statement::Equation(Equation::new(lhs.lower(), rhs.lower())));
        }
    }

    match parse_expr(input) {
        Ok((remaining, expr_node)) => {
            if remaining.trim().is_empty() {
                Ok(Statement::Expression(expr_node.lower()))
            } else {
                Err(ParseError::UnconsumedInput(remaining.trim().to_string()))
            }
        }
        Err(e) => Err(ParseError::NomError(format!("{}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(show("123"), "123");
    }

    #[test]
    fn test_parse_decimal_literals() {
        let cases = [
            ("8.2", "41/5"),
            ("0.5", "1/2"),
            (".5", "1/2"),
            ("8.", "8"),
            ("0.125", "1/8"),
            ("100.001", "100001/1000"),
        ];

        for (input, expected) in cases {
            assert_eq!(show(input), expected, "input {}", input);
        }
    }

    #[test]
    fn test_parse_negative_decimal() {
        assert_eq!(show("-0.125"), "-1/8");
    }

    #[test]
    fn test_parse_arithmetic_and_parens() {
        assert_eq!(show("1 + 2 * x"), "1 + 2 * x");
        assert_eq!(show("(1 + 2) * x"), "(1 + 2) * x");
        assert_eq!(show("10 - 4 - 3"), "10 - 4 - 3");
    }

    #[test]
    fn test_power_right_associativity() {
        let e = parse("2^3^4").unwrap();
        match e.as_ref() {
            Expr::Pow(base, exp) => {
                assert_eq!(base.to_string(), "2");
                assert!(matches!(exp.as_ref(), Expr::Pow(_, _)));
            }
            other => panic!("Expected Pow, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_exponent() {
        let e = parse("x^-2").unwrap();
        match e.as_ref() {
            Expr::Pow(_, exp) => assert!(matches!(exp.as_ref(), Expr::Neg(_))),
            other => panic!("Expected Pow, got {:?}", other),
        }
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(show("2x"), "2 * x");
        assert_eq!(show("3(a+b)"), "3 * (a + b)");
        assert_eq!(show("2pi"), "2 * pi");
        assert_eq!(show("3x^2"), "3 * x^2");
        assert_eq!(show("2sin(x)"), "2 * sin(x)");
        // x1 stays a single variable
        assert_eq!(show("x1"), "x1");
    }

    #[test]
    fn test_negated_coefficient_multiplies() {
        let e = parse("-3x").unwrap();
        match e.as_ref() {
            Expr::Mul(l, r) => {
                assert!(matches!(l.as_ref(), Expr::Neg(_)));
                assert_eq!(r.to_string(), "x");
            }
            other => panic!("Expected Mul, got {:?}", other),
        }
        assert_eq!(show("x^2 - 5x + 6"), "x^2 - 5 * x + 6");
    }

    #[test]
    fn test_function_power_syntax() {
        let e = parse("sin^2(x)").unwrap();
        match e.as_ref() {
            Expr::Pow(base, exp) => {
                assert_eq!(base.to_string(), "sin(x)");
                assert_eq!(exp.to_string(), "2");
            }
            other => panic!("Expected Pow, got {:?}", other),
        }
        // Unknown names keep ordinary power semantics
        assert!(parse("y^2(x)").is_ok());
    }

    #[test]
    fn test_function_aliases() {
        assert_eq!(show("arcsin(1)"), "asin(1)");
        assert_eq!(show("exp(2)"), "e^2");
        assert_eq!(show("sqrt(16)"), "sqrt(16)");
    }

    #[test]
    fn test_constant_word_boundary() {
        assert!(matches!(parse("e").unwrap().as_ref(), Expr::Constant(Constant::E)));
        assert!(matches!(parse("pivot").unwrap().as_ref(), Expr::Variable(v) if v == "pivot"));
        assert_eq!(show("2e^(x^2)"), "2 * e^x^2");
    }

    #[test]
    fn test_abs_and_factorial() {
        assert_eq!(show("|x - 1|"), "abs(x - 1)");
        assert_eq!(show("5!"), "fact(5)");
    }

    #[test]
    fn test_parse_statement_equation() {
        match parse_statement("2x + 5 = 13").unwrap() {
            Statement::Equation(eq) => {
                assert_eq!(eq.lhs.to_string(), "2 * x + 5");
                assert_eq!(eq.rhs.to_string(), "13");
            }
            other => panic!("Expected equation, got {:?}", other),
        }
        assert!(matches!(
            parse_statement("1 + 1").unwrap(),
            Statement::Expression(_)
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("2 x"), Err(ParseError::UnconsumedInput(_))));
        assert!(matches!(parse("Gaya 100 N"), Err(ParseError::UnconsumedInput(_))));
        assert!(parse("*").is_err());
    }
}
