//! Derivatives by the power and chain rules, antiderivatives by the reverse
//! power rule.

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use regex::Regex;
use std::rc::Rc;
use std::sync::LazyLock;
use tutor_ast::{Constant, Expr};
use tutor_parser::parse;

use super::{Outcome, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{eval_exact, format_rational, format_rational_paren};
use crate::normalize::math_segment;
use crate::options::SolveOptions;
use crate::poly::{format_unsigned_term, Polynomial};
use crate::solution::Step;

static INTEGRAL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)∫|\bintegral\b|\bantiturunan\b|\bintegrate\b").expect("valid regex literal")
});

static DEFINITE_BOUNDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"∫\s*_?\s*(-?\d+(?:\.\d+)?)\s*\^\s*(-?\d+(?:\.\d+)?)").expect("valid regex literal")
});

static LEIBNIZ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"d/d([A-Za-z])").expect("valid regex literal"));

static TRAILING_DIFFERENTIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z])d([A-Za-z])\s*$").expect("valid regex literal")
});

static FUNCTION_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9_])[A-Za-z]\s*'?\s*\(\s*([A-Za-z])\s*\)\s*=?")
        .expect("valid regex literal")
});

static MARKER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:turunan|pertama|derivative|first|antiturunan|integral|integrate|tak tentu|dari|of|the|find|fungsi|function)\b|∫",
    )
    .expect("valid regex literal")
});

const SUBSCRIPT_DIGITS: [(char, char); 11] = [
    ('₀', '0'),
    ('₁', '1'),
    ('₂', '2'),
    ('₃', '3'),
    ('₄', '4'),
    ('₅', '5'),
    ('₆', '6'),
    ('₇', '7'),
    ('₈', '8'),
    ('₉', '9'),
    ('₋', '-'),
];

/// Derivative or (possibly definite) antiderivative of one function.
pub struct CalculusStrategy;

impl SolverStrategy for CalculusStrategy {
    fn name(&self) -> &'static str {
        "calculus"
    }

    fn apply(&self, problem: &Problem<'_>, _opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        Some(solve(problem.normalized))
    }
}

fn solve(normalized: &str) -> Result<Outcome, SolveError> {
    let task = Task::extract(normalized)?;
    tracing::debug!(target: "solver", function = %task.function, var = %task.var, integral = task.integral, "calculus task");
    if task.integral {
        integrate(&task)
    } else {
        differentiate(&task)
    }
}

/// The function to work on, stripped of its surrounding wording.
#[derive(Debug)]
struct Task {
    function: String,
    expr: Rc<Expr>,
    var: String,
    integral: bool,
    bounds: Option<(BigRational, BigRational)>,
}

impl Task {
    fn extract(normalized: &str) -> Result<Self, SolveError> {
        let integral = INTEGRAL_MARKER.is_match(normalized);
        let mut text: String = normalized
            .chars()
            .map(|c| {
                SUBSCRIPT_DIGITS
                    .iter()
                    .find(|(sub, _)| *sub == c)
                    .map_or(c, |(_, digit)| *digit)
            })
            .collect();

        let mut bounds = None;
        if let Some(caps) = DEFINITE_BOUNDS.captures(&text) {
            bounds = Some((bound(&caps[1])?, bound(&caps[2])?));
            text = DEFINITE_BOUNDS.replace(&text, " ").into_owned();
        }

        let mut var_hint = None;
        if let Some(caps) = LEIBNIZ.captures(&text) {
            var_hint = Some(caps[1].to_string());
            text = LEIBNIZ.replace_all(&text, " ").into_owned();
        }
        if let Some(caps) = TRAILING_DIFFERENTIAL.captures(&text) {
            var_hint.get_or_insert_with(|| caps[2].to_string());
            text = TRAILING_DIFFERENTIAL.replace(&text, "${1}").into_owned();
        }
        if let Some(caps) = FUNCTION_HEAD.captures(&text) {
            var_hint.get_or_insert_with(|| caps[2].to_string());
            text = FUNCTION_HEAD.replace_all(&text, "${1}").into_owned();
        }
        text = MARKER_WORDS.replace_all(&text, " ").into_owned();
        text = text.replace(['[', '{'], "(").replace([']', '}'], ")");

        let function = strip_enclosing_parens(&math_segment(&text)).to_string();
        if function.is_empty() {
            return Err(SolveError::UnrecognizedForm("no function to work on".to_string()));
        }
        let expr = parse(&function)?;
        let vars = expr.variables();
        let var = match vars.len() {
            0 => var_hint.unwrap_or_else(|| "x".to_string()),
            1 => vars.into_iter().next().unwrap_or_default(),
            n => {
                return Err(SolveError::UnsupportedExpression(format!(
                    "function of {} variables",
                    n
                )))
            }
        };

        Ok(Self {
            function,
            expr,
            var,
            integral,
            bounds,
        })
    }
}

/// `(x + 1)` becomes `x + 1`; `(x + 1)(x - 1)` is left alone.
fn strip_enclosing_parens(text: &str) -> &str {
    let mut text = text.trim();
    while let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let mut depth = 0i32;
        let balanced = inner.chars().all(|c| {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            depth >= 0
        });
        if !balanced || depth != 0 {
            break;
        }
        text = inner.trim();
    }
    text
}

fn bound(text: &str) -> Result<BigRational, SolveError> {
    eval_exact(&*parse(text)?)?
        .ok_or_else(|| SolveError::UnrecognizedForm(format!("bound '{}' is not a number", text)))
}

/// Splits a sum into its signed terms, left to right.
fn additive_terms(expr: &Rc<Expr>, negated: bool, out: &mut Vec<Rc<Expr>>) {
    match expr.as_ref() {
        Expr::Add(l, r) => {
            additive_terms(l, negated, out);
            additive_terms(r, negated, out);
        }
        Expr::Sub(l, r) => {
            additive_terms(l, negated, out);
            additive_terms(r, !negated, out);
        }
        Expr::Neg(inner) if !matches!(inner.as_ref(), Expr::Number(_)) => {
            additive_terms(inner, !negated, out)
        }
        _ => out.push(if negated { Expr::neg(expr.clone()) } else { expr.clone() }),
    }
}

/// `k·e^u` with a constant `k` and a polynomial exponent `u`.
fn exponential_term(expr: &Expr, var: &str) -> Option<(BigRational, Polynomial)> {
    let constant = |e: &Expr| eval_exact(e).ok().flatten();
    match expr {
        Expr::Pow(base, exp) if matches!(base.as_ref(), Expr::Constant(Constant::E)) => {
            Some((BigRational::one(), Polynomial::from_expr(exp, var)?))
        }
        Expr::Neg(inner) => exponential_term(inner, var).map(|(k, u)| (-k, u)),
        Expr::Mul(l, r) => {
            if let Some(k) = constant(l) {
                exponential_term(r, var).map(|(c, u)| (k * c, u))
            } else {
                let k = constant(r)?;
                exponential_term(l, var).map(|(c, u)| (k * c, u))
            }
        }
        Expr::Div(l, r) => {
            let k = constant(r).filter(|k| !k.is_zero())?;
            exponential_term(l, var).map(|(c, u)| (c / k, u))
        }
        _ => None,
    }
}

fn exp_power(u: &Polynomial) -> String {
    if u.coeffs.len() == 2 && u.coeff(0).is_zero() && u.coeff(1).is_one() {
        format!("e^{}", u.var)
    } else {
        format!("e^({})", u)
    }
}

/// `factor·e^u` split into its sign and unsigned body.
fn exp_product(factor: &Polynomial, u: &Polynomial) -> (bool, String) {
    let power = exp_power(u);
    let mut terms = factor.terms();
    match (terms.next(), terms.next()) {
        (None, _) => (false, "0".to_string()),
        (Some((c, 0)), None) if c.abs().is_one() => (c.is_negative(), power),
        (Some((c, p)), None) => (
            c.is_negative(),
            format!("{}·{}", format_unsigned_term(c, p, &factor.var), power),
        ),
        _ => (false, format!("({})·{}", factor, power)),
    }
}

fn signed(negative: bool, body: &str) -> String {
    if negative {
        format!("-{}", body)
    } else {
        body.to_string()
    }
}

/// Joins signed pieces into `a + b - c`.
fn join_signed(pieces: &[(bool, String)]) -> String {
    let mut out = String::new();
    for (i, (negative, body)) in pieces.iter().enumerate() {
        match (i, negative) {
            (0, _) => out.push_str(&signed(*negative, body)),
            (_, true) => out.push_str(&format!(" - {}", body)),
            (_, false) => out.push_str(&format!(" + {}", body)),
        }
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

/// A single term that expands into several, such as `x * (x + 1)`.
fn push_expansion(steps: &mut Vec<Step>, term: &Expr, p: &Polynomial) {
    if p.terms().count() > 1 {
        steps.push(Step::new(
            format!("{} = {}", term, p),
            "Jabarkan perkalian menjadi suku-suku berpangkat",
        ));
    }
}

fn differentiate(task: &Task) -> Result<Outcome, SolveError> {
    let var = task.var.as_str();
    let mut steps = vec![Step::new(
        format!("f({}) = {}", var, task.function),
        "Fungsi yang akan diturunkan",
    )];

    let mut terms = Vec::new();
    additive_terms(&task.expr, false, &mut terms);

    let mut polynomial_part = Polynomial::zero(var);
    let mut exponential_parts = Vec::new();
    for term in &terms {
        if let Some(p) = Polynomial::from_expr(term, var) {
            push_expansion(&mut steps, term, &p);
            let derivative = p.derivative();
            let explanation = if p.degree() == 0 {
                "Turunan konstanta adalah nol".to_string()
            } else {
                format!("Aturan pangkat: d/d{v}(c·{v}^n) = n·c·{v}^(n-1)", v = var)
            };
            steps.push(Step::with_result(
                format!("d/d{}({}) = {}", var, p, derivative),
                explanation,
                derivative.to_string(),
            ));
            polynomial_part = polynomial_part.add(&derivative);
        } else if !term.contains_var(var) {
            steps.push(Step::with_result(
                format!("d/d{}({}) = 0", var, term),
                "Turunan konstanta adalah nol",
                "0",
            ));
        } else if let Some((k, u)) = exponential_term(term, var) {
            let (term_negative, term_body) = exp_product(&Polynomial::constant(k.clone(), var), &u);
            let inner = u.derivative();
            steps.push(Step::new(
                format!("d/du(e^u) = e^u, u = {}", u),
                "Aturan rantai: turunan fungsi luar e^u adalah e^u itu sendiri",
            ));
            steps.push(Step::with_result(
                format!("du/d{} = {}", var, inner),
                format!("Turunan fungsi dalam u = {}", u),
                inner.to_string(),
            ));
            let (negative, body) = exp_product(&inner.scale(&k), &u);
            let combined = signed(negative, &body);
            steps.push(Step::with_result(
                format!(
                    "d/d{}({}) = {}",
                    var,
                    signed(term_negative, &term_body),
                    combined
                ),
                "Kalikan turunan fungsi luar dengan turunan fungsi dalam",
                combined.clone(),
            ));
            if !inner.is_zero() && !k.is_zero() {
                exponential_parts.push((negative, body));
            }
        } else {
            return Err(SolveError::UnsupportedExpression(format!(
                "cannot differentiate '{}' by the power or chain rule",
                term
            )));
        }
    }

    let mut pieces = Vec::new();
    if !polynomial_part.is_zero() {
        pieces.push((false, polynomial_part.to_string()));
    }
    pieces.extend(exponential_parts);
    let answer = join_signed(&pieces);
    steps.push(Step::with_result(
        format!("f'({}) = {}", var, answer),
        "Hasil turunan fungsi",
        answer.clone(),
    ));
    Ok(Outcome::new(answer, steps))
}

fn integrate(task: &Task) -> Result<Outcome, SolveError> {
    let var = task.var.as_str();
    let mut steps = vec![Step::new(
        format!("∫ ({}) d{}", task.function, var),
        "Integral yang akan dihitung",
    )];

    let mut terms = Vec::new();
    additive_terms(&task.expr, false, &mut terms);

    let mut antiderivative = Polynomial::zero(var);
    for term in &terms {
        let p = Polynomial::from_expr(term, var).ok_or_else(|| {
            SolveError::UnsupportedExpression(format!(
                "cannot integrate '{}' by the reverse power rule",
                term
            ))
        })?;
        push_expansion(&mut steps, term, &p);
        let integrated = p.antiderivative();
        steps.push(Step::with_result(
            format!("∫ {} d{} = {}", p, var, integrated),
            format!(
                "Terapkan aturan integrasi: ∫ {v}^n d{v} = {v}^(n+1)/(n+1)",
                v = var
            ),
            integrated.to_string(),
        ));
        antiderivative = antiderivative.add(&integrated);
    }

    let Some((lower, upper)) = &task.bounds else {
        let answer = if antiderivative.is_zero() {
            "C".to_string()
        } else {
            format!("{} + C", antiderivative)
        };
        steps.push(Step::with_result(
            format!("F({}) = {}", var, answer),
            "Hasil integral tak tentu",
            answer.clone(),
        ));
        return Ok(Outcome::new(answer, steps));
    };

    steps.push(Step::new(
        format!("F({}) = {}", var, antiderivative),
        "Antiturunan dari fungsi",
    ));
    let at_upper = antiderivative.eval(upper);
    let at_lower = antiderivative.eval(lower);
    let value = &at_upper - &at_lower;
    let answer = format_rational(&value);
    steps.push(Step::with_result(
        format!(
            "F({}) - F({}) = {} - {} = {}",
            format_rational(upper),
            format_rational(lower),
            format_rational(&at_upper),
            format_rational_paren(&at_lower),
            answer
        ),
        "Hitung integral tentu dengan teorema dasar kalkulus: F(b) - F(a)",
        answer.clone(),
    ));
    Ok(Outcome::new(answer, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn run(raw: &str) -> Result<Outcome, SolveError> {
        solve(&normalize(raw))
    }

    #[test]
    fn power_rule_single_term() {
        let out = run("Turunan dari x^3").unwrap();
        assert_eq!(out.final_answer, "3x^2");
        assert_eq!(out.steps[0].text(), "f(x) = x^3");
        assert_eq!(out.steps.last().unwrap().text(), "f'(x) = 3x^2");
        assert_eq!(run("derivative of x^2").unwrap().final_answer, "2x");
    }

    #[test]
    fn power_rule_polynomial() {
        let out = run("Turunan dari f(x) = x³ + 2x² - 5x + 1").unwrap();
        assert_eq!(out.final_answer, "3x^2 + 4x - 5");
        // one step per term, plus the function and the result
        assert_eq!(out.steps.len(), 6);
        assert_eq!(out.steps[3].text(), "d/dx(-5x) = -5");
        assert_eq!(out.steps[4].explanation(), "Turunan konstanta adalah nol");
    }

    #[test]
    fn products_are_expanded_before_the_power_rule() {
        let out = run("turunan dari x * (x + 1)").unwrap();
        assert_eq!(out.final_answer, "2x + 1");
        assert_eq!(out.steps[1].text(), "x * (x + 1) = x^2 + x");
        assert_eq!(out.steps[2].text(), "d/dx(x^2 + x) = 2x + 1");

        let out = run("∫ (x + 1)^2 dx").unwrap();
        assert_eq!(out.steps[1].text(), "(x + 1)^2 = x^2 + 2x + 1");
        assert_eq!(out.final_answer, "(1/3)x^3 + x^2 + x + C");
    }

    #[test]
    fn leibniz_notation_and_other_variables() {
        assert_eq!(run("d/dx x^4").unwrap().final_answer, "4x^3");
        assert_eq!(run("turunan dari 3t^2 + t").unwrap().final_answer, "6t + 1");
        assert_eq!(run("turunan dari x^3 / 3").unwrap().final_answer, "x^2");
    }

    #[test]
    fn chain_rule_for_exponentials() {
        let out = run("turunan dari e^(x^2)").unwrap();
        assert_eq!(out.final_answer, "2x·e^(x^2)");
        let texts: Vec<_> = out.steps.iter().map(|s| s.text()).collect();
        assert_eq!(texts[1], "d/du(e^u) = e^u, u = x^2");
        assert_eq!(texts[2], "du/dx = 2x");
        assert_eq!(texts[3], "d/dx(e^(x^2)) = 2x·e^(x^2)");

        assert_eq!(run("turunan dari x^2 + 3e^x").unwrap().final_answer, "2x + 3·e^x");
        assert_eq!(run("turunan dari -e^(2x)").unwrap().final_answer, "-2·e^(2x)");
    }

    #[test]
    fn unsupported_terms() {
        assert!(matches!(
            run("turunan dari sin(x)"),
            Err(SolveError::UnsupportedExpression(_))
        ));
        assert!(matches!(
            run("turunan dari x * y"),
            Err(SolveError::UnsupportedExpression(_))
        ));
        assert!(matches!(run("turunan dari"), Err(SolveError::UnrecognizedForm(_))));
    }

    #[test]
    fn indefinite_integral() {
        let out = run("Integral dari ∫(3x² - 4x + 5)dx").unwrap();
        assert_eq!(out.final_answer, "x^3 - 2x^2 + 5x + C");
        assert_eq!(out.steps[0].text(), "∫ (3x^2 - 4x + 5) dx");
        assert_eq!(out.steps.len(), 5);
    }

    #[test]
    fn definite_integral() {
        let out = run("∫₀^2 (3x² - 4x + 5) dx").unwrap();
        assert_eq!(out.final_answer, "10");
        assert_eq!(out.steps.last().unwrap().text(), "F(2) - F(0) = 10 - 0 = 10");
    }

    #[test]
    fn enclosing_parens() {
        assert_eq!(strip_enclosing_parens("(x + 1)"), "x + 1");
        assert_eq!(strip_enclosing_parens("((x))"), "x");
        assert_eq!(strip_enclosing_parens("(x + 1)(x - 1)"), "(x + 1)(x - 1)");
    }

    #[test]
    fn reciprocal_is_not_integrated() {
        assert!(matches!(
            run("integral x^-1 dx"),
            Err(SolveError::UnsupportedExpression(_))
        ));
    }
}
