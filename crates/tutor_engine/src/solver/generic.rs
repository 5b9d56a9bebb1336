use tutor_parser::parse;

use super::{Outcome, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{evaluate, format_rational, Evaluated};
use crate::normalize::math_segment;
use crate::options::SolveOptions;
use crate::poly::Polynomial;
use crate::solution::Step;

/// Free-form numeric evaluation, or collection of a one-variable polynomial.
pub struct GenericStrategy;

impl SolverStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn apply(&self, problem: &Problem<'_>, opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        let text = math_segment(problem.normalized);
        if text.contains('=') {
            return None;
        }
        Some(evaluate_text(&text, opts))
    }
}

/// Evaluates `text` as a closed expression, or simplifies it when it is a
/// polynomial in a single variable.
pub fn evaluate_text(text: &str, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let expr = parse(text).map_err(|e| SolveError::EvaluationFailure(e.to_string()))?;
    let vars = expr.variables();

    if vars.is_empty() {
        let value = evaluate(&expr)?;
        let display = value.display(opts.general_decimals);
        let mut steps = vec![Step::new(text, "Evaluasi numerik")];
        if let Evaluated::Exact(q) = &value {
            if !q.is_integer() {
                let fraction = format_rational(q);
                steps.push(Step::with_result(
                    format!("= {}", fraction),
                    "Bentuk pecahan eksak",
                    fraction,
                ));
            }
        }
        steps.push(Step::with_result(
            format!("= {}", display),
            "Hasil akhir perhitungan dengan presisi tinggi",
            display.clone(),
        ));
        return Ok(Outcome::new(display, steps));
    }

    let mut vars = vars.into_iter();
    let (Some(var), None) = (vars.next(), vars.next()) else {
        return Err(SolveError::EvaluationFailure(
            "expression has more than one free variable".to_string(),
        ));
    };
    let poly = Polynomial::from_expr(&expr, &var).ok_or_else(|| {
        SolveError::EvaluationFailure(format!("'{}' has no value without {}", text, var))
    })?;
    let simplified = poly.to_string();
    let steps = vec![
        Step::new(text, "Sederhanakan ekspresi"),
        Step::with_result(
            format!("= {}", simplified),
            "Gabungkan suku sejenis, bentuk akhir yang paling sederhana",
            simplified.clone(),
        ),
    ];
    Ok(Outcome::new(simplified, steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> String {
        evaluate_text(text, &SolveOptions::default()).unwrap().final_answer
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(answer("15 + 27 * 3"), "96");
        assert_eq!(answer("(15 + 25) / 2"), "20");
        assert_eq!(answer("5^2 + sqrt(16)"), "29");
        assert_eq!(answer("1 + 1"), "2");
    }

    #[test]
    fn fractions_show_exact_step() {
        let out = evaluate_text("1 / 3", &SolveOptions::default()).unwrap();
        assert_eq!(out.final_answer, "0.333333");
        assert_eq!(out.steps[1].text(), "= 1/3");
        assert_eq!(out.steps.len(), 3);
    }

    #[test]
    fn irrational_values() {
        assert_eq!(answer("2 * pi"), "6.283185");
        assert_eq!(answer("sqrt(2)"), "1.414214");
        assert_eq!(answer("log(100)"), "2");
    }

    #[test]
    fn collects_like_terms() {
        let out = evaluate_text("2x + 3x", &SolveOptions::default()).unwrap();
        assert_eq!(out.final_answer, "5x");
        assert_eq!(out.steps.len(), 2);
        assert_eq!(answer("(x + 1)^2 - x^2"), "2x + 1");
    }

    #[test]
    fn failures_are_evaluation_failures() {
        for text in ["1 / 0", "x + y", "sin(x) + 1", "2 +", "asin(3)"] {
            assert!(
                matches!(
                    evaluate_text(text, &SolveOptions::default()),
                    Err(SolveError::EvaluationFailure(_))
                ),
                "{}",
                text
            );
        }
    }
}
