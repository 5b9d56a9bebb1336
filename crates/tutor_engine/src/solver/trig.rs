use tutor_parser::{parse, TRIG_FUNCTIONS};

use super::{Outcome, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{eval_f64, format_fixed, format_number};
use crate::normalize::{degree_angles, has_degree_marker, math_segment};
use crate::options::SolveOptions;
use crate::solution::Step;

/// Numeric evaluation of expressions built from trigonometric calls.
pub struct TrigStrategy;

impl SolverStrategy for TrigStrategy {
    fn name(&self) -> &'static str {
        "trigonometry"
    }

    fn apply(&self, problem: &Problem<'_>, opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        Some(solve(problem, opts))
    }
}

fn solve(problem: &Problem<'_>, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let text = math_segment(problem.normalized);
    let expr = parse(&text)?;
    if let Some(var) = expr.variables().into_iter().next() {
        return Err(SolveError::EvaluationFailure(format!(
            "'{}' has no numeric value",
            var
        )));
    }
    let decimals = opts.trig_decimals;
    let mut steps = Vec::new();

    if has_degree_marker(problem.original) {
        let conversions: Vec<String> = degree_angles(&text)
            .iter()
            .map(|angle| {
                format!(
                    "{}° = {} × π/180 = {} rad",
                    format_number(angle.degrees, decimals),
                    format_number(angle.degrees, decimals),
                    format_fixed(angle.degrees.to_radians(), decimals)
                )
            })
            .collect();
        if !conversions.is_empty() {
            steps.push(Step::new(
                conversions.join(", "),
                "Mengkonversi satuan derajat ke radian untuk perhitungan",
            ));
        }
    }

    steps.push(Step::new(
        format!("Hitung: {}", text),
        "Substitusi nilai sudut ke dalam fungsi trigonometri",
    ));

    if expr.count_calls(TRIG_FUNCTIONS) == 1 {
        if let Some(call) = expr.find_call(TRIG_FUNCTIONS) {
            let value = format_fixed(eval_f64(call, &[])?, decimals);
            steps.push(Step::with_result(
                format!("{} = {}", call, value),
                "Nilai fungsi trigonometri",
                value,
            ));
        }
    }

    let value = format_fixed(eval_f64(&expr, &[])?, decimals);
    steps.push(Step::with_result(
        format!("= {}", value),
        format!("Hasil perhitungan trigonometri ({} desimal presisi)", decimals),
        value.clone(),
    ));
    Ok(Outcome::new(value, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::solution::Category;

    fn run(raw: &str) -> Result<Outcome, SolveError> {
        let normalized = normalize(raw);
        let problem = Problem {
            original: raw,
            normalized: &normalized,
            category: Category::Trigonometry,
        };
        solve(&problem, &SolveOptions::default())
    }

    #[test]
    fn sine_of_thirty_degrees() {
        let out = run("sin(30°)").unwrap();
        assert_eq!(out.final_answer, "0.500000");
        let texts: Vec<_> = out.steps.iter().map(|s| s.text()).collect();
        assert_eq!(
            texts,
            vec![
                "30° = 30 × π/180 = 0.523599 rad",
                "Hitung: sin(30 * pi / 180)",
                "sin(30 * pi / 180) = 0.500000",
                "= 0.500000",
            ]
        );
    }

    #[test]
    fn radians_need_no_conversion() {
        let out = run("cos(0)").unwrap();
        assert_eq!(out.final_answer, "1.000000");
        assert!(out.steps[0].text().starts_with("Hitung:"));
    }

    #[test]
    fn combinations_are_evaluated_at_once() {
        let out = run("Hitung sin(30°) + cos(60°)").unwrap();
        assert_eq!(out.final_answer, "1.000000");
        // two calls: no single-call value step
        assert_eq!(out.steps.len(), 3);
    }

    #[test]
    fn pythagorean_identity() {
        for angle in ["0.7", "2", "30°", "123.4°"] {
            let raw = format!("sin²({a}) + cos²({a})", a = angle);
            assert_eq!(run(&raw).unwrap().final_answer, "1.000000", "{}", raw);
        }
    }

    #[test]
    fn tiny_values_print_as_positive_zero() {
        assert_eq!(run("sin(180°)").unwrap().final_answer, "0.000000");
    }

    #[test]
    fn failures() {
        assert!(matches!(run("sin(x)"), Err(SolveError::EvaluationFailure(_))));
        assert!(matches!(run("asin(2)"), Err(SolveError::EvaluationFailure(_))));
    }
}
