//! Degrades from the category solver to weaker strategies until one answers.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tutor_parser::parse;

use crate::error::SolveError;
use crate::eval::{eval_f64, format_number};
use crate::options::SolveOptions;
use crate::solution::{Category, Solution, Step};
use crate::solver::calculus::CalculusStrategy;
use crate::solver::generic::evaluate_text;
use crate::solver::{run_primary, Outcome, Problem, SolverStrategy};

static FUNCTION_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])([A-Za-z])\s*\(\s*([A-Za-z])\s*\)\s*=\s*(.+)")
        .expect("valid regex literal")
});

static DERIVATIVE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bturunan\b|\bderivative\b|d/d[A-Za-z]").expect("valid regex literal")
});

static MATH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d|(?:^|[^A-Za-z0-9_])[A-Za-z](?:$|[^A-Za-z0-9_])").expect("valid regex literal")
});

/// Answer given when the input was restated but not solved.
pub const NEEDS_DETAIL: &str =
    "Ekspresi berhasil dianalisis tetapi memerlukan input yang lebih spesifik";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrimaryStrategy,
    GenericEvaluation,
    ManualPatternParse,
    Degraded,
}

impl Stage {
    fn next(self) -> Self {
        match self {
            Stage::PrimaryStrategy => Stage::GenericEvaluation,
            Stage::GenericEvaluation => Stage::ManualPatternParse,
            Stage::ManualPatternParse | Stage::Degraded => Stage::Degraded,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PrimaryStrategy => "primary",
            Stage::GenericEvaluation => "generic-evaluation",
            Stage::ManualPatternParse => "manual-pattern-parse",
            Stage::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

/// Runs the chain over one normalized snapshot. Always returns a solution.
pub fn run_chain(problem: &Problem<'_>, opts: &SolveOptions) -> Solution {
    let mut stage = Stage::PrimaryStrategy;
    loop {
        let attempt = match stage {
            Stage::PrimaryStrategy => run_primary(problem, opts),
            Stage::GenericEvaluation => generic_evaluation(problem, opts),
            Stage::ManualPatternParse => manual_pattern_parse(problem, opts),
            Stage::Degraded => {
                tracing::warn!(
                    target: "fallback",
                    category = %problem.category,
                    input = problem.original,
                    "every strategy failed, returning degraded solution"
                );
                return Solution::degraded(problem.original, problem.category);
            }
        };
        match attempt {
            Ok(outcome) => {
                tracing::debug!(target: "fallback", %stage, "solved");
                return Solution::new(
                    problem.original,
                    outcome.final_answer,
                    outcome.steps,
                    problem.category,
                );
            }
            Err(error) => {
                let next = stage.next();
                tracing::debug!(target: "fallback", from = %stage, to = %next, %error, "stage failed");
                stage = next;
            }
        }
    }
}

/// Numeric or symbolic evaluation of the whole normalized text, condensed
/// into a single step.
fn generic_evaluation(problem: &Problem<'_>, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let outcome = evaluate_text(problem.normalized, opts)?;
    let step = Step::with_result(
        format!("{} = {}", problem.normalized, outcome.final_answer),
        "Evaluasi numerik",
        outcome.final_answer.clone(),
    );
    Ok(Outcome::new(outcome.final_answer, vec![step]))
}

fn manual_pattern_parse(problem: &Problem<'_>, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let text = problem.normalized;
    let mut steps = vec![Step::new(
        "Parser manual aktif",
        "Menganalisis soal dengan parser khusus",
    )];

    if let Some(caps) = FUNCTION_DEFINITION.captures(text) {
        let (name, var) = (&caps[1], &caps[2]);
        let body = caps[3].trim();
        let head = format!("{}({}) = {}", name, var, body);
        steps.push(Step::new(
            format!("Fungsi: {}", head),
            "Berhasil mengidentifikasi fungsi matematika",
        ));
        // a derivative request that reached this stage from another category
        if problem.category != Category::Calculus && DERIVATIVE_MARKER.is_match(text) {
            match CalculusStrategy.apply(problem, opts) {
                Some(Ok(mut outcome)) => {
                    outcome.steps.splice(0..0, steps);
                    return Ok(outcome);
                }
                Some(Err(e)) => tracing::debug!(target: "fallback", error = %e, "derivative of function head failed"),
                None => {}
            }
        }
        let point = opts.sample_point;
        let sampled = parse(body)
            .ok()
            .and_then(|expr| eval_f64(&expr, &[(var, point as f64)]).ok());
        return Ok(match sampled {
            Some(value) => {
                let value = format_number(value, opts.general_decimals);
                steps.push(Step::with_result(
                    format!("{}({}) = {}", name, point, value),
                    format!("Contoh evaluasi fungsi pada {} = {}", var, point),
                    value,
                ));
                Outcome::new(format!("Fungsi berhasil diparse: {}", head), steps)
            }
            None => Outcome::new(format!("Fungsi: {}", head), steps),
        });
    }

    if MATH_TOKEN.is_match(text) {
        steps.push(Step::new(text, NEEDS_DETAIL));
        return Ok(Outcome::new(NEEDS_DETAIL, steps));
    }

    Err(SolveError::UnrecognizedForm(
        "no mathematical content".to_string(),
    ))
}
