use num_traits::{One, Signed, Zero};

use super::{EquationInput, Outcome, PolyEquation, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{format_rational, format_rational_paren};
use crate::options::SolveOptions;
use crate::poly::{format_term, Polynomial};
use crate::solution::Step;

/// `a·x + b = c`, in any arrangement that collects to degree one.
pub struct LinearStrategy;

impl SolverStrategy for LinearStrategy {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn apply(&self, problem: &Problem<'_>, _opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        let input = match EquationInput::from_problem(problem)? {
            Ok(input) => input,
            Err(e) => return Some(Err(e)),
        };
        if input.degree != 1 {
            return None;
        }
        Some(solve(&input))
    }
}

fn solve(input: &EquationInput) -> Result<Outcome, SolveError> {
    let (left, right) = input.sides()?;
    let mut steps = vec![Step::new(input.text.clone(), "Persamaan linear yang diberikan")];
    solve_collected(&left, &right, &mut steps)
}

/// Solves `left = right` once both sides are polynomials of degree at most
/// one, appending to `steps`. Shared with the quadratic path when its
/// leading coefficient vanishes.
pub(crate) fn solve_collected(
    left: &Polynomial,
    right: &Polynomial,
    steps: &mut Vec<Step>,
) -> Result<Outcome, SolveError> {
    let eq = PolyEquation::gather(left, right);
    if right.degree() > 0 {
        steps.push(Step::new(
            format!("{} = {}", eq.coefficients, format_rational(&eq.rhs)),
            "Pindahkan suku variabel ke ruas kiri",
        ));
    }
    match isolate(&eq, steps) {
        Ok(outcome) => Ok(outcome),
        Err(SolveError::DegenerateEquation(reason)) => {
            tracing::debug!(target: "solver", %reason, "degenerate linear equation");
            Ok(degenerate_outcome(&eq, std::mem::take(steps)))
        }
        Err(e) => Err(e),
    }
}

fn isolate(eq: &PolyEquation, steps: &mut Vec<Step>) -> Result<Outcome, SolveError> {
    let var = eq.var();
    let a = eq.coefficients.coeff(1);
    let b = eq.coefficients.coeff(0);
    if eq.coefficients.degree() > 1 {
        return Err(SolveError::UnrecognizedForm("not a degree-one equation".to_string()));
    }
    if a.is_zero() {
        return Err(SolveError::DegenerateEquation(format!(
            "coefficient of {} is zero",
            var
        )));
    }

    let ax = format_term(&a, 1, var);
    let c = eq.rhs.clone();
    let rhs = &c - &b;
    if !b.is_zero() {
        let moved = if b.is_negative() {
            format!("{} + {}", format_rational(&c), format_rational(&-&b))
        } else {
            format!("{} - {}", format_rational(&c), format_rational(&b))
        };
        steps.push(Step::new(
            format!("{} = {}", ax, moved),
            format!("Pindahkan konstanta {} ke ruas kanan", format_rational(&b)),
        ));
        steps.push(Step::with_result(
            format!("{} = {}", ax, format_rational(&rhs)),
            "Hitung nilai ruas kanan",
            format_rational(&rhs),
        ));
    }

    let value = &rhs / &a;
    if !a.is_one() {
        steps.push(Step::new(
            format!("{} = {} / {}", var, format_rational(&rhs), format_rational_paren(&a)),
            format!("Bagi kedua ruas dengan {}", format_rational(&a)),
        ));
    }

    let answer = format!("{} = {}", var, format_rational(&value));
    steps.push(Step::with_result(answer.clone(), "Hasil akhir", format_rational(&value)));
    Ok(Outcome::new(answer, std::mem::take(steps)))
}

/// Terminal step for `0·x + b = c`.
fn degenerate_outcome(eq: &PolyEquation, mut steps: Vec<Step>) -> Outcome {
    let b = eq.coefficients.coeff(0);
    let var = eq.var();
    let answer = if b == eq.rhs {
        "Semua bilangan real memenuhi persamaan"
    } else {
        "Tidak ada solusi"
    };
    let explanation = if b == eq.rhs {
        format!("Koefisien {} bernilai nol dan kedua ruas selalu sama, setiap nilai {} adalah solusi", var, var)
    } else {
        format!("Koefisien {} bernilai nol sehingga persamaan tidak memiliki solusi tunggal", var)
    };
    steps.push(Step::new(
        format!("0{} = {}", var, format_rational(&(&eq.rhs - &b))),
        explanation,
    ));
    Outcome::new(answer, steps)
}
