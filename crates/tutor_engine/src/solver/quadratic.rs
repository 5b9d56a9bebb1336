use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::linear::solve_collected;
use super::{EquationInput, Outcome, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{format_fixed, format_rational, format_rational_paren, rational_sqrt, rational_to_f64};
use crate::options::SolveOptions;
use crate::poly::Polynomial;
use crate::solution::Step;

/// `a·x² + b·x + c = 0` via the discriminant.
pub struct QuadraticStrategy;

impl SolverStrategy for QuadraticStrategy {
    fn name(&self) -> &'static str {
        "quadratic"
    }

    fn apply(&self, problem: &Problem<'_>, opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        let input = match EquationInput::from_problem(problem)? {
            Ok(input) => input,
            Err(e) => return Some(Err(e)),
        };
        if input.degree != 2 {
            return None;
        }
        Some(solve(&input, opts))
    }
}

/// A root that is either exact or rounded.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    Exact(BigRational),
    Approx(f64),
}

impl Root {
    pub fn to_f64(&self) -> f64 {
        match self {
            Root::Exact(q) => rational_to_f64(q),
            Root::Approx(v) => *v,
        }
    }

    fn display(&self, decimals: usize) -> String {
        match self {
            Root::Exact(q) => format_rational(q),
            Root::Approx(v) => format_fixed(*v, decimals),
        }
    }
}

/// Real roots of `a·x² + b·x + c` with `a ≠ 0`, the `+√D` root first.
pub fn real_roots(a: &BigRational, b: &BigRational, c: &BigRational) -> Vec<Root> {
    let disc = discriminant(a, b, c);
    let two_a = a * BigRational::from_integer(BigInt::from(2));
    if disc.is_negative() {
        return vec![];
    }
    if disc.is_zero() {
        return vec![Root::Exact(-b / &two_a)];
    }
    match rational_sqrt(&disc) {
        Some(sqrt) => vec![
            Root::Exact((-b + &sqrt) / &two_a),
            Root::Exact((-b - &sqrt) / &two_a),
        ],
        None => {
            let sqrt = rational_to_f64(&disc).sqrt();
            let nb = rational_to_f64(&-b);
            let denom = rational_to_f64(&two_a);
            vec![Root::Approx((nb + sqrt) / denom), Root::Approx((nb - sqrt) / denom)]
        }
    }
}

pub fn discriminant(a: &BigRational, b: &BigRational, c: &BigRational) -> BigRational {
    b * b - a * c * BigRational::from_integer(BigInt::from(4))
}

fn solve(input: &EquationInput, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let var = input.var.as_str();
    let (left, right) = input.sides()?;
    let mut steps = vec![Step::new(input.text.clone(), "Persamaan kuadrat yang diberikan")];

    let poly = left.sub(&right);
    if poly.degree() < 2 {
        steps.push(Step::new(
            format!("{} = 0", poly),
            format!(
                "Koefisien {}^2 bernilai nol, persamaan diselesaikan sebagai persamaan linear",
                var
            ),
        ));
        return solve_collected(&poly, &Polynomial::zero(var), &mut steps);
    }
    if !right.is_zero() {
        steps.push(Step::new(
            format!("{} = 0", poly),
            "Pindahkan semua suku ke ruas kiri",
        ));
    }

    let a = poly.coeff(2);
    let b = poly.coeff(1);
    let c = poly.coeff(0);
    steps.push(Step::new(
        format!(
            "a = {}, b = {}, c = {}",
            format_rational(&a),
            format_rational(&b),
            format_rational(&c)
        ),
        "Identifikasi koefisien a, b, dan c",
    ));

    let disc = discriminant(&a, &b, &c);
    steps.push(Step::with_result(
        format!(
            "Δ = b² - 4ac = {}² - 4·{}·{} = {}",
            format_rational_paren(&b),
            format_rational_paren(&a),
            format_rational_paren(&c),
            format_rational(&disc)
        ),
        "Hitung diskriminan untuk mengetahui jenis akar",
        format_rational(&disc),
    ));

    let decimals = opts.general_decimals;
    let neg_b = format_rational(&-&b);
    let two_a = format_rational_paren(&(&a * BigRational::from_integer(BigInt::from(2))));
    let roots = real_roots(&a, &b, &c);
    let answer = match roots.as_slice() {
        [] => {
            steps.push(Step::new(
                "Tidak ada akar real",
                "Diskriminan negatif, akar berupa bilangan kompleks",
            ));
            "Tidak ada akar real".to_string()
        }
        [root] => {
            let value = root.display(decimals);
            steps.push(Step::with_result(
                format!("{} = {} / {} = {}", var, neg_b, two_a, value),
                "Akar kembar (diskriminan = 0)",
                value.clone(),
            ));
            format!("{} = {}", var, value)
        }
        [first, second, ..] => {
            let disc_text = format_rational(&disc);
            let mut values = Vec::with_capacity(2);
            for (root, index, sign, ordinal) in [
                (first, "₁", "+", "pertama"),
                (second, "₂", "-", "kedua"),
            ] {
                let value = root.display(decimals);
                steps.push(Step::with_result(
                    format!(
                        "{}{} = ({} {} √{}) / {} = {}",
                        var, index, neg_b, sign, disc_text, two_a, value
                    ),
                    format!("Akar {} menggunakan rumus kuadrat", ordinal),
                    value.clone(),
                ));
                values.push(format!("{} = {}", var, value));
            }
            values.join(" atau ")
        }
    };
    Ok(Outcome::new(answer, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::solution::Category;

    fn run(raw: &str) -> Outcome {
        let normalized = normalize(raw);
        let problem = Problem {
            original: raw,
            normalized: &normalized,
            category: Category::Algebra,
        };
        QuadraticStrategy
            .apply(&problem, &SolveOptions::default())
            .expect("quadratic applies")
            .expect("quadratic solves")
    }

    #[test]
    fn two_rational_roots() {
        let out = run("x^2 - 5x + 6 = 0");
        assert_eq!(out.final_answer, "x = 3 atau x = 2");
        let texts: Vec<_> = out.steps.iter().map(|s| s.text()).collect();
        assert_eq!(
            texts,
            vec![
                "x^2 - 5x + 6 = 0",
                "a = 1, b = -5, c = 6",
                "Δ = b² - 4ac = (-5)² - 4·1·6 = 1",
                "x₁ = (5 + √1) / 2 = 3",
                "x₂ = (5 - √1) / 2 = 2",
            ]
        );
        assert_eq!(out.steps[2].result(), Some("1"));
    }

    #[test]
    fn double_root() {
        let out = run("x² - 4x + 4 = 0");
        assert_eq!(out.final_answer, "x = 2");
        assert_eq!(out.steps.last().unwrap().explanation(), "Akar kembar (diskriminan = 0)");
    }

    #[test]
    fn no_real_roots() {
        let out = run("x^2 + 1 = 0");
        assert_eq!(out.final_answer, "Tidak ada akar real");
        assert!(out.steps.last().unwrap().result().is_none());
    }

    #[test]
    fn irrational_roots_are_rounded() {
        let out = run("x^2 - 2 = 0");
        assert_eq!(out.final_answer, "x = 1.414214 atau x = -1.414214");
    }

    #[test]
    fn terms_on_both_sides_move_left() {
        let out = run("x^2 = 5x - 6");
        assert_eq!(out.steps[1].text(), "x^2 - 5x + 6 = 0");
        assert_eq!(out.final_answer, "x = 3 atau x = 2");
    }

    #[test]
    fn cancelled_square_falls_back_to_linear() {
        let out = run("x^2 + 2x = x^2 + 4");
        assert_eq!(out.final_answer, "x = 2");
        assert!(out
            .steps
            .iter()
            .any(|s| s.explanation().contains("persamaan linear")));
    }

    #[test]
    fn roots_satisfy_the_equation() {
        let q = |n: i64| BigRational::from_integer(n.into());
        for root in real_roots(&q(2), &q(-3), &q(-5)) {
            let x = root.to_f64();
            assert!((2.0 * x * x - 3.0 * x - 5.0).abs() < 1e-9);
        }
    }
}
