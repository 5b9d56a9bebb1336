//! Category solvers behind one strategy seam.

pub mod calculus;
pub mod generic;
pub mod linear;
pub mod quadratic;
pub mod trig;
pub mod vector;

use num_rational::BigRational;
use tutor_ast::{Equation, Expr};
use tutor_parser::{parse_statement, Statement};

use crate::error::SolveError;
use crate::normalize::math_segment;
use crate::options::SolveOptions;
use crate::poly::{syntactic_degree, Polynomial};
use crate::solution::{Category, Step};

pub use calculus::CalculusStrategy;
pub use generic::GenericStrategy;
pub use linear::LinearStrategy;
pub use quadratic::QuadraticStrategy;
pub use trig::TrigStrategy;
pub use vector::VectorStrategy;

/// One request as seen by the strategies.
#[derive(Debug, Clone, Copy)]
pub struct Problem<'a> {
    /// Text exactly as the user typed it.
    pub original: &'a str,
    pub normalized: &'a str,
    pub category: Category,
}

/// What a successful strategy produces; the controller wraps it into a
/// [`crate::Solution`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub final_answer: String,
    pub steps: Vec<Step>,
}

impl Outcome {
    pub fn new(final_answer: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            final_answer: final_answer.into(),
            steps,
        }
    }
}

pub trait SolverStrategy {
    fn name(&self) -> &'static str;

    /// Attempts to solve the problem with this strategy.
    /// Returns:
    /// - None: the strategy does not apply to this problem.
    /// - Some(Ok(outcome)): the strategy applied and produced an answer.
    /// - Some(Err(e)): the strategy applied but could not finish.
    fn apply(&self, problem: &Problem<'_>, opts: &SolveOptions) -> Option<Result<Outcome, SolveError>>;
}

const ALGEBRA: &[&dyn SolverStrategy] = &[&LinearStrategy, &QuadraticStrategy, &GenericStrategy];
const ARITHMETIC: &[&dyn SolverStrategy] = &[&GenericStrategy];
const TRIGONOMETRY: &[&dyn SolverStrategy] = &[&TrigStrategy];
const CALCULUS: &[&dyn SolverStrategy] = &[&CalculusStrategy];
const PHYSICS: &[&dyn SolverStrategy] = &[&VectorStrategy];

/// Strategies tried, in order, for a category. Conversation has none.
pub fn strategies_for(category: Category) -> &'static [&'static dyn SolverStrategy] {
    match category {
        Category::Algebra => ALGEBRA,
        Category::Arithmetic => ARITHMETIC,
        Category::Trigonometry => TRIGONOMETRY,
        Category::Calculus => CALCULUS,
        Category::Physics => PHYSICS,
        Category::Conversation => &[],
    }
}

/// Runs the first applicable strategy for the problem's category.
pub fn run_primary(problem: &Problem<'_>, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    for strategy in strategies_for(problem.category) {
        if let Some(result) = strategy.apply(problem, opts) {
            tracing::debug!(
                target: "solver",
                strategy = strategy.name(),
                ok = result.is_ok(),
                "strategy applied"
            );
            return result;
        }
        tracing::trace!(target: "solver", strategy = strategy.name(), "not applicable");
    }
    Err(SolveError::UnrecognizedForm(format!(
        "no {} strategy applies",
        problem.category
    )))
}

/// A parsed single-variable equation and the written form it came from.
#[derive(Debug, Clone)]
pub(crate) struct EquationInput {
    pub text: String,
    pub equation: Equation,
    pub var: String,
    /// Highest power of `var` as written.
    pub degree: usize,
}

impl EquationInput {
    /// `None` when the text holds no equation at all.
    pub fn from_problem(problem: &Problem<'_>) -> Option<Result<Self, SolveError>> {
        let text = math_segment(problem.normalized);
        if !text.contains('=') {
            return None;
        }
        Some(Self::parse(text))
    }

    fn parse(text: String) -> Result<Self, SolveError> {
        let equation = match parse_statement(&text)? {
            Statement::Equation(eq) => eq,
            Statement::Expression(_) => {
                return Err(SolveError::UnrecognizedForm(format!("'{}' is not an equation", text)))
            }
        };
        let mut vars = equation.lhs.variables();
        vars.extend(equation.rhs.variables());
        let var = match vars.len() {
            1 => vars.into_iter().next().unwrap_or_default(),
            0 => return Err(SolveError::UnrecognizedForm("equation has no variable".to_string())),
            _ => {
                return Err(SolveError::UnrecognizedForm(format!(
                    "equation has {} variables",
                    vars.len()
                )))
            }
        };
        let degree = syntactic_degree(&equation.lhs, &var)
            .zip(syntactic_degree(&equation.rhs, &var))
            .map(|(l, r)| l.max(r))
            .ok_or_else(|| SolveError::UnrecognizedForm("not a polynomial equation".to_string()))?;
        Ok(Self {
            text,
            equation,
            var,
            degree,
        })
    }

    /// Both sides as polynomials in the equation's variable.
    pub fn sides(&self) -> Result<(Polynomial, Polynomial), SolveError> {
        let side = |e: &Expr| {
            Polynomial::from_expr(e, &self.var)
                .ok_or_else(|| SolveError::UnrecognizedForm(format!("'{}' is not polynomial", e)))
        };
        Ok((side(&self.equation.lhs)?, side(&self.equation.rhs)?))
    }
}

/// `Σ coefficients[i]·var^i = rhs`, with every variable term on the left.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PolyEquation {
    pub coefficients: Polynomial,
    pub rhs: BigRational,
}

impl PolyEquation {
    /// Moves the variable terms of `right` to the left and keeps its
    /// constant on the right.
    pub fn gather(left: &Polynomial, right: &Polynomial) -> Self {
        let right_constant = right.coeff(0);
        let right_variable = right.sub(&Polynomial::constant(right_constant.clone(), &right.var));
        Self {
            coefficients: left.sub(&right_variable),
            rhs: right_constant,
        }
    }

    pub fn var(&self) -> &str {
        &self.coefficients.var
    }
}
