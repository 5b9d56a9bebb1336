use thiserror::Error;
use tutor_parser::ParseError;

/// Failure of a single solving strategy.
///
/// Every variant is recovered inside the engine; callers only ever observe
/// a [`crate::Solution`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Unrecognized form: {0}")]
    UnrecognizedForm(String),
    #[error("Degenerate equation: {0}")]
    DegenerateEquation(String),
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),
    #[error("Evaluation failure: {0}")]
    EvaluationFailure(String),
}

impl From<ParseError> for SolveError {
    fn from(e: ParseError) -> Self {
        SolveError::UnrecognizedForm(e.to_string())
    }
}

/// Numeric evaluation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Variable '{0}' has no value")]
    FreeVariable(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Domain error in {0}")]
    Domain(String),
    #[error("Result is not a finite number")]
    NonFinite,
}

impl From<EvalError> for SolveError {
    fn from(e: EvalError) -> Self {
        SolveError::EvaluationFailure(e.to_string())
    }
}
