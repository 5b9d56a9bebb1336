//! Numeric evaluation of expression trees.
//!
//! Exact rational folding is tried first; anything involving constants,
//! transcendental functions or irrational powers is evaluated in `f64`.

use num_bigint::BigInt;
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use tutor_ast::Expr;

use crate::error::EvalError;

/// Largest integer exponent folded exactly.
const MAX_EXACT_EXPONENT: u32 = 256;
/// Largest exact power result, in bits of numerator plus denominator.
const MAX_EXACT_BITS: u64 = 65_536;
/// Largest factorial argument.
const MAX_FACTORIAL: u32 = 170;

/// Folds `expr` to an exact rational when every operation stays rational.
///
/// `Ok(None)` means the value exists but is not rational-foldable.
pub fn eval_exact(expr: &Expr) -> Result<Option<BigRational>, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Some(n.clone())),
        Expr::Constant(_) => Ok(None),
        Expr::Variable(v) => Err(EvalError::FreeVariable(v.clone())),
        Expr::Add(l, r) => Ok(zip(eval_exact(l)?, eval_exact(r)?, |a, b| a + b)),
        Expr::Sub(l, r) => Ok(zip(eval_exact(l)?, eval_exact(r)?, |a, b| a - b)),
        Expr::Mul(l, r) => Ok(zip(eval_exact(l)?, eval_exact(r)?, |a, b| a * b)),
        Expr::Div(l, r) => {
            let num = eval_exact(l)?;
            let den = eval_exact(r)?;
            if den.as_ref().is_some_and(Zero::is_zero) {
                return Err(EvalError::DivisionByZero);
            }
            Ok(zip(num, den, |a, b| a / b))
        }
        Expr::Neg(e) => Ok(eval_exact(e)?.map(|v| -v)),
        Expr::Pow(b, e) => {
            let base = eval_exact(b)?;
            let exp = eval_exact(e)?;
            match (base, exp) {
                (Some(base), Some(exp)) if exp.is_integer() => exact_pow(base, exp.to_integer()),
                _ => Ok(None),
            }
        }
        Expr::Function(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_exact(arg)?);
            }
            match (name.as_str(), values.as_slice()) {
                ("abs", [Some(v)]) => Ok(Some(v.abs())),
                ("sqrt", [Some(v)]) => {
                    if v.is_negative() {
                        return Err(EvalError::Domain("sqrt".to_string()));
                    }
                    Ok(rational_sqrt(v))
                }
                ("fact", [Some(v)]) => factorial(v).map(Some),
                _ => Ok(None),
            }
        }
    }
}

fn zip(
    a: Option<BigRational>,
    b: Option<BigRational>,
    op: impl FnOnce(BigRational, BigRational) -> BigRational,
) -> Option<BigRational> {
    match (a, b) {
        (Some(a), Some(b)) => Some(op(a, b)),
        _ => None,
    }
}

/// `base^exp` folded exactly, or `Ok(None)` when the exponent or the size
/// of the result is out of budget.
pub(crate) fn exact_pow(base: BigRational, exp: BigInt) -> Result<Option<BigRational>, EvalError> {
    let Some(magnitude) = exp.abs().to_u32() else {
        return Ok(None);
    };
    if magnitude > MAX_EXACT_EXPONENT {
        return Ok(None);
    }
    let bits = base.numer().bits() + base.denom().bits();
    if bits.saturating_mul(u64::from(magnitude)) > MAX_EXACT_BITS {
        return Ok(None);
    }
    if exp.is_negative() {
        if base.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        return Ok(Some(num_traits::pow(base.recip(), magnitude as usize)));
    }
    Ok(Some(num_traits::pow(base, magnitude as usize)))
}

/// Exact square root of a non-negative rational, if it is a perfect square.
pub fn rational_sqrt(value: &BigRational) -> Option<BigRational> {
    if value.is_negative() {
        return None;
    }
    let numer = value.numer();
    let denom = value.denom();
    let rn = numer.sqrt();
    let rd = denom.sqrt();
    if &(&rn * &rn) == numer && &(&rd * &rd) == denom {
        Some(BigRational::new(rn, rd))
    } else {
        None
    }
}

fn factorial(value: &BigRational) -> Result<BigRational, EvalError> {
    let n = value
        .is_integer()
        .then(|| value.to_integer().to_u32())
        .flatten()
        .filter(|n| *n <= MAX_FACTORIAL)
        .ok_or_else(|| EvalError::Domain("factorial".to_string()))?;
    let mut acc = BigInt::one();
    for k in 2..=n {
        acc *= k;
    }
    Ok(BigRational::from_integer(acc))
}

pub fn rational_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        let n = value.numer().to_f64().unwrap_or(f64::NAN);
        let d = value.denom().to_f64().unwrap_or(f64::NAN);
        n / d
    })
}

/// Evaluates `expr` in `f64`, binding variables from `env`.
pub fn eval_f64(expr: &Expr, env: &[(&str, f64)]) -> Result<f64, EvalError> {
    let value = eval_inner(expr, env)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn eval_inner(expr: &Expr, env: &[(&str, f64)]) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(rational_to_f64(n)),
        Expr::Constant(c) => Ok(c.value()),
        Expr::Variable(v) => env
            .iter()
            .find(|(name, _)| name == v)
            .map(|(_, value)| *value)
            .ok_or_else(|| EvalError::FreeVariable(v.clone())),
        Expr::Add(l, r) => Ok(eval_inner(l, env)? + eval_inner(r, env)?),
        Expr::Sub(l, r) => Ok(eval_inner(l, env)? - eval_inner(r, env)?),
        Expr::Mul(l, r) => Ok(eval_inner(l, env)? * eval_inner(r, env)?),
        Expr::Div(l, r) => {
            let num = eval_inner(l, env)?;
            let den = eval_inner(r, env)?;
            if den == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(num / den)
        }
        Expr::Pow(b, e) => Ok(eval_inner(b, env)?.powf(eval_inner(e, env)?)),
        Expr::Neg(e) => Ok(-eval_inner(e, env)?),
        Expr::Function(name, args) => {
            let values = args
                .iter()
                .map(|a| eval_inner(a, env))
                .collect::<Result<Vec<_>, _>>()?;
            apply_function(name, &values)
        }
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let value = match (name, args) {
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        ("sec", [x]) => 1.0 / x.cos(),
        ("csc", [x]) => 1.0 / x.sin(),
        ("cot", [x]) => 1.0 / x.tan(),
        ("asin", [x]) => x.asin(),
        ("acos", [x]) => x.acos(),
        ("atan", [x]) => x.atan(),
        ("sqrt", [x]) => {
            if *x < 0.0 {
                return Err(EvalError::Domain("sqrt".to_string()));
            }
            x.sqrt()
        }
        ("abs", [x]) => x.abs(),
        ("ln", [x]) => x.ln(),
        ("log", [x]) => x.log10(),
        ("log", [base, x]) => x.log(*base),
        ("exp", [x]) => x.exp(),
        ("fact", [x]) => {
            if *x < 0.0 || x.fract() != 0.0 || *x > MAX_FACTORIAL as f64 {
                return Err(EvalError::Domain("factorial".to_string()));
            }
            (2..=(*x as u32)).fold(1.0, |acc, k| acc * k as f64)
        }
        _ => return Err(EvalError::UnknownFunction(name.to_string())),
    };
    Ok(value)
}

/// Evaluates a closed expression, exactly when possible.
pub fn evaluate(expr: &Expr) -> Result<Evaluated, EvalError> {
    match eval_exact(expr)? {
        Some(q) => Ok(Evaluated::Exact(q)),
        None => eval_f64(expr, &[]).map(Evaluated::Approx),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Exact(BigRational),
    Approx(f64),
}

impl Evaluated {
    pub fn as_f64(&self) -> f64 {
        match self {
            Evaluated::Exact(q) => rational_to_f64(q),
            Evaluated::Approx(v) => *v,
        }
    }

    /// Integers print bare, everything else with `decimals` places.
    pub fn display(&self, decimals: usize) -> String {
        match self {
            Evaluated::Exact(q) if q.is_integer() => q.to_integer().to_string(),
            _ => format_number(self.as_f64(), decimals),
        }
    }
}

/// Integral values print bare; others with a fixed number of decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    format_fixed(value, decimals)
}

/// Always `decimals` places, without a negative zero.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// `p/q`, or a bare integer.
pub fn format_rational(value: &BigRational) -> String {
    if value.is_integer() {
        value.to_integer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// Wraps negative values in parentheses for use inside a formula.
pub fn format_rational_paren(value: &BigRational) -> String {
    if value.is_negative() {
        format!("({})", format_rational(value))
    } else {
        format_rational(value)
    }
}
