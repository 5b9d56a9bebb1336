use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::max;
use std::fmt;
use tutor_ast::Expr;

use crate::eval::{exact_pow, format_rational};

/// Highest power accepted when expanding `p^n`.
const MAX_EXPANDED_DEGREE: usize = 64;

/// Univariate polynomial with exact coefficients; `coeffs[i]` belongs to `var^i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coeffs: Vec<BigRational>,
    pub var: String,
}

impl Polynomial {
    pub fn new(coeffs: Vec<BigRational>, var: &str) -> Self {
        let mut poly = Polynomial {
            coeffs,
            var: var.to_string(),
        };
        poly.trim();
        poly
    }

    pub fn zero(var: &str) -> Self {
        Polynomial::new(vec![], var)
    }

    pub fn one(var: &str) -> Self {
        Polynomial::new(vec![BigRational::one()], var)
    }

    pub fn constant(c: BigRational, var: &str) -> Self {
        Polynomial::new(vec![c], var)
    }

    /// `c·var^power`
    pub fn monomial(c: BigRational, power: usize, var: &str) -> Self {
        let mut coeffs = vec![BigRational::zero(); power + 1];
        coeffs[power] = c;
        Polynomial::new(coeffs, var)
    }

    fn trim(&mut self) {
        while self.coeffs.last().is_some_and(Zero::is_zero) {
            self.coeffs.pop();
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, with the zero polynomial reported as 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeff(&self, power: usize) -> BigRational {
        self.coeffs.get(power).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn leading_coeff(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    /// Builds the polynomial for `expr` in `var`, or `None` when `expr` is
    /// not polynomial in `var` (other variables, functions, constants,
    /// negative or symbolic powers, division by a non-constant).
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        match expr {
            Expr::Number(n) => Some(Polynomial::constant(n.clone(), var)),
            Expr::Variable(v) if v == var => Some(Polynomial::monomial(BigRational::one(), 1, var)),
            Expr::Variable(_) | Expr::Constant(_) | Expr::Function(_, _) => None,
            Expr::Add(l, r) => {
                let p1 = Polynomial::from_expr(l, var)?;
                let p2 = Polynomial::from_expr(r, var)?;
                Some(p1.add(&p2))
            }
            Expr::Sub(l, r) => {
                let p1 = Polynomial::from_expr(l, var)?;
                let p2 = Polynomial::from_expr(r, var)?;
                Some(p1.sub(&p2))
            }
            Expr::Mul(l, r) => {
                let p1 = Polynomial::from_expr(l, var)?;
                let p2 = Polynomial::from_expr(r, var)?;
                let product = p1.mul(&p2);
                (product.degree() <= MAX_EXPANDED_DEGREE).then_some(product)
            }
            Expr::Div(l, r) => {
                let p = Polynomial::from_expr(l, var)?;
                let divisor = Polynomial::from_expr(r, var)?;
                if divisor.degree() > 0 || divisor.is_zero() {
                    return None;
                }
                Some(p.scale(&divisor.leading_coeff().recip()))
            }
            Expr::Pow(base, exp) => {
                let n = exp.as_number()?;
                if !n.is_integer() || n.is_negative() {
                    return None;
                }
                let p_base = Polynomial::from_expr(base, var)?;
                if p_base.degree() == 0 {
                    let folded = exact_pow(p_base.coeff(0), n.to_integer()).ok()??;
                    return Some(Polynomial::constant(folded, var));
                }
                let n = n.to_integer().to_usize()?;
                if n > MAX_EXPANDED_DEGREE || p_base.degree().saturating_mul(n) > MAX_EXPANDED_DEGREE {
                    return None;
                }
                let mut res = Polynomial::one(var);
                for _ in 0..n {
                    res = res.mul(&p_base);
                }
                Some(res)
            }
            Expr::Neg(e) => Some(Polynomial::from_expr(e, var)?.neg()),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = max(self.coeffs.len(), other.coeffs.len());
        let coeffs = (0..len).map(|i| self.coeff(i) + other.coeff(i)).collect();
        Polynomial::new(coeffs, &self.var)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let len = max(self.coeffs.len(), other.coeffs.len());
        let coeffs = (0..len).map(|i| self.coeff(i) - other.coeff(i)).collect();
        Polynomial::new(coeffs, &self.var)
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero(&self.var);
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, c1) in self.coeffs.iter().enumerate() {
            for (j, c2) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += c1 * c2;
            }
        }
        Polynomial::new(coeffs, &self.var)
    }

    pub fn neg(&self) -> Self {
        Polynomial::new(self.coeffs.iter().map(|c| -c).collect(), &self.var)
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect(), &self.var)
    }

    /// Power rule applied term by term.
    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
            .collect();
        Polynomial::new(coeffs, &self.var)
    }

    /// Reverse power rule with a zero constant of integration.
    pub fn antiderivative(&self) -> Self {
        let mut coeffs = vec![BigRational::zero()];
        coeffs.extend(
            self.coeffs
                .iter()
                .enumerate()
                .map(|(i, c)| c / BigRational::from_integer(BigInt::from(i + 1))),
        );
        Polynomial::new(coeffs, &self.var)
    }

    /// Horner evaluation at an exact point.
    pub fn eval(&self, at: &BigRational) -> BigRational {
        self.coeffs
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * at + c)
    }

    /// Non-zero terms from the highest power down, as `(coeff, power)`.
    pub fn terms(&self) -> impl Iterator<Item = (&BigRational, usize)> {
        self.coeffs
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, c)| !c.is_zero())
            .map(|(i, c)| (c, i))
    }
}

/// Renders one term without its sign: `3x^2`, `x`, `(1/2)x`, `7`.
pub fn format_unsigned_term(coeff: &BigRational, power: usize, var: &str) -> String {
    let magnitude = coeff.abs();
    let var_part = match power {
        0 => String::new(),
        1 => var.to_string(),
        n => format!("{}^{}", var, n),
    };
    if power == 0 {
        return format_rational(&magnitude);
    }
    if magnitude.is_one() {
        var_part
    } else if magnitude.is_integer() {
        format!("{}{}", magnitude, var_part)
    } else {
        format!("({}){}", format_rational(&magnitude), var_part)
    }
}

/// Renders one signed term on its own: `-3x^2`.
pub fn format_term(coeff: &BigRational, power: usize, var: &str) -> String {
    let body = format_unsigned_term(coeff, power, var);
    if coeff.is_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

impl fmt::Display for Polynomial {
    /// `3x^2 + 4x - 5`; the zero polynomial prints as `0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (k, (c, power)) in self.terms().enumerate() {
            let body = format_unsigned_term(c, power, &self.var);
            match (k, c.is_negative()) {
                (0, true) => write!(f, "-{}", body)?,
                (0, false) => write!(f, "{}", body)?,
                (_, true) => write!(f, " - {}", body)?,
                (_, false) => write!(f, " + {}", body)?,
            }
        }
        Ok(())
    }
}

/// Highest literal power of `var` written in `expr`, before any collection.
///
/// `x^2 - x^2 + x` reports 2 here while its polynomial has degree 1.
pub fn syntactic_degree(expr: &Expr, var: &str) -> Option<usize> {
    match expr {
        Expr::Number(_) | Expr::Constant(_) => Some(0),
        Expr::Variable(v) => Some(usize::from(v == var)),
        Expr::Add(l, r) | Expr::Sub(l, r) => {
            Some(max(syntactic_degree(l, var)?, syntactic_degree(r, var)?))
        }
        Expr::Mul(l, r) => Some(syntactic_degree(l, var)? + syntactic_degree(r, var)?),
        Expr::Div(l, r) => {
            if r.contains_var(var) {
                None
            } else {
                syntactic_degree(l, var)
            }
        }
        Expr::Pow(base, exp) => {
            let n = exp.as_number()?;
            if !n.is_integer() || n.is_negative() {
                return None;
            }
            let n = n.to_integer().to_usize()?;
            syntactic_degree(base, var)?.checked_mul(n)
        }
        Expr::Neg(e) => syntactic_degree(e, var),
        Expr::Function(_, args) => {
            if args.iter().any(|a| a.contains_var(var)) {
                None
            } else {
                Some(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_parser::parse;

    fn poly(input: &str) -> Polynomial {
        Polynomial::from_expr(&parse(input).unwrap(), "x").unwrap()
    }

    fn int(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_from_expr_collects_like_terms() {
        let p = poly("2x + 3x");
        assert_eq!(p.coeffs, vec![int(0), int(5)]);
        let p = poly("(x + 1)^2");
        assert_eq!(p.coeffs, vec![int(1), int(2), int(1)]);
        let p = poly("x^3 / 3");
        assert_eq!(p.leading_coeff(), BigRational::new(1.into(), 3.into()));
    }

    #[test]
    fn test_from_expr_rejects_non_polynomials() {
        for input in ["sin(x)", "1 / x", "x^-1", "x^y", "2 * pi * x", "y + 1"] {
            let expr = parse(input).unwrap();
            assert!(Polynomial::from_expr(&expr, "x").is_none(), "{}", input);
        }
    }

    #[test]
    fn test_constant_powers_fold_within_budget() {
        assert_eq!(poly("2^3 * x").coeffs, vec![int(0), int(8)]);
        assert_eq!(poly("x^0"), Polynomial::one("x"));
        for input in ["2^50000000 * x", "(9^256)^256 * x", "(x + 1)^100"] {
            let expr = parse(input).unwrap();
            assert!(Polynomial::from_expr(&expr, "x").is_none(), "{}", input);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(poly("3x^2 + 4x - 5").to_string(), "3x^2 + 4x - 5");
        assert_eq!(poly("-x + 1").to_string(), "-x + 1");
        assert_eq!(poly("x - x").to_string(), "0");
        assert_eq!(poly("x^2 / 2").to_string(), "(1/2)x^2");
    }

    #[test]
    fn test_derivative_and_antiderivative() {
        assert_eq!(poly("x^3").derivative().to_string(), "3x^2");
        assert_eq!(poly("x^2").derivative().to_string(), "2x");
        assert_eq!(poly("x^3 + 2x^2 - 5x + 1").derivative().to_string(), "3x^2 + 4x - 5");
        assert_eq!(poly("7").derivative().to_string(), "0");
        assert_eq!(poly("3x^2 - 4x + 5").antiderivative().to_string(), "x^3 - 2x^2 + 5x");
    }

    #[test]
    fn test_eval() {
        let p = poly("x^2 - 5x + 6");
        assert!(p.eval(&int(2)).is_zero());
        assert!(p.eval(&int(3)).is_zero());
        assert_eq!(p.eval(&int(0)), int(6));
    }

    #[test]
    fn test_format_term() {
        assert_eq!(format_term(&int(-3), 2, "x"), "-3x^2");
        assert_eq!(format_term(&int(1), 1, "y"), "y");
        assert_eq!(format_term(&int(-7), 0, "x"), "-7");
    }

    #[test]
    fn test_syntactic_degree() {
        let d = |s: &str| syntactic_degree(&parse(s).unwrap(), "x");
        assert_eq!(d("x^2 - x^2 + x"), Some(2));
        assert_eq!(d("2x + 5"), Some(1));
        assert_eq!(d("3 * x * (x + 1)"), Some(2));
        assert_eq!(d("1 / x"), None);
        assert_eq!(d("sin(x)"), None);
        assert_eq!(d("13"), Some(0));
    }
}
