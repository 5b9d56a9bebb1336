use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(Rc<Expr>, Rc<Expr>),
    Sub(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    Div(Rc<Expr>, Rc<Expr>),
    Pow(Rc<Expr>, Rc<Expr>),
    Neg(Rc<Expr>),
    Function(String, Vec<Rc<Expr>>), // e.g., sin(x), sqrt(x), log(x)
}

impl Expr {
    // Helper constructors for cleaner code
    pub fn num(n: i64) -> Rc<Self> {
        Rc::new(Expr::Number(BigRational::from_integer(BigInt::from(n))))
    }

    pub fn rational(q: BigRational) -> Rc<Self> {
        Rc::new(Expr::Number(q))
    }

    pub fn var(name: &str) -> Rc<Self> {
        Rc::new(Expr::Variable(name.to_string()))
    }

    pub fn add(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Add(lhs, rhs))
    }

    pub fn sub(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Sub(lhs, rhs))
    }

    pub fn mul(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Mul(lhs, rhs))
    }

    pub fn div(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Div(lhs, rhs))
    }

    pub fn pow(base: Rc<Expr>, exp: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Pow(base, exp))
    }

    pub fn neg(expr: Rc<Expr>) -> Rc<Self> {
        Rc::new(Expr::Neg(expr))
    }

    pub fn func(name: &str, args: Vec<Rc<Expr>>) -> Rc<Self> {
        Rc::new(Expr::Function(name.to_string(), args))
    }
}

impl Expr {
    /// Literal rational value, looking through negation.
    pub fn as_number(&self) -> Option<BigRational> {
        match self {
            Expr::Number(n) => Some(n.clone()),
            Expr::Neg(inner) => inner.as_number().map(|n| -n),
            _ => None,
        }
    }

    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(v) => v == var,
            Expr::Number(_) | Expr::Constant(_) => false,
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.contains_var(var) || r.contains_var(var)
            }
            Expr::Neg(e) => e.contains_var(var),
            Expr::Function(_, args) => args.iter().any(|a| a.contains_var(var)),
        }
    }

    /// Names of every variable in the tree, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Variable(v) => {
                out.insert(v.clone());
            }
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.collect_variables(out);
                r.collect_variables(out);
            }
            Expr::Neg(e) => e.collect_variables(out),
            Expr::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Number of calls to any of `names` anywhere in the tree.
    pub fn count_calls(&self, names: &[&str]) -> usize {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => 0,
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.count_calls(names) + r.count_calls(names)
            }
            Expr::Neg(e) => e.count_calls(names),
            Expr::Function(name, args) => {
                let own = usize::from(names.contains(&name.as_str()));
                own + args.iter().map(|a| a.count_calls(names)).sum::<usize>()
            }
        }
    }

    /// First call to any of `names`, in pre-order.
    pub fn find_call(&self, names: &[&str]) -> Option<&Expr> {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => None,
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.find_call(names).or_else(|| r.find_call(names))
            }
            Expr::Neg(e) => e.find_call(names),
            Expr::Function(name, args) => {
                if names.contains(&name.as_str()) {
                    Some(self)
                } else {
                    args.iter().find_map(|a| a.find_call(names))
                }
            }
        }
    }
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(_, _) | Expr::Sub(_, _) => 1,
            Expr::Mul(_, _) | Expr::Div(_, _) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(_, _) => 4,
            Expr::Number(n) if n.is_negative() || !n.is_integer() => 3,
            Expr::Function(_, _) | Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => 5,
        }
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, e: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let my_prec = self.precedence();
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Constant(c) => write!(f, "{}", c.name()),
            Expr::Variable(s) => write!(f, "{}", s),
            Expr::Add(l, r) => {
                write_side(f, l, l.precedence() < my_prec)?;
                write!(f, " + ")?;
                write_side(f, r, r.precedence() < my_prec)
            }
            // Subtraction and division are left-associative: a - (b - c) keeps its parens.
            Expr::Sub(l, r) => {
                write_side(f, l, l.precedence() < my_prec)?;
                write!(f, " - ")?;
                write_side(f, r, r.precedence() <= my_prec)
            }
            Expr::Mul(l, r) => {
                write_side(f, l, l.precedence() < my_prec)?;
                write!(f, " * ")?;
                write_side(f, r, r.precedence() < my_prec)
            }
            Expr::Div(l, r) => {
                write_side(f, l, l.precedence() < my_prec)?;
                write!(f, " / ")?;
                write_side(f, r, r.precedence() <= my_prec)
            }
            // Power is right-associative, so the base needs parens at equal precedence.
            Expr::Pow(b, e) => {
                write_side(f, b, b.precedence() <= my_prec)?;
                write!(f, "^")?;
                write_side(f, e, e.precedence() < my_prec)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                write_side(f, e, e.precedence() < my_prec)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = Expr::add(Expr::num(1), Expr::mul(Expr::var("x"), Expr::num(2)));
        assert_eq!(format!("{}", e), "1 + x * 2");
    }

    #[test]
    fn test_display_precedence() {
        // (1 + x) * 2
        let e = Expr::mul(Expr::add(Expr::num(1), Expr::var("x")), Expr::num(2));
        assert_eq!(format!("{}", e), "(1 + x) * 2");

        // a - (b - c)
        let e = Expr::sub(Expr::var("a"), Expr::sub(Expr::var("b"), Expr::var("c")));
        assert_eq!(format!("{}", e), "a - (b - c)");

        // (x^2)^3 and x^(2^3)
        let inner = Expr::pow(Expr::var("x"), Expr::num(2));
        assert_eq!(format!("{}", Expr::pow(inner.clone(), Expr::num(3))), "(x^2)^3");
        let e = Expr::pow(Expr::var("x"), Expr::pow(Expr::num(2), Expr::num(3)));
        assert_eq!(format!("{}", e), "x^2^3");
    }

    #[test]
    fn test_display_negative_base() {
        let e = Expr::pow(Expr::num(-2), Expr::num(2));
        assert_eq!(format!("{}", e), "(-2)^2");
        let e = Expr::pow(Expr::neg(Expr::var("x")), Expr::num(2));
        assert_eq!(format!("{}", e), "(-x)^2");
    }

    #[test]
    fn test_display_function() {
        let pi = Rc::new(Expr::Constant(Constant::Pi));
        let e = Expr::func("sin", vec![Expr::div(pi, Expr::num(6))]);
        assert_eq!(format!("{}", e), "sin(pi / 6)");
    }

    #[test]
    fn test_variables_and_calls() {
        let e = Expr::add(
            Expr::mul(Expr::num(2), Expr::func("sin", vec![Expr::var("x")])),
            Expr::func("cos", vec![Expr::var("y")]),
        );
        let vars: Vec<String> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
        assert!(e.contains_var("y"));
        assert!(!e.contains_var("z"));
        assert_eq!(e.count_calls(&["sin", "cos"]), 2);
        assert!(matches!(e.find_call(&["cos"]), Some(Expr::Function(name, _)) if name == "cos"));
    }

    #[test]
    fn test_as_number_through_negation() {
        let e = Expr::neg(Expr::num(3));
        assert_eq!(e.as_number(), Some(BigRational::from_integer(BigInt::from(-3))));
        assert!(Expr::var("x").as_number().is_none());
    }
}
