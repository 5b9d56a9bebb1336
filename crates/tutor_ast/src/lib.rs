pub mod expression;
pub use expression::{Constant, Expr};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Rc<Expr>, // Left Hand Side
    pub rhs: Rc<Expr>, // Right Hand Side
}

impl Equation {
    pub fn new(lhs: Rc<Expr>, rhs: Rc<Expr>) -> Self {
        Self { lhs, rhs }
    }

    pub fn contains_var(&self, var: &str) -> bool {
        self.lhs.contains_var(var) || self.rhs.contains_var(var)
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
