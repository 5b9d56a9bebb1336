//! Formatting and evaluation knobs for the solving pipeline.

/// Options threaded through every strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Decimal places for trigonometric values.
    pub trig_decimals: usize,
    /// Decimal places for physics quantities.
    pub physics_decimals: usize,
    /// Decimal places for every other non-integer value.
    pub general_decimals: usize,
    /// Point at which an identified `f(x)` is sampled by the manual parser.
    pub sample_point: i64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            trig_decimals: 6,
            physics_decimals: 2,
            general_decimals: 6,
            sample_point: 1,
        }
    }
}
