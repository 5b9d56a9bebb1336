//! Planar vector decomposition and resultants of forces.

use regex::Regex;
use std::sync::LazyLock;

use super::{Outcome, Problem, SolverStrategy};
use crate::error::SolveError;
use crate::eval::{format_fixed, format_number};
use crate::normalize::{degree_angles, DegreeAngle};
use crate::options::SolveOptions;
use crate::solution::Step;

static TAGGED_MAGNITUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:N|(?i:newton))\b").expect("valid regex literal")
});

static PLAIN_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_./^])(\d+(?:\.\d+)?)").expect("valid regex literal")
});

static FORCE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:gaya|force|newton)|\bN\b").expect("valid regex literal"));

static VELOCITY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)kecepatan|velocity|m/s(?:[^2²^]|$)").expect("valid regex literal")
});

static ACCELERATION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)percepatan|acceleration|m/s(?:2|²|\^2)").expect("valid regex literal")
});

static MASS_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)massa|mass|\bkg\b").expect("valid regex literal"));

/// Unit of the quantity being decomposed, chosen by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Force,
    Velocity,
    Acceleration,
    Mass,
    Unitless,
}

impl Quantity {
    /// First keyword family found in the original text wins.
    pub fn detect(original: &str) -> Self {
        if FORCE_WORDS.is_match(original) {
            Quantity::Force
        } else if VELOCITY_WORDS.is_match(original) {
            Quantity::Velocity
        } else if ACCELERATION_WORDS.is_match(original) {
            Quantity::Acceleration
        } else if MASS_WORDS.is_match(original) {
            Quantity::Mass
        } else {
            Quantity::Unitless
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Force => "N",
            Quantity::Velocity => "m/s",
            Quantity::Acceleration => "m/s²",
            Quantity::Mass => "kg",
            Quantity::Unitless => "",
        }
    }
}

/// `(F·cos θ, F·sin θ)` for an angle in degrees.
pub fn decompose(magnitude: f64, angle_deg: f64) -> (f64, f64) {
    let theta = angle_deg.to_radians();
    (magnitude * theta.cos(), magnitude * theta.sin())
}

/// Eight-point compass name for a direction measured from the positive x-axis.
pub fn compass(angle_deg: f64) -> &'static str {
    match angle_deg {
        a if (-22.5..22.5).contains(&a) => "Timur",
        a if (22.5..67.5).contains(&a) => "Timur Laut",
        a if (67.5..112.5).contains(&a) => "Utara",
        a if (112.5..157.5).contains(&a) => "Barat Laut",
        a if a >= 157.5 || a < -157.5 => "Barat",
        a if (-157.5..-112.5).contains(&a) => "Barat Daya",
        a if (-112.5..-67.5).contains(&a) => "Selatan",
        _ => "Tenggara",
    }
}

pub struct VectorStrategy;

impl SolverStrategy for VectorStrategy {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn apply(&self, problem: &Problem<'_>, opts: &SolveOptions) -> Option<Result<Outcome, SolveError>> {
        Some(solve(problem, opts))
    }
}

fn magnitudes(normalized: &str, angles: &[DegreeAngle]) -> Vec<f64> {
    let mut masked = normalized.to_string();
    for angle in angles {
        masked.replace_range(angle.span.clone(), &" ".repeat(angle.span.len()));
    }
    let tagged: Vec<f64> = TAGGED_MAGNITUDE
        .captures_iter(&masked)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    if !tagged.is_empty() {
        return tagged;
    }
    PLAIN_NUMBER
        .captures_iter(&masked)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

struct Formatter {
    decimals: usize,
    unit: &'static str,
}

impl Formatter {
    fn value(&self, v: f64) -> String {
        format_fixed(v, self.decimals)
    }

    fn with_unit(&self, v: f64) -> String {
        if self.unit.is_empty() {
            self.value(v)
        } else {
            format!("{} {}", self.value(v), self.unit)
        }
    }

    fn term(&self, v: f64) -> String {
        let text = self.value(v);
        if text.starts_with('-') {
            format!("({})", text)
        } else {
            text
        }
    }

    fn plain(&self, v: f64) -> String {
        format_number(v, self.decimals)
    }
}

fn solve(problem: &Problem<'_>, opts: &SolveOptions) -> Result<Outcome, SolveError> {
    let angles = degree_angles(problem.normalized);
    let forces = magnitudes(problem.normalized, &angles);
    if forces.is_empty() {
        return Err(SolveError::UnrecognizedForm("no magnitude found".to_string()));
    }
    if angles.is_empty() {
        return Err(SolveError::UnrecognizedForm("no angle found".to_string()));
    }
    let fmt = Formatter {
        decimals: opts.physics_decimals,
        unit: Quantity::detect(problem.original).unit(),
    };
    tracing::debug!(target: "solver", forces = forces.len(), angles = angles.len(), unit = fmt.unit, "vector problem");

    if let [magnitude] = forces.as_slice() {
        return Ok(single(*magnitude, angles[0].degrees, &fmt));
    }

    let mut directions: Vec<f64> = angles.iter().map(|a| a.degrees).collect();
    if directions.len() + 1 == forces.len() {
        directions.insert(0, 0.0);
    }
    if directions.len() != forces.len() {
        return Err(SolveError::UnrecognizedForm(format!(
            "{} magnitudes but {} angles",
            forces.len(),
            angles.len()
        )));
    }
    Ok(resultant(&forces, &directions, &fmt))
}

fn single(magnitude: f64, angle: f64, fmt: &Formatter) -> Outcome {
    let (fx, fy) = decompose(magnitude, angle);
    let (m, a) = (fmt.plain(magnitude), fmt.plain(angle));
    let steps = vec![
        Step::with_result(
            format!("Fx = F·cos θ = {}·cos({}°) = {}", m, a, fmt.with_unit(fx)),
            "Komponen horizontal (sumbu x)",
            fmt.with_unit(fx),
        ),
        Step::with_result(
            format!("Fy = F·sin θ = {}·sin({}°) = {}", m, a, fmt.with_unit(fy)),
            "Komponen vertikal (sumbu y)",
            fmt.with_unit(fy),
        ),
    ];
    Outcome::new(
        format!("Fx = {}, Fy = {}", fmt.with_unit(fx), fmt.with_unit(fy)),
        steps,
    )
}

fn resultant(forces: &[f64], directions: &[f64], fmt: &Formatter) -> Outcome {
    let mut steps = Vec::with_capacity(forces.len() + 3);
    let mut components = Vec::with_capacity(forces.len());
    for (i, (&magnitude, &angle)) in forces.iter().zip(directions).enumerate() {
        let (fx, fy) = decompose(magnitude, angle);
        let (m, a) = (fmt.plain(magnitude), fmt.plain(angle));
        let n = i + 1;
        steps.push(Step::new(
            format!(
                "F{n}x = {m}·cos({a}°) = {}, F{n}y = {m}·sin({a}°) = {}",
                fmt.with_unit(fx),
                fmt.with_unit(fy),
            ),
            format!("Komponen gaya ke-{}", n),
        ));
        components.push((fx, fy));
    }

    let sum_x: f64 = components.iter().map(|c| c.0).sum();
    let sum_y: f64 = components.iter().map(|c| c.1).sum();
    let join = |values: Vec<f64>| {
        values
            .into_iter()
            .map(|v| fmt.term(v))
            .collect::<Vec<_>>()
            .join(" + ")
    };
    steps.push(Step::new(
        format!(
            "ΣFx = {} = {}, ΣFy = {} = {}",
            join(components.iter().map(|c| c.0).collect()),
            fmt.with_unit(sum_x),
            join(components.iter().map(|c| c.1).collect()),
            fmt.with_unit(sum_y)
        ),
        "Jumlahkan komponen pada sumbu yang sama",
    ));

    let r = sum_x.hypot(sum_y);
    steps.push(Step::with_result(
        format!(
            "R = √(ΣFx² + ΣFy²) = √({}² + {}²) = {}",
            fmt.term(sum_x),
            fmt.term(sum_y),
            fmt.with_unit(r)
        ),
        "Besar resultan",
        fmt.with_unit(r),
    ));

    if fmt.value(r).trim_start_matches(['0', '.']).is_empty() {
        return Outcome::new(format!("R = {}", fmt.with_unit(r)), steps);
    }

    let direction = sum_y.atan2(sum_x).to_degrees();
    let heading = compass(direction);
    steps.push(Step::with_result(
        format!(
            "θ = tan⁻¹(ΣFy / ΣFx) = {}° ({})",
            fmt.value(direction),
            heading
        ),
        "Arah resultan diukur dari sumbu x positif",
        format!("{}°", fmt.value(direction)),
    ));
    Outcome::new(
        format!(
            "R = {}, θ = {}° ({})",
            fmt.with_unit(r),
            fmt.value(direction),
            heading
        ),
        steps,
    )
}
