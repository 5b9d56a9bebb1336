//! Ordered rule table assigning exactly one [`Category`] to normalized text.

use regex::Regex;
use std::sync::LazyLock;
use tutor_parser::{is_known_function, TRIG_FUNCTIONS};

use crate::solution::Category;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid regex literal"));

static FUNCTION_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])[A-Za-z]\s*\(\s*[A-Za-z]\s*\)\s*$").expect("valid regex literal")
});

const CALCULUS_MARKERS: &[&str] = &["turunan", "derivative", "antiturunan", "integral", "∫", "d/dx"];

const PHYSICS_WORDS: &[&str] = &[
    "gaya",
    "force",
    "vektor",
    "vector",
    "komponen",
    "component",
    "resultan",
    "resultant",
    "newton",
];

/// Facts about the text computed once and shared by every rule.
struct Features<'a> {
    text: &'a str,
    lower: String,
    words: Vec<&'a str>,
}

impl<'a> Features<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
            words: WORD.find_iter(text).map(|m| m.as_str()).collect(),
        }
    }

    fn has_digit(&self) -> bool {
        self.text.chars().any(|c| c.is_ascii_digit())
    }

    fn has_operator(&self) -> bool {
        self.text.chars().any(|c| "+-*/^=".contains(c))
    }
}

fn is_single_letter_variable(word: &str) -> bool {
    word.len() == 1 && word != "e" && word != "_"
}

fn has_single_letter_variable(text: &str) -> bool {
    WORD.find_iter(text)
        .any(|m| is_single_letter_variable(m.as_str()))
}

fn is_pure_numeral(side: &str) -> bool {
    let side = side.trim();
    !side.is_empty() && side.parse::<f64>().is_ok()
}

/// `=` with a single-letter variable on a non-numeral side. A function
/// definition head such as `f(x) =` is not an equation to solve.
fn rule_equation(f: &Features<'_>) -> bool {
    let Some((lhs, rhs)) = f.text.split_once('=') else {
        return false;
    };
    if FUNCTION_DEFINITION.is_match(lhs) {
        return false;
    }
    [lhs, rhs]
        .iter()
        .any(|side| !is_pure_numeral(side) && has_single_letter_variable(side))
}

fn rule_calculus(f: &Features<'_>) -> bool {
    CALCULUS_MARKERS.iter().any(|m| f.lower.contains(m))
}

fn rule_trigonometry(f: &Features<'_>) -> bool {
    f.words.iter().any(|w| TRIG_FUNCTIONS.contains(&w.to_lowercase().as_str()))
}

fn rule_physics(f: &Features<'_>) -> bool {
    f.words
        .iter()
        .any(|w| PHYSICS_WORDS.contains(&w.to_lowercase().as_str()))
}

fn rule_free_variable(f: &Features<'_>) -> bool {
    f.words.iter().any(|w| is_single_letter_variable(w)) && (f.has_digit() || f.has_operator())
}

fn rule_arithmetic(f: &Features<'_>) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "+-*/^!%.,()[]|".contains(c);
    let only_math_chars = f
        .text
        .chars()
        .all(|c| allowed(c) || c.is_ascii_alphabetic() || c == '_');
    let only_known_names = f
        .words
        .iter()
        .all(|w| is_known_function(w) || *w == "pi" || *w == "e");
    f.has_digit() && only_math_chars && only_known_names
}

struct ClassifierRule {
    name: &'static str,
    category: Category,
    matches: fn(&Features<'_>) -> bool,
}

/// Evaluated top to bottom; the first match wins.
const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "equation",
        category: Category::Algebra,
        matches: rule_equation,
    },
    ClassifierRule {
        name: "calculus-marker",
        category: Category::Calculus,
        matches: rule_calculus,
    },
    ClassifierRule {
        name: "trig-function",
        category: Category::Trigonometry,
        matches: rule_trigonometry,
    },
    ClassifierRule {
        name: "physics-vocabulary",
        category: Category::Physics,
        matches: rule_physics,
    },
    ClassifierRule {
        name: "free-variable",
        category: Category::Algebra,
        matches: rule_free_variable,
    },
    ClassifierRule {
        name: "arithmetic",
        category: Category::Arithmetic,
        matches: rule_arithmetic,
    },
];

pub fn classify(normalized: &str) -> Category {
    let features = Features::new(normalized);
    let hit = RULES.iter().find(|rule| (rule.matches)(&features));
    let category = hit.map_or(Category::Conversation, |rule| rule.category);
    tracing::debug!(
        target: "classify",
        rule = hit.map_or("fallthrough", |rule| rule.name),
        category = %category,
        "classified"
    );
    category
}
