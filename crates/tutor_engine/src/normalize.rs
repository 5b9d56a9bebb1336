//! Canonicalizes free-form questions into solver-friendly text.
//!
//! `normalize` is total and idempotent: running it on its own output changes
//! nothing.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tutor_parser::is_known_function;

/// Single glyph substitutions, applied in order.
const GLYPHS: &[(&str, &str)] = &[
    ("×", "*"),
    ("·", "*"),
    ("÷", "/"),
    ("−", "-"),
    ("**", "^"),
    ("²", "^2"),
    ("³", "^3"),
    ("π", "pi"),
    ("θ", "theta"),
    ("α", "alpha"),
    ("β", "beta"),
    ("γ", "gamma"),
    ("δ", "delta"),
    ("φ", "phi"),
    ("λ", "lambda"),
    ("μ", "mu"),
    ("σ", "sigma"),
    ("ω", "omega"),
];

static FILLER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:hitung|berapa|selesaikan|tentukan|jelaskan|carilah)\b")
        .expect("valid regex literal")
});

static SQRT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"√\s*(\d+(?:\.\d+)?)").expect("valid regex literal"));

static SQRT_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"√\s*([A-Za-z])([^A-Za-z0-9_(]|$)").expect("valid regex literal")
});

static DEGREES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)(?:\s*(?:°|(?i:derajat)\b))+").expect("valid regex literal")
});

static RADIAN_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?) \* pi / 180").expect("valid regex literal")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex literal"));

pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_string();
    for (from, to) in GLYPHS {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }

    // Question marks go before filler removal so "hit?ung" cannot survive one pass.
    text = text.replace('?', " ");
    text = FILLER_WORDS.replace_all(&text, " ").into_owned();

    text = SQRT_NUMBER.replace_all(&text, "sqrt(${1})").into_owned();
    text = SQRT_LETTER.replace_all(&text, "sqrt(${1})${2}").into_owned();
    text = text.replace('√', "sqrt");

    text = DEGREES.replace_all(&text, "${1} * pi / 180").into_owned();

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Whether the original text marks an angle in degrees.
pub fn has_degree_marker(raw: &str) -> bool {
    DEGREES.is_match(raw)
}

/// An angle the normalizer rewrote from degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeAngle {
    pub degrees: f64,
    /// Byte range of the `<n> * pi / 180` form in the normalized text.
    pub span: Range<usize>,
}

/// Every `<n> * pi / 180` angle in normalized text, left to right.
pub fn degree_angles(normalized: &str) -> Vec<DegreeAngle> {
    RADIAN_FORM
        .captures_iter(normalized)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let degrees = caps[1].parse::<f64>().ok()?;
            Some(DegreeAngle {
                degrees,
                span: whole.range(),
            })
        })
        .collect()
}

fn is_known_name(word: &str) -> bool {
    is_known_function(word) || word == "pi" || word == "e"
}

fn is_prose_token(token: &str) -> bool {
    let word = token.trim_end_matches([':', ',', '.', ';']);
    word.chars().count() >= 2 && word.chars().all(char::is_alphabetic) && !is_known_name(word)
}

/// Strips the prose around the mathematical part of a normalized question:
/// leading and trailing words, and a trailing `, x` style question tail.
pub fn math_segment(text: &str) -> String {
    let mut text = text.trim();
    if let Some((head, tail)) = text.rsplit_once(',') {
        let tail_is_math = tail
            .chars()
            .any(|c| c.is_ascii_digit() || "=+-*/^()".contains(c));
        if !tail_is_math {
            text = head.trim();
        }
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let start = tokens
        .iter()
        .position(|t| !is_prose_token(t))
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !is_prose_token(t))
        .map_or(start, |i| i + 1);

    tokens[start..end.max(start)]
        .join(" ")
        .trim_end_matches(['.', ',', ';'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_glyphs_and_collapses_whitespace() {
        assert_eq!(normalize("  15 +   27 × 3 "), "15 + 27 * 3");
        assert_eq!(normalize("(15 + 25) ÷ 2"), "(15 + 25) / 2");
        assert_eq!(normalize("x² − 4"), "x^2 - 4");
        assert_eq!(normalize("2πr"), "2pir");
        assert_eq!(normalize("sin θ"), "sin theta");
    }

    #[test]
    fn wraps_square_root_operands() {
        assert_eq!(normalize("√16"), "sqrt(16)");
        assert_eq!(normalize("√x + 1"), "sqrt(x) + 1");
        assert_eq!(normalize("√(x+1)"), "sqrt(x+1)");
        assert_eq!(normalize("5² + √16"), "5^2 + sqrt(16)");
    }

    #[test]
    fn converts_degrees() {
        assert_eq!(normalize("sin(30°)"), "sin(30 * pi / 180)");
        assert_eq!(normalize("sin(30 derajat)"), "sin(30 * pi / 180)");
        assert_eq!(normalize("cos 45 Derajat"), "cos 45 * pi / 180");
    }

    #[test]
    fn repeated_degree_markers_convert_once() {
        assert_eq!(normalize("sin(30° derajat)"), "sin(30 * pi / 180)");
        assert_eq!(normalize("30 ° °"), "30 * pi / 180");
        let once = normalize("sin(30° derajat)");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn removes_filler_words_and_question_marks() {
        assert_eq!(normalize("berapa 1 + 1?"), "1 + 1");
        assert_eq!(normalize("Hitung 2 × 3"), "2 * 3");
        assert_eq!(normalize("5^2 berapa?"), "5^2");
        assert_eq!(normalize("Carilah nilai x"), "nilai x");
        // Function names are left alone
        assert_eq!(normalize("hitung sin(0)"), "sin(0)");
    }

    #[test]
    fn normalize_is_idempotent_on_samples() {
        let samples = [
            "Berapa hasil dari 5² + √16?",
            "Hitung sin(30°) + cos(60°)",
            "Sebuah gaya 50 N membentuk sudut 30° dengan sumbu x",
            "hit?ung 30 hitung derajat",
            "√x√y",
            "Turunan dari f(x) = x³ + 2x² - 5x + 1",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn degree_marker_detection() {
        assert!(has_degree_marker("sin(30°)"));
        assert!(has_degree_marker("sin 30 derajat"));
        assert!(!has_degree_marker("sin(pi / 6)"));
    }

    #[test]
    fn finds_converted_angles() {
        let text = normalize("Gaya 100 N sudut 45°, lalu 30.5 derajat");
        let angles = degree_angles(&text);
        assert_eq!(angles.len(), 2);
        assert_eq!(angles[0].degrees, 45.0);
        assert_eq!(&text[angles[0].span.clone()], "45 * pi / 180");
        assert_eq!(angles[1].degrees, 30.5);
        assert!(degree_angles("sin(pi / 6)").is_empty());
    }

    #[test]
    fn extracts_math_segment() {
        assert_eq!(math_segment("persamaan: 2x + 5 = 13"), "2x + 5 = 13");
        assert_eq!(math_segment("hasil dari 5^2 + sqrt(16)"), "5^2 + sqrt(16)");
        assert_eq!(math_segment("Jika 2x + 5 = 13, x"), "2x + 5 = 13");
        assert_eq!(math_segment("sin(30 * pi / 180) saja"), "sin(30 * pi / 180)");
        assert_eq!(math_segment("log(2, 8)"), "log(2, 8)");
        assert_eq!(math_segment("halo semua"), "");
    }
}
