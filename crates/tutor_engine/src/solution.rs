use serde::Serialize;
use std::fmt;
use tutor_api_models::{SolutionJson, StepJson, SCHEMA_VERSION};

/// Answer given when every strategy, including the fallbacks, failed.
pub const APOLOGY: &str = "Maaf, soal ini terlalu kompleks untuk engine saat ini. Coba sederhanakan atau bagi menjadi beberapa langkah.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Arithmetic,
    Algebra,
    Trigonometry,
    Calculus,
    Physics,
    Conversation,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Arithmetic => "arithmetic",
            Category::Algebra => "algebra",
            Category::Trigonometry => "trigonometry",
            Category::Calculus => "calculus",
            Category::Physics => "physics",
            Category::Conversation => "conversation",
        }
    }

    /// Maps a label written by an external producer. `geometry` is the
    /// older name of the physics category.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "arithmetic" => Some(Category::Arithmetic),
            "algebra" => Some(Category::Algebra),
            "trigonometry" => Some(Category::Trigonometry),
            "calculus" => Some(Category::Calculus),
            "physics" | "geometry" => Some(Category::Physics),
            "conversation" => Some(Category::Conversation),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a worked solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    text: String,
    explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
}

impl Step {
    pub fn new(text: impl Into<String>, explanation: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.trim().is_empty(), "step text must not be empty");
        Self {
            text,
            explanation: explanation.into(),
            result: None,
        }
    }

    pub fn with_result(
        text: impl Into<String>,
        explanation: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::new(text, explanation)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

/// The complete answer to one request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    original_expression: String,
    final_answer: String,
    steps: Vec<Step>,
    category: Category,
}

impl Solution {
    pub(crate) fn new(
        original_expression: impl Into<String>,
        final_answer: impl Into<String>,
        steps: Vec<Step>,
        category: Category,
    ) -> Self {
        let final_answer = final_answer.into();
        debug_assert!(!final_answer.trim().is_empty());
        debug_assert!(category == Category::Conversation || !steps.is_empty());
        Self {
            original_expression: original_expression.into(),
            final_answer,
            steps,
            category,
        }
    }

    /// The apology answer with its single diagnostic step.
    pub(crate) fn degraded(original: &str, category: Category) -> Self {
        let text = if original.trim().is_empty() {
            "Soal tidak dikenali"
        } else {
            original.trim()
        };
        Self::new(
            original,
            APOLOGY,
            vec![Step::new(text, "Terjadi kesalahan dalam perhitungan matematis")],
            category,
        )
    }

    pub fn original_expression(&self) -> &str {
        &self.original_expression
    }

    pub fn final_answer(&self) -> &str {
        &self.final_answer
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_degraded(&self) -> bool {
        self.final_answer == APOLOGY
    }

    pub fn to_json(&self) -> SolutionJson {
        SolutionJson {
            schema_version: SCHEMA_VERSION,
            ok: !self.is_degraded(),
            category: self.category.as_str().to_string(),
            original_expression: self.original_expression.clone(),
            final_answer: self.final_answer.clone(),
            steps: self
                .steps
                .iter()
                .enumerate()
                .map(|(i, s)| StepJson {
                    index: i + 1,
                    text: s.text.clone(),
                    explanation: s.explanation.clone(),
                    result: s.result.clone(),
                })
                .collect(),
        }
    }
}
