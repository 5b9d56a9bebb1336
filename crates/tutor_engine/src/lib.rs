//! Step-by-step tutoring engine for Indonesian and English math questions.
//!
//! Input flows through [`normalize::normalize`], [`classify::classify`] and
//! the per-category strategies in [`solver`]; when those fail the
//! [`fallback`] chain degrades gracefully. The public entry points never
//! panic and never return an error: every input produces a [`Solution`].

pub mod classify;
pub mod conversation;
pub mod error;
pub mod eval;
pub mod fallback;
pub mod normalize;
pub mod options;
pub mod poly;
pub mod remote;
pub mod response;
pub mod solution;
pub mod solver;

pub use classify::classify;
pub use error::{EvalError, SolveError};
pub use normalize::normalize;
pub use options::SolveOptions;
pub use remote::{CompletionRequest, CompletionService, ImageInput, NoCompletion, RemoteError};
pub use response::{parse_completion, ResponseError};
pub use solution::{Category, Solution, Step, APOLOGY};

use solver::Problem;

/// Sample questions grouped by the category they exercise.
pub const EXAMPLE_PROBLEMS: &[(Category, &[&str])] = &[
    (
        Category::Arithmetic,
        &["berapa 1 + 1?", "hitung 2 × 3", "5^2 berapa?", "berapa (15 + 25) ÷ 2?"],
    ),
    (
        Category::Algebra,
        &["2x + 5 = 13", "x^2 - 5x + 6 = 0", "2x^2 + 7x - 15 = 0", "x^2 + 4x + 4 = 0"],
    ),
    (
        Category::Trigonometry,
        &["sin(30°)", "cos(45 derajat)", "tan(60 derajat)"],
    ),
    (
        Category::Calculus,
        &[
            "Turunan dari x^3",
            "Turunan dari f(x) = x^3 + 2x^2 - 5x + 1",
            "Integral dari 3x^2 - 4x + 5",
        ],
    ),
    (
        Category::Physics,
        &["Gaya 100 N sudut 45°", "Resultan gaya 30 N dan 40 N dengan sudut 90°"],
    ),
    (
        Category::Conversation,
        &["hai, gimana kabarnya?", "kamu bisa apa aja?", "terima kasih ya!"],
    ),
];

/// Every sample question, in display order.
pub fn example_problems() -> impl Iterator<Item = &'static str> {
    EXAMPLE_PROBLEMS
        .iter()
        .flat_map(|(_, problems)| problems.iter().copied())
}

/// A configured engine, optionally backed by a completion service.
#[derive(Debug, Clone)]
pub struct Tutor<S = NoCompletion> {
    options: SolveOptions,
    service: Option<S>,
}

impl Tutor<NoCompletion> {
    pub fn new() -> Self {
        Self {
            options: SolveOptions::default(),
            service: None,
        }
    }
}

impl Default for Tutor<NoCompletion> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CompletionService> Tutor<S> {
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a completion service, consulted for conversational and
    /// degraded results and for every image.
    pub fn with_service<T: CompletionService>(self, service: T) -> Tutor<T> {
        Tutor {
            options: self.options,
            service: Some(service),
        }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    pub fn solve(&self, raw: &str, image: Option<&ImageInput>) -> Solution {
        let local = self.solve_locally(raw);

        let Some(service) = &self.service else {
            return local;
        };
        let wants_remote = image.is_some()
            || local.is_degraded()
            || (local.category() == Category::Conversation && !raw.trim().is_empty());
        if !wants_remote {
            return local;
        }

        let request = CompletionRequest {
            text: raw.to_string(),
            image: image.cloned(),
            category_hint: local.category(),
        };
        match service.complete(&request) {
            Ok(reply) => parse_completion(&reply, raw),
            Err(error) => {
                tracing::warn!(target: "remote", %error, "completion failed, keeping local result");
                local
            }
        }
    }

    fn solve_locally(&self, raw: &str) -> Solution {
        if raw.trim().is_empty() {
            return conversation::reply(raw);
        }
        let normalized = normalize(raw);
        let category = classify(&normalized);
        if category == Category::Conversation {
            return conversation::reply(raw);
        }
        let problem = Problem {
            original: raw,
            normalized: &normalized,
            category,
        };
        fallback::run_chain(&problem, &self.options)
    }
}

/// Solves `raw` with default options and no completion service.
pub fn solve(raw: &str, image: Option<&ImageInput>) -> Solution {
    Tutor::new().solve(raw, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn local_solving_without_service() {
        let sol = solve("2x + 5 = 13", None);
        assert_eq!(sol.category(), Category::Algebra);
        assert_eq!(sol.final_answer(), "x = 4");
    }

    #[test]
    fn empty_input_is_conversation() {
        let sol = solve("", None);
        assert_eq!(sol.category(), Category::Conversation);
        assert_eq!(sol.final_answer(), conversation::EMPTY_INPUT_REPLY);
    }

    #[test]
    fn service_is_not_consulted_for_solved_problems() {
        let calls = Cell::new(0);
        let service = |_: &CompletionRequest| -> Result<String, RemoteError> {
            calls.set(calls.get() + 1);
            Ok("{}".to_string())
        };
        let tutor = Tutor::new().with_service(service);
        assert_eq!(tutor.solve("2x + 5 = 13", None).final_answer(), "x = 4");
        assert_eq!(tutor.solve("", None).category(), Category::Conversation);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn service_answers_conversation_and_images() {
        let service = |req: &CompletionRequest| -> Result<String, RemoteError> {
            Ok(format!(
                r#"{{"finalAnswer": "dari layanan", "steps": [{{"step": "{}", "explanation": "x"}}], "category": "algebra"}}"#,
                if req.image.is_some() { "gambar" } else { "teks" }
            ))
        };
        let tutor = Tutor::new().with_service(service);

        let chat = tutor.solve("Halo", None);
        assert_eq!(chat.final_answer(), "dari layanan");
        assert_eq!(chat.steps()[0].text(), "teks");

        let image = ImageInput::new("image/png", "AAAA");
        let pictured = tutor.solve("2x + 5 = 13", Some(&image));
        assert_eq!(pictured.steps()[0].text(), "gambar");
    }

    #[test]
    fn service_errors_keep_local_result() {
        let tutor = Tutor::new().with_service(|_: &CompletionRequest| -> Result<String, RemoteError> {
            Err(RemoteError::Timeout)
        });
        let sol = tutor.solve("Halo", None);
        assert!(sol.final_answer().starts_with("Halo! Saya adalah AI matematika"));
        assert_eq!(sol.category(), Category::Conversation);
    }

    #[test]
    fn examples_are_non_empty() {
        assert!(example_problems().count() >= 15);
        assert!(example_problems().all(|p| !p.trim().is_empty()));
    }
}
