use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub const COMMANDS: &[&str] = &[
    "help",
    "examples",
    "steps on",
    "steps off",
    "config save",
    "config restore",
    "quit",
    "exit",
];

/// Completes REPL commands and whole example problems by prefix.
pub struct TutorHelper {
    candidates: Vec<String>,
}

impl TutorHelper {
    pub fn new() -> Self {
        let candidates = COMMANDS
            .iter()
            .copied()
            .chain(tutor_engine::example_problems())
            .map(str::to_string)
            .collect();
        Self { candidates }
    }

    fn matches(&self, prefix: &str) -> Vec<Pair> {
        let prefix = prefix.to_lowercase();
        self.candidates
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect()
    }
}

impl Default for TutorHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for TutorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        // candidates are whole lines, so the replacement always starts at 0
        let prefix = &line[..pos];
        if prefix.trim().is_empty() {
            return Ok((0, Vec::new()));
        }
        Ok((0, self.matches(prefix)))
    }
}

impl Hinter for TutorHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for TutorHelper {}

impl Validator for TutorHelper {}

impl Helper for TutorHelper {}
