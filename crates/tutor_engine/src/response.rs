//! Turns a completion-service reply into a [`Solution`].

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tutor_api_models::CompletionRecord;

use crate::classify::classify;
use crate::conversation;
use crate::normalize::normalize;
use crate::solution::{Category, Solution, Step};

static FENCED_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid regex literal")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("reply contains no JSON record")]
    NoRecord,
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("record has an empty final answer")]
    EmptyAnswer,
    #[error("record has no steps")]
    NoSteps,
    #[error("step {0} has empty text")]
    EmptyStep(usize),
}

fn record_text(response: &str) -> Option<&str> {
    if let Some(caps) = FENCED_RECORD.captures(response) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

fn stringify(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Validated solution from the record in `response`.
pub fn extract_solution(response: &str, original: &str) -> Result<Solution, ResponseError> {
    let text = record_text(response).ok_or(ResponseError::NoRecord)?;
    let record =
        CompletionRecord::from_json(text).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    let final_answer = record.final_answer.trim();
    if final_answer.is_empty() {
        return Err(ResponseError::EmptyAnswer);
    }
    if record.steps.is_empty() {
        return Err(ResponseError::NoSteps);
    }
    let steps = record
        .steps
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let text = s.step.trim();
            if text.is_empty() {
                return Err(ResponseError::EmptyStep(i + 1));
            }
            let step = match s.result.and_then(stringify) {
                Some(result) => Step::with_result(text, s.explanation, result),
                None => Step::new(text, s.explanation),
            };
            Ok(step)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let category = record
        .category
        .as_deref()
        .and_then(Category::from_label)
        .unwrap_or_else(|| classify(&normalize(original)));

    Ok(Solution::new(original, final_answer, steps, category))
}

/// Never fails: a reply without a usable record becomes a conversational
/// answer carrying the prose.
pub fn parse_completion(response: &str, original: &str) -> Solution {
    match extract_solution(response, original) {
        Ok(solution) => solution,
        Err(error) => {
            tracing::debug!(target: "response", %error, "treating reply as conversation");
            let prose = response.trim();
            if prose.is_empty() {
                return conversation::reply(original);
            }
            let step_text = if original.trim().is_empty() {
                "Percakapan"
            } else {
                original.trim()
            };
            Solution::new(
                original,
                prose,
                vec![Step::new(step_text, "Percakapan dengan tutor")],
                Category::Conversation,
            )
        }
    }
}
