//! JSON DTOs for solutions and for the record embedded in completion responses.
//!
//! These models stay independent from engine internals; the engine converts
//! into and out of them at its boundary.

use serde::{Deserialize, Serialize};

/// Stable schema version for JSON outputs.
pub const SCHEMA_VERSION: u8 = 1;

// =============================================================================
// Solution output
// =============================================================================

/// One tutoring step for JSON output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepJson {
    pub index: usize,
    pub text: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// A complete solution for `tutor solve --json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolutionJson {
    #[serde(rename = "schema_version")]
    pub schema_version: u8,
    pub ok: bool,
    pub category: String,
    pub original_expression: String,
    pub final_answer: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub steps: Vec<StepJson>,
}

impl SolutionJson {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// An error result with stable kind/code for API consumers.
#[derive(Serialize, Debug)]
pub struct ErrorJsonOutput {
    pub schema_version: u8,
    pub ok: bool,
    pub kind: String,
    pub code: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl ErrorJsonOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: false,
            kind: "InternalError".to_string(),
            code: "E_INTERNAL".to_string(),
            error: error.into(),
            input: None,
        }
    }

    pub fn with_input(error: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::new(error)
        }
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(
                "{{\"schema_version\":{},\"ok\":false,\"error\":\"serialization failed\"}}",
                SCHEMA_VERSION
            )
        })
    }
}

// =============================================================================
// Completion-response record
// =============================================================================

/// One step as written by a completion service.
///
/// The step text may arrive as `step` or `text`; `result` may be any JSON
/// scalar and is stringified by the engine.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionStepRecord {
    #[serde(alias = "text")]
    pub step: String,
    pub explanation: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Structured record a completion service embeds in its reply.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub final_answer: String,
    pub steps: Vec<CompletionStepRecord>,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
}

impl CompletionRecord {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_json_uses_camel_case_fields() {
        let out = SolutionJson {
            schema_version: SCHEMA_VERSION,
            ok: true,
            category: "algebra".to_string(),
            original_expression: "2x + 5 = 13".to_string(),
            final_answer: "x = 4".to_string(),
            steps: vec![StepJson {
                index: 1,
                text: "x = 4".to_string(),
                explanation: "Hasil akhir".to_string(),
                result: Some("4".to_string()),
            }],
        };
        let value: serde_json::Value = serde_json::from_str(&out.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["finalAnswer"], "x = 4");
        assert_eq!(value["originalExpression"], "2x + 5 = 13");
        assert_eq!(value["steps"][0]["result"], "4");
    }

    #[test]
    fn step_without_result_omits_field() {
        let step = StepJson {
            index: 1,
            text: "Halo".to_string(),
            explanation: "Percakapan".to_string(),
            result: None,
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("result"));
    }

    #[test]
    fn completion_record_accepts_type_and_text_aliases() {
        let record = CompletionRecord::from_json(
            r#"{"finalAnswer":"12","steps":[{"text":"3 * 4","explanation":"kali","result":12}],"type":"arithmetic"}"#,
        )
        .unwrap();
        assert_eq!(record.final_answer, "12");
        assert_eq!(record.steps[0].step, "3 * 4");
        assert_eq!(record.steps[0].result, Some(serde_json::json!(12)));
        assert_eq!(record.category.as_deref(), Some("arithmetic"));
    }

    #[test]
    fn completion_record_requires_final_answer() {
        assert!(CompletionRecord::from_json(r#"{"steps":[]}"#).is_err());
    }

    #[test]
    fn error_output_carries_input() {
        let err = ErrorJsonOutput::with_input("boom", "1 +");
        assert_eq!(err.input.as_deref(), Some("1 +"));
        assert!(err.to_json_pretty().contains("\"ok\": false"));
    }
}
