//! JSON DTOs shared by the engine and the CLI.

pub mod json_types;

pub use json_types::{
    CompletionRecord, CompletionStepRecord, ErrorJsonOutput, SolutionJson, StepJson,
    SCHEMA_VERSION,
};
