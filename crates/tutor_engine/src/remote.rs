//! Seam to an external completion service.
//!
//! The engine never talks to the network itself. Callers that own a client
//! implement [`CompletionService`] (or pass a closure) and the engine decides
//! when to consult it.

use serde::Serialize;
use thiserror::Error;

use crate::solution::Category;

/// An attached image, already encoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub mime_type: String,
    pub data_base64: String,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data_base64: data_base64.into(),
        }
    }
}

/// Everything a completion service receives for one problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInput>,
    /// Category the local classifier assigned.
    pub category_hint: Category,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("completion service unavailable: {0}")]
    Unavailable(String),
    #[error("completion service rejected the request: {0}")]
    Rejected(String),
    #[error("completion service timed out")]
    Timeout,
}

pub trait CompletionService {
    /// Raw text of the service reply for `request`.
    fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError>;
}

impl<F> CompletionService for F
where
    F: Fn(&CompletionRequest) -> Result<String, RemoteError>,
{
    fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        self(request)
    }
}

/// The service used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompletion;

impl CompletionService for NoCompletion {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, RemoteError> {
        Err(RemoteError::Unavailable("no completion service configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            text: "Halo".to_string(),
            image: None,
            category_hint: Category::Conversation,
        }
    }

    #[test]
    fn closures_are_services() {
        let echo = |req: &CompletionRequest| -> Result<String, RemoteError> {
            Ok(format!("echo {}", req.text))
        };
        assert_eq!(echo.complete(&request()).unwrap(), "echo Halo");
    }

    #[test]
    fn no_completion_is_unavailable() {
        assert!(matches!(
            NoCompletion.complete(&request()),
            Err(RemoteError::Unavailable(_))
        ));
    }

    #[test]
    fn request_serializes_for_transport() {
        let mut req = request();
        req.image = Some(ImageInput::new("image/png", "iVBORw0KGgo="));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["categoryHint"], "conversation");
        assert_eq!(value["image"]["mimeType"], "image/png");
        assert!(serde_json::to_value(request()).unwrap().get("image").is_none());
    }
}
