//! Contract with the native layer: the commands the front end invokes.
//!
//! Capture and provider calls are opaque here. A host bridges these to its
//! own command runtime and forwards the capture signals onto the `EventBus`.

use crate::catalog::ProviderId;
use serde::Serialize;

/// Command and signal names as registered by the native layer.
pub mod names {
    pub const CAPTURE_REGION: &str = "capture_region";
    pub const START_CAPTURE_REGION: &str = "start_capture_region";
    pub const ASK_AI: &str = "ask_ai";

    pub const CAPTURE_DONE: &str = "capture-done";
    pub const CAPTURE_ERROR: &str = "capture-error";
}

/// A rejected native command. The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CommandError(pub String);

impl From<String> for CommandError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

impl From<&str> for CommandError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

/// Payload of `ask_ai`. Built fresh for every ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub provider: ProviderId,
    pub model: String,
    pub prompt: String,
    /// Base64 PNG of the captured region; serialised as `null` when absent.
    #[serde(rename = "image_base64")]
    pub image: Option<String>,
}

/// Native commands consumed by the orchestrators.
#[allow(async_fn_in_trait)]
pub trait NativeCommands {
    /// Synchronous-return capture: resolves with the base64 image.
    async fn capture_region(&self) -> Result<String, CommandError>;

    /// Event-based capture: returns once the capture has started. The outcome
    /// arrives later as `capture-done` or `capture-error`.
    async fn start_capture_region(&self) -> Result<(), CommandError>;

    async fn ask_ai(&self, req: &AskRequest) -> Result<String, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_serialises_missing_image_as_null() {
        let req = AskRequest {
            provider: ProviderId::Ollama,
            model: "llava".into(),
            prompt: "what is this".into(),
            image: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "provider": "ollama",
                "model": "llava",
                "prompt": "what is this",
                "image_base64": null,
            })
        );
    }
}
