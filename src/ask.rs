//! Ask trigger handler — sends the selection and capture to a provider.
//!
//! Preconditions are checked in order and short-circuit without touching the
//! native layer. Once they pass the selection is persisted, `ask_ai` is
//! invoked, and its answer or error lands in the answer area.

use crate::app::App;
use crate::capture::CaptureProtocol;
use crate::commands::{AskRequest, CommandError, NativeCommands};
use crate::settings::{SettingsStore, StoreError};
use crate::view::{BusyGuard, View};

/// A precondition that stopped an ask before any command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AskValidation {
    #[error("Select a model.")]
    NoModel,
    #[error("Select an area first.")]
    NoImage,
}

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("{0}")]
    Persist(#[from] StoreError),
    #[error("{0}")]
    Rejected(#[from] CommandError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AskPhase {
    #[default]
    Idle,
    Sending,
    Done,
    /// The error text is in the answer area.
    Failed,
    Invalid(AskValidation),
}

impl AskPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, AskPhase::Sending)
    }

    pub fn status_text(&self) -> String {
        match self {
            AskPhase::Idle => String::new(),
            AskPhase::Sending => "Sending…".to_string(),
            AskPhase::Done => "Done ✅".to_string(),
            AskPhase::Failed => "Error".to_string(),
            AskPhase::Invalid(v) => v.to_string(),
        }
    }

    fn release(view: &mut View) {
        if view.ask.is_busy() {
            view.ask = AskPhase::Idle;
        }
    }
}

#[derive(Debug)]
pub enum AskOutcome {
    /// An ask was already in flight; the click was ignored.
    Busy,
    Invalid(AskValidation),
    Answered(String),
    Failed(AskError),
}

/// Build the request from what the controls show right now.
///
/// The sync-return protocol cannot ask without a capture; the event-based
/// one sends an explicit `null` image instead.
pub fn build_request(view: &View, protocol: CaptureProtocol) -> Result<AskRequest, AskValidation> {
    let selection = view.selection();
    if selection.model.is_empty() {
        return Err(AskValidation::NoModel);
    }

    let image = view.preview.as_ref().map(|p| p.base64().to_string());
    if image.is_none() && protocol == CaptureProtocol::SyncReturn {
        return Err(AskValidation::NoImage);
    }

    Ok(AskRequest {
        provider: selection.provider,
        model: selection.model,
        prompt: selection.prompt,
        image,
    })
}

enum Start {
    Busy,
    Invalid(AskValidation),
    Ready(AskRequest),
}

impl<S: SettingsStore, C: NativeCommands> App<S, C> {
    /// Handle a click on the ask trigger.
    pub async fn ask(&self) -> AskOutcome {
        let protocol = self.protocol();
        let start = self.update(|view| {
            if view.ask.is_busy() {
                return Start::Busy;
            }
            view.ask = AskPhase::Sending;
            view.answer = None;
            match build_request(view, protocol) {
                Ok(req) => Start::Ready(req),
                Err(invalid) => {
                    view.ask = AskPhase::Invalid(invalid);
                    Start::Invalid(invalid)
                }
            }
        });

        let req = match start {
            Start::Ready(req) => req,
            Start::Busy => {
                log::debug!("[ASK] Ignoring click — request already in flight");
                return AskOutcome::Busy;
            }
            Start::Invalid(invalid) => {
                log::info!("[ASK] Not sending: {}", invalid);
                return AskOutcome::Invalid(invalid);
            }
        };

        let _busy = BusyGuard::new(&self.view, AskPhase::release);
        let started = std::time::Instant::now();
        log::info!(
            "[ASK] provider={} model={} image={}",
            req.provider,
            req.model,
            req.image.as_ref().map_or(0, String::len)
        );

        match self.send(&req).await {
            Ok(answer) => {
                log::info!(
                    "[ASK] Answered in {}ms ({} chars)",
                    started.elapsed().as_millis(),
                    answer.len()
                );
                self.update(|view| {
                    view.answer = Some(answer.clone());
                    view.ask = AskPhase::Done;
                });
                AskOutcome::Answered(answer)
            }
            Err(e) => {
                log::error!("[ASK] Failed after {}ms: {}", started.elapsed().as_millis(), e);
                self.update(|view| {
                    view.answer = Some(e.to_string());
                    view.ask = AskPhase::Failed;
                });
                AskOutcome::Failed(e)
            }
        }
    }

    async fn send(&self, req: &AskRequest) -> Result<String, AskError> {
        self.save_ui_to_store().await?;
        Ok(self.commands().ask_ai(req).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProviderId, CUSTOM};
    use crate::view::Preview;

    fn view_with_image() -> View {
        let mut view = View::default();
        view.preview = Some(Preview::new("A".repeat(120)));
        view
    }

    #[test]
    fn empty_custom_model_is_rejected_first() {
        let mut view = View::default();
        view.selector.select(CUSTOM).unwrap();
        view.selector.set_custom_text("   ");
        // Model is checked before the image, even in sync mode.
        assert_eq!(
            build_request(&view, CaptureProtocol::SyncReturn),
            Err(AskValidation::NoModel)
        );
    }

    #[test]
    fn sync_protocol_requires_a_capture() {
        let view = View::default();
        assert_eq!(
            build_request(&view, CaptureProtocol::SyncReturn),
            Err(AskValidation::NoImage)
        );
    }

    #[test]
    fn event_protocol_allows_a_missing_capture() {
        let req = build_request(&View::default(), CaptureProtocol::Events).unwrap();
        assert_eq!(req.image, None);
        assert_eq!(req.provider, ProviderId::Openai);
        assert_eq!(req.model, "gpt-4o-mini");
    }

    #[test]
    fn request_carries_the_captured_image() {
        let req = build_request(&view_with_image(), CaptureProtocol::SyncReturn).unwrap();
        assert_eq!(req.image.as_deref().map(str::len), Some(120));
    }

    #[test]
    fn status_text_per_phase() {
        assert_eq!(AskPhase::Sending.status_text(), "Sending…");
        assert_eq!(AskPhase::Failed.status_text(), "Error");
        assert_eq!(
            AskPhase::Invalid(AskValidation::NoImage).status_text(),
            "Select an area first."
        );
    }
}
