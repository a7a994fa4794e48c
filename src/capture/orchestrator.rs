//! Capture trigger handler — the imperative shell around the native command.

use super::payload::{image_from_signal, message_from_signal, validate_payload};
use super::{CaptureError, CaptureOutcome, CapturePhase, CaptureProtocol};
use crate::app::App;
use crate::commands::{names, NativeCommands};
use crate::events::RaceBuilder;
use crate::view::{BusyGuard, Preview, UiEffect};
use std::sync::Arc;

/// Which capture signal won the race.
enum Signal {
    Done(String),
    Failed(String),
}

impl<S, C: NativeCommands> App<S, C> {
    /// Handle a click on the capture trigger.
    ///
    /// Idle → Capturing → Done | Failed. Clicks while Capturing are ignored.
    pub async fn capture(&self) -> CaptureOutcome {
        let started = self.update(|view| {
            if view.capture.is_busy() {
                return false;
            }
            view.capture = CapturePhase::Capturing;
            view.preview = None;
            view.answer = None;
            true
        });
        if !started {
            log::debug!("[CAPTURE] Ignoring click — capture already in progress");
            return CaptureOutcome::Busy;
        }

        let _busy = BusyGuard::new(&self.view, CapturePhase::release);
        let start = std::time::Instant::now();
        log::info!("[CAPTURE] Starting capture ({} protocol)", self.protocol());

        let result = match self.protocol() {
            CaptureProtocol::SyncReturn => self.capture_direct().await,
            CaptureProtocol::Events => self.capture_via_signals().await,
        };

        match result {
            Ok(image) => {
                log::info!(
                    "[CAPTURE] Captured {} base64 chars in {}ms",
                    image.len(),
                    start.elapsed().as_millis()
                );
                self.update(|view| {
                    view.preview = Some(Preview::new(image));
                    view.capture = CapturePhase::Done;
                    view.push_effect(UiEffect::ScrollPreviewIntoView);
                });
                CaptureOutcome::Captured
            }
            Err(e) => {
                log::error!("[CAPTURE] Failed after {}ms: {}", start.elapsed().as_millis(), e);
                self.update(|view| view.capture = CapturePhase::Failed(e.to_string()));
                CaptureOutcome::Failed(e)
            }
        }
    }

    async fn capture_direct(&self) -> Result<String, CaptureError> {
        let payload = self.commands().capture_region().await?;
        validate_payload(payload)
    }

    async fn capture_via_signals(&self) -> Result<String, CaptureError> {
        // Subscribe before starting so a fast native side cannot emit into
        // an empty bus.
        let race = RaceBuilder::new(Arc::clone(self.bus()))
            .on(names::CAPTURE_DONE, |p| Signal::Done(image_from_signal(p)))
            .on(names::CAPTURE_ERROR, |p| Signal::Failed(message_from_signal(p)))
            .arm();

        // A rejected start wins outright; dropping `race` unsubscribes.
        self.commands().start_capture_region().await?;

        match race.settle().await? {
            Signal::Done(payload) => validate_payload(payload),
            Signal::Failed(msg) => Err(CaptureError::Signalled(msg)),
        }
    }
}
