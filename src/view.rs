//! View model rendered by the host window.
//!
//! Disabled flags and status lines are derived from the per-operation phase,
//! never stored separately, so they cannot disagree under rapid clicking.

use crate::ask::AskPhase;
use crate::capture::CapturePhase;
use crate::dialog::ApiKeyForm;
use crate::selection::ModelSelector;
use crate::settings::{Selection, DEFAULT_MODEL, DEFAULT_PROMPT};
use std::sync::{Mutex, PoisonError};

/// One-off instructions for the host that are not part of steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEffect {
    ScrollPreviewIntoView,
}

/// A captured region ready for preview and for the next ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    base64: String,
}

impl Preview {
    pub fn new(base64: String) -> Self {
        Self { base64 }
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// `src` for the preview image element.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}

#[derive(Debug, Clone)]
pub struct View {
    pub capture: CapturePhase,
    pub preview: Option<Preview>,
    pub selector: ModelSelector,
    pub prompt: String,
    pub ask: AskPhase,
    /// Answer area text; `None` hides the area.
    pub answer: Option<String>,
    /// Open API key dialog, if any.
    pub settings_dialog: Option<ApiKeyForm>,
    effects: Vec<UiEffect>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            capture: CapturePhase::default(),
            preview: None,
            selector: ModelSelector::new(Default::default(), Some(DEFAULT_MODEL)),
            prompt: DEFAULT_PROMPT.to_string(),
            ask: AskPhase::default(),
            answer: None,
            settings_dialog: None,
            effects: Vec::new(),
        }
    }
}

impl View {
    pub fn capture_enabled(&self) -> bool {
        !self.capture.is_busy()
    }

    pub fn capture_status(&self) -> String {
        self.capture.status_text()
    }

    pub fn ask_enabled(&self) -> bool {
        !self.ask.is_busy()
    }

    pub fn ask_status(&self) -> String {
        self.ask.status_text()
    }

    pub fn preview_src(&self) -> Option<String> {
        self.preview.as_ref().map(Preview::data_url)
    }

    pub fn settings_open(&self) -> bool {
        self.settings_dialog.is_some()
    }

    /// What the controls currently say, with the custom slot resolved.
    pub fn selection(&self) -> Selection {
        Selection {
            provider: self.selector.provider(),
            model: self.selector.effective_model(),
            prompt: self.prompt.clone(),
        }
    }

    pub(crate) fn push_effect(&mut self, effect: UiEffect) {
        self.effects.push(effect);
    }

    pub(crate) fn take_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }
}

/// Releases an operation's busy phase when dropped, whatever path the
/// operation left by.
pub(crate) struct BusyGuard<'a> {
    view: &'a Mutex<View>,
    release: fn(&mut View),
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn new(view: &'a Mutex<View>, release: fn(&mut View)) -> Self {
        Self { view, release }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        (self.release)(&mut view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_idle_with_default_selection() {
        let view = View::default();
        assert!(view.capture_enabled());
        assert!(view.ask_enabled());
        assert_eq!(view.capture_status(), "");
        assert_eq!(view.selection(), Selection::default());
        assert!(view.preview_src().is_none());
    }

    #[test]
    fn preview_src_is_a_png_data_url() {
        let preview = Preview::new("iVBORw0KGgo".into());
        assert_eq!(preview.data_url(), "data:image/png;base64,iVBORw0KGgo");
    }

    #[test]
    fn busy_guard_runs_release_on_drop() {
        let view = Mutex::new(View::default());
        view.lock().unwrap().capture = CapturePhase::Capturing;
        {
            let _guard = BusyGuard::new(&view, CapturePhase::release);
        }
        assert_eq!(view.lock().unwrap().capture, CapturePhase::Idle);
    }

    #[test]
    fn effects_are_drained_once() {
        let mut view = View::default();
        view.push_effect(UiEffect::ScrollPreviewIntoView);
        assert_eq!(view.take_effects(), vec![UiEffect::ScrollPreviewIntoView]);
        assert!(view.take_effects().is_empty());
    }
}
