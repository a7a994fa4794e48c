//! Screen capture orchestration — public API.
//!
//! The native layer does the actual region selection; this module drives it,
//! validates what comes back and moves the capture phase of the view.

mod orchestrator;
mod payload;

pub use payload::{validate_payload, MIN_PAYLOAD_LEN};

use crate::commands::CommandError;
use crate::events::RaceError;
use crate::view::View;
use std::fmt;
use std::str::FromStr;

/// How the native capture command reports its result.
///
/// Chosen once per `App`; the two generations are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureProtocol {
    /// `capture_region` resolves with the image itself.
    SyncReturn,
    /// `start_capture_region` returns at once; `capture-done` or
    /// `capture-error` follows.
    #[default]
    Events,
}

impl fmt::Display for CaptureProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureProtocol::SyncReturn => f.write_str("sync"),
            CaptureProtocol::Events => f.write_str("events"),
        }
    }
}

impl FromStr for CaptureProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(CaptureProtocol::SyncReturn),
            "events" | "event" => Ok(CaptureProtocol::Events),
            other => Err(format!("unknown capture protocol '{}'", other)),
        }
    }
}

/// Capture state as shown by the trigger and status line.
///
/// `Done` and `Failed` are resting states: the trigger is enabled again and
/// the last outcome stays on screen until the next capture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing,
    Done,
    Failed(String),
}

impl CapturePhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, CapturePhase::Capturing)
    }

    pub fn status_text(&self) -> String {
        match self {
            CapturePhase::Idle => String::new(),
            CapturePhase::Capturing => "Selecting area…".to_string(),
            CapturePhase::Done => "Done ✅".to_string(),
            CapturePhase::Failed(msg) => format!("Error: {}", msg),
        }
    }

    pub(crate) fn release(view: &mut View) {
        if view.capture.is_busy() {
            view.capture = CapturePhase::Idle;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Empty image data")]
    EmptyImageData,

    #[error("{0}")]
    Rejected(#[from] CommandError),

    /// Message carried by `capture-error`.
    #[error("{0}")]
    Signalled(String),

    #[error("Capture ended without a result: {0}")]
    Abandoned(#[from] RaceError),
}

/// Result of one click on the capture trigger.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// A capture was already running; the click was ignored.
    Busy,
    Captured,
    Failed(CaptureError),
}
