//! Inertial wheel scrolling for the main viewport.
//!
//! Wheel deltas feed a velocity; a frame loop moves the viewport by that
//! velocity and decays it until it is negligible, then stops. The next
//! qualifying wheel event starts a new loop.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const LINE_DELTA_MULTIPLIER: f64 = 16.0;
pub const PAGE_DELTA_MULTIPLIER: f64 = 800.0;

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    pub fn multiplier(self) -> f64 {
        match self {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => LINE_DELTA_MULTIPLIER,
            DeltaMode::Page => PAGE_DELTA_MULTIPLIER,
        }
    }
}

/// Element kind the wheel event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelTarget {
    TextInput,
    TextArea,
    Select,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelInput {
    pub delta_y: f64,
    pub mode: DeltaMode,
    pub target: WheelTarget,
    /// Target sits inside an open modal dialog.
    pub in_modal: bool,
}

impl WheelInput {
    /// Form controls and dialogs keep their native scrolling.
    pub fn is_excluded(&self) -> bool {
        self.in_modal || !matches!(self.target, WheelTarget::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDisposition {
    /// Let the platform handle it.
    Native,
    /// Consumed; the host must suppress default scrolling. `start_frames`
    /// is set when no frame loop is running yet.
    Handled { start_frames: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTuning {
    pub gain: f64,
    /// Velocity cap, px per frame.
    pub max_velocity: f64,
    /// Per-frame multiplicative decay.
    pub friction: f64,
    /// Velocity factor applied when a boundary is hit.
    pub bounce: f64,
    pub epsilon: f64,
    pub frame_interval: Duration,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            gain: 0.12,
            max_velocity: 60.0,
            friction: 0.92,
            bounce: 0.5,
            epsilon: 0.1,
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl Viewport {
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InertialScroller {
    tuning: ScrollTuning,
    velocity: f64,
    animating: bool,
}

impl InertialScroller {
    pub fn new(tuning: ScrollTuning) -> Self {
        Self {
            tuning,
            velocity: 0.0,
            animating: false,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn frame_interval(&self) -> Duration {
        self.tuning.frame_interval
    }

    pub fn on_wheel(&mut self, input: &WheelInput) -> WheelDisposition {
        if input.is_excluded() {
            return WheelDisposition::Native;
        }

        let max = self.tuning.max_velocity;
        let delta = input.delta_y * input.mode.multiplier();
        self.velocity = (self.velocity + delta * self.tuning.gain).clamp(-max, max);

        let start_frames = !self.animating;
        self.animating = true;
        WheelDisposition::Handled { start_frames }
    }

    /// Advance one frame. Returns false once the loop should stop.
    pub fn step(&mut self, viewport: &mut Viewport) -> bool {
        let max_scroll = viewport.max_scroll();
        let next = (viewport.scroll_top + self.velocity).clamp(0.0, max_scroll);
        viewport.scroll_top = next;

        if next <= 0.0 || next >= max_scroll {
            self.velocity *= self.tuning.bounce;
        }
        self.velocity *= self.tuning.friction;

        if self.velocity.abs() < self.tuning.epsilon {
            self.velocity = 0.0;
            self.animating = false;
            return false;
        }
        true
    }

    /// Drop any remaining velocity and mark the loop as stopped.
    pub fn halt(&mut self) {
        self.velocity = 0.0;
        self.animating = false;
    }
}

/// Scroller state plus the viewport it drives, shared with the frame loop.
#[derive(Debug, Clone, Default)]
pub struct ScrollSurface {
    pub scroller: InertialScroller,
    pub viewport: Viewport,
}

pub type SharedSurface = Arc<Mutex<ScrollSurface>>;

/// Wheel handler: fold the event in and spawn a frame loop if none runs.
///
/// Must be called from within a tokio runtime.
pub fn handle_wheel(surface: &SharedSurface, input: &WheelInput) -> WheelDisposition {
    let disposition = surface
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .scroller
        .on_wheel(input);

    if let WheelDisposition::Handled { start_frames: true } = disposition {
        tokio::spawn(run_frames(Arc::clone(surface)));
    }
    disposition
}

/// Halts the scroller if the frame loop is dropped before it settles, so
/// the next wheel event can start a fresh loop.
struct FrameLoopGuard {
    surface: SharedSurface,
    settled: bool,
}

impl Drop for FrameLoopGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        log::trace!("[SCROLL] Frame loop dropped mid-animation");
        self.surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scroller
            .halt();
    }
}

/// Step the surface once per frame until the velocity dies out.
pub async fn run_frames(surface: SharedSurface) {
    let period = surface
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .scroller
        .frame_interval();
    let mut frames = tokio::time::interval(period);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut loop_guard = FrameLoopGuard {
        surface,
        settled: false,
    };
    let mut count = 0u32;
    loop {
        frames.tick().await;
        count += 1;
        let mut guard = loop_guard
            .surface
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let ScrollSurface { scroller, viewport } = &mut *guard;
        if !scroller.step(viewport) {
            // A wheel event may restart the scroller once the lock is
            // released; the guard must not halt that new loop.
            drop(guard);
            loop_guard.settled = true;
            break;
        }
    }
    log::trace!("[SCROLL] Animation settled after {} frames", count);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            scroll_top: 500.0,
            scroll_height: 2000.0,
            client_height: 600.0,
        }
    }

    fn wheel(delta_y: f64, mode: DeltaMode) -> WheelInput {
        WheelInput {
            delta_y,
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn form_controls_and_modals_keep_native_scrolling() {
        let mut s = InertialScroller::default();
        for target in [WheelTarget::TextInput, WheelTarget::TextArea, WheelTarget::Select] {
            let input = WheelInput {
                delta_y: 100.0,
                target,
                ..Default::default()
            };
            assert_eq!(s.on_wheel(&input), WheelDisposition::Native);
        }
        let modal = WheelInput {
            delta_y: 100.0,
            in_modal: true,
            ..Default::default()
        };
        assert_eq!(s.on_wheel(&modal), WheelDisposition::Native);
        assert_eq!(s.velocity(), 0.0);
        assert!(!s.is_animating());
    }

    #[test]
    fn delta_mode_scales_input() {
        let tuning = ScrollTuning {
            max_velocity: f64::MAX,
            ..Default::default()
        };
        let mut px = InertialScroller::new(tuning);
        px.on_wheel(&wheel(1.0, DeltaMode::Pixel));
        let mut line = InertialScroller::new(tuning);
        line.on_wheel(&wheel(1.0, DeltaMode::Line));
        let mut page = InertialScroller::new(tuning);
        page.on_wheel(&wheel(1.0, DeltaMode::Page));

        assert!((line.velocity() / px.velocity() - 16.0).abs() < 1e-9);
        assert!((page.velocity() / px.velocity() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_is_clamped() {
        let mut s = InertialScroller::default();
        s.on_wheel(&wheel(10.0, DeltaMode::Page));
        assert_eq!(s.velocity(), ScrollTuning::default().max_velocity);
        s.on_wheel(&wheel(-100.0, DeltaMode::Page));
        assert_eq!(s.velocity(), -ScrollTuning::default().max_velocity);
    }

    #[test]
    fn only_the_first_wheel_event_starts_frames() {
        let mut s = InertialScroller::default();
        assert_eq!(
            s.on_wheel(&wheel(50.0, DeltaMode::Pixel)),
            WheelDisposition::Handled { start_frames: true }
        );
        assert_eq!(
            s.on_wheel(&wheel(50.0, DeltaMode::Pixel)),
            WheelDisposition::Handled { start_frames: false }
        );
    }

    #[test]
    fn step_moves_and_decays() {
        let mut s = InertialScroller::default();
        let mut vp = viewport();
        s.on_wheel(&wheel(100.0, DeltaMode::Pixel));
        let v0 = s.velocity();

        assert!(s.step(&mut vp));
        assert_eq!(vp.scroll_top, 500.0 + v0);
        assert!((s.velocity() - v0 * 0.92).abs() < 1e-9);
    }

    #[test]
    fn hitting_a_boundary_halves_velocity() {
        let mut s = InertialScroller::default();
        let mut vp = Viewport {
            scroll_top: 0.0,
            ..viewport()
        };
        s.on_wheel(&wheel(-100.0, DeltaMode::Pixel));
        let v0 = s.velocity();

        s.step(&mut vp);
        assert_eq!(vp.scroll_top, 0.0);
        assert!((s.velocity() - v0 * 0.5 * 0.92).abs() < 1e-9);
    }

    #[test]
    fn loop_terminates_and_restarts_lazily() {
        let mut s = InertialScroller::default();
        let mut vp = viewport();
        s.on_wheel(&wheel(100.0, DeltaMode::Pixel));

        let mut frames = 0;
        while s.step(&mut vp) {
            frames += 1;
            assert!(frames < 1_000, "animation never settled");
        }
        assert!(!s.is_animating());
        assert_eq!(s.velocity(), 0.0);

        assert_eq!(
            s.on_wheel(&wheel(10.0, DeltaMode::Pixel)),
            WheelDisposition::Handled { start_frames: true }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn frame_loop_scrolls_and_settles() {
        let surface: SharedSurface = Arc::new(Mutex::new(ScrollSurface {
            scroller: InertialScroller::default(),
            viewport: viewport(),
        }));

        let disposition = handle_wheel(&surface, &wheel(3.0, DeltaMode::Line));
        assert_eq!(disposition, WheelDisposition::Handled { start_frames: true });

        tokio::time::sleep(Duration::from_secs(10)).await;

        let state = surface.lock().unwrap();
        assert!(!state.scroller.is_animating());
        assert!(state.viewport.scroll_top > 500.0);
        assert!(state.viewport.scroll_top <= state.viewport.max_scroll());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_frame_loop_lets_the_next_wheel_restart() {
        let surface: SharedSurface = Arc::new(Mutex::new(ScrollSurface {
            scroller: InertialScroller::default(),
            viewport: viewport(),
        }));
        surface
            .lock()
            .unwrap()
            .scroller
            .on_wheel(&wheel(3.0, DeltaMode::Line));

        let frames = tokio::spawn(run_frames(Arc::clone(&surface)));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(surface.lock().unwrap().scroller.is_animating());

        frames.abort();
        assert!(frames.await.unwrap_err().is_cancelled());

        let mut state = surface.lock().unwrap();
        assert!(!state.scroller.is_animating());
        assert_eq!(state.scroller.velocity(), 0.0);
        assert_eq!(
            state.scroller.on_wheel(&wheel(10.0, DeltaMode::Pixel)),
            WheelDisposition::Handled { start_frames: true }
        );
    }
}
