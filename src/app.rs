//! The application context handed to every handler.
//!
//! Built once at startup; tests build one per case with in-memory parts.

use crate::capture::CaptureProtocol;
use crate::events::EventBus;
use crate::view::{UiEffect, View};
use std::sync::{Arc, Mutex, PoisonError};

pub struct App<S, C> {
    store: S,
    commands: C,
    bus: Arc<EventBus>,
    protocol: CaptureProtocol,
    pub(crate) view: Mutex<View>,
}

impl<S, C> App<S, C> {
    pub fn new(store: S, commands: C, bus: Arc<EventBus>, protocol: CaptureProtocol) -> Self {
        Self {
            store,
            commands,
            bus,
            protocol,
            view: Mutex::new(View::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    /// Bus the native layer emits capture signals on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn protocol(&self) -> CaptureProtocol {
        self.protocol
    }

    /// Snapshot of the view for rendering.
    pub fn view(&self) -> View {
        self.update(|view| view.clone())
    }

    /// Drain pending one-off UI effects.
    pub fn take_effects(&self) -> Vec<UiEffect> {
        self.update(View::take_effects)
    }

    /// Mutate the view. Never held across an await.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut View) -> R) -> R {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }
}
