//! Lumina — capture and request orchestration for the desktop window.
//!
//! This crate wires together:
//! - Settings persistence and model-id migration (settings/)
//! - Provider/model/prompt selection (selection/, catalog.rs)
//! - Screen capture orchestration over the native layer (capture/, events/)
//! - Ask orchestration (ask.rs) and the API key dialog (dialog.rs)
//! - Inertial wheel scrolling (scroll.rs)
//!
//! The host shell renders `View` and bridges `NativeCommands` and the
//! capture signals to its own runtime.

pub mod app;
pub mod ask;
pub mod capture;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod events;
pub mod scroll;
pub mod selection;
pub mod settings;
pub mod view;

pub use app::App;
pub use config::AppConfig;

use commands::NativeCommands;
use events::EventBus;
use settings::JsonFileStore;
use std::sync::Arc;

/// Build the application context and reconcile it with stored settings.
///
/// A settings failure here is logged and the window comes up with defaults;
/// it is the only place a store error is not surfaced to the caller.
pub async fn start<C: NativeCommands>(
    config: AppConfig,
    commands: C,
    bus: Arc<EventBus>,
) -> App<JsonFileStore, C> {
    let _ = env_logger::try_init();

    log::info!(
        "Lumina starting up (settings: {}, capture: {})",
        config.settings_path.display(),
        config.capture_protocol
    );

    let store = JsonFileStore::new(&config.settings_path);
    if let Err(e) = settings::seed_defaults(&store).await {
        log::warn!("[SETTINGS] Could not seed defaults: {}", e);
    }

    let app = App::new(store, commands, bus, config.capture_protocol);
    if let Err(e) = app.load_initial().await {
        log::error!("[SETTINGS] Failed to load settings, continuing with defaults: {}", e);
    }

    app
}
