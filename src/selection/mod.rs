//! Selection state — keeps provider, model and prompt controls in step with
//! the settings store.
//!
//! Every user edit is written through and flushed immediately. Store
//! failures propagate to the caller; only the startup path swallows them.

mod selector;

pub use selector::{ModelSelector, SelectorOption, UnknownModel};

use crate::app::App;
use crate::catalog::ProviderId;
use crate::settings::{self, keys, migrate_model, Selection, SettingsStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    UnknownModel(#[from] UnknownModel),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S: SettingsStore, C> App<S, C> {
    /// Reconcile the controls from the store, then write the result back.
    ///
    /// Deprecated model ids are rewritten on the way in, and because the
    /// reconciled selection is saved straight away the store never keeps a
    /// deprecated id past one successful load.
    pub async fn load_initial(&self) -> Result<Selection, StoreError> {
        let stored = Selection::read(self.store()).await?;
        let model = migrate_model(&stored.model);

        self.update(|view| {
            view.selector.fill(stored.provider, Some(model.as_str()));
            view.prompt = stored.prompt.clone();
        });

        self.store()
            .set(keys::SCHEMA_VERSION, settings::SCHEMA_VERSION)
            .await?;
        let selection = self.save_ui_to_store().await?;
        log::info!(
            "[SETTINGS] Loaded provider={} model={}",
            selection.provider,
            selection.model
        );
        Ok(selection)
    }

    pub async fn on_provider_change(&self, provider: ProviderId) -> Result<Selection, StoreError> {
        self.update(|view| view.selector.fill(provider, None));
        self.save_ui_to_store().await
    }

    /// A new dropdown slot was picked (catalog id or the custom sentinel).
    pub async fn on_model_change(&self, slot: &str) -> Result<Selection, SelectionError> {
        self.update(|view| view.selector.select(slot))?;
        Ok(self.save_ui_to_store().await?)
    }

    pub async fn on_custom_model_change(&self, text: &str) -> Result<Selection, StoreError> {
        self.update(|view| view.selector.set_custom_text(text));
        self.save_ui_to_store().await
    }

    pub async fn on_prompt_change(&self, prompt: &str) -> Result<Selection, StoreError> {
        self.update(|view| view.prompt = prompt.to_string());
        self.save_ui_to_store().await
    }

    /// Write the effective selection and flush. Idempotent for unchanged
    /// controls.
    pub async fn save_ui_to_store(&self) -> Result<Selection, StoreError> {
        let selection = self.update(|view| view.selection());

        let store = self.store();
        store.set(keys::PROVIDER, selection.provider.as_str()).await?;
        store.set(keys::MODEL, &selection.model).await?;
        store.set(keys::PROMPT, &selection.prompt).await?;
        store.save().await?;

        log::debug!(
            "[SETTINGS] Saved provider={} model={}",
            selection.provider,
            selection.model
        );
        Ok(selection)
    }
}
