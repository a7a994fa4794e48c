//! API key settings dialog.

use crate::app::App;
use crate::settings::{keys, Settings, SettingsStore, StoreError};

/// Contents of the API key fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyForm {
    pub openai: String,
    pub gemini: String,
    pub deepseek: String,
}

impl From<&Settings> for ApiKeyForm {
    fn from(settings: &Settings) -> Self {
        Self {
            openai: settings.openai_api_key.clone(),
            gemini: settings.gemini_api_key.clone(),
            deepseek: settings.deepseek_api_key.clone(),
        }
    }
}

impl<S: SettingsStore, C> App<S, C> {
    /// Fill the dialog from the store and show it.
    pub async fn open_settings(&self) -> Result<ApiKeyForm, StoreError> {
        let settings = Settings::read(self.store()).await?;
        let form = ApiKeyForm::from(&settings);
        self.update(|view| view.settings_dialog = Some(form.clone()));
        Ok(form)
    }

    /// Persist trimmed keys, flush, and close the dialog.
    ///
    /// The dialog stays open if the store fails so nothing typed is lost.
    pub async fn save_settings(&self, form: &ApiKeyForm) -> Result<(), StoreError> {
        let store = self.store();
        store.set(keys::OPENAI_API_KEY, form.openai.trim()).await?;
        store.set(keys::GEMINI_API_KEY, form.gemini.trim()).await?;
        store.set(keys::DEEPSEEK_API_KEY, form.deepseek.trim()).await?;
        store.save().await?;

        log::info!("[SETTINGS] API keys saved");
        self.close_settings();
        Ok(())
    }

    pub fn close_settings(&self) {
        self.update(|view| view.settings_dialog = None);
    }
}
