//! Persisted settings — public API.
//!
//! The settings document is a flat map of string fields. The store is the
//! source of truth across restarts; the view is reconciled from it at startup
//! and pushed back after every user-visible change.

mod migration;
mod store;

pub use migration::{migrate_model, MigrationRule, MODEL_MIGRATIONS};
pub use store::{JsonFileStore, MemoryStore, SettingsStore, StoreError};

use crate::catalog::ProviderId;

/// Keys of the settings document.
pub mod keys {
    pub const PROVIDER: &str = "provider";
    pub const MODEL: &str = "model";
    pub const PROMPT: &str = "prompt";
    pub const OPENAI_API_KEY: &str = "openai_api_key";
    pub const GEMINI_API_KEY: &str = "gemini_api_key";
    pub const DEEPSEEK_API_KEY: &str = "deepseek_api_key";
    pub const SCHEMA_VERSION: &str = "schema_version";
}

/// File name of the settings document inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Current layout of the settings document.
pub const SCHEMA_VERSION: &str = "1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PROMPT: &str = "Explain what is shown in the selected region.";

/// Provider, model and prompt as the user last left them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub provider: ProviderId,
    pub model: String,
    pub prompt: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            provider: ProviderId::default(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Typed view of the whole settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub selection: Selection,
    pub openai_api_key: String,
    pub gemini_api_key: String,
    pub deepseek_api_key: String,
}

impl Selection {
    /// Read provider, model and prompt, substituting defaults for absent
    /// fields. An unrecognised provider falls back to the default.
    pub async fn read<S: SettingsStore>(store: &S) -> Result<Self, StoreError> {
        let provider = match store.get(keys::PROVIDER).await? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("[SETTINGS] {} — falling back to default provider", e);
                ProviderId::default()
            }),
            None => ProviderId::default(),
        };
        let model = store
            .get(keys::MODEL)
            .await?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let prompt = store
            .get(keys::PROMPT)
            .await?
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        Ok(Self { provider, model, prompt })
    }
}

impl Settings {
    /// Read every field. No migration is applied here.
    pub async fn read<S: SettingsStore>(store: &S) -> Result<Self, StoreError> {
        Ok(Self {
            selection: Selection::read(store).await?,
            openai_api_key: store.get(keys::OPENAI_API_KEY).await?.unwrap_or_default(),
            gemini_api_key: store.get(keys::GEMINI_API_KEY).await?.unwrap_or_default(),
            deepseek_api_key: store.get(keys::DEEPSEEK_API_KEY).await?.unwrap_or_default(),
        })
    }

    pub fn api_key(&self, provider: ProviderId) -> Option<&str> {
        match provider {
            ProviderId::Openai => Some(&self.openai_api_key),
            ProviderId::Gemini => Some(&self.gemini_api_key),
            ProviderId::Deepseek => Some(&self.deepseek_api_key),
            ProviderId::Ollama => None,
        }
    }
}

/// Write provider/model defaults into a fresh document. Does not flush.
pub async fn seed_defaults<S: SettingsStore>(store: &S) -> Result<(), StoreError> {
    if store.get(keys::PROVIDER).await?.is_none() {
        store.set(keys::PROVIDER, ProviderId::default().as_str()).await?;
    }
    if store.get(keys::MODEL).await?.is_none() {
        store.set(keys::MODEL, DEFAULT_MODEL).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_empty_store_gives_defaults() {
        let store = MemoryStore::new();
        let settings = Settings::read(&store).await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.selection.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn read_unknown_provider_falls_back() {
        let store = MemoryStore::with_entries([("provider", "anthropic")]);
        let settings = Settings::read(&store).await.unwrap();
        assert_eq!(settings.selection.provider, ProviderId::Openai);
    }

    #[tokio::test]
    async fn seed_defaults_keeps_existing_values() {
        let store = MemoryStore::with_entries([("provider", "ollama")]);
        seed_defaults(&store).await.unwrap();
        assert_eq!(store.get(keys::PROVIDER).await.unwrap().as_deref(), Some("ollama"));
        assert_eq!(store.get(keys::MODEL).await.unwrap().as_deref(), Some("gpt-4o-mini"));
        // Seeding never flushes on its own.
        assert!(!store.saved().contains_key(keys::MODEL));
    }

    #[test]
    fn api_key_lookup_per_provider() {
        let settings = Settings {
            gemini_api_key: "g-key".into(),
            ..Default::default()
        };
        assert_eq!(settings.api_key(ProviderId::Gemini), Some("g-key"));
        assert_eq!(settings.api_key(ProviderId::Ollama), None);
    }
}
