//! Known AI providers and their selectable models — static catalog.
//!
//! Each provider owns an ordered list of model entries. The selector always
//! appends the `CUSTOM` sentinel after the catalog entries; the sentinel is
//! not itself part of any provider's list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selector value meaning "use the free-text model field".
pub const CUSTOM: &str = "__custom__";

/// Label shown for the custom slot.
pub const CUSTOM_LABEL: &str = "Custom…";

/// An external AI service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[default]
    Openai,
    Gemini,
    Deepseek,
    Ollama,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Openai,
        ProviderId::Gemini,
        ProviderId::Deepseek,
        ProviderId::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Openai => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Deepseek => "deepseek",
            ProviderId::Ollama => "ollama",
        }
    }

    /// Display name used by the provider selector.
    pub fn label(self) -> &'static str {
        match self {
            ProviderId::Openai => "OpenAI",
            ProviderId::Gemini => "Gemini",
            ProviderId::Deepseek => "DeepSeek",
            ProviderId::Ollama => "Ollama (local)",
        }
    }

    /// Settings key holding this provider's API credential.
    ///
    /// Ollama runs locally and needs none.
    pub fn api_key_field(self) -> Option<&'static str> {
        match self {
            ProviderId::Openai => Some(crate::settings::keys::OPENAI_API_KEY),
            ProviderId::Gemini => Some(crate::settings::keys::GEMINI_API_KEY),
            ProviderId::Deepseek => Some(crate::settings::keys::DEEPSEEK_API_KEY),
            ProviderId::Ollama => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// One selectable model of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: &'static str,
    pub label: &'static str,
}

static OPENAI: &[ModelEntry] = &[
    ModelEntry { id: "gpt-4o-mini", label: "gpt-4o-mini (fast/cheap)" },
    ModelEntry { id: "gpt-4o", label: "gpt-4o (strong)" },
];

static GEMINI: &[ModelEntry] = &[
    ModelEntry { id: "gemini-2.5-flash", label: "gemini-2.5-flash (fast)" },
    ModelEntry { id: "gemini-2.5-pro", label: "gemini-2.5-pro (strong)" },
    ModelEntry { id: "gemini-2.5-flash-lite", label: "gemini-2.5-flash-lite (cheap)" },
    ModelEntry { id: "gemini-2.0-flash", label: "gemini-2.0-flash" },
    ModelEntry { id: "gemini-2.0-flash-lite", label: "gemini-2.0-flash-lite" },
];

static DEEPSEEK: &[ModelEntry] = &[ModelEntry { id: "deepseek-chat", label: "deepseek-chat" }];

static OLLAMA: &[ModelEntry] = &[
    ModelEntry { id: "llama3", label: "llama3" },
    ModelEntry { id: "llava", label: "llava (vision)" },
];

/// Ordered catalog entries for a provider.
pub fn models_for(provider: ProviderId) -> &'static [ModelEntry] {
    match provider {
        ProviderId::Openai => OPENAI,
        ProviderId::Gemini => GEMINI,
        ProviderId::Deepseek => DEEPSEEK,
        ProviderId::Ollama => OLLAMA,
    }
}

/// Look up a model id within one provider's catalog.
pub fn find_model(provider: ProviderId, id: &str) -> Option<&'static ModelEntry> {
    models_for(provider).iter().find(|m| m.id == id)
}
