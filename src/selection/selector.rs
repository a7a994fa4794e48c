//! Provider/model selector state — pure, no store access.

use crate::catalog::{self, ProviderId, CUSTOM, CUSTOM_LABEL};

/// One option of the model dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Model '{id}' is not offered for {provider}")]
pub struct UnknownModel {
    pub provider: ProviderId,
    pub id: String,
}

/// The model dropdown plus its free-text "custom" field.
///
/// `selected` is always a catalog id of `provider` or the `CUSTOM` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    provider: ProviderId,
    selected: &'static str,
    custom_text: String,
}

impl ModelSelector {
    pub fn new(provider: ProviderId, prefer: Option<&str>) -> Self {
        let mut selector = Self {
            provider,
            selected: CUSTOM,
            custom_text: String::new(),
        };
        selector.fill(provider, prefer);
        selector
    }

    /// Repopulate for `provider`, selecting `prefer` when possible.
    ///
    /// A non-empty preferred id outside the catalog is kept as custom text
    /// rather than dropped. Without a preference the first catalog entry is
    /// chosen, or the custom slot if the catalog is empty. The custom text
    /// survives provider switches.
    pub fn fill(&mut self, provider: ProviderId, prefer: Option<&str>) {
        self.provider = provider;
        let models = catalog::models_for(provider);

        let in_catalog = prefer.and_then(|id| catalog::find_model(provider, id));

        match (in_catalog, prefer) {
            (Some(entry), _) => {
                self.selected = entry.id;
            }
            (None, Some(id)) if !id.trim().is_empty() => {
                self.selected = CUSTOM;
                self.custom_text = id.to_string();
            }
            _ => {
                self.selected = models.first().map_or(CUSTOM, |m| m.id);
            }
        }
    }

    /// Pick a dropdown slot: a catalog id of the current provider or `CUSTOM`.
    pub fn select(&mut self, slot: &str) -> Result<(), UnknownModel> {
        if slot == CUSTOM {
            self.selected = CUSTOM;
            return Ok(());
        }
        match catalog::find_model(self.provider, slot) {
            Some(entry) => {
                self.selected = entry.id;
                Ok(())
            }
            None => Err(UnknownModel {
                provider: self.provider,
                id: slot.to_string(),
            }),
        }
    }

    pub fn set_custom_text(&mut self, text: &str) {
        self.custom_text = text.to_string();
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn selected_slot(&self) -> &'static str {
        self.selected
    }

    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    /// Whether the custom slot is selected (and its text field shown).
    pub fn is_custom(&self) -> bool {
        self.selected == CUSTOM
    }

    /// The model an ask would use: trimmed custom text, or the slot's id.
    pub fn effective_model(&self) -> String {
        if self.is_custom() {
            self.custom_text.trim().to_string()
        } else {
            self.selected.to_string()
        }
    }

    /// Catalog entries followed by the custom slot.
    pub fn options(&self) -> Vec<SelectorOption> {
        catalog::models_for(self.provider)
            .iter()
            .map(|m| SelectorOption {
                value: m.id,
                label: m.label,
            })
            .chain(std::iter::once(SelectorOption {
                value: CUSTOM,
                label: CUSTOM_LABEL,
            }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_preference_is_selected() {
        let s = ModelSelector::new(ProviderId::Gemini, Some("gemini-2.5-pro"));
        assert_eq!(s.selected_slot(), "gemini-2.5-pro");
        assert!(!s.is_custom());
        assert_eq!(s.effective_model(), "gemini-2.5-pro");
    }

    #[test]
    fn unknown_preference_becomes_custom() {
        let s = ModelSelector::new(ProviderId::Ollama, Some("qwen2.5:7b"));
        assert!(s.is_custom());
        assert_eq!(s.custom_text(), "qwen2.5:7b");
        assert_eq!(s.effective_model(), "qwen2.5:7b");
    }

    #[test]
    fn blank_preference_falls_back_to_first_entry() {
        let s = ModelSelector::new(ProviderId::Deepseek, Some("  "));
        assert_eq!(s.selected_slot(), "deepseek-chat");
    }

    #[test]
    fn preference_from_another_provider_is_not_silently_used() {
        // gpt-4o is an OpenAI id; under Gemini it can only be custom text.
        let s = ModelSelector::new(ProviderId::Gemini, Some("gpt-4o"));
        assert!(s.is_custom());
        assert!(catalog::find_model(ProviderId::Gemini, s.selected_slot()).is_none());
    }

    #[test]
    fn refill_without_preference_picks_first_of_new_provider() {
        let mut s = ModelSelector::new(ProviderId::Openai, Some("gpt-4o"));
        s.fill(ProviderId::Ollama, None);
        assert_eq!(s.provider(), ProviderId::Ollama);
        assert_eq!(s.selected_slot(), "llama3");
    }

    #[test]
    fn custom_text_is_trimmed_for_effective_model() {
        let mut s = ModelSelector::new(ProviderId::Openai, None);
        s.select(CUSTOM).unwrap();
        s.set_custom_text("  my-local-model ");
        assert_eq!(s.effective_model(), "my-local-model");
    }

    #[test]
    fn select_rejects_ids_outside_the_provider() {
        let mut s = ModelSelector::new(ProviderId::Openai, None);
        let err = s.select("llava").unwrap_err();
        assert_eq!(err.provider, ProviderId::Openai);
        assert_eq!(s.selected_slot(), "gpt-4o-mini");
    }

    #[test]
    fn options_end_with_custom_slot() {
        let s = ModelSelector::new(ProviderId::Gemini, None);
        let options = s.options();
        assert_eq!(options.len(), catalog::models_for(ProviderId::Gemini).len() + 1);
        assert_eq!(options.last().map(|o| o.value), Some(CUSTOM));
    }
}
