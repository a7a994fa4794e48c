//! Rewrites of deprecated model identifiers, applied at load time.
//!
//! Every rule points straight at a current id. When a model is superseded
//! again, existing rules are retargeted instead of chained.

/// A single deprecated-id → current-id rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationRule {
    pub deprecated: &'static str,
    pub current: &'static str,
}

pub static MODEL_MIGRATIONS: &[MigrationRule] = &[
    MigrationRule { deprecated: "gemini-1.5-flash", current: "gemini-2.5-flash" },
    MigrationRule { deprecated: "gemini-1.5-pro", current: "gemini-2.5-pro" },
];

/// Apply every rule in order. Returns the input unchanged when none match.
pub fn migrate_model(model: &str) -> String {
    MODEL_MIGRATIONS
        .iter()
        .fold(model.to_string(), |acc, rule| {
            if acc == rule.deprecated {
                log::info!("[SETTINGS] Migrating model {} -> {}", rule.deprecated, rule.current);
                rule.current.to_string()
            } else {
                acc
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_deprecated_id_maps_to_its_successor() {
        for rule in MODEL_MIGRATIONS {
            assert_eq!(migrate_model(rule.deprecated), rule.current);
        }
    }

    #[test]
    fn current_ids_are_untouched() {
        assert_eq!(migrate_model("gemini-2.5-pro"), "gemini-2.5-pro");
        assert_eq!(migrate_model("my-local-model"), "my-local-model");
        assert_eq!(migrate_model(""), "");
    }

    #[test]
    fn no_rule_targets_a_deprecated_id() {
        for rule in MODEL_MIGRATIONS {
            assert!(MODEL_MIGRATIONS.iter().all(|r| r.deprecated != rule.current));
        }
    }
}
