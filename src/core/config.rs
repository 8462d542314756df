/// Linker configuration — one link rule, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::resolve::TokenTable;
use crate::core::scanner::FieldNames;
use crate::schema::ReferenceKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Describes which anchors get which field, and where targets live.
///
/// The defaults describe the dice-grant rule: affix blocks of category 3
/// receive a typed `granted_dice` array pointing at a die resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Filesystem directory scanned for target documents.
    pub targets_dir: PathBuf,
    /// The same directory as seen from inside the project (`res://...`).
    pub targets_res_dir: String,
    /// Document extension, without the dot.
    pub extension: String,
    /// `type` attribute written on new declarations.
    pub target_type: String,
    pub target_field: String,
    pub name_field: String,
    pub category_field: String,
    /// Accepted category values; empty accepts every anchor.
    pub categories: Vec<String>,
    /// Reference shape for embedded blocks.
    pub block_reference: ReferenceKind,
    /// Reference shape for the root section of flat documents.
    pub root_reference: ReferenceKind,
    /// Script declaring the element type of collection references.
    pub element_script: Option<String>,
    pub tokens: TokenTable,
    /// Base seed for new local ids; mixed with each document path.
    pub seed: u64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            targets_dir: PathBuf::from("resources/dice/affix_dice"),
            targets_res_dir: "res://resources/dice/affix_dice".to_string(),
            extension: "tres".to_string(),
            target_type: "Resource".to_string(),
            target_field: "granted_dice".to_string(),
            name_field: "affix_name".to_string(),
            category_field: "category".to_string(),
            categories: vec!["3".to_string()],
            block_reference: ReferenceKind::Collection,
            root_reference: ReferenceKind::Collection,
            element_script: Some("res://scripts/dice/die_resource.gd".to_string()),
            tokens: TokenTable::default(),
            seed: 0,
        }
    }
}

impl LinkerConfig {
    pub fn load_from_ron(path: &Path) -> Result<LinkerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<LinkerConfig, ConfigError> {
        let config: LinkerConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_field.is_empty() {
            return Err(ConfigError::Invalid("target_field is empty".to_string()));
        }
        if self.name_field.is_empty() {
            return Err(ConfigError::Invalid("name_field is empty".to_string()));
        }
        if self.extension.is_empty() {
            return Err(ConfigError::Invalid("extension is empty".to_string()));
        }
        if self.tokens.sizes.iter().all(|t| t.is_empty()) {
            return Err(ConfigError::Invalid("no size tokens".to_string()));
        }
        if self.tokens.no_element.is_empty() {
            return Err(ConfigError::Invalid("no_element token is empty".to_string()));
        }
        let needs_script = self.block_reference == ReferenceKind::Collection
            || self.root_reference == ReferenceKind::Collection;
        if needs_script && self.element_script.as_deref().unwrap_or_default().is_empty() {
            return Err(ConfigError::Invalid(
                "collection references need an element_script".to_string(),
            ));
        }
        Ok(())
    }

    /// Field names handed to the scanner.
    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            target: self.target_field.clone(),
            category: self.category_field.clone(),
            name: self.name_field.clone(),
        }
    }

    pub fn accepts_category(&self, category: Option<&str>) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        category.is_some_and(|c| self.categories.iter().any(|accepted| accepted == c))
    }

    pub fn reference_kind(&self, root: bool) -> ReferenceKind {
        if root {
            self.root_reference
        } else {
            self.block_reference
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LinkerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.target_field, "granted_dice");
        assert!(config.accepts_category(Some("3")));
        assert!(!config.accepts_category(Some("1")));
        assert!(!config.accepts_category(None));
    }

    #[test]
    fn parse_partial_ron_keeps_defaults() {
        let config = LinkerConfig::parse_ron(
            r#"(
                targets_dir: "dice",
                targets_res_dir: "res://dice",
                categories: [],
                root_reference: Single,
                tokens: (
                    sizes: ["d6", "d4"],
                    elements: ["fire"],
                ),
                seed: 42,
            )"#,
        )
        .unwrap();
        assert_eq!(config.targets_dir, PathBuf::from("dice"));
        assert_eq!(config.extension, "tres");
        assert_eq!(config.root_reference, ReferenceKind::Single);
        assert_eq!(config.block_reference, ReferenceKind::Collection);
        assert_eq!(config.tokens.no_element, "none");
        assert_eq!(config.seed, 42);
        assert!(config.accepts_category(None));
        assert_eq!(config.reference_kind(true), ReferenceKind::Single);
        assert_eq!(config.reference_kind(false), ReferenceKind::Collection);
    }

    #[test]
    fn collection_without_script_is_invalid() {
        let err = LinkerConfig::parse_ron("(element_script: None)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let ok = LinkerConfig::parse_ron(
            "(element_script: None, block_reference: Single, root_reference: Single)",
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn empty_size_tokens_rejected() {
        let err = LinkerConfig::parse_ron("(tokens: (sizes: [], elements: []))").unwrap_err();
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn bad_ron_is_reported() {
        assert!(matches!(
            LinkerConfig::parse_ron("(targets_dir: 12"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn load_from_missing_file() {
        assert!(matches!(
            LinkerConfig::load_from_ron(Path::new("/nonexistent/linker.ron")),
            Err(ConfigError::Io(_))
        ));
    }
}
