/// Name resolution — maps an affix label to the path of a target document.

use serde::{Deserialize, Serialize};

/// Ordered token lists used to pick a target from a label.
///
/// Order matters: every list is checked front to back and the first token
/// contained in the label wins, regardless of where it appears in the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTable {
    pub sizes: Vec<String>,
    pub elements: Vec<String>,
    #[serde(default = "default_no_element")]
    pub no_element: String,
}

fn default_no_element() -> String {
    "none".to_string()
}

impl Default for TokenTable {
    fn default() -> Self {
        Self {
            sizes: ["d20", "d12", "d10", "d8", "d6", "d4"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            elements: ["fire", "ice", "lightning", "poison", "shadow", "holy"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            no_element: default_no_element(),
        }
    }
}

/// Resolves labels to `{base_dir}/{size}_{element}.{extension}`.
#[derive(Debug, Clone)]
pub struct NameResolver {
    tokens: TokenTable,
    base_dir: String,
    extension: String,
}

impl NameResolver {
    pub fn new(tokens: TokenTable, base_dir: &str, extension: &str) -> Self {
        Self {
            tokens: TokenTable {
                sizes: tokens.sizes.iter().map(|t| t.to_lowercase()).collect(),
                elements: tokens.elements.iter().map(|t| t.to_lowercase()).collect(),
                no_element: tokens.no_element.to_lowercase(),
            },
            base_dir: base_dir.trim_end_matches('/').to_string(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Resolve a label. Returns `None` when no size token is present.
    pub fn resolve(&self, label: &str) -> Option<String> {
        let lower = label.to_lowercase();
        let size = first_match(&self.tokens.sizes, &lower)?;
        let element = first_match(&self.tokens.elements, &lower).unwrap_or(&self.tokens.no_element);
        Some(format!(
            "{}/{}_{}.{}",
            self.base_dir, size, element, self.extension
        ))
    }
}

fn first_match<'a>(tokens: &'a [String], haystack: &str) -> Option<&'a String> {
    tokens.iter().find(|token| haystack.contains(token.as_str()))
}
