//! Engine-wide settings.

use serde::{Deserialize, Serialize};

/// Settings shared by every node of a tree.
///
/// Deserializes from a partial object; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Character that introduces a switch (`-a`, `--all`).
    pub switch_prefix: char,
    /// Maximum number of enumerated suggestions a bounded integer offers.
    pub completion_limit: usize,
    /// Separator between merged error messages.
    pub error_joiner: String,
    /// Text shown before the input in error context lines (e.g. `"/"`).
    pub line_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            switch_prefix: '-',
            completion_limit: 20,
            error_joiner: " or ".to_string(),
            line_prefix: String::new(),
        }
    }
}

impl EngineConfig {
    /// Strip one or two leading switch prefixes from `word`.
    ///
    /// Returns `None` when `word` is not switch-shaped (no prefix, or nothing
    /// after it).
    pub fn switch_name<'w>(&self, word: &'w str) -> Option<&'w str> {
        let rest = word.strip_prefix(self.switch_prefix)?;
        let rest = rest.strip_prefix(self.switch_prefix).unwrap_or(rest);
        (!rest.is_empty()).then_some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "completion_limit": 5, "line_prefix": "/" }"#).unwrap();
        assert_eq!(config.completion_limit, 5);
        assert_eq!(config.line_prefix, "/");
        assert_eq!(config.switch_prefix, '-');
        assert_eq!(config.error_joiner, " or ");
    }

    #[test]
    fn switch_names() {
        let config = EngineConfig::default();
        assert_eq!(config.switch_name("-a"), Some("a"));
        assert_eq!(config.switch_name("--all"), Some("all"));
        assert_eq!(config.switch_name("-"), None);
        assert_eq!(config.switch_name("--"), None);
        assert_eq!(config.switch_name("all"), None);
        assert_eq!(config.switch_name("-5"), Some("5"));
    }
}
