use serde::{Deserialize, Serialize};

/// Tunables for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Upper bound for `insertTable` rows
    #[serde(default = "default_table_limit")]
    pub max_table_rows: u32,

    /// Upper bound for `insertTable` columns
    #[serde(default = "default_table_limit")]
    pub max_table_cols: u32,

    /// Consecutive empty list items created by Enter before the next Enter
    /// leaves the list
    #[serde(default = "default_list_exit_after")]
    pub list_exit_after: u32,

    /// Normalization passes allowed before giving up
    #[serde(default = "default_max_normalize_passes")]
    pub max_normalize_passes: usize,

    /// Append an empty paragraph when a void block is inserted at the end
    /// of the document, so the caret has somewhere to go
    #[serde(default = "default_true")]
    pub trailing_paragraph_after_void: bool,
}

fn default_table_limit() -> u32 {
    20
}

fn default_list_exit_after() -> u32 {
    1
}

fn default_max_normalize_passes() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_table_rows: default_table_limit(),
            max_table_cols: default_table_limit(),
            list_exit_after: default_list_exit_after(),
            max_normalize_passes: default_max_normalize_passes(),
            trailing_paragraph_after_void: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{ "maxTableRows": 8, "listExitAfter": 2 }"#;
        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_table_rows, 8);
        assert_eq!(config.max_table_cols, 20);
        assert_eq!(config.list_exit_after, 2);
        assert!(config.trailing_paragraph_after_void);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.max_table_rows, 20);
        assert_eq!(config.list_exit_after, 1);
        assert_eq!(config.max_normalize_passes, 256);
    }
}
