use richdoc_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "richdoc.config.json";

/// richdoc configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Editing session tunables
    #[serde(default)]
    pub editor: EditorConfig,

    /// Default length for `richdoc excerpt`
    #[serde(default)]
    pub excerpt_length: Option<usize>,
}

impl Config {
    /// Load config from `explicit`, else from the working directory.
    /// A missing default file gives the default config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };
        let content = std::fs::read_to_string(&config_path)
            .map_err(|err| anyhow::anyhow!("Cannot read {}: {}", config_path.display(), err))?;
        let config: Config = serde_json::from_str(&content)?;
        tracing::debug!(path = %config_path.display(), "config loaded");
        Ok(config)
    }
}
