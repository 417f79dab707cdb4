use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User settings read from `~/.config/rigger/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiggerConfig {
    /// Ruby interpreter used for ERB rendering.
    pub ruby: String,
    /// Default log filter when `RIGGER_LOG` is unset.
    pub log: Option<String>,
}

impl Default for RiggerConfig {
    fn default() -> Self {
        Self {
            ruby: "ruby".to_owned(),
            log: None,
        }
    }
}

impl RiggerConfig {
    /// Load from an explicit path; the file must exist.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("config error: reading {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| format!("config error: {}: {e}", path.display()))
    }

    /// Load the per-user config, falling back to defaults when there is none.
    pub fn load_default() -> Result<Self, String> {
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/rigger/config.toml"))
}
