// ABOUTME: TOML configuration loading and merging for the wcat CLI
// ABOUTME: Resolves server and image-bound defaults from project and XDG locations

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        Self::load_from_paths(&paths.iter().map(|p| p.as_str()).collect::<Vec<_>>())
    }

    /// Load and merge configuration files, lowest precedence first; later
    /// paths override earlier ones. Missing files are skipped.
    pub fn load_from_paths(paths: &[&str]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            if !Path::new(path).exists() {
                continue;
            }
            let file_config = Self::load_from_file(path)?;
            config = config.merge(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first: the user config
    /// directory, then XDG config home, then a project-local `wcat.toml`.
    pub fn get_config_paths() -> Vec<String> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir.join(".config").join("wcat").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home).join("wcat").join("config.toml");
            paths.push(path.to_string_lossy().to_string());
        }

        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("wcat.toml").to_string_lossy().to_string());
        }

        paths
    }

    /// Merge with another config, giving precedence to the other one.
    pub fn merge(self, other: Config) -> Config {
        Config {
            server: other.server.or(self.server),
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref server) = self.server {
            let parsed = url::Url::parse(server)
                .map_err(|err| anyhow!("Invalid server URL '{}': {}", server, err))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(anyhow!(
                    "Invalid server URL '{}': expected an http or https URL",
                    server
                ));
            }
        }
        Ok(())
    }
}
