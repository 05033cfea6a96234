use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Ingest settings, loaded from a TOML file. Every field has a default so
/// a missing config file means default behavior, not an error.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub lineup: LineupConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LineupConfig {
    /// Label the run's lineup is named after. The lineup slug is this
    /// label upper-cased with spaces replaced by hyphens.
    #[serde(default = "default_lineup_name")]
    pub name: String,
}

impl Default for LineupConfig {
    fn default() -> Self {
        Self {
            name: default_lineup_name(),
        }
    }
}

fn default_lineup_name() -> String {
    "Default Guide Lineup".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IngestConfig {
    /// Skip cast-and-crew credit mapping entirely.
    #[serde(default)]
    pub exclude_cast_and_crew: bool,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load the config at `path`, falling back to defaults when the file does
/// not exist. A file that exists but fails to parse is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
[lineup]
name = "Cable One"

[ingest]
exclude_cast_and_crew = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.lineup.name, "Cable One");
        assert!(config.ingest.exclude_cast_and_crew);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.lineup.name, "Default Guide Lineup");
        assert!(!config.ingest.exclude_cast_and_crew);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/epg.toml")).unwrap();
        assert_eq!(config.lineup.name, "Default Guide Lineup");
    }
}
