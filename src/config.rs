use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "museum-reports.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub output_dir: PathBuf,
    pub log_level: Option<String>,
    pub draft_retention_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            max_connections: 5,
            output_dir: PathBuf::from("reports"),
            log_level: None,
            draft_retention_days: 30,
        }
    }
}

impl Config {
    /// Reads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(dir) = lookup("MUSEUM_REPORTS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("MUSEUM_REPORTS_LOG") {
            self.log_level = Some(level);
        }
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a production Postgres instance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load(&dir.path().join("absent.toml")).unwrap();
        config.database_url = None;
        config.log_level = None;
        config.output_dir = PathBuf::from("reports");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url = \"postgres://localhost/museums\"\nmax_connections = 2\ndraft_retention_days = 7"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.draft_retention_days, 7);
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://db/override"),
            ("MUSEUM_REPORTS_OUTPUT_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            database_url: Some("postgres://db/file".to_string()),
            ..Config::default()
        };
        config.apply_env(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.database_url().unwrap(), "postgres://db/override");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn database_url_is_required() {
        let config = Config::default();
        assert!(config.database_url().is_err());
    }

    #[test]
    fn rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_connections = \"many\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
