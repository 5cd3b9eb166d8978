use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DaytaskError, Result};

pub const CONFIG_VERSION: u32 = 1;
pub const ADVISOR_ENV: &str = "DAYTASK_ADVISOR";
pub const ADVISOR_TIMEOUT_ENV: &str = "DAYTASK_ADVISOR_TIMEOUT_MS";
pub const DEFAULT_ADVISOR_TIMEOUT_MS: u64 = 15_000;

/// Contents of `.daytask/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor: Option<AdvisorConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Shell command run with `sh -c`. Receives the request JSON on stdin and
    /// must print the suggestion JSON on stdout.
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            advisor: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DaytaskError::NotInitialized);
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The advisor command in effect: `$DAYTASK_ADVISOR` wins over the file.
    pub fn advisor_command(&self) -> Option<String> {
        resolve_advisor_command(std::env::var(ADVISOR_ENV).ok(), self)
    }

    pub fn set_advisor(&mut self, command: Option<String>) {
        self.advisor = command
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(|command| AdvisorConfig { command });
    }
}

/// How long an advisor command may run before it is killed.
pub fn advisor_timeout() -> Duration {
    timeout_from(std::env::var(ADVISOR_TIMEOUT_ENV).ok())
}

fn timeout_from(value: Option<String>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_ADVISOR_TIMEOUT_MS))
}

fn resolve_advisor_command(env: Option<String>, config: &Config) -> Option<String> {
    env.filter(|c| !c.trim().is_empty())
        .or_else(|| config.advisor.as_ref().map(|a| a.command.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_not_initialized() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("config.json")),
            Err(DaytaskError::NotInitialized)
        ));
    }

    #[test]
    fn advisor_timeout_falls_back_to_default() {
        let default = Duration::from_millis(DEFAULT_ADVISOR_TIMEOUT_MS);
        assert_eq!(timeout_from(None), default);
        assert_eq!(timeout_from(Some("0".into())), default);
        assert_eq!(timeout_from(Some("soon".into())), default);
        assert_eq!(timeout_from(Some(" 250 ".into())), Duration::from_millis(250));
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.set_advisor(Some("  ./suggest.sh ".into()));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.advisor.unwrap().command, "./suggest.sh");
    }

    #[test]
    fn blank_advisor_clears_it() {
        let mut config = Config::default();
        config.set_advisor(Some("echo".into()));
        config.set_advisor(Some("   ".into()));
        assert_eq!(config.advisor, None);
    }

    #[test]
    fn minimal_file_parses_and_ignores_unknown_fields() {
        let config: Config = serde_json::from_str(r#"{"version": 1, "theme": "dark"}"#).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn env_override_wins_over_file() {
        let mut config = Config::default();
        config.set_advisor(Some("from-file".into()));
        assert_eq!(
            resolve_advisor_command(Some("from-env".into()), &config).as_deref(),
            Some("from-env")
        );
        assert_eq!(
            resolve_advisor_command(Some(" ".into()), &config).as_deref(),
            Some("from-file")
        );
        assert_eq!(resolve_advisor_command(None, &Config::default()), None);
    }
}
