use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Persisted CLI session: which server to talk to and the bearer token to send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub server_url: String,
    pub token: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            updated_at: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("STUDY_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("study").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_environment_config() -> anyhow::Result<EnvironmentConfig> {
    let env_file = get_config_dir()?.join("env.json");

    if !env_file.exists() {
        return Ok(EnvironmentConfig::default());
    }

    let content = fs::read_to_string(env_file)?;
    let config: EnvironmentConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_environment_config(config: &EnvironmentConfig) -> anyhow::Result<()> {
    let env_file = get_config_dir()?.join("env.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(env_file, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_and_loads_round_trip() {
        let dir = std::env::temp_dir().join(format!("study-cli-{}", uuid::Uuid::new_v4().simple()));
        std::env::set_var("STUDY_CLI_CONFIG_DIR", &dir);

        assert_eq!(load_environment_config().unwrap().server_url, DEFAULT_SERVER_URL);

        let mut config = EnvironmentConfig {
            server_url: "http://studies.internal:8080".to_string(),
            token: Some("abc".to_string()),
            updated_at: None,
        };
        config.touch();
        save_environment_config(&config).unwrap();

        let loaded = load_environment_config().unwrap();
        assert_eq!(loaded.server_url, "http://studies.internal:8080");
        assert_eq!(loaded.token.as_deref(), Some("abc"));
        assert!(loaded.updated_at.is_some());

        let _ = fs::remove_dir_all(dir);
    }
}
