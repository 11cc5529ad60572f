use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_alert_from")]
    pub alert_from: String,

    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_webhook_method")]
    pub webhook_method: String,

    #[serde(default)]
    pub webhook_body_template: Option<String>,

    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    log_dir: Option<String>,
    alert_from: Option<String>,
    webhook_url: Option<String>,
    webhook_method: Option<String>,
    webhook_body_template: Option<String>,
    webhook_timeout_secs: Option<u64>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_alert_from() -> String {
    "noreply@critmon.com".to_string()
}

fn default_webhook_method() -> String {
    "POST".to_string()
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_dir: default_log_dir(),
            alert_from: default_alert_from(),
            webhook_url: None,
            webhook_method: default_webhook_method(),
            webhook_body_template: None,
            webhook_timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

fn parse_file_config(contents: &str, path: &Path) -> Result<PartialServerConfig, String> {
    toml::from_str(contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => {
                let path = Path::new(path_str);
                if path.exists() {
                    let contents = fs::read_to_string(path)
                        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                    parse_file_config(&contents, path)?
                } else {
                    return Err(format!("Config file not found at {path:?}"));
                }
            }
            None => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let config = Self::merge(env_config, file_config);
        config.validate()?;
        Ok(config)
    }

    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Self {
        ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            alert_from: env_config
                .alert_from
                .or(file_config.alert_from)
                .unwrap_or_else(default_alert_from),
            webhook_url: env_config.webhook_url.or(file_config.webhook_url),
            webhook_method: env_config
                .webhook_method
                .or(file_config.webhook_method)
                .unwrap_or_else(default_webhook_method),
            webhook_body_template: env_config
                .webhook_body_template
                .or(file_config.webhook_body_template),
            webhook_timeout_secs: env_config
                .webhook_timeout_secs
                .or(file_config.webhook_timeout_secs)
                .unwrap_or_else(default_webhook_timeout_secs),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.webhook_timeout_secs == 0 {
            return Err("WEBHOOK_TIMEOUT_SECS must be greater than zero".to_string());
        }
        match self.webhook_method.to_uppercase().as_str() {
            "GET" | "POST" => Ok(()),
            other => Err(format!("WEBHOOK_METHOD must be GET or POST, got {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_file() {
        let file = parse_file_config(
            r#"
            listen_addr = "127.0.0.1:9000"
            alert_from = "alerts@example.com"
            webhook_url = "https://hooks.example.com/down"
            webhook_timeout_secs = 3
            "#,
            Path::new("pulsecheck.toml"),
        )
        .unwrap();
        let env = PartialServerConfig {
            listen_addr: Some("0.0.0.0:7000".to_string()),
            ..PartialServerConfig::default()
        };

        let config = ServerConfig::merge(env, file);
        assert_eq!(config.listen_addr, "0.0.0.0:7000");
        assert_eq!(config.alert_from, "alerts@example.com");
        assert_eq!(config.webhook_url.as_deref(), Some("https://hooks.example.com/down"));
        assert_eq!(config.webhook_method, "POST");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.webhook_timeout_secs, 3);
    }

    #[test]
    fn test_empty_layers_give_defaults() {
        let config = ServerConfig::merge(PartialServerConfig::default(), PartialServerConfig::default());
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = parse_file_config("listen_addr = ", Path::new("broken.toml"));
        assert!(result.unwrap_err().starts_with("Failed to parse TOML"));
    }

    #[test]
    fn test_validate_webhook_method() {
        let mut config = ServerConfig::default();
        config.webhook_method = "get".to_string();
        assert!(config.validate().is_ok());

        config.webhook_method = "PUT".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_webhook_timeout() {
        let mut config = ServerConfig::default();
        assert_eq!(config.webhook_timeout_secs, 10);

        config.webhook_timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("WEBHOOK_TIMEOUT_SECS"));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ServerConfig::load(Some("/nonexistent/pulsecheck.toml"));
        assert!(result.unwrap_err().contains("not found"));
    }
}
