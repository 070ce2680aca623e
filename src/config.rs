use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub source_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub policy: DownloadPolicy,
    pub connect_timeout: u64,
    pub timeout: Option<u64>,
    pub user_agent: String,
}

/// What to do when the destination file of a download already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadPolicy {
    /// Leave the existing file alone and make no request.
    #[default]
    SkipExisting,
    /// Fetch again and replace the file.
    Overwrite,
}

impl std::fmt::Display for DownloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadPolicy::SkipExisting => write!(f, "skip-existing"),
            DownloadPolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec![
                "txt".to_string(),
                "csv".to_string(),
                "log".to_string(),
                "rtf".to_string(),
            ],
            image_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            policy: DownloadPolicy::SkipExisting,
            connect_timeout: 30,
            timeout: None, // Wait as long as the server keeps the connection open
            user_agent: format!("imgharvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HarvestError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HarvestError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HarvestError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["imgharvest.toml", ".imgharvest.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(policy) = cli_args.policy {
            self.download.policy = policy;
        }

        if let Some(timeout) = cli_args.timeout {
            self.download.timeout = Some(timeout);
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| HarvestError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| HarvestError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_extensions("source", &self.scan.source_extensions)?;
        validate_extensions("image", &self.scan.image_extensions)?;

        if self.download.connect_timeout == 0 {
            return Err(HarvestError::Config {
                message: "Connect timeout must be greater than 0".to_string(),
            });
        }

        if self.download.timeout == Some(0) {
            return Err(HarvestError::Config {
                message: "Request timeout must be greater than 0 when set".to_string(),
            });
        }

        Ok(())
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.download.connect_timeout)
    }

    pub fn request_timeout_duration(&self) -> Option<Duration> {
        self.download.timeout.map(Duration::from_secs)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

fn validate_extensions(kind: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(HarvestError::Config {
            message: format!("At least one {} extension must be specified", kind),
        });
    }

    if let Some(bad) = extensions
        .iter()
        .find(|ext| ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return Err(HarvestError::Config {
            message: format!(
                "Invalid {} extension '{}': use letters and digits only, without the dot",
                kind, bad
            ),
        });
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub policy: Option<DownloadPolicy>,
    pub timeout: Option<u64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: Option<DownloadPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }
}
