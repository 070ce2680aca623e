use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Invalid directory: {path}")]
    InvalidDirectory { path: String },

    #[error("No eligible files found in {directory}")]
    NoEligibleFiles {
        directory: String,
        searched_extensions: Vec<String>,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL skipped: {url} ({reason})")]
    InvalidUrl { url: String, reason: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Server returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("URL has no file name to save under: {url}")]
    MissingFileName { url: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl HarvestError {
    /// An empty scan ends the run without it being a failure.
    pub fn is_soft_exit(&self) -> bool {
        matches!(self, HarvestError::NoEligibleFiles { .. })
    }

    pub fn read<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        HarvestError::Read {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return HarvestError::Timeout {
                url: url.to_string(),
            };
        }

        if let Some(status) = error.status() {
            return HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }

        HarvestError::Network {
            url: url.to_string(),
            message: describe_reqwest_error(&error),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for HarvestError {
    fn user_message(&self) -> String {
        match self {
            HarvestError::InvalidDirectory { path } => {
                format!("Invalid directory: {}", path)
            }
            HarvestError::NoEligibleFiles { directory, .. } => {
                format!("No eligible files found in {}", directory)
            }
            HarvestError::Read { path, source } => {
                format!("Could not read {}: {}", path, source)
            }
            HarvestError::InvalidUrl { url, .. } => {
                format!("Invalid URL skipped: {}", url)
            }
            HarvestError::Network { url, message } => {
                format!("Failed to download {}: {}", url, message)
            }
            HarvestError::HttpStatus { url, status } => {
                format!("Failed to download {}: HTTP {}", url, status)
            }
            HarvestError::Timeout { url } => {
                format!("Failed to download {}: timed out", url)
            }
            HarvestError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            HarvestError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            HarvestError::InvalidDirectory { .. } => Some(
                "Pass an existing directory as the first argument, or run from inside the directory to scan.".to_string()
            ),
            HarvestError::NoEligibleFiles { searched_extensions, .. } => Some(format!(
                "Only files with these extensions are scanned: {}",
                searched_extensions.join(", ")
            )),
            HarvestError::Config { .. } => Some(
                "Check your configuration file syntax or regenerate one with --generate-config.".to_string()
            ),
            HarvestError::Timeout { .. } => Some(
                "Increase the request timeout with --timeout or remove it from the configuration.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for HarvestError {
    fn from(error: toml::de::Error) -> Self {
        HarvestError::Config {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for HarvestError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        HarvestError::from_reqwest(&url, error)
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

// reqwest's Display stops at the outermost layer ("error sending request"),
// the useful part is usually further down the source chain.
fn describe_reqwest_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = HarvestError::InvalidDirectory {
            path: "/no/such/dir".to_string(),
        };
        assert!(error.user_message().contains("Invalid directory"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_soft_exit_detection() {
        let soft = HarvestError::NoEligibleFiles {
            directory: "/tmp".to_string(),
            searched_extensions: vec!["txt".to_string()],
        };
        assert!(soft.is_soft_exit());
        assert!(soft.suggestion().unwrap().contains("txt"));

        let fatal = HarvestError::InvalidDirectory {
            path: "/tmp/missing".to_string(),
        };
        assert!(!fatal.is_soft_exit());
    }

    #[test]
    fn test_read_error_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = HarvestError::read("notes.txt", io);
        assert!(error.to_string().contains("notes.txt"));
        assert!(matches!(error, HarvestError::Read { .. }));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let error = HarvestError::from(toml_error);
        assert!(matches!(error, HarvestError::Config { .. }));
    }
}
