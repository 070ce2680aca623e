use crate::config::{Config, DownloadPolicy};
use crate::error::{HarvestError, Result};
use crate::fetcher::destination::image_file_name;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub policy: DownloadPolicy,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.download.policy,
            connect_timeout: config.connect_timeout_duration(),
            request_timeout: config.request_timeout_duration(),
            user_agent: config.download.user_agent.clone(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of one download attempt. Failures are values, not errors, so the
/// caller can move on to the next URL.
#[derive(Debug)]
pub enum FetchOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    SkippedExists { path: PathBuf },
    Failed { url: Url, error: HarvestError },
}

impl FetchOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, FetchOutcome::Downloaded { .. })
    }
}

pub struct ImageFetcher {
    client: reqwest::Client,
    policy: DownloadPolicy,
}

impl ImageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone());

        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| HarvestError::Config {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            policy: settings.policy,
        })
    }

    pub fn policy(&self) -> DownloadPolicy {
        self.policy
    }

    /// Downloads `url` into `target_dir`, named after the URL's last path
    /// segment. `target_dir` must already exist.
    pub async fn fetch(&self, url: &Url, target_dir: &Path) -> FetchOutcome {
        let destination = match image_file_name(url) {
            Ok(name) => target_dir.join(name),
            Err(error) => {
                return FetchOutcome::Failed {
                    url: url.clone(),
                    error,
                }
            }
        };

        if self.policy == DownloadPolicy::SkipExisting && destination.exists() {
            tracing::debug!("{} exists, not fetching {}", destination.display(), url);
            return FetchOutcome::SkippedExists { path: destination };
        }

        match self.download_to(url, &destination).await {
            Ok(bytes) => FetchOutcome::Downloaded {
                path: destination,
                bytes,
            },
            Err(error) => {
                tracing::warn!("download of {} failed: {}", url, error);
                FetchOutcome::Failed {
                    url: url.clone(),
                    error,
                }
            }
        }
    }

    async fn download_to(&self, url: &Url, destination: &Path) -> Result<u64> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HarvestError::from_reqwest(url.as_str(), e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| HarvestError::from_reqwest(url.as_str(), e))?;

        write_atomically(destination, &body)?;

        tracing::debug!("wrote {} bytes to {}", body.len(), destination.display());
        Ok(body.len() as u64)
    }
}

// Written next to the destination and renamed into place, so a failed write
// never leaves a partial image that a later skip-existing run would keep.
fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<()> {
    let dir = destination.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(destination).map_err(|e| HarvestError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fetcher(policy: DownloadPolicy) -> ImageFetcher {
        let settings = FetchSettings {
            policy,
            request_timeout: Some(Duration::from_secs(5)),
            ..FetchSettings::default()
        };
        ImageFetcher::new(settings).unwrap()
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.download.policy = DownloadPolicy::Overwrite;
        config.download.timeout = Some(12);

        let settings = FetchSettings::from_config(&config);
        assert_eq!(settings.policy, DownloadPolicy::Overwrite);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(12)));
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_request() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("cat.jpg"), b"old").unwrap();

        // Nothing listens here; a request would fail
        let url = Url::parse("http://127.0.0.1:1/cat.jpg").unwrap();
        let outcome = fetcher(DownloadPolicy::SkipExisting)
            .fetch(&url, temp_dir.path())
            .await;

        assert!(matches!(outcome, FetchOutcome::SkippedExists { .. }));
        assert_eq!(fs::read(temp_dir.path().join("cat.jpg")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        let url = Url::parse("http://127.0.0.1:1/dog.png").unwrap();

        let outcome = fetcher(DownloadPolicy::SkipExisting)
            .fetch(&url, temp_dir.path())
            .await;

        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert!(!outcome.is_downloaded());
        assert!(!temp_dir.path().join("dog.png").exists());
    }

    #[tokio::test]
    async fn test_url_without_file_name_is_failure() {
        let temp_dir = TempDir::new().unwrap();
        let url = Url::parse("https://photo.png").unwrap();

        let outcome = fetcher(DownloadPolicy::Overwrite)
            .fetch(&url, temp_dir.path())
            .await;

        assert!(matches!(
            outcome,
            FetchOutcome::Failed {
                error: HarvestError::MissingFileName { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_write_atomically_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("img.gif");
        fs::write(&path, b"before").unwrap();

        write_atomically(&path, b"after").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"after");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }
}
