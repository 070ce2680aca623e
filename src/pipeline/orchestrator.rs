use crate::config::{Config, DownloadPolicy};
use crate::error::{HarvestError, Result};
use crate::extractor::LinkExtractor;
use crate::fetcher::{target_folder_for, FetchOutcome, FetchSettings, ImageFetcher};
use crate::pipeline::summary::RunSummary;
use crate::scanner::{validate_directory, SourceCollector, SourceFile};
use crate::ui::GracefulShutdown;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    FileStarted {
        source: &'a SourceFile,
        index: usize,
        total: usize,
    },
    LinkRejected {
        source: &'a SourceFile,
        error: &'a HarvestError,
    },
    ImageDownloaded {
        path: &'a Path,
        bytes: u64,
    },
    ImageSkipped {
        path: &'a Path,
    },
    DownloadFailed {
        url: &'a Url,
        error: &'a HarvestError,
    },
    FileFailed {
        source: &'a SourceFile,
        error: &'a HarvestError,
    },
    FileFinished {
        source: &'a SourceFile,
        downloaded: usize,
    },
}

/// What a run would do for one source file, without doing it.
#[derive(Debug)]
pub struct SourcePlan {
    pub source: SourceFile,
    pub target_folder: PathBuf,
    pub links: Vec<Url>,
    pub rejected: usize,
    pub read_error: Option<HarvestError>,
}

pub struct Pipeline {
    collector: SourceCollector,
    extractor: LinkExtractor,
    fetcher: ImageFetcher,
    shutdown: GracefulShutdown,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            collector: SourceCollector::new(&config.scan),
            extractor: LinkExtractor::new(&config.scan)?,
            fetcher: ImageFetcher::new(FetchSettings::from_config(config))?,
            shutdown: GracefulShutdown::without_handler(),
        })
    }

    pub fn with_shutdown(mut self, shutdown: GracefulShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn policy(&self) -> DownloadPolicy {
        self.fetcher.policy()
    }

    /// Validates `directory` and lists its source files.
    ///
    /// An empty listing is reported as `NoEligibleFiles`, which callers treat
    /// as a successful early exit.
    pub fn collect_sources(&self, directory: &Path) -> Result<Vec<SourceFile>> {
        validate_directory(directory)?;

        let sources = self.collector.collect(directory);
        if sources.is_empty() {
            return Err(HarvestError::NoEligibleFiles {
                directory: directory.display().to_string(),
                searched_extensions: self.collector.get_extensions().clone(),
            });
        }

        Ok(sources)
    }

    pub async fn run(
        &self,
        directory: &Path,
        on_event: &dyn Fn(&PipelineEvent<'_>),
    ) -> Result<RunSummary> {
        let sources = self.collect_sources(directory)?;
        let mut summary = RunSummary::new(sources.len());

        tracing::info!(
            "processing {} source files in {} ({} policy)",
            sources.len(),
            directory.display(),
            self.policy()
        );

        for (index, source) in sources.iter().enumerate() {
            self.shutdown.check_shutdown()?;

            summary.start_file(&source.filename);
            on_event(&PipelineEvent::FileStarted {
                source,
                index,
                total: sources.len(),
            });

            match self.process_source(source, &mut summary, on_event).await {
                Ok(downloaded) => {
                    tracing::info!("{}: {} images downloaded", source.filename, downloaded);
                    on_event(&PipelineEvent::FileFinished { source, downloaded });
                }
                Err(HarvestError::Cancelled) => return Err(HarvestError::Cancelled),
                Err(error) => {
                    tracing::warn!("{}: {}", source.filename, error);
                    summary.record_file_failure(&error);
                    on_event(&PipelineEvent::FileFailed {
                        source,
                        error: &error,
                    });
                }
            }

            summary.finish_file();
        }

        Ok(summary)
    }

    async fn process_source(
        &self,
        source: &SourceFile,
        summary: &mut RunSummary,
        on_event: &dyn Fn(&PipelineEvent<'_>),
    ) -> Result<usize> {
        let extraction = self.extractor.extract_file(&source.path)?;

        for error in &extraction.rejected {
            summary.record_rejected_link(error);
            on_event(&PipelineEvent::LinkRejected { source, error });
        }

        // No valid links: leave the directory untouched
        if extraction.is_empty() {
            return Ok(0);
        }

        let target = target_folder_for(source);
        if !target.is_dir() {
            fs::create_dir_all(&target)?;
            summary.record_folder_created();
        }

        let mut downloaded = 0;
        for url in &extraction.links {
            self.shutdown.check_shutdown()?;

            match self.fetcher.fetch(url, &target).await {
                FetchOutcome::Downloaded { path, bytes } => {
                    downloaded += 1;
                    summary.record_download(bytes);
                    on_event(&PipelineEvent::ImageDownloaded { path: &path, bytes });
                }
                FetchOutcome::SkippedExists { path } => {
                    summary.record_skip();
                    on_event(&PipelineEvent::ImageSkipped { path: &path });
                }
                FetchOutcome::Failed { url, error } => {
                    summary.record_failed_download(&error);
                    on_event(&PipelineEvent::DownloadFailed {
                        url: &url,
                        error: &error,
                    });
                }
            }
        }

        Ok(downloaded)
    }

    /// Collects and extracts like `run`, but creates nothing and fetches nothing.
    pub fn plan(&self, directory: &Path) -> Result<Vec<SourcePlan>> {
        let sources = self.collect_sources(directory)?;

        Ok(sources
            .into_iter()
            .map(|source| {
                let target_folder = target_folder_for(&source);
                match self.extractor.extract_file(&source.path) {
                    Ok(extraction) => SourcePlan {
                        rejected: extraction.rejected.len(),
                        links: extraction.links,
                        source,
                        target_folder,
                        read_error: None,
                    },
                    Err(error) => SourcePlan {
                        source,
                        target_folder,
                        links: Vec::new(),
                        rejected: 0,
                        read_error: Some(error),
                    },
                }
            })
            .collect())
    }
}
