pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DownloadConfig, DownloadPolicy, ScanConfig};
pub use error::{HarvestError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{parse_image_url, LinkExtraction, LinkExtractor};
pub use fetcher::{FetchOutcome, FetchSettings, ImageFetcher};
pub use pipeline::{Pipeline, PipelineEvent, RunReport, RunSummary, SourcePlan};
pub use scanner::{SourceCollector, SourceFile, SourceFilter};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use indicatif::ProgressBar;
use std::cell::OnceCell;
use std::path::Path;

/// Main library interface: one configured harvester, run against a directory.
pub struct ImageHarvest {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl ImageHarvest {
    /// Create a new instance; installs the Ctrl+C handler.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::without_handler(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Scan `directory` and download every image linked from its source files.
    ///
    /// Per-item outcomes are printed as they happen; the returned report
    /// holds the totals. `NoEligibleFiles` is returned as an error so the
    /// caller can decide how to present the soft exit.
    pub async fn run(&self, directory: &Path) -> Result<RunReport> {
        let pipeline = Pipeline::new(&self.config)?.with_shutdown(self.shutdown.clone());
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        let file_progress: OnceCell<ProgressBar> = OnceCell::new();

        let result = pipeline
            .run(directory, &|event| match event {
                PipelineEvent::FileStarted {
                    source,
                    index,
                    total,
                } => {
                    let pb = file_progress
                        .get_or_init(|| self.progress_manager.create_file_progress(*total as u64));
                    ui::progress::update_file_progress(pb, *index, &source.filename);
                    output.suspend_and_print(|f| {
                        f.debug(&format!("Reading {} ({} bytes)", source.filename, source.size))
                    });
                }
                PipelineEvent::LinkRejected { error, .. } => {
                    output.suspend_and_print(|f| f.link_rejected(error));
                }
                PipelineEvent::ImageDownloaded { path, .. } => {
                    let shown = path.strip_prefix(directory).unwrap_or(*path);
                    output.suspend_and_print(|f| f.downloaded(shown));
                }
                PipelineEvent::ImageSkipped { path } => {
                    let shown = path.strip_prefix(directory).unwrap_or(*path);
                    output.suspend_and_print(|f| f.skipped(shown));
                }
                PipelineEvent::DownloadFailed { url, error } => {
                    output.suspend_and_print(|f| f.download_failed(url.as_str(), error));
                }
                PipelineEvent::FileFailed { error, .. } => {
                    output.suspend_and_print(|f| f.file_failed(error));
                }
                PipelineEvent::FileFinished { source, downloaded } => {
                    output.suspend_and_print(|f| {
                        f.debug(&format!("{}: {} images downloaded", source.filename, downloaded))
                    });
                }
            })
            .await;

        if let Some(pb) = file_progress.get() {
            match &result {
                Ok(summary) => {
                    pb.set_position(summary.files_processed as u64);
                    ui::progress::finish_progress_with_summary(pb, summary);
                }
                Err(_) => pb.abandon(),
            }
        }
        self.progress_manager.clear();

        let summary = result?;
        Ok(RunReport::new(directory, pipeline.policy(), summary))
    }

    /// Everything `run` would fetch, without creating folders or making requests.
    pub fn plan(&self, directory: &Path) -> Result<Vec<SourcePlan>> {
        let spinner = self.progress_manager.create_spinner("Reading source files");
        let result = Pipeline::new(&self.config).and_then(|pipeline| pipeline.plan(directory));
        spinner.finish_and_clear();
        result
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &HarvestError) {
        if error.is_soft_exit() {
            self.output_formatter.print_soft_exit(error);
        } else {
            self.output_formatter.print_user_friendly_error(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_without_links_reports_zero_downloads() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "no images here\n").unwrap();
        std::fs::write(temp_dir.path().join("data.csv"), "a,b\n1,2\n").unwrap();

        let harvest = ImageHarvest::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        let report = harvest.run(temp_dir.path()).await.unwrap();

        assert_eq!(report.summary.files_processed, 2);
        assert_eq!(report.summary.images_downloaded, 0);
        assert_eq!(report.policy, DownloadPolicy::SkipExisting);
        assert_eq!(
            report.summary.headline(),
            "Processed 2 files, downloaded 0 images"
        );
    }

    #[tokio::test]
    async fn test_run_on_empty_directory_is_soft_exit() {
        let temp_dir = TempDir::new().unwrap();

        let harvest = ImageHarvest::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        let error = harvest.run(temp_dir.path()).await.unwrap_err();

        assert!(error.is_soft_exit());
    }

    #[test]
    fn test_plan_lists_links() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("links.txt"),
            "see https://img.example/cat.jpg and https://img.example/dog.png\n",
        )
        .unwrap();

        let harvest = ImageHarvest::new_for_test(Config::default(), OutputMode::Plain, 0, true);
        let plans = harvest.plan(temp_dir.path()).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].links.len(), 2);
        assert!(!temp_dir.path().join("links").exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        ImageHarvest::generate_sample_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[scan]"));
        assert!(content.contains("[download]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

}
