use clap::Parser;
use imgharvest::{
    logging, Cli, HarvestError, ImageHarvest, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Warning: {:#}", e);
    }

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let directory = match cli.target_directory() {
        Ok(directory) => directory,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let harvest = match ImageHarvest::from_cli(&cli) {
        Ok(harvest) => harvest,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&harvest, &directory);
    }

    match harvest.run(&directory).await {
        Ok(report) => {
            harvest.output_formatter().print_run_report(&report);
            0
        }
        Err(e) => {
            harvest.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &HarvestError) -> i32 {
    match error {
        e if e.is_soft_exit() => 0,
        HarvestError::Cancelled => 130, // Interrupted (SIGINT)
        HarvestError::Config { .. } => 2,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "imgharvest.toml".to_string());

    match ImageHarvest::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  imgharvest <directory> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(harvest: &ImageHarvest, directory: &std::path::Path) -> i32 {
    let formatter = harvest.output_formatter();

    formatter.info("DRY RUN MODE - nothing will be downloaded");

    let config = harvest.config();
    formatter.debug(&format!(
        "Source extensions: {}",
        config.scan.source_extensions.join(", ")
    ));
    formatter.debug(&format!(
        "Image extensions: {}",
        config.scan.image_extensions.join(", ")
    ));
    formatter.debug(&format!("Download policy: {}", config.download.policy));

    match harvest.plan(directory) {
        Ok(plans) => {
            formatter.print_plan(directory, &plans);
            let links: usize = plans.iter().map(|p| p.links.len()).sum();
            formatter.success(&format!(
                "{} files, {} images would be fetched",
                plans.len(),
                links
            ));
            0
        }
        Err(e) => {
            harvest.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &HarvestError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
