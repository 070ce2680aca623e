use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-v`/`-q`.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    tracing::debug!("logging initialized");

    Ok(())
}

fn default_directive(verbose: u8, quiet: bool) -> String {
    // At the default level the console output already reports every
    // recoverable failure, so only errors are logged.
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    format!("warn,imgharvest={}", level)
}
