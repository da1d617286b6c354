//! Upward Server Entry Point
//!
//! Initializes logging, loads configuration and the definition document, and
//! serves requests over HTTP.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use upward_server::core::config::LoggingConfig;
use upward_server::core::{Config, HttpTransport, UpwardServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);
    config.validate()?;

    // Load the definition document and resolve its entry once
    let server = UpwardServer::load(config.clone()).await?;

    info!(
        "Serving '{}' from {}",
        config.definition.entry,
        config.definition.path.display()
    );

    let transport = HttpTransport::new(config.http);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
