use anyhow::Result;
use clap::Parser;
use gs1920_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.yml")]
    config: String,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Seconds subtracted from the Prometheus scrape timeout (overrides config)
    #[arg(long, env = "EXPORTER_TIMEOUT_OFFSET")]
    timeout_offset: Option<f64>,

    /// Skip TLS certificate verification for https switches (not recommended)
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting GS1920 Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(offset) = args.timeout_offset {
        config.server.timeout_offset = offset;
    }
    if args.insecure {
        config.server.insecure = true;
    }
    config.validate()?;

    info!("Configuration loaded successfully");
    info!("Configured devices: {}", config.devices.len());
    info!(
        "Collectors: hwmon={} poe={}",
        config.features.hwmon, config.features.poe
    );

    // Start the probe server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
