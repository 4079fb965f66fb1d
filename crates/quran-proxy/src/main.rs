mod proxy;

use std::path::PathBuf;

use clap::Parser;
use quran_core::config::Config;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Quran audio proxy: serves the player's static files and streams
/// whole-chapter recordings from the first mirror that answers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory to serve static files from (overrides the config file)
    #[arg(short, long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup stderr + file logging
    let data_dir = quran_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("proxy.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,quran_proxy=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let mut config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    if let Some(port) = args.port {
        config.proxy.port = port;
    }
    if let Some(bind) = args.bind {
        config.proxy.bind_address = bind;
    }
    if let Some(root) = args.root {
        config.proxy.static_root = root;
    }
    info!(
        "Serving {:?} with {} mirrors",
        config.proxy.static_root,
        config.proxy.mirrors.len()
    );

    let state = proxy::ProxyState::from_config(&config.proxy)?;
    proxy::serve(&config.proxy.bind_address, config.proxy.port, state).await
}
