use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use agenda::config::{AppConfig, CONFIG_ENV, load_config};
use agenda::routes::{self, Services};
use agenda::{Error, Server};

#[tokio::main]
async fn main() -> ExitCode {
    // First argument, then AGENDA_CONFIG, then built-in defaults.
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from);

    let config = load_config(path.as_deref());
    init_tracing(config.as_ref().map(|c| c.log_filter.as_str()).unwrap_or("info"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Result<AppConfig, agenda::config::ConfigError>) -> Result<(), Error> {
    let config = config?;
    let addr = config.socket_addr()?;
    info!(%addr, api_prefix = %config.api_prefix, "starting agenda");

    let router = routes::router(&Services::in_memory(), &config.api_prefix);
    Server::new(addr).serve(router).await
}

/// `RUST_LOG` wins when set; otherwise the configured filter applies.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
