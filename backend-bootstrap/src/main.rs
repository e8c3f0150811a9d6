use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gantry-backend")]
#[command(about = "Scan reconciliation backend", version)]
struct Args {
    /// Path to the TOML config file (defaults to ./config.toml)
    #[arg(short, long)]
    config: Option<String>,
    /// Override the configured listen address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(config) = args.config {
        std::env::set_var("GANTRY_CONFIG", config);
    }
    if let Some(bind) = args.bind {
        std::env::set_var("GANTRY_BIND_ADDR", bind);
    }

    backend_bootstrap::run_standalone().await
}
