use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use stki_core::{EngineConfig, Representation};
use stki_server::build_app;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "stki-server")]
struct Args {
    /// Folder of .txt documents
    #[arg(long, default_value = "data/processed")]
    data: PathBuf,
    /// Treat files as raw text instead of preprocessed tokens
    #[arg(long, default_value_t = false)]
    raw: bool,
    /// JSON engine config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = EngineConfig::load_or_default(args.config.as_deref())?;
    let representation = if args.raw { Representation::Text } else { Representation::Tokens };
    let app: Router = build_app(&args.data, representation, config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, data = %args.data.display(), "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
