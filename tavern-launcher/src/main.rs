mod cli;

use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();
    let config = cli.app_config();

    // Client-side routes such as /board fall back to the app shell.
    let index = cli.dist_dir.join("index.html");
    let router =
        Router::new().fallback_service(ServeDir::new(&cli.dist_dir).fallback(ServeFile::new(index)));
    let router = backend::init(router, &config)
        .await?
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from((cli.host, cli.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
