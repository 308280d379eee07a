//! Entry point for the `bridge-gateway` binary: a local OpenAI-compatible
//! chat-completions server backed by the vendor agent protocol.

use bridge_common::GatewayConfig;
use bridge_gateway::AppState;
use bridge_gateway::router;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bridge-gateway", about = "OpenAI-compatible gateway for the vendor agent protocol")]
struct Cli {
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    cursor_base_url: Option<String>,

    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = "info";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = GatewayConfig::load();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(base_url) = cli.cursor_base_url {
        config.vendor_base_url = base_url;
    }
    if cli.debug {
        config.debug = true;
    }

    if config.access_token.is_none() {
        tracing::error!(
            "no vendor access token configured; set CURSOR_ACCESS_TOKEN and retry"
        );
        std::process::exit(1);
    }

    let port = config.port;
    let app = router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind to port {port}: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!("bridge-gateway listening on port {port}");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server exited with error: {err}");
        std::process::exit(1);
    }
}
