use anyhow::Result;
use clap::Parser;
use product_finder::app::App;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "product-finder")]
#[command(about = "Identify products from photos and find them on Amazon")]
struct CliArgs {
    /// Address to listen on.
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8080", value_parser = parse_bind_arg)]
    bind: SocketAddr,
}

fn parse_bind_arg(input: &str) -> std::result::Result<SocketAddr, String> {
    input
        .parse()
        .map_err(|_| format!("Invalid address '{}'. Expected format: HOST:PORT", input))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_finder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting product-finder");

    let args = CliArgs::parse();

    match App::new() {
        Ok(app) => match app.run(args.bind).await {
            Ok(_) => {
                info!("Server stopped");
                Ok(())
            }
            Err(e) => {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
