use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use gesture_call_signaling_server::router::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let address = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:5002".to_owned());
    let address = SocketAddr::from_str(&address).context("invalid socket address provided")?;

    axum::Server::bind(&address)
        .serve(create_router().into_make_service())
        .await
        .context("signaling server failed")
}
