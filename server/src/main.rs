mod acceptor;
mod config;
mod handlers;

use std::sync::Arc;

use color_eyre::eyre::{self, WrapErr};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine, the environment may carry everything
    dotenv().ok();
    relay::init_tracing();

    let config = Config::from_env()?;
    let listener = TcpListener::bind(&config.listen_address)
        .await
        .wrap_err_with(|| format!("Failed to create listener on {}", config.listen_address))?;
    info!(
        server = %config.identities.server,
        peer = %config.identities.peer,
        "XMPP server started on {}",
        config.listen_address
    );

    acceptor::serve(listener, Arc::new(config.identities)).await;

    Ok(())
}
