mod config;

use color_eyre::eyre::{self, WrapErr};
use dotenvy::dotenv;
use parsers::stanza::{
    message::{Message, MessageType},
    Stanza,
};
use relay::{Connection, DispatchLoop, Session, Silent, TracingLog, XmppSession};
use tokio::net::TcpStream;
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    relay::init_tracing();

    let config = Config::from_env()?;

    let stream = TcpStream::connect(&config.server_address)
        .await
        .wrap_err_with(|| format!("Failed to connect to {}", config.server_address))?;
    let mut session = XmppSession::establish_client(config.client, Connection::new(stream))
        .await
        .wrap_err("Failed to create session")?;
    info!(id = session.id().unwrap_or_default(), "Session established");

    let message = Message {
        to: Some(config.recipient),
        type_: MessageType::Normal,
        body: config.body,
        ..Default::default()
    };
    session
        .send(Stanza::Message(message))
        .await
        .wrap_err("Failed to send message")?;
    info!("Message sent, waiting for reply...");

    DispatchLoop::new(session, Silent, TracingLog)
        .run()
        .await
        .into_result()
        .wrap_err("Failed to serve session")
}
