use std::sync::Arc;

use relay::{Connection, DispatchLoop, LoopExit, TracingLog, XmppSession};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, info_span, warn, Instrument};

use crate::{config::Identities, handlers::Echo};

/// Accepts connections forever, each one served by its own task.
///
/// A failed accept is logged and the loop goes on.
pub async fn serve(listener: TcpListener, identities: Arc<Identities>) {
    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                let span = info_span!("connection", peer = %address);
                tokio::spawn(handle_connection(stream, Arc::clone(&identities)).instrument(span));
            }
            Err(error) => warn!(%error, "Failed to accept connection"),
        }
    }
}

async fn handle_connection(stream: TcpStream, identities: Arc<Identities>) {
    let connection = Connection::new(stream);
    let session = match XmppSession::establish_server(
        identities.server.clone(),
        identities.peer.clone(),
        connection,
    )
    .await
    {
        Ok(session) => session,
        Err(error) => {
            warn!(%error, "Failed to create session");
            return;
        }
    };
    info!(id = session.id().unwrap_or_default(), "Session established");

    match DispatchLoop::new(session, Echo, TracingLog).run().await {
        LoopExit::EndOfStream => info!("Session closed by peer"),
        exit => warn!("Failed to serve session: {exit}"),
    }
}
