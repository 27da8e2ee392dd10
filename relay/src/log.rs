use parsers::{
    jid::Jid,
    stanza::{iq::Iq, message::Message, presence::Presence},
    DecodeError,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    dispatch::{LoopState, StanzaLog},
    error::SessionError,
};

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`
/// (`info` when unset)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// [`StanzaLog`] writing `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

fn or_unknown(jid: &Option<Jid>) -> String {
    jid.as_ref()
        .map(Jid::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

impl StanzaLog for TracingLog {
    fn message(&self, message: &Message) {
        info!(from = %or_unknown(&message.from), "Received message: {}", message.body);
    }

    fn presence(&self, presence: &Presence) {
        info!("Received presence from: {}", or_unknown(&presence.from));
    }

    fn iq(&self, iq: &Iq) {
        info!(id = ?iq.id, "Received IQ from: {}", or_unknown(&iq.from));
    }

    fn unknown(&self, name: &str) {
        info!("Unknown stanza: {name}");
    }

    fn decode_failed(&self, name: &str, error: &DecodeError) {
        warn!(%error, "Failed to decode <{name}>");
    }

    fn state_changed(&self, state: LoopState) {
        debug!(?state, "dispatch loop state changed");
    }

    fn close_failed(&self, error: &SessionError) {
        warn!(%error, "Failed to close session");
    }
}
