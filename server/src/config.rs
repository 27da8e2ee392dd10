use color_eyre::eyre::{self, WrapErr};
use parsers::jid::Jid;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:5222";
pub const DEFAULT_SERVER_JID: &str = "server@example.com";
pub const DEFAULT_PEER_JID: &str = "client@example.com";

/// Addresses every connection's session is established with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identities {
    /// Our own address
    pub server: Jid,
    /// The address clients are expected to present
    pub peer: Jid,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_address: String,
    pub identities: Identities,
}

impl Config {
    /// Reads `LISTEN_ADDRESS`, `SERVER_JID` and `PEER_JID`, falling back to
    /// the defaults for any that are unset
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let jid = |key: &str, default: &str| -> eyre::Result<Jid> {
            let value = lookup(key).unwrap_or_else(|| default.to_string());
            value
                .parse::<Jid>()
                .wrap_err_with(|| format!("{key} is not a valid JID: {value:?}"))
        };

        Ok(Self {
            listen_address: lookup("LISTEN_ADDRESS")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string()),
            identities: Identities {
                server: jid("SERVER_JID", DEFAULT_SERVER_JID)?,
                peer: jid("PEER_JID", DEFAULT_PEER_JID)?,
            },
        })
    }
}
