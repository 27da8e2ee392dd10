use color_eyre::eyre::{self, WrapErr};
use parsers::jid::Jid;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5222";
pub const DEFAULT_CLIENT_JID: &str = "client@example.com";
pub const DEFAULT_RECIPIENT_JID: &str = "server@example.com";
pub const DEFAULT_MESSAGE_BODY: &str = "Hello, XMPP!";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Address we open the stream as
    pub client: Jid,
    /// Where the first message goes
    pub recipient: Jid,
    pub body: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let value = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let jid = |key: &str, default: &str| -> eyre::Result<Jid> {
            let raw = value(key, default);
            raw.parse::<Jid>()
                .wrap_err_with(|| format!("{key} is not a valid JID: {raw:?}"))
        };

        Ok(Self {
            server_address: value("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            client: jid("CLIENT_JID", DEFAULT_CLIENT_JID)?,
            recipient: jid("RECIPIENT_JID", DEFAULT_RECIPIENT_JID)?,
            body: value("MESSAGE_BODY", DEFAULT_MESSAGE_BODY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_address, "127.0.0.1:5222");
        assert_eq!(config.client, Jid::new("client", "example.com"));
        assert_eq!(config.recipient, Jid::new("server", "example.com"));
        assert_eq!(config.body, "Hello, XMPP!");
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(|key| match key {
            "SERVER_ADDRESS" => Some("10.0.0.2:5222".to_string()),
            "CLIENT_JID" => Some("alice@localhost/phone".to_string()),
            "MESSAGE_BODY" => Some("1 < 2".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.server_address, "10.0.0.2:5222");
        assert_eq!(
            config.client,
            Jid::new("alice", "localhost").with_resource("phone")
        );
        assert_eq!(config.recipient, Jid::new("server", "example.com"));
        assert_eq!(config.body, "1 < 2");
    }

    #[test]
    fn invalid_recipient_is_an_error() {
        let err = Config::from_lookup(|key| {
            (key == "RECIPIENT_JID").then(|| "server@".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("RECIPIENT_JID"));
    }
}
