pub const NAMESPACE_CLIENT: &str = "jabber:client";
pub const NAMESPACE_STREAM: &str = "http://etherx.jabber.org/streams";

pub const STREAM_VERSION: &str = "1.0";
pub const DEFAULT_LANG: &str = "en";
