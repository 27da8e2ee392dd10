pub mod constants;
pub mod error;
pub mod from_xml;
pub mod jid;
pub mod stanza;
pub mod stream;
pub mod utils;

pub use error::DecodeError;
