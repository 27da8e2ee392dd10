pub mod message;

pub use message::Echo;
