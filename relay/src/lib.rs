pub mod conn;
pub mod dispatch;
pub mod error;
pub mod log;
pub mod session;

pub use conn::{Connection, Frame};
pub use dispatch::{DispatchLoop, LoopExit, LoopState, MessageHandler, Silent, StanzaLog};
pub use error::SessionError;
pub use log::{init_tracing, TracingLog};
pub use session::{Session, XmppSession};
