//! Live status channel: connection registry, broadcast pipeline and the
//! client command dispatcher.

pub mod broadcaster;
pub mod commands;
mod handler;
pub mod message;
pub mod registry;

pub use broadcaster::Broadcaster;
pub use commands::CommandDispatcher;
pub use handler::ws_handler;
pub use message::{MessageKind, WsMessage};
pub use registry::ConnectionRegistry;
