#[cfg(feature = "websocket")]
mod axum_socket;
mod memory;
#[cfg(feature = "websocket")]
mod tungstenite_socket;

#[cfg(feature = "websocket")]
pub use axum_socket::axum_socket_connector;
pub use memory::memory_connector;
#[cfg(feature = "websocket")]
pub use tungstenite_socket::tungstenite_socket_connector;

use super::*;
