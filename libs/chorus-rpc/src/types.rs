use thiserror::Error;
#[cfg(feature = "websocket")]
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ChorusRpcError {
    #[cfg(feature = "websocket")]
    #[error("websocket connect error")]
    WebsocketConnectError(#[from] tungstenite::Error),
    #[error("invalid remote url")]
    RemoteUrl(#[from] url::ParseError),
    #[error("cannot derive timesync endpoint from {0}")]
    InvalidRemote(String),
    #[error("timesync request failed")]
    Http(#[from] reqwest::Error),
    #[error("timesync request timed out")]
    TimesyncTimeout,
    #[error("timesync response {actual} does not answer request {expected}")]
    TimesyncMismatch { expected: u64, actual: u64 },
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("coordinator error")]
    Core(#[from] chorus_core::ChorusError),
}

pub type ChorusRpcResult<T> = Result<T, ChorusRpcError>;
