use super::*;
use chorus_core::SyncConfig;
use std::env;
use url::Url;

const DEFAULT_SERVER: &str = "ws://localhost:3000/";

/// Settings of the endpoint binary, read from the environment.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    /// Coordinator websocket url. `ws://localhost:3000/` by default.
    pub server: String,
    /// Clock sync url, derived from `server` unless set.
    pub timesync: String,
    pub sync: SyncConfig,
}

impl EndpointConfig {
    pub fn new() -> ChorusRpcResult<Self> {
        dotenvy::dotenv().ok();

        let server = env::var("CHORUS_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.into());
        let timesync = match env::var("CHORUS_TIMESYNC") {
            Ok(timesync) => timesync,
            Err(_) => timesync_url(&server)?,
        };

        Ok(Self {
            server,
            timesync,
            sync: SyncConfig::default(),
        })
    }

    pub fn with_server(server: &str) -> ChorusRpcResult<Self> {
        Ok(Self {
            server: server.into(),
            timesync: timesync_url(server)?,
            sync: SyncConfig::default(),
        })
    }
}

/// Map a coordinator websocket url onto its `/timesync` route.
pub fn timesync_url(server: &str) -> ChorusRpcResult<String> {
    let mut url = Url::parse(server)?;
    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        _ => return Err(ChorusRpcError::InvalidRemote(server.into())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ChorusRpcError::InvalidRemote(server.into()))?;
    url.set_path("/timesync");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}
