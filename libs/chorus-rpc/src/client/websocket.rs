use super::*;
use chorus_core::{SyncedClock, SystemClock};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::client::IntoClientRequest, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn prepare_connection(remote: &str) -> ChorusRpcResult<Socket> {
    let uri = Url::parse(remote)?;
    let req = uri.into_client_request()?;

    debug!("connect to remote: {}", req.uri());
    Ok(connect_async(req).await?.0)
}

/// Keep an endpoint joined to the coordinator at `config.server` until
/// `cancel` fires, reconnecting every 2 seconds after a failure.
///
/// Clock sync runs in the background for the whole lifetime, independent of
/// the websocket.
pub async fn start_websocket_client(
    config: EndpointConfig,
    renderer: Arc<dyn Renderer>,
    cancel: CancellationToken,
) {
    let clock = SyncedClock::new(Arc::new(SystemClock), &config.sync);
    let sync = Arc::new(ClockSyncClient::new(
        HttpTimesync::new(config.timesync.clone()),
        clock.clone(),
        config.sync.clone(),
    ));
    let sync_handle = sync.start(cancel.child_token());

    let dispatcher = EndpointDispatcher::new(clock, renderer);

    loop {
        let socket = tokio::select! {
            _ = cancel.cancelled() => break,
            socket = prepare_connection(&config.server) => socket,
        };
        let socket = match socket {
            Ok(socket) => socket,
            Err(e) => {
                warn!("failed to connect to remote, try again in 2 seconds: {}", e);
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(Duration::from_secs(2)) => continue,
                }
            }
        };

        info!("connected to {}", config.server);
        let (tx, rx) = tungstenite_socket_connector(socket, &config.server);
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = run_session(&dispatcher, tx, rx) => {}
        }

        info!("remote connection disconnected, try again in 2 seconds");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(Duration::from_secs(2)) => {}
        }
    }

    dispatcher.reset();
    if let Err(e) = sync_handle.await {
        error!("clock sync loop failed: {}", e);
    }
    info!("endpoint stopped");
}
