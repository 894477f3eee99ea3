use chorus_logger::{error, info, init_logger};
use chorus_rpc::{start_websocket_client, EndpointConfig, LogRenderer};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    init_logger();

    let config = match EndpointConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid endpoint config: {}", e);
            return;
        }
    };
    info!("joining {}, clock sync via {}", config.server, config.timesync);

    let cancel = CancellationToken::new();
    let client = tokio::spawn(start_websocket_client(
        config,
        Arc::new(LogRenderer),
        cancel.clone(),
    ));

    if let Err(e) = signal::ctrl_c().await {
        error!("failed to install ctrl+c handler: {}", e);
    }
    cancel.cancel();

    if let Err(e) = client.await {
        error!("endpoint task failed: {}", e);
    }
}
