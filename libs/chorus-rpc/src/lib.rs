mod client;
mod connector;
mod context;
mod protocol;
mod timesync;
mod types;

#[cfg(feature = "websocket")]
pub use client::start_websocket_client;
pub use client::{
    run_session, timesync_url, DispatchOutcome, EndpointConfig, EndpointDispatcher, LogRenderer,
    Renderer,
};
#[cfg(feature = "websocket")]
pub use connector::{axum_socket_connector, tungstenite_socket_connector};
pub use connector::memory_connector;
pub use context::RpcContextImpl;
pub use protocol::{ClientMessage, ServerMessage, TimesyncRequest, TimesyncResponse};
pub use timesync::{ClockSyncClient, HttpTimesync, TimesyncTransport};
pub use types::{ChorusRpcError, ChorusRpcResult};

use chorus_core::{debug, error, info, trace, warn, Dispatch};
use std::{sync::Arc, time::Instant};
use tokio::{
    sync::mpsc::{channel, Receiver, Sender},
    time::{sleep, Duration},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Close,
    Ping,
}

/// Serve one endpoint connection until either side hangs up.
///
/// `get_channel` hands over the socket as an outbound [`Message`] sender and
/// an inbound stream of text frames. The endpoint is joined to the
/// coordinator on its `join` frame and always removed again on exit.
pub async fn handle_connector(
    context: Arc<impl RpcContextImpl + Send + Sync + 'static>,
    identifier: String,
    get_channel: impl FnOnce() -> (Sender<Message>, Receiver<String>),
) {
    info!("{} connected", identifier);

    let (tx, mut rx) = get_channel();
    let (outbox, mut dispatches) = channel::<Dispatch>(100);

    'session: loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(text) = msg else {
                    // remote closed
                    break 'session;
                };
                match ClientMessage::from_text(&text) {
                    Ok(ClientMessage::Join) => context.join_scheduler(&identifier, outbox.clone()),
                    Err(e) => warn!("ignore malformed frame from {}: {}", identifier, e),
                }
            },
            Some(dispatch) = dispatches.recv() => {
                let ts = Instant::now();
                let text = match ServerMessage::from(dispatch).to_text() {
                    Ok(text) => text,
                    Err(e) => {
                        error!("failed to encode dispatch for {}: {}", identifier, e);
                        continue;
                    }
                };
                if tx.send(Message::Text(text)).await.is_err() {
                    // pipeline was closed
                    break 'session;
                }
                if ts.elapsed().as_micros() > 100 {
                    debug!("process dispatch cost: {}ms", ts.elapsed().as_micros());
                }
            },
            _ = sleep(Duration::from_secs(5)) => {
                if tx.is_closed() || tx.send(Message::Ping).await.is_err() {
                    break 'session;
                }
            }
        }
    }

    context.leave_scheduler(&identifier);

    // make a final attempt to close the socket
    if let Err(e) = tx.send(Message::Close).await {
        trace!("socket of {} already closed: {}", identifier, e);
    }

    info!("{} disconnected", identifier);
}

#[cfg(test)]
mod test {
    use super::*;
    use chorus_core::{
        Coordinator, ManualClock, SchedulerConfig, Script, ScriptLine, VoiceAssigner, VoiceMode,
    };

    struct TestContext {
        coordinator: Arc<Coordinator>,
    }

    impl RpcContextImpl for TestContext {
        fn get_coordinator(&self) -> &Arc<Coordinator> {
            &self.coordinator
        }
    }

    fn context(clock: Arc<ManualClock>) -> Arc<TestContext> {
        let script = Script::new(vec![
            ScriptLine::new("Hello.", false),
            ScriptLine::new("Together.", true),
        ])
        .unwrap();
        let voices = VoiceAssigner::new(["Alex", "Moira"], VoiceMode::RoundRobin).unwrap();
        Arc::new(TestContext {
            coordinator: Coordinator::new(
                script,
                voices,
                clock,
                SchedulerConfig {
                    lookahead: Duration::from_millis(1000),
                    interval: Duration::from_millis(5000),
                },
            ),
        })
    }

    async fn recv_server(rx: &mut Receiver<String>) -> ServerMessage {
        let text = rx.recv().await.expect("connection closed");
        ServerMessage::from_text(&text).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn join_then_voice_then_playback() {
        let clock = Arc::new(ManualClock::new(10_000));
        let context = context(clock.clone());
        let (server, (client_tx, mut client_rx)) = memory_connector();

        let handle = tokio::spawn(handle_connector(context.clone(), "a".into(), move || server));

        client_tx
            .send(Message::Text(ClientMessage::Join.to_text().unwrap()))
            .await
            .unwrap();

        assert_eq!(
            recv_server(&mut client_rx).await,
            ServerMessage::VoiceAssignment {
                voice: "Alex".into()
            }
        );
        assert_eq!(
            recv_server(&mut client_rx).await,
            ServerMessage::Playback {
                phrase: "Hello.".into(),
                time: 11_000,
                is_simultaneous: false,
            }
        );
        assert_eq!(context.coordinator.size(), 1);

        client_tx.send(Message::Close).await.unwrap();
        handle.await.unwrap();

        assert_eq!(context.coordinator.size(), 0);
        assert!(!context.coordinator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_frames_keep_connection() {
        let context = context(Arc::new(ManualClock::new(0)));
        let (server, (client_tx, mut client_rx)) = memory_connector();

        let handle = tokio::spawn(handle_connector(context.clone(), "b".into(), move || server));

        for frame in ["garbage", r#"{"type":"dance"}"#, "{}"] {
            client_tx.send(Message::Text(frame.into())).await.unwrap();
        }
        client_tx
            .send(Message::Text(r#"{"type":"join"}"#.into()))
            .await
            .unwrap();

        assert!(matches!(
            recv_server(&mut client_rx).await,
            ServerMessage::VoiceAssignment { .. }
        ));
        assert_eq!(context.coordinator.size(), 1);

        drop(client_tx);
        handle.await.unwrap();
        assert_eq!(context.coordinator.size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_without_join() {
        let context = context(Arc::new(ManualClock::new(0)));
        let (server, (client_tx, _client_rx)) = memory_connector();

        let handle = tokio::spawn(handle_connector(context.clone(), "c".into(), move || server));
        client_tx.send(Message::Close).await.unwrap();
        handle.await.unwrap();

        assert_eq!(context.coordinator.size(), 0);
        assert_eq!(context.coordinator.epoch(), 0);
    }

    #[test]
    fn timesync_answers_with_coordinator_clock() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let context = context(clock.clone());
        clock.advance(25);

        assert_eq!(
            context.timesync(TimesyncRequest { id: 3, time: 5 }),
            TimesyncResponse {
                id: 3,
                result: 1_700_000_000_025
            }
        );
    }
}
