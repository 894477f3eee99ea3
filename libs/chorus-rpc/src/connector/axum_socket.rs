use super::*;
use axum::{
    extract::ws::{Message as WebSocketMessage, WebSocket},
    Error,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc::channel;
use tokio_tungstenite::tungstenite::Error as SocketError;

#[inline]
fn is_connection_closed(error: Error) -> bool {
    if let Ok(e) = error.into_inner().downcast::<SocketError>() {
        matches!(
            e.as_ref(),
            SocketError::ConnectionClosed | SocketError::AlreadyClosed
        )
    } else {
        false
    }
}

impl From<Message> for WebSocketMessage {
    fn from(value: Message) -> Self {
        match value {
            Message::Text(text) => WebSocketMessage::Text(text),
            Message::Close => WebSocketMessage::Close(None),
            Message::Ping => WebSocketMessage::Ping(vec![]),
        }
    }
}

/// Split an accepted websocket into an outbound [`Message`] pipeline and an
/// inbound stream of text frames.
pub fn axum_socket_connector(
    socket: WebSocket,
    identifier: &str,
) -> (Sender<Message>, Receiver<String>) {
    let (mut socket_tx, mut socket_rx) = socket.split();

    // send to remote pipeline
    let (local_sender, mut local_receiver) = channel::<Message>(100);
    {
        // socket send thread
        let identifier = identifier.to_owned();
        tokio::spawn(async move {
            while let Some(msg) = local_receiver.recv().await {
                let is_close = matches!(msg, Message::Close);
                if let Err(e) = socket_tx.send(msg.into()).await {
                    let error = e.to_string();
                    if is_connection_closed(e) {
                        break;
                    } else {
                        error!("socket send error: {}", error);
                    }
                }
                if is_close {
                    break;
                }
            }
            debug!("socket send final: {}", identifier);
        });
    }

    let (remote_sender, remote_receiver) = channel::<String>(512);
    {
        // socket recv thread
        let identifier = identifier.to_owned();
        tokio::spawn(async move {
            while let Some(msg) = socket_rx.next().await {
                match msg {
                    Ok(WebSocketMessage::Text(text)) => {
                        trace!("recv from {}: {}bytes", identifier, text.len());
                        if remote_sender.send(text).await.is_err() {
                            // pipeline was closed
                            break;
                        }
                    }
                    Ok(WebSocketMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("socket recv error from {}: {}", identifier, e);
                        break;
                    }
                }
            }
            debug!("socket recv final: {}", identifier);
        });
    }

    (local_sender, remote_receiver)
}
