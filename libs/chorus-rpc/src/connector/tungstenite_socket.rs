use super::*;
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::{net::TcpStream, sync::mpsc::channel};
use tokio_tungstenite::{
    tungstenite::{Error as SocketError, Message as WebSocketMessage},
    MaybeTlsStream, WebSocketStream,
};

type WebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

impl From<Message> for WebSocketMessage {
    fn from(value: Message) -> Self {
        match value {
            Message::Text(text) => WebSocketMessage::Text(text),
            Message::Close => WebSocketMessage::Close(None),
            Message::Ping => WebSocketMessage::Ping(vec![]),
        }
    }
}

/// Client side counterpart of [`axum_socket_connector`](super::axum_socket_connector).
pub fn tungstenite_socket_connector(
    socket: WebSocket,
    remote: &str,
) -> (Sender<Message>, Receiver<String>) {
    let (mut socket_tx, mut socket_rx) = socket.split();

    // send to remote pipeline
    let (local_sender, mut local_receiver) = channel::<Message>(100);
    {
        // socket send thread
        let remote = remote.to_owned();
        tokio::spawn(async move {
            let mut retry = 5;
            while let Some(msg) = local_receiver.recv().await {
                let is_close = matches!(msg, Message::Close);
                if let Err(e) = socket_tx.send(msg.into()).await {
                    let error = e.to_string();
                    if matches!(
                        e,
                        SocketError::ConnectionClosed | SocketError::AlreadyClosed
                    ) || retry == 0
                    {
                        break;
                    } else {
                        retry -= 1;
                        error!("socket send error: {}", error);
                    }
                } else {
                    retry = 5;
                }
                if is_close {
                    break;
                }
            }
            debug!("socket send final: {}", remote);
        });
    }

    let (remote_sender, remote_receiver) = channel::<String>(512);
    {
        // socket recv thread
        let remote = remote.to_owned();
        tokio::spawn(async move {
            while let Some(msg) = socket_rx.next().await {
                match msg {
                    Ok(WebSocketMessage::Text(text)) => {
                        trace!("recv from remote: {}bytes", text.len());
                        if remote_sender.send(text).await.is_err() {
                            // pipeline was closed
                            break;
                        }
                    }
                    Ok(WebSocketMessage::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("socket recv error from {}: {}", remote, e);
                        break;
                    }
                }
            }
            debug!("socket recv final: {}", remote);
        });
    }

    (local_sender, remote_receiver)
}
