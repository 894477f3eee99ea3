use super::*;
use tokio::sync::mpsc::channel;

fn pipe(mut from: Receiver<Message>, to: Sender<String>, side: &'static str) {
    tokio::spawn(async move {
        while let Some(msg) = from.recv().await {
            match msg {
                Message::Text(text) => {
                    if to.send(text).await.is_err() {
                        // pipeline was closed
                        break;
                    }
                }
                Message::Close => break,
                Message::Ping => continue,
            }
        }
        trace!("memory pipe {side} final");
    });
}

/// Two connected in-process socket ends, each shaped like the output of a
/// socket connector. Sending [`Message::Close`] on one end closes the
/// inbound stream of the other.
// just for test
pub fn memory_connector() -> (
    (Sender<Message>, Receiver<String>),
    (Sender<Message>, Receiver<String>),
) {
    let (server_tx, server_out) = channel::<Message>(100);
    let (client_tx, client_out) = channel::<Message>(100);
    let (server_in_tx, server_in) = channel::<String>(512);
    let (client_in_tx, client_in) = channel::<String>(512);

    pipe(server_out, client_in_tx, "server->client");
    pipe(client_out, server_in_tx, "client->server");

    ((server_tx, server_in), (client_tx, client_in))
}
