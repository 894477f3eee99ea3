use super::*;
use axum::{
    extract::ws::WebSocketUpgrade,
    response::Response,
    routing::{get, post},
    Json,
};
use chorus_rpc::{axum_socket_connector, handle_connector, TimesyncRequest, TimesyncResponse};
use nanoid::nanoid;

pub fn sync_handler(router: Router) -> Router {
    router
        .route("/", get(upgrade_handler))
        .route("/timesync", post(timesync_handler))
}

async fn upgrade_handler(
    Extension(context): Extension<Arc<Context>>,
    ws: WebSocketUpgrade,
) -> Response {
    let identifier = nanoid!();
    ws.on_upgrade(move |socket| {
        handle_connector(context, identifier.clone(), move || {
            axum_socket_connector(socket, &identifier)
        })
    })
}

async fn timesync_handler(
    Extension(context): Extension<Arc<Context>>,
    Json(request): Json<TimesyncRequest>,
) -> Json<TimesyncResponse> {
    Json(context.timesync(request))
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::StatusCode;
    use axum_test_helper::TestClient;
    use chorus_core::{constants, Clock};
    use chorus_rpc::{ClientMessage, ServerMessage};
    use futures::{SinkExt, StreamExt};
    use tokio_tungstenite::{connect_async, tungstenite::Message as WebSocketMessage};

    fn context() -> Arc<Context> {
        Arc::new(Context::new(&Config {
            port: 0,
            voice_mode: Default::default(),
            scheduler: Default::default(),
        }))
    }

    #[tokio::test]
    async fn timesync_echoes_id() {
        let context = context();
        let client = TestClient::new(make_router(context.clone()));

        let before = SystemClock.now();
        let resp = client
            .post("/timesync")
            .header("Content-Type", "application/json")
            .body(r#"{"id":42,"time":0}"#)
            .send()
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: TimesyncResponse = serde_json::from_str(&resp.text().await).unwrap();
        assert_eq!(body.id, 42);
        assert!(body.result >= before);
        assert!(body.result - before < 1_000);
    }

    #[tokio::test]
    async fn timesync_rejects_malformed_body() {
        let client = TestClient::new(make_router(context()));

        let resp = client
            .post("/timesync")
            .header("Content-Type", "application/json")
            .body(r#"{"id":"x"}"#)
            .send()
            .await;
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn websocket_join_receives_voice_and_first_line() {
        let context = context();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let app = make_router(context.clone());
        tokio::spawn(async move {
            Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        let (mut socket, _) = connect_async(format!("ws://{addr}/")).await.unwrap();
        socket
            .send(WebSocketMessage::Text(ClientMessage::Join.to_text().unwrap()))
            .await
            .unwrap();

        let mut frames = Vec::new();
        while frames.len() < 2 {
            match socket.next().await.unwrap().unwrap() {
                WebSocketMessage::Text(text) => frames.push(ServerMessage::from_text(&text).unwrap()),
                _ => continue,
            }
        }

        assert_eq!(
            frames[0],
            ServerMessage::VoiceAssignment {
                voice: constants::DEFAULT_VOICES[0].into()
            }
        );
        match &frames[1] {
            ServerMessage::Playback { phrase, .. } => {
                assert_eq!(phrase, &Script::default()[0].text)
            }
            other => panic!("unexpected frame: {other:?}"),
        }
        assert_eq!(context.coordinator.size(), 1);
        assert!(context.coordinator.is_running());

        socket.close(None).await.unwrap();
        for _ in 0..50 {
            if context.coordinator.size() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(context.coordinator.size(), 0);
        assert!(!context.coordinator.is_running());
    }
}
