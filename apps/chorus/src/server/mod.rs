mod sync;

use super::config::Config;
use axum::{http::Method, Extension, Router, Server};
use chorus_core::{Coordinator, Script, SystemClock, VoiceAssigner};
use chorus_logger::{error, info};
use chorus_rpc::RpcContextImpl;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

pub struct Context {
    coordinator: Arc<Coordinator>,
}

impl Context {
    pub fn new(config: &Config) -> Self {
        let coordinator = Coordinator::new(
            Script::default(),
            VoiceAssigner::with_default_voices(config.voice_mode),
            Arc::new(SystemClock),
            config.scheduler.clone(),
        );
        info!(
            "script of {} lines, voice mode {:?}, lookahead {:?}, interval {:?}",
            coordinator.script().len(),
            config.voice_mode,
            config.scheduler.lookahead,
            config.scheduler.interval
        );

        Self { coordinator }
    }
}

impl RpcContextImpl for Context {
    fn get_coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }
}

pub fn make_router(context: Arc<Context>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        // endpoints are browsers served from anywhere
        .allow_origin(Any)
        .allow_headers(Any);

    sync::sync_handler(Router::new())
        .layer(cors)
        .layer(Extension(context))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

pub async fn start_server(config: Config) {
    let context = Arc::new(Context::new(&config));
    let app = make_router(context.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {}", addr);

    if let Err(e) = Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server shutdown due to error: {}", e);
    }

    context.coordinator.close();

    info!("Server shutdown complete");
}
