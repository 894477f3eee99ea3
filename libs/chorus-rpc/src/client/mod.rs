mod config;
#[cfg(feature = "websocket")]
mod websocket;

pub use config::{timesync_url, EndpointConfig};
#[cfg(feature = "websocket")]
pub use websocket::start_websocket_client;

use super::*;
use chorus_core::SyncedClock;
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;

/// Performs a playback action on the endpoint, e.g. speech synthesis.
pub trait Renderer: Send + Sync {
    fn render(&self, voice: Option<&str>, phrase: &str, simultaneous: bool);
}

/// Writes each phrase to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render(&self, voice: Option<&str>, phrase: &str, simultaneous: bool) {
        let voice = voice.unwrap_or("default voice");
        if simultaneous {
            info!("[{voice}, together] {phrase}");
        } else {
            info!("[{voice}] {phrase}");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    VoiceAssigned(String),
    /// Armed to fire after `delay` milliseconds.
    Scheduled { delay: i64 },
    /// Playback instant already passed by `-delay` milliseconds; dropped.
    Late { delay: i64 },
}

/// Turns coordinator frames into timed calls of a [`Renderer`].
///
/// At most one playback is pending at a time: a newer playback aborts the
/// pending one before arming itself.
pub struct EndpointDispatcher {
    clock: SyncedClock,
    renderer: Arc<dyn Renderer>,
    voice: Arc<RwLock<Option<String>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl EndpointDispatcher {
    pub fn new(clock: SyncedClock, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            clock,
            renderer,
            voice: Arc::default(),
            pending: Mutex::default(),
        }
    }

    pub fn clock(&self) -> &SyncedClock {
        &self.clock
    }

    pub fn voice(&self) -> Option<String> {
        self.voice
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn handle_text(&self, text: &str) -> ChorusRpcResult<DispatchOutcome> {
        Ok(self.handle(ServerMessage::from_text(text)?))
    }

    pub fn handle(&self, msg: ServerMessage) -> DispatchOutcome {
        match msg {
            ServerMessage::VoiceAssignment { voice } => {
                *self.voice.write().unwrap_or_else(PoisonError::into_inner) = Some(voice.clone());
                DispatchOutcome::VoiceAssigned(voice)
            }
            ServerMessage::Playback {
                phrase,
                time,
                is_simultaneous,
            } => {
                let delay = time.saturating_sub(self.clock.synchronized_now());
                if delay <= 0 {
                    return DispatchOutcome::Late { delay };
                }

                let renderer = self.renderer.clone();
                let voice = self.voice.clone();
                let handle = tokio::spawn(async move {
                    sleep(Duration::from_millis(delay as u64)).await;
                    let voice = voice.read().unwrap_or_else(PoisonError::into_inner).clone();
                    renderer.render(voice.as_deref(), &phrase, is_simultaneous);
                });

                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(previous) = pending.replace(handle) {
                    previous.abort();
                }

                DispatchOutcome::Scheduled { delay }
            }
        }
    }

    /// Abort the pending playback. Returns whether one was still waiting.
    pub fn cancel_pending(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Forget the session: abort the pending playback and drop the voice.
    pub fn reset(&self) {
        self.cancel_pending();
        self.voice
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Join the coordinator over an established connection and dispatch its
/// frames until the connection ends.
pub async fn run_session(
    dispatcher: &EndpointDispatcher,
    tx: Sender<Message>,
    mut rx: Receiver<String>,
) {
    let join = match ClientMessage::Join.to_text() {
        Ok(join) => join,
        Err(e) => {
            error!("failed to encode join: {}", e);
            return;
        }
    };
    if tx.send(Message::Text(join)).await.is_err() {
        warn!("connection closed before join");
        return;
    }

    while let Some(text) = rx.recv().await {
        match dispatcher.handle_text(&text) {
            Ok(DispatchOutcome::VoiceAssigned(voice)) => info!("assigned voice: {}", voice),
            Ok(DispatchOutcome::Scheduled { delay }) => debug!("playback in {}ms", delay),
            Ok(DispatchOutcome::Late { delay }) => {
                warn!("drop late playback, {}ms behind", -delay)
            }
            Err(e) => warn!("ignore malformed frame: {}", e),
        }
    }

    dispatcher.reset();
    if let Err(e) = tx.send(Message::Close).await {
        trace!("connection already closed: {}", e);
    }
}
