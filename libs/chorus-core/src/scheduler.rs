use super::*;
use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{
    sync::mpsc::{error::TrySendError, Sender},
    time::sleep,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Distance between the coordinator's "now" and the playback instant.
    pub lookahead: Duration,
    /// Pause between two ticks.
    pub interval: Duration,
}

impl SchedulerConfig {
    /// `lookahead` in milliseconds, saturating at `i64::MAX`.
    pub fn lookahead_millis(&self) -> i64 {
        i64::try_from(self.lookahead.as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: Duration::from_millis(constants::DEFAULT_LOOKAHEAD_MS),
            interval: Duration::from_millis(constants::DEFAULT_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub text: String,
    /// Coordinator epoch milliseconds at which the line should be rendered.
    pub time: i64,
    pub simultaneous: bool,
}

/// Event queued on an endpoint's outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    VoiceAssignment(String),
    Playback(Playback),
}

/// Record of one dispatched line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
    pub index: usize,
    pub playback: Playback,
    pub targets: Vec<EndpointId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub voice: String,
    pub seq: u64,
    pub endpoints: usize,
    /// Set when this join woke the scheduler; the first line goes out
    /// before `join` returns.
    pub first_tick: Option<Tick>,
}

enum Phase {
    Idle,
    Running {
        epoch: u64,
        cancel: CancellationToken,
    },
}

struct SchedulerState {
    registry: ConnectionRegistry,
    voices: VoiceAssigner,
    current_index: usize,
    phase: Phase,
    epochs: u64,
}

/// Owns the registry, the voice assigner and the script cursor behind one
/// lock, and drives the dispatch loop while at least one endpoint is joined.
pub struct Coordinator {
    state: Mutex<SchedulerState>,
    script: Script,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl Coordinator {
    pub fn new(
        script: Script,
        voices: VoiceAssigner,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SchedulerState {
                registry: ConnectionRegistry::new(),
                voices,
                current_index: 0,
                phase: Phase::Idle,
                epochs: 0,
            }),
            script,
            clock,
            config,
        })
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lock().phase, Phase::Running { .. })
    }

    pub fn current_index(&self) -> usize {
        self.lock().current_index
    }

    /// Number of Idle to Running transitions so far.
    pub fn epoch(&self) -> u64 {
        self.lock().epochs
    }

    pub fn size(&self) -> usize {
        self.lock().registry.size()
    }

    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.lock().registry.snapshot()
    }

    /// Register `id` and queue its voice assignment on `outbox`.
    ///
    /// The first endpoint of an idle coordinator starts a new run: the cursor
    /// goes back to the first line, that line is dispatched right away and
    /// the loop is spawned for the following ones. A second join of the same
    /// id re-queues the voice it already has and reports
    /// [`ChorusError::AlreadyRegistered`].
    pub fn join(self: &Arc<Self>, id: EndpointId, outbox: Sender<Dispatch>) -> ChorusResult<Joined> {
        let mut state = self.lock();

        if let Some(endpoint) = state.registry.get(&id) {
            deliver(
                &endpoint.outbox,
                &endpoint.id,
                Dispatch::VoiceAssignment(endpoint.voice.clone()),
            );
            return Err(ChorusError::AlreadyRegistered(id));
        }

        let voice = state.voices.next_voice();
        let seq = state.registry.add(id.clone(), voice.clone(), outbox.clone())?.seq;
        deliver(&outbox, &id, Dispatch::VoiceAssignment(voice.clone()));

        let endpoints = state.registry.size();
        info!("endpoint {id} joined as {voice}, total endpoints: {endpoints}");

        let first_tick = if let Phase::Idle = state.phase {
            state.epochs += 1;
            let epoch = state.epochs;
            let cancel = CancellationToken::new();
            state.phase = Phase::Running {
                epoch,
                cancel: cancel.clone(),
            };
            state.current_index = 0;
            info!("scheduler running, epoch {epoch}");

            let tick = self.tick_locked(&mut state, epoch);
            tokio::spawn(self.clone().run(epoch, cancel));
            tick
        } else {
            None
        };

        Ok(Joined {
            voice,
            seq,
            endpoints,
            first_tick,
        })
    }

    /// Deregister `id`. The last endpoint leaving stops the run loop.
    pub fn leave(&self, id: &str) -> Option<Endpoint> {
        let mut state = self.lock();
        let endpoint = state.registry.remove(id)?;

        let remaining = state.registry.size();
        info!("endpoint {id} left, total endpoints: {remaining}");
        if remaining == 0 {
            stop(&mut state);
        }

        Some(endpoint)
    }

    /// Dispatch the current line of the live run and advance the cursor.
    ///
    /// Returns `None` when idle. The run loop calls this once per interval.
    pub fn tick(&self) -> Option<Tick> {
        let mut state = self.lock();
        let epoch = match state.phase {
            Phase::Running { epoch, .. } => epoch,
            Phase::Idle => return None,
        };
        self.tick_locked(&mut state, epoch)
    }

    /// Stop the live run, if any. Endpoints stay registered.
    pub fn close(&self) {
        stop(&mut self.lock());
    }

    fn tick_locked(&self, state: &mut SchedulerState, epoch: u64) -> Option<Tick> {
        match state.phase {
            Phase::Running { epoch: live, .. } if live == epoch => {}
            _ => return None,
        }

        let snapshot = state.registry.snapshot();
        if snapshot.is_empty() {
            stop(state);
            return None;
        }

        let index = state.current_index;
        let line = &self.script[index];
        let targets = if line.simultaneous {
            &snapshot[..]
        } else {
            let pos = index % snapshot.len();
            &snapshot[pos..=pos]
        };

        let playback = Playback {
            text: line.text.clone(),
            time: self.clock.now().saturating_add(self.config.lookahead_millis()),
            simultaneous: line.simultaneous,
        };
        for target in targets {
            deliver(
                &target.outbox,
                &target.id,
                Dispatch::Playback(playback.clone()),
            );
        }
        state.current_index = (index + 1) % self.script.len();

        debug!(
            "line {index} dispatched to {} of {} endpoints at {}",
            targets.len(),
            snapshot.len(),
            playback.time
        );

        Some(Tick {
            epoch,
            index,
            playback,
            targets: targets.iter().map(|e| e.id.clone()).collect(),
        })
    }

    fn tick_epoch(&self, epoch: u64) -> Option<Tick> {
        let mut state = self.lock();
        self.tick_locked(&mut state, epoch)
    }

    async fn run(self: Arc<Self>, epoch: u64, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.config.interval) => {}
            }
            if self.tick_epoch(epoch).is_none() {
                break;
            }
        }
        debug!("scheduler loop of epoch {epoch} stopped");
    }
}

fn stop(state: &mut SchedulerState) {
    if let Phase::Running { epoch, cancel } = mem::replace(&mut state.phase, Phase::Idle) {
        cancel.cancel();
        info!("scheduler idle, epoch {epoch} finished");
    }
}

fn deliver(outbox: &Sender<Dispatch>, id: &str, dispatch: Dispatch) -> bool {
    match outbox.try_send(dispatch) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("outbox of {id} is full, event dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!("outbox of {id} is closed, event dropped");
            false
        }
    }
}
