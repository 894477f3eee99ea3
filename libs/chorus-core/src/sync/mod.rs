mod sample;
mod state;

pub use sample::ClockSample;
pub use state::{SampleOutcome, SyncConfig, SyncState};

use super::*;
use std::sync::{Arc, RwLock};

/// Local clock corrected by the smoothed offset of a [`SyncState`].
///
/// Cloning shares the underlying estimate, so the sampling loop and the
/// playback dispatcher can hold the same instance.
#[derive(Clone)]
pub struct SyncedClock {
    local: Arc<dyn Clock>,
    state: Arc<RwLock<SyncState>>,
}

impl SyncedClock {
    pub fn new(local: Arc<dyn Clock>, config: &SyncConfig) -> Self {
        Self {
            local,
            state: Arc::new(RwLock::new(SyncState::new(config))),
        }
    }

    pub fn local(&self) -> &Arc<dyn Clock> {
        &self.local
    }

    /// Local time plus the current offset estimate, in epoch milliseconds.
    ///
    /// Before the first accepted sample this is the plain local time.
    pub fn synchronized_now(&self) -> i64 {
        let offset = self.offset().unwrap_or_default();
        self.local.now().saturating_add(offset.round() as i64)
    }

    pub fn offset(&self) -> Option<f64> {
        match self.state.read() {
            Ok(state) => state.offset(),
            Err(poisoned) => poisoned.into_inner().offset(),
        }
    }

    pub fn fold(&self, sample: ClockSample) -> SampleOutcome {
        match self.state.write() {
            Ok(mut state) => state.fold(sample),
            Err(poisoned) => poisoned.into_inner().fold(sample),
        }
    }

    pub fn snapshot(&self) -> SyncState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Clock for SyncedClock {
    fn now(&self) -> i64 {
        self.synchronized_now()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn synchronized_now_falls_back_to_local() {
        let local = Arc::new(ManualClock::new(10_000));
        let clock = SyncedClock::new(local.clone(), &SyncConfig::default());

        assert_eq!(clock.synchronized_now(), 10_000);
        local.advance(5);
        assert_eq!(clock.now(), 10_005);
    }

    #[test]
    fn synchronized_now_applies_offset() {
        let local = Arc::new(ManualClock::new(10_000));
        let clock = SyncedClock::new(local, &SyncConfig::default());

        // coordinator runs 3s ahead, 20ms each way
        let outcome = clock.fold(ClockSample::new(10_000, 13_020, 10_040));
        assert_eq!(outcome, SampleOutcome::Accepted { offset: 3_000.0, rtt: 40 });
        assert_eq!(clock.synchronized_now(), 13_000);
    }
}
