use super::*;
use async_trait::async_trait;
use chorus_core::{ClockSample, SampleOutcome, SyncConfig, SyncedClock};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{task::JoinHandle, time::timeout};
use tokio_util::sync::CancellationToken;

/// One request/response exchange with the coordinator clock.
#[async_trait]
pub trait TimesyncTransport: Send + Sync {
    async fn exchange(&self, request: TimesyncRequest) -> ChorusRpcResult<TimesyncResponse>;
}

/// `POST /timesync` over HTTP.
pub struct HttpTimesync {
    client: reqwest::Client,
    url: String,
}

impl HttpTimesync {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TimesyncTransport for HttpTimesync {
    async fn exchange(&self, request: TimesyncRequest) -> ChorusRpcResult<TimesyncResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Samples the coordinator clock and folds the results into a shared
/// [`SyncedClock`].
pub struct ClockSyncClient<T> {
    transport: T,
    clock: SyncedClock,
    config: SyncConfig,
    next_id: AtomicU64,
}

impl<T: TimesyncTransport> ClockSyncClient<T> {
    pub fn new(transport: T, clock: SyncedClock, config: SyncConfig) -> Self {
        Self {
            transport,
            clock,
            config,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn clock(&self) -> &SyncedClock {
        &self.clock
    }

    /// Run one exchange and measure it against the local clock.
    pub async fn sample(&self) -> ChorusRpcResult<ClockSample> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let local = self.clock.local();

        let local_send = local.now();
        let response = timeout(
            self.config.timeout,
            self.transport.exchange(TimesyncRequest {
                id,
                time: local_send,
            }),
        )
        .await
        .map_err(|_| ChorusRpcError::TimesyncTimeout)??;
        let local_receive = local.now();

        if response.id != id {
            return Err(ChorusRpcError::TimesyncMismatch {
                expected: id,
                actual: response.id,
            });
        }

        Ok(ClockSample::new(local_send, response.result, local_receive))
    }

    /// Take one sample and fold it. A failed exchange leaves the estimate
    /// untouched and returns `None`.
    pub async fn sync_once(&self) -> Option<SampleOutcome> {
        match self.sample().await {
            Ok(sample) => {
                let outcome = self.clock.fold(sample);
                match &outcome {
                    SampleOutcome::Accepted { offset, rtt } => {
                        debug!("clock offset {:.1}ms, rtt {}ms", offset, rtt)
                    }
                    SampleOutcome::Rejected { rtt, min_rtt } => {
                        debug!("reject clock sample, rtt {}ms, min rtt {}ms", rtt, min_rtt)
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                warn!("clock sync failed, keep previous offset: {}", e);
                None
            }
        }
    }
}

impl<T: TimesyncTransport + 'static> ClockSyncClient<T> {
    /// Sample immediately and then once per interval until `cancel` fires.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.sync_once().await;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(self.config.interval) => {}
                }
            }
            debug!("clock sync loop stopped");
        })
    }
}
