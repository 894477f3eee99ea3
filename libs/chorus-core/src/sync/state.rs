use super::ClockSample;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Pause between two exchanges.
    pub interval: Duration,
    /// An exchange that takes longer than this is abandoned.
    pub timeout: Duration,
    /// A sample is accepted only if its rtt is within this multiple of the
    /// smallest rtt seen so far.
    pub outlier_factor: f64,
    /// Weight of an accepted sample in the moving average, in `(0, 1]`.
    pub smoothing: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            outlier_factor: 2.0,
            smoothing: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Accepted { offset: f64, rtt: i64 },
    Rejected { rtt: i64, min_rtt: i64 },
}

#[derive(Debug, Clone)]
pub struct SyncState {
    offset: Option<f64>,
    last_rtt: Option<i64>,
    min_rtt: Option<i64>,
    samples: usize,
    rejected: usize,
    outlier_factor: f64,
    smoothing: f64,
}

impl SyncState {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            offset: None,
            last_rtt: None,
            min_rtt: None,
            samples: 0,
            rejected: 0,
            outlier_factor: config.outlier_factor.max(1.0),
            smoothing: config.smoothing.clamp(f64::MIN_POSITIVE, 1.0),
        }
    }

    /// Smoothed `coordinator - endpoint` offset, `None` until a sample lands.
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn last_rtt(&self) -> Option<i64> {
        self.last_rtt
    }

    pub fn min_rtt(&self) -> Option<i64> {
        self.min_rtt
    }

    /// Number of samples folded into the offset.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Fold one exchange into the estimate.
    ///
    /// A negative rtt means the local clock stepped backwards mid-exchange;
    /// such a sample is rejected and leaves both the offset and the minimum
    /// rtt untouched.
    pub fn fold(&mut self, sample: ClockSample) -> SampleOutcome {
        let rtt = sample.rtt();
        self.last_rtt = Some(rtt);
        if rtt < 0 {
            self.rejected += 1;
            return SampleOutcome::Rejected {
                rtt,
                min_rtt: self.min_rtt.unwrap_or(rtt),
            };
        }

        let min_rtt = self.min_rtt.map_or(rtt, |min| min.min(rtt));
        self.min_rtt = Some(min_rtt);

        if rtt as f64 > min_rtt.max(1) as f64 * self.outlier_factor {
            self.rejected += 1;
            return SampleOutcome::Rejected { rtt, min_rtt };
        }

        let measured = sample.offset();
        let offset = match self.offset {
            Some(current) => current + self.smoothing * (measured - current),
            None => measured,
        };
        self.offset = Some(offset);
        self.samples += 1;

        SampleOutcome::Accepted { offset, rtt }
    }
}
