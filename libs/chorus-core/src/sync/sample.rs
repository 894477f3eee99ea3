/// Timestamps of one clock-sync exchange, all in epoch milliseconds.
///
/// `local_send` and `local_receive` are read from the endpoint clock,
/// `remote` from the coordinator clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    pub local_send: i64,
    pub remote: i64,
    pub local_receive: i64,
}

impl ClockSample {
    pub fn new(local_send: i64, remote: i64, local_receive: i64) -> Self {
        Self {
            local_send,
            remote,
            local_receive,
        }
    }

    /// Midpoint estimate of `coordinator - endpoint`.
    ///
    /// Computed in `f64` so that any `remote` the coordinator sends is finite.
    pub fn offset(&self) -> f64 {
        let remote = self.remote as f64;
        ((remote - self.local_send as f64) + (remote - self.local_receive as f64)) / 2.0
    }

    /// Negative when the local clock stepped backwards during the exchange.
    pub fn rtt(&self) -> i64 {
        self.local_receive.saturating_sub(self.local_send)
    }
}
