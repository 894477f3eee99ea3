use super::*;
use chorus_core::{ChorusError, Coordinator, Dispatch};

/// What a connection handler needs from the process hosting it.
pub trait RpcContextImpl {
    fn get_coordinator(&self) -> &Arc<Coordinator>;

    /// Answer one clock-sync exchange with the coordinator clock.
    fn timesync(&self, request: TimesyncRequest) -> TimesyncResponse {
        TimesyncResponse {
            id: request.id,
            result: self.get_coordinator().clock().now(),
        }
    }

    fn join_scheduler(&self, identifier: &str, outbox: Sender<Dispatch>) {
        match self
            .get_coordinator()
            .join(identifier.to_owned(), outbox)
        {
            Ok(joined) => {
                if let Some(tick) = joined.first_tick {
                    debug!("{identifier} started epoch {}", tick.epoch);
                }
            }
            Err(ChorusError::AlreadyRegistered(_)) => {
                debug!("{identifier} joined twice, voice re-sent");
            }
            Err(e) => error!("{identifier} failed to join: {e}"),
        }
    }

    fn leave_scheduler(&self, identifier: &str) {
        if self.get_coordinator().leave(identifier).is_none() {
            trace!("{identifier} left without joining");
        }
    }
}
