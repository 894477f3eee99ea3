use tracing::{subscriber::Interest, Level, Metadata};
use tracing_subscriber::layer::{Context, Filter};

/// Quiets the websocket and http stacks below INFO so that per-frame chatter
/// doesn't drown out scheduler and clock-sync events.
pub struct TransportFilter {
    max_level: Level,
}

const TRANSPORT_PREFIX: [&str; 6] = [
    "hyper::",
    "rustls::",
    "mio::",
    "tungstenite::",
    "tokio_tungstenite::",
    "reqwest::",
];

impl TransportFilter {
    pub fn new(max_level: Level) -> Self {
        Self { max_level }
    }

    fn is_enabled(&self, metadata: &Metadata<'_>) -> bool {
        let is_transport = TRANSPORT_PREFIX
            .iter()
            .any(|prefix| metadata.target().starts_with(prefix))
            && *metadata.level() > Level::INFO;

        *metadata.level() <= self.max_level && !is_transport
    }
}

impl<S> Filter<S> for TransportFilter {
    fn enabled(&self, metadata: &Metadata<'_>, _: &Context<'_, S>) -> bool {
        self.is_enabled(metadata)
    }

    fn callsite_enabled(&self, metadata: &'static Metadata<'static>) -> Interest {
        if self.is_enabled(metadata) {
            Interest::always()
        } else {
            Interest::never()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tracing::{
        callsite::{Callsite, Identifier},
        field::FieldSet,
        metadata::Kind,
    };

    struct NoCallsite;

    impl Callsite for NoCallsite {
        fn set_interest(&self, _: Interest) {}

        fn metadata(&self) -> &Metadata<'_> {
            unreachable!()
        }
    }

    static CALLSITE: NoCallsite = NoCallsite;

    fn metadata(target: &'static str, level: Level) -> Metadata<'static> {
        Metadata::new(
            "test",
            target,
            level,
            None,
            None,
            None,
            FieldSet::new(&[], Identifier(&CALLSITE)),
            Kind::EVENT,
        )
    }

    #[test]
    fn transport_debug_is_filtered() {
        let filter = TransportFilter::new(Level::TRACE);

        assert!(!filter.is_enabled(&metadata("tungstenite::protocol", Level::DEBUG)));
        assert!(filter.is_enabled(&metadata("tungstenite::protocol", Level::WARN)));
        assert!(filter.is_enabled(&metadata("chorus_core::scheduler", Level::DEBUG)));
    }

    #[test]
    fn max_level_is_respected() {
        let filter = TransportFilter::new(Level::INFO);

        assert!(filter.is_enabled(&metadata("chorus_rpc", Level::INFO)));
        assert!(!filter.is_enabled(&metadata("chorus_rpc", Level::DEBUG)));
    }
}
