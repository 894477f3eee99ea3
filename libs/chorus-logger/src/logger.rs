use super::*;
use std::io::{stderr, stdout};
use tracing_subscriber::prelude::*;

/// Install the global subscriber at the build's default level.
///
/// Safe to call more than once: later calls are ignored, which lets every
/// test that wants log output call it without coordinating.
#[inline]
pub fn init_logger() {
    init_logger_with_level(if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    })
}

pub fn init_logger_with_level(level: Level) {
    let writer = stderr
        .with_max_level(Level::WARN)
        .or_else(stdout.with_max_level(level));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .map_writer(move |_| writer)
                .map_event_format(|e| ChorusFormatter::new(e.with_timer(LogTime)))
                .with_filter(TransportFilter::new(level)),
        )
        .try_init();
}
