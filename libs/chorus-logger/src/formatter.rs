use nu_ansi_term::{AnsiGenericString, Color};
use std::fmt::Result;
use tracing::{Event, Level, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::{
    fmt::{
        format::{Format, Full, Writer},
        time::FormatTime,
        FmtContext, FormatEvent, FormatFields, FormattedFields,
    },
    registry::LookupSpan,
};

const COLORFUL_LOGS: &str = "CHORUS_COLORFUL_LOGS";

pub struct LogTime;

impl LogTime {
    // millisecond precision, playback timestamps are compared by eye
    fn now() -> String {
        if cfg!(debug_assertions) {
            chrono::Local::now().format("%m-%d %H:%M:%S%.3f").to_string()
        } else {
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        }
    }
}

impl FormatTime for LogTime {
    fn format_time(&self, w: &mut Writer<'_>) -> Result {
        write!(w, "[{}]", Self::now())
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => " WARN",
        Level::INFO => " INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

fn paint_level(level: Level) -> AnsiGenericString<'static, str> {
    let color = match level {
        Level::ERROR => Color::Red,
        Level::WARN => Color::Yellow,
        Level::INFO => Color::Green,
        Level::DEBUG => Color::Blue,
        Level::TRACE => Color::Purple,
    };
    color.paint(level_label(level))
}

/// `[time][level][target] ` in front of every line.
fn prefix(time: &str, level: Level, target: &str, colorful: bool) -> String {
    if colorful {
        format!(
            "[{}][{}][{}] ",
            Color::DarkGray.paint(time),
            paint_level(level),
            Color::LightMagenta.paint(target)
        )
    } else {
        format!("[{}][{}][{}] ", time, level_label(level), target)
    }
}

/// Compact line format with the connection span chain; release builds fall
/// back to the stock formatter unless `CHORUS_COLORFUL_LOGS` is set.
pub struct ChorusFormatter {
    default: Format<Full, LogTime>,
    colorful: bool,
}

impl ChorusFormatter {
    pub fn new(default: Format<Full, LogTime>) -> Self {
        Self {
            default,
            colorful: cfg!(debug_assertions) || std::env::var(COLORFUL_LOGS).is_ok(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for ChorusFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> Result {
        if !self.colorful {
            return self.default.format_event(ctx, writer, event);
        }

        let normalized = event.normalized_metadata();
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());
        write!(
            writer,
            "{}",
            prefix(&LogTime::now(), *meta.level(), meta.target(), true)
        )?;

        // connection spans carry the endpoint identifier
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                if let Some(fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_prefix() {
        assert_eq!(
            prefix("10-19 12:00:00.250", Level::WARN, "chorus_core::scheduler", false),
            "[10-19 12:00:00.250][ WARN][chorus_core::scheduler] "
        );
    }

    #[test]
    fn colorful_prefix_keeps_the_text() {
        let line = prefix("t", Level::ERROR, "chorus", true);
        assert!(line.contains("ERROR"));
        assert!(line.contains("chorus"));
        assert!(line.contains('\u{1b}'));
    }

    #[test]
    fn labels_are_aligned() {
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            assert_eq!(level_label(level).len(), 5);
        }
    }
}
