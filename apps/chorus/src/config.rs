use chorus_core::{constants, SchedulerConfig, VoiceMode};
use std::{env, time::Duration};

/// Coordinator settings, resolved once at start.
#[derive(Clone, Debug)]
pub struct Config {
    /// 3000 by default.
    pub port: u16,
    /// `SAME_VOICE=true` gives every endpoint the first voice.
    pub voice_mode: VoiceMode,
    pub scheduler: SchedulerConfig,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn millis(name: &str, default: u64) -> Duration {
    Duration::from_millis(
        env::var(name)
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(default),
    )
}

impl Config {
    pub fn new() -> Self {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(3000);

        let voice_mode = VoiceMode::from_same_voice(
            env::var("SAME_VOICE")
                .map(|val| parse_flag(&val))
                .unwrap_or(false),
        );

        let scheduler = SchedulerConfig {
            lookahead: millis("CHORUS_LOOKAHEAD_MS", constants::DEFAULT_LOOKAHEAD_MS),
            interval: millis("CHORUS_INTERVAL_MS", constants::DEFAULT_INTERVAL_MS),
        };

        Self {
            port,
            voice_mode,
            scheduler,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_voice_flag() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["", "0", "false", "no", "same"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn unset_millis_fall_back() {
        assert_eq!(
            millis("CHORUS_TEST_UNSET_MILLIS", 1234),
            Duration::from_millis(1234)
        );
    }
}
