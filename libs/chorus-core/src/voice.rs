use super::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    /// Hand out the voices in order, wrapping around.
    #[default]
    RoundRobin,
    /// Every endpoint gets the first voice.
    FixedSingle,
}

impl VoiceMode {
    pub fn from_same_voice(same_voice: bool) -> Self {
        if same_voice {
            Self::FixedSingle
        } else {
            Self::RoundRobin
        }
    }
}

#[derive(Debug, Clone)]
pub struct VoiceAssigner {
    voices: Arc<[String]>,
    cursor: usize,
    mode: VoiceMode,
}

impl VoiceAssigner {
    pub fn new<I, V>(voices: I, mode: VoiceMode) -> ChorusResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let voices: Arc<[String]> = voices.into_iter().map(Into::into).collect();
        if voices.is_empty() {
            return Err(ChorusError::EmptyVoices);
        }
        Ok(Self {
            voices,
            cursor: 0,
            mode,
        })
    }

    pub fn with_default_voices(mode: VoiceMode) -> Self {
        Self {
            voices: constants::DEFAULT_VOICES.iter().map(|v| v.to_string()).collect(),
            cursor: 0,
            mode,
        }
    }

    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    pub fn voices(&self) -> &[String] {
        &self.voices
    }

    pub fn next_voice(&mut self) -> String {
        match self.mode {
            VoiceMode::FixedSingle => self.voices[0].clone(),
            VoiceMode::RoundRobin => {
                let voice = self.voices[self.cursor].clone();
                self.cursor = (self.cursor + 1) % self.voices.len();
                voice
            }
        }
    }
}
