//! Best-effort text-to-speech through the `espeak-ng` command.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use tracing::debug;

#[allow(async_fn_in_trait)]
pub trait Speech {
    /// Speak `text` in the language tagged `lang`. Callers treat failure as
    /// "speech unavailable" and carry on.
    async fn say(&mut self, text: &str, lang: &str) -> Result<()>;
}

/// Language tag to synthesizer voice mapping, owned by its speech
/// collaborator so concurrent sessions never share lookup state.
#[derive(Debug, Default, Clone)]
pub struct VoiceCache {
    voices: HashMap<String, String>,
}

impl VoiceCache {
    /// Pin a voice for a language tag ahead of time.
    pub fn insert(&mut self, lang: impl Into<String>, voice: impl Into<String>) {
        self.voices.insert(lang.into(), voice.into());
    }

    /// espeak-ng voice names are lowercased tags ("en-us", "pl"); anything
    /// unmapped is normalized once and remembered.
    fn voice_for(&mut self, lang: &str) -> String {
        if let Some(voice) = self.voices.get(lang) {
            return voice.clone();
        }
        let voice = lang.to_ascii_lowercase().replace('_', "-");
        self.voices.insert(lang.to_owned(), voice.clone());
        voice
    }
}

/// Speaks by spawning `espeak-ng` and not waiting for it to finish.
pub struct EspeakSpeech {
    program: String,
    cache: VoiceCache,
}

impl EspeakSpeech {
    pub fn new() -> Self {
        Self::with_cache(VoiceCache::default())
    }

    pub fn with_cache(cache: VoiceCache) -> Self {
        Self {
            program: "espeak-ng".to_owned(),
            cache,
        }
    }
}

impl Default for EspeakSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl Speech for EspeakSpeech {
    async fn say(&mut self, text: &str, lang: &str) -> Result<()> {
        let voice = self.cache.voice_for(lang);
        debug!("speaking {} chars as {voice}", text.len());
        Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program))?;
        Ok(())
    }
}

/// Silent speech for headless runs and tests.
pub struct NoSpeech;

impl Speech for NoSpeech {
    async fn say(&mut self, _text: &str, _lang: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_tags_normalize_to_espeak_voices() {
        let mut cache = VoiceCache::default();
        assert_eq!(cache.voice_for("en_US"), "en-us");
        assert_eq!(cache.voice_for("pl"), "pl");
    }

    #[test]
    fn pinned_voices_win() {
        let mut cache = VoiceCache::default();
        cache.insert("en-US", "en-us-nyc");
        assert_eq!(cache.voice_for("en-US"), "en-us-nyc");
    }
}
