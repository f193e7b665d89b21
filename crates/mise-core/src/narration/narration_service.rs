use crate::{
    CoreResult,
    narration::select_preferred_voice,
    ports::{AudioSinkPort, LocalSpeechPort, RemoteSynthesisPort, SpeechOptions},
};

use std::{sync::Arc, sync::OnceLock, time::Duration};

use tracing::{debug, info, instrument, warn};

/// Delivery settings for the on-device fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationSettings {
    /// Rate, pitch and volume. A voice set here overrides the heuristic.
    pub speech: SpeechOptions,
    /// How long to wait for the voice catalog before using the default voice.
    pub voice_catalog_wait: Duration,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            speech: SpeechOptions::default(),
            voice_catalog_wait: Duration::from_secs(2),
        }
    }
}

/// Speaks assistant replies: remote synthesis first, on-device speech as
/// the fallback, silence when neither exists.
pub struct NarrationService {
    remote: Option<(Arc<dyn RemoteSynthesisPort>, Arc<dyn AudioSinkPort>)>,
    local: Option<Arc<dyn LocalSpeechPort>>,
    settings: NarrationSettings,
    preferred_voice: OnceLock<Option<String>>,
}

impl NarrationService {
    /// A service with no speech output at all.
    pub fn new(settings: NarrationSettings) -> Self {
        Self {
            remote: None,
            local: None,
            settings,
            preferred_voice: OnceLock::new(),
        }
    }

    /// Use remote synthesis played through `sink`.
    pub fn with_remote(
        mut self,
        remote: Arc<dyn RemoteSynthesisPort>,
        sink: Arc<dyn AudioSinkPort>,
    ) -> Self {
        self.remote = Some((remote, sink));
        self
    }

    /// Use `local` when remote synthesis is missing or fails.
    pub fn with_local(mut self, local: Arc<dyn LocalSpeechPort>) -> Self {
        self.local = Some(local);
        self
    }

    /// Whether any speech output is configured.
    pub fn is_silent(&self) -> bool {
        self.remote.is_none() && !self.local.as_ref().is_some_and(|l| l.is_available())
    }

    /// Speak `text`, resolving when playback ends.
    ///
    /// # Errors
    ///
    /// Only a playback failure after successful synthesis is returned. A
    /// synthesis failure falls back to on-device speech, which never fails.
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn speak(&self, text: &str) -> CoreResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        if let Some((remote, sink)) = &self.remote {
            match remote.synthesize(text).await {
                Ok(audio) => {
                    debug!(bytes = audio.len(), "Playing synthesized reply");
                    return sink.play(audio).await;
                }
                Err(e) => warn!(error = ?e, "Remote synthesis failed, using on-device speech"),
            }
        }

        self.speak_locally(text).await;
        Ok(())
    }

    async fn speak_locally(&self, text: &str) {
        let Some(local) = self.local.as_ref().filter(|l| l.is_available()) else {
            debug!("No speech output available, reply not spoken");
            return;
        };

        let mut options = self.settings.speech.clone();
        if options.voice.is_none() {
            options.voice = self.preferred_voice(local.as_ref()).await;
        }

        if let Err(e) = local.speak(text, &options).await {
            warn!(error = ?e, "On-device speech failed");
        }
    }

    async fn preferred_voice(&self, local: &dyn LocalSpeechPort) -> Option<String> {
        if let Some(voice) = self.preferred_voice.get() {
            return voice.clone();
        }

        if local.voices().is_empty()
            && tokio::time::timeout(self.settings.voice_catalog_wait, local.voices_ready())
                .await
                .is_err()
        {
            debug!("Voice catalog not ready, using default voice");
            return None;
        }

        let voices = local.voices();
        if voices.is_empty() {
            return None;
        }

        let chosen = select_preferred_voice(&voices).map(|v| v.name.clone());
        info!(voice = ?chosen, "Preferred narration voice selected");
        self.preferred_voice.get_or_init(|| chosen).clone()
    }
}
