use crate::{
    CoreResult, MiseError,
    ports::{LocalSpeechPort, SpeechOptions, VoiceInfo},
};

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::{process::Command, sync::watch};
use tracing::{debug, info, instrument, warn};

const ESPEAK_BASE_RATE: f32 = 175.0;
const ESPEAK_BASE_PITCH: f32 = 50.0;
const ESPEAK_BASE_AMPLITUDE: f32 = 100.0;
const SAY_BASE_RATE: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Espeak,
    Say,
}

/// On-device speech through the system synthesizer (`espeak-ng`, `espeak`
/// or macOS `say`).
#[derive(Debug, Clone)]
pub struct SystemSpeech {
    program: Option<(Engine, PathBuf)>,
    catalog: watch::Receiver<Option<Vec<VoiceInfo>>>,
}

impl SystemSpeech {
    /// Locate a synthesizer on `PATH` and start loading its voice catalog.
    ///
    /// Must be called inside a tokio runtime.
    pub fn detect() -> Self {
        let program = [
            ("espeak-ng", Engine::Espeak),
            ("espeak", Engine::Espeak),
            ("say", Engine::Say),
        ]
        .into_iter()
        .find_map(|(name, engine)| which::which(name).ok().map(|path| (engine, path)));

        let (tx, catalog) = watch::channel(None);

        match &program {
            Some((engine, path)) => {
                info!(program = %path.display(), "System speech synthesizer found");
                let (engine, path) = (*engine, path.clone());
                tokio::spawn(async move {
                    let voices = load_voices(engine, &path).await;
                    debug!(count = voices.len(), "Voice catalog loaded");
                    let _ = tx.send(Some(voices));
                });
            }
            None => {
                info!("No system speech synthesizer found");
                let _ = tx.send(Some(Vec::new()));
            }
        }

        Self { program, catalog }
    }

    fn arguments(engine: Engine, text: &str, options: &SpeechOptions) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(voice) = &options.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }

        match engine {
            Engine::Espeak => {
                args.push("-s".to_string());
                args.push(scaled(ESPEAK_BASE_RATE, options.rate));
                args.push("-p".to_string());
                args.push(scaled(ESPEAK_BASE_PITCH, options.pitch));
                args.push("-a".to_string());
                args.push(scaled(ESPEAK_BASE_AMPLITUDE, options.volume));
            }
            // `say` has no pitch or volume flags.
            Engine::Say => {
                args.push("-r".to_string());
                args.push(scaled(SAY_BASE_RATE, options.rate));
            }
        }

        args.push("--".to_string());
        args.push(text.to_string());
        args
    }
}

#[async_trait]
impl LocalSpeechPort for SystemSpeech {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.catalog.borrow().clone().unwrap_or_default()
    }

    async fn voices_ready(&self) {
        let mut catalog = self.catalog.clone();
        let _ = catalog.wait_for(Option::is_some).await;
    }

    #[instrument(skip(self, text, options), fields(voice = ?options.voice))]
    async fn speak(&self, text: &str, options: &SpeechOptions) -> CoreResult<()> {
        let Some((engine, path)) = &self.program else {
            return Ok(());
        };

        let status = Command::new(path)
            .args(Self::arguments(*engine, text, options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| MiseError::playback(format!("failed to run synthesizer: {e}")))?;

        if !status.success() {
            return Err(MiseError::playback(format!("synthesizer exited with {status}")));
        }
        Ok(())
    }
}

fn scaled(base: f32, factor: f32) -> String {
    format!("{}", (base * factor).round().max(1.0) as u32)
}

async fn load_voices(engine: Engine, path: &PathBuf) -> Vec<VoiceInfo> {
    let args: &[&str] = match engine {
        Engine::Espeak => &["--voices"],
        Engine::Say => &["-v", "?"],
    };

    let output = match Command::new(path).args(args).kill_on_drop(true).output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(status = %output.status, "Voice listing failed");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = ?e, "Voice listing failed");
            return Vec::new();
        }
    };

    let listing = String::from_utf8_lossy(&output.stdout);
    match engine {
        Engine::Espeak => parse_espeak_voices(&listing),
        Engine::Say => parse_say_voices(&listing),
    }
}

/// Parse `espeak-ng --voices`:
/// `Pty Language Age/Gender VoiceName File Other Languages`.
pub(crate) fn parse_espeak_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let language = columns.nth(1)?;
            let name = columns.nth(1)?;
            Some(VoiceInfo {
                name: name.to_string(),
                language: Some(language.to_string()),
            })
        })
        .collect()
}

/// Parse `say -v ?`: `Name  en_US  # sample sentence`. Names may contain
/// spaces.
pub(crate) fn parse_say_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim_end();
            let (name, language) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(VoiceInfo {
                name: name.to_string(),
                language: Some(language.replace('_', "-")),
            })
        })
        .collect()
}
