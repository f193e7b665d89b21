use crate::{
    AppCommand, AppError, AppResult, KeyboardCapture,
    config::{CaptureBackend, Config, NarrationConfig},
    renderer,
};

use std::{
    io::{BufRead, StdoutLock},
    path::Path,
    sync::Arc,
    time::Duration,
};

use mise_core::{
    CookingAssistant, GeminiClient, MicrophoneCapture, NarrationService, OpenAiSpeechClient,
    Photo, Preferences, Screen, SessionHandle, SpeakerPlayback, SystemSpeech,
    UnconfiguredGeneration, ViewController, VoiceHandle, VoiceMode, VoiceNotice,
    VoiceSessionController, VoiceStatus, WakePhraseMatcher,
    ports::{CapturePort, GenerationPort},
    session::{END_OF_RECIPE_REPLY, START_OF_RECIPE_REPLY},
    view::status_text,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Owns the view and the preferences form. The voice controller runs as its
/// own task and shares the cooking session through the assistant.
pub struct App {
    pub(crate) view: ViewController,
    pub(crate) preferences: Preferences,
    pub(crate) narration: Arc<NarrationService>,
    pub(crate) voice: VoiceHandle,
    pub(crate) notices: mpsc::UnboundedReceiver<VoiceNotice>,
    pub(crate) status: watch::Receiver<VoiceStatus>,
    pub(crate) keyboard: Option<Arc<KeyboardCapture>>,
    pub(crate) controller: JoinHandle<()>,
}

impl App {
    /// Wire providers, narration and capture from the configuration and
    /// start the voice controller. Must run inside the tokio runtime.
    #[instrument(skip(config))]
    pub(crate) fn new(config: &Config) -> AppResult<Self> {
        let (generation, questions) = generation_models(config);

        let assistant = CookingAssistant::new(questions, SessionHandle::default());
        let view = ViewController::new(
            generation,
            assistant.clone(),
            config.generation.recipe_count,
        );

        let narration = Arc::new(build_narration(&config.narration));
        if narration.is_silent() {
            warn!("No speech output available, replies will only be printed");
        }

        let wake = WakePhraseMatcher::new(&config.voice.wake_phrases)?;

        let (capture, keyboard): (Arc<dyn CapturePort>, _) = match config.voice.capture {
            CaptureBackend::Keyboard => {
                let keyboard = Arc::new(KeyboardCapture::new());
                (keyboard.clone(), Some(keyboard))
            }
            CaptureBackend::Microphone => {
                if let Err(e) = config.validate_model_path() {
                    warn!(error = ?e, "Voice input will be unavailable");
                }
                let microphone = MicrophoneCapture::new(
                    &config.whisper.model_path,
                    config.whisper.use_gpu,
                    config.voice.no_speech_timeout(),
                );
                (Arc::new(microphone), None)
            }
        };

        let (controller, voice, notices) = VoiceSessionController::new(
            capture,
            assistant,
            Arc::clone(&narration),
            wake,
            config.voice.settings(),
        );
        let status = voice.subscribe();
        let controller = tokio::spawn(controller.run());

        Ok(Self {
            view,
            preferences: Preferences::default(),
            narration,
            voice,
            notices,
            status,
            keyboard,
            controller,
        })
    }

    /// Read commands until `quit` or end of input.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Mise starting");

        // Stdin forwarding via single persistent blocking task.
        //
        // Shutdown: when line_rx is dropped (main loop breaks),
        // line_tx.blocking_send() fails on the next line. A read still
        // pending at exit is abandoned by the runtime shutdown timeout.
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
        tokio::task::spawn_blocking(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to read stdin");
                        break;
                    }
                }
            }
        });

        {
            let mut out = stdout();
            renderer::help(&mut out)?;
            renderer::prompt(&mut out)?;
        }

        loop {
            tokio::select! {
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Input closed, shutting down");
                        break;
                    };
                    if !self.handle_line(&line).await? {
                        info!("Quit requested");
                        break;
                    }
                    renderer::prompt(&mut stdout())?;
                }

                Some(notice) = self.notices.recv() => {
                    let mut out = stdout();
                    renderer::notice(&mut out, &notice)?;
                    renderer::prompt(&mut out)?;
                }

                Ok(()) = self.status.changed() => {
                    let status = *self.status.borrow_and_update();
                    let mut out = stdout();
                    renderer::status(&mut out, status_text(status).as_deref())?;
                    renderer::prompt(&mut out)?;
                }
            }
        }

        drop(line_rx);
        self.voice.shutdown();

        match tokio::time::timeout(Duration::from_secs(1), self.controller).await {
            Ok(Ok(())) => info!("Voice controller stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Voice controller task panicked"),
            Err(_) => info!("Voice controller did not stop within timeout"),
        }

        info!("Mise shut down successfully");
        Ok(())
    }

    /// Handle one input line. Returns `false` to quit.
    async fn handle_line(&mut self, line: &str) -> AppResult<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        let outcome = match line.parse::<AppCommand>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(keep_running) => Ok(keep_running),
            Err(e) => {
                warn!(error = ?e, "Command failed");
                renderer::error(&mut stdout(), &user_message(&e))?;
                Ok(true)
            }
        }
    }

    #[instrument(skip(self))]
    async fn execute(&mut self, command: AppCommand) -> AppResult<bool> {
        match command {
            AppCommand::SetCookingTime(time) => {
                self.preferences.cooking_time = time;
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::SetDishType(dish_type) => {
                self.preferences.dish_type = dish_type;
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::ToggleMood(mood) => {
                self.preferences.toggle_mood(mood);
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::ToggleDietary(dietary) => {
                self.preferences.toggle_dietary(dietary);
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::SetIngredients(text) => {
                self.preferences.ingredients = text;
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::SetDishName(name) => {
                self.preferences.dish_name = name;
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::SetPhoto(path) => {
                self.preferences.ingredient_image = match path {
                    Some(path) => Some(read_photo(&path).await?),
                    None => None,
                };
                renderer::preferences(&mut stdout(), &self.preferences)?;
            }
            AppCommand::Generate => {
                renderer::reply(&mut stdout(), "Thinking up some recipes...")?;
                let recipes = self.view.generate_recipes(self.preferences.clone()).await?;
                renderer::recipes(&mut stdout(), recipes)?;
            }
            AppCommand::Select(index) => {
                let recipe = self.view.select_recipe(index)?;
                let announcement = self.view.start_cooking().await?;
                let mut out = stdout();
                renderer::recipe(&mut out, &recipe)?;
                renderer::reply(&mut out, &announcement)?;
                self.speak(announcement);
            }
            AppCommand::Next => {
                let reply = self
                    .view
                    .next_step()
                    .await?
                    .unwrap_or_else(|| END_OF_RECIPE_REPLY.to_string());
                self.say(reply)?;
            }
            AppCommand::Previous => {
                let reply = self
                    .view
                    .previous_step()
                    .await?
                    .unwrap_or_else(|| START_OF_RECIPE_REPLY.to_string());
                self.say(reply)?;
            }
            AppCommand::Step(index) => {
                let reply = self.view.go_to_step(index).await?;
                self.say(reply)?;
            }
            AppCommand::Repeat => {
                let reply = self.view.current_step().await?;
                self.say(reply)?;
            }
            AppCommand::Listen => self.voice.start(VoiceMode::SingleShot),
            AppCommand::HandsFree => self.voice.toggle_hands_free(),
            AppCommand::StopVoice => self.voice.stop(),
            AppCommand::Progress(path) => {
                let photo = read_photo(&path).await?;
                renderer::reply(&mut stdout(), "Let me take a look...")?;
                let feedback = self.view.check_progress(photo).await?;
                self.say(feedback)?;
            }
            AppCommand::Say(utterance) => self.deliver_utterance(&utterance)?,
            AppCommand::Transcript => {
                let entries = self.view.transcript().await?;
                renderer::transcript(&mut stdout(), &entries)?;
            }
            AppCommand::Back => self.back().await?,
            AppCommand::Help => renderer::help(&mut stdout())?,
            AppCommand::Quit => return Ok(false),
        }

        Ok(true)
    }

    async fn back(&mut self) -> AppResult<()> {
        if self.view.screen() == Screen::Cooking {
            self.voice.stop();
        }
        self.view.back().await;

        let mut out = stdout();
        match self.view.screen() {
            Screen::Recommendations => renderer::recipes(&mut out, self.view.recipes())?,
            Screen::Preferences | Screen::Cooking => {
                renderer::preferences(&mut out, &self.preferences)?
            }
        }
        Ok(())
    }

    #[track_caller]
    fn deliver_utterance(&self, utterance: &str) -> AppResult<()> {
        let Some(keyboard) = &self.keyboard else {
            return Err(AppError::invalid_command(
                "typed utterances need [voice].capture = \"keyboard\"",
            ));
        };

        if !keyboard.deliver(utterance) {
            return Err(AppError::invalid_command(
                "not listening, type 'listen' or 'handsfree' first",
            ));
        }
        Ok(())
    }

    /// Print a reply and speak it in the background.
    fn say(&self, text: String) -> AppResult<()> {
        renderer::reply(&mut stdout(), &text)?;
        self.speak(text);
        Ok(())
    }

    fn speak(&self, text: String) {
        let narration = Arc::clone(&self.narration);
        tokio::spawn(async move {
            if let Err(e) = narration.speak(&text).await {
                warn!(error = ?e, "Reply playback failed");
            }
        });
    }
}

/// Recipe model and question model. Both fail with a hint when no key is
/// configured.
fn generation_models(config: &Config) -> (Arc<dyn GenerationPort>, Arc<dyn GenerationPort>) {
    match config.generation.api_key.as_deref() {
        Some(key) => {
            let recipes = GeminiClient::new(key)
                .with_base_url(&config.generation.base_url)
                .with_model(&config.generation.model);
            let questions = recipes.clone().with_model(config.assistant_model());
            info!(
                recipe_model = recipes.model(),
                assistant_model = questions.model(),
                "Gemini configured"
            );
            (Arc::new(recipes), Arc::new(questions))
        }
        None => {
            warn!("No Gemini API key, recipe generation will fail until one is set");
            (Arc::new(UnconfiguredGeneration), Arc::new(UnconfiguredGeneration))
        }
    }
}

fn build_narration(config: &NarrationConfig) -> NarrationService {
    let mut narration = NarrationService::new(config.settings());

    match config.api_key.as_deref() {
        Some(key) if config.remote_enabled => {
            let client = OpenAiSpeechClient::new(key)
                .with_base_url(&config.base_url)
                .with_model(&config.model)
                .with_voice(&config.voice)
                .with_speed(config.speed)
                .with_max_input_chars(config.max_input_chars);
            narration = narration.with_remote(Arc::new(client), Arc::new(SpeakerPlayback::new()));
        }
        _ => info!("Remote speech synthesis disabled"),
    }

    if config.local_enabled {
        narration = narration.with_local(Arc::new(SystemSpeech::detect()));
    }

    narration
}

async fn read_photo(path: &Path) -> AppResult<Photo> {
    let bytes = tokio::fs::read(path).await?;
    Ok(Photo::from_bytes(bytes)?)
}

fn user_message(error: &AppError) -> String {
    match error {
        AppError::Core { source, .. } => source.to_string(),
        AppError::InvalidCommand { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

fn stdout() -> StdoutLock<'static> {
    std::io::stdout().lock()
}
