use std::{collections::HashMap, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    commands::{is_affirmative, FinishedAnswer, FormCommand, VoiceCommand},
    error::RecognitionError,
    form_assistant::{FillOutcome, FormAssistant},
    model::{ConversationState, DictationTranscript, MedicationDraft},
    prompts,
    provider::{ModeKind, RecognitionMode, ResultEvent, SpeechRecognizer},
    reminder::today_summary,
    services::{
        Clock, DisableReason, PreferenceStore, ReminderRepository, SpeechOutput, TimerKind,
        TimerScheduler, TimerToken, UtteranceId, VoiceHost,
    },
    session::{EndOutcome, ErrorDisposition, RecognitionSession, StartOutcome},
    settings::AssistantSettings,
};

pub struct Collaborators {
    pub recognizer: Box<dyn SpeechRecognizer>,
    pub speech: Box<dyn SpeechOutput>,
    pub timers: Box<dyn TimerScheduler>,
    pub host: Box<dyn VoiceHost>,
    pub reminders: Box<dyn ReminderRepository>,
    pub preferences: Box<dyn PreferenceStore>,
    pub clock: Box<dyn Clock>,
}

/// The step to take once the current spoken prompt has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterSpeech {
    ListenCommands,
    ListenStillThere,
    AnnounceHome,
    OpenAddForm,
    StartDictation,
    ListenFinished,
    ResumeDictation,
    SaveDraft,
    CloseDictation,
    ReturnHome,
    OpenSettings,
    AskAnythingElse,
    Nothing,
}

#[derive(Debug, Clone, Copy)]
struct PendingSpeech {
    id: UtteranceId,
    then: AfterSpeech,
}

/// Top-level voice conversation, driven by host events. Every prompt is
/// preceded by a manual stop of the recognition session, and listening only
/// resumes from the prompt's completion.
pub struct ConversationController {
    state: ConversationState,
    settings: AssistantSettings,
    session: RecognitionSession,
    speech: Box<dyn SpeechOutput>,
    timers: Box<dyn TimerScheduler>,
    host: Box<dyn VoiceHost>,
    reminders: Box<dyn ReminderRepository>,
    preferences: Box<dyn PreferenceStore>,
    clock: Box<dyn Clock>,
    assistant: FormAssistant,
    draft: MedicationDraft,
    transcript: DictationTranscript,
    speaking: Option<PendingSpeech>,
    next_utterance: u64,
    armed: HashMap<TimerKind, TimerToken>,
    timer_generation: u64,
    disabled: Option<DisableReason>,
}

impl ConversationController {
    pub fn new(settings: AssistantSettings, parts: Collaborators) -> Self {
        let session = RecognitionSession::new(
            parts.recognizer,
            settings.max_network_retries,
            settings.network_retry_delay(),
        );
        let assistant = FormAssistant::new(settings.required_fields.clone());
        Self {
            state: ConversationState::Idle,
            settings,
            session,
            speech: parts.speech,
            timers: parts.timers,
            host: parts.host,
            reminders: parts.reminders,
            preferences: parts.preferences,
            clock: parts.clock,
            assistant,
            draft: MedicationDraft::default(),
            transcript: DictationTranscript::default(),
            speaking: None,
            next_utterance: 0,
            armed: HashMap::new(),
            timer_generation: 0,
            disabled: None,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn draft(&self) -> &MedicationDraft {
        &self.draft
    }

    pub fn transcript(&self) -> &DictationTranscript {
        &self.transcript
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_running()
    }

    pub fn disabled_reason(&self) -> Option<&DisableReason> {
        self.disabled.as_ref()
    }

    /// Voice commands are on when the user opted in and nothing has since
    /// made recognition unusable.
    pub fn voice_enabled(&self) -> bool {
        self.disabled.is_none() && self.preferences.voice_help() == Some(true)
    }

    pub fn start(&mut self) {
        match self.preferences.voice_help() {
            Some(true) if self.disabled.is_none() => self.announce_home(),
            Some(true) => warn!(reason = ?self.disabled, "voice help unavailable"),
            Some(false) => debug!("voice help switched off"),
            None => info!("voice help preference unset, waiting for the user"),
        }
    }

    pub fn enable_voice(&mut self) {
        if let Err(err) = self.preferences.set_voice_help(true) {
            warn!(error = %err, "failed to persist voice preference");
        }
        self.disabled = None;
        self.say(prompts::VOICE_ACTIVATED, AfterSpeech::AnnounceHome);
    }

    /// The user turned voice help down. Nothing further is spoken.
    pub fn decline_voice(&mut self) {
        if let Err(err) = self.preferences.set_voice_help(false) {
            warn!(error = %err, "failed to persist voice preference");
        }
        self.cancel_speech();
        self.stop_listening();
        self.disarm(TimerKind::NetworkRetry);
        self.set_state(ConversationState::Idle);
        info!("voice help declined");
    }

    pub fn announce_home(&mut self) {
        self.say(prompts::WELCOME, AfterSpeech::ListenCommands);
    }

    pub fn open_dictation(&mut self) {
        if let Some(reason) = &self.disabled {
            warn!(?reason, "dictation requested while voice is unavailable");
            return;
        }
        self.host.open_dictation_surface();
        self.transcript.clear();
        self.host.update_transcript("");
        self.draft = MedicationDraft::default();
        self.set_state(ConversationState::Dictating);
        self.say(prompts::DICTATION_EXAMPLE, AfterSpeech::StartDictation);
    }

    /// Parse what was dictated since the last submit, then save or ask for
    /// what is missing. Earlier turns are already in the draft.
    pub fn submit_dictation(&mut self) -> FillOutcome {
        let today = self.clock.today();
        let outcome =
            self.assistant
                .fill_from_text(&mut self.draft, self.transcript.unparsed(), today);
        self.transcript.mark_parsed();

        match outcome.missing.first() {
            None => {
                info!(draft = ?self.draft, "dictation complete");
                self.say(prompts::SAVING, AfterSpeech::SaveDraft);
            }
            Some(first) => {
                info!(missing = ?outcome.missing, "dictation incomplete");
                let labels: Vec<&str> = outcome.missing.iter().map(|f| f.spoken_label()).collect();
                let prompt = prompts::missing_fields(&labels, first.question());
                self.set_state(ConversationState::Dictating);
                self.say(&prompt, AfterSpeech::ResumeDictation);
            }
        }
        outcome
    }

    /// Close the dictation surface, dropping the draft and any prompt in
    /// flight.
    pub fn close_dictation(&mut self) {
        self.cancel_speech();
        self.stop_listening();
        self.host.close_dictation_surface();
        self.transcript.clear();
        self.draft = MedicationDraft::default();
        self.set_state(ConversationState::Idle);
    }

    pub fn dispose(&mut self) {
        self.cancel_speech();
        self.stop_listening();
        self.disarm(TimerKind::NetworkRetry);
        self.set_state(ConversationState::Idle);
    }

    pub fn on_speech_finished(&mut self, id: UtteranceId) {
        match self.speaking {
            Some(pending) if pending.id == id => {
                self.speaking = None;
                self.continue_with(pending.then);
            }
            _ => debug!(?id, "ignoring completion of superseded speech"),
        }
    }

    pub fn on_result(&mut self, event: &ResultEvent) {
        let utterance = self.session.accept(event);
        let spoken = utterance.final_text.trim().to_lowercase();

        match self.state {
            ConversationState::ListeningCommand => {
                self.disarm(TimerKind::Inactivity);
                if spoken.is_empty() {
                    self.arm(TimerKind::Inactivity);
                } else {
                    info!(command = %spoken, "voice command");
                    self.dispatch(&spoken);
                }
            }
            ConversationState::AwaitingConfirmation => {
                self.disarm(TimerKind::Inactivity);
                if spoken.is_empty() {
                    self.arm(TimerKind::Inactivity);
                } else if is_affirmative(&spoken) {
                    self.announce_home();
                } else {
                    self.disable_voice(DisableReason::Inactivity);
                }
            }
            ConversationState::Dictating => {
                self.disarm(TimerKind::DictationSilence);
                if let Some(command) = FormCommand::parse(&spoken) {
                    info!(?command, "form command");
                    self.form_command(command);
                    return;
                }
                self.transcript.append_final(&utterance.final_text);
                self.transcript.partial_text = utterance.interim_text.trim().to_string();
                let live = self.transcript.live_text();
                self.host.update_transcript(&live);
                self.arm(TimerKind::DictationSilence);
            }
            ConversationState::AwaitingDictationConfirmation => {
                self.disarm(TimerKind::DictationSilence);
                if spoken.is_empty() {
                    self.arm(TimerKind::DictationSilence);
                } else {
                    self.answer_finished(&spoken);
                }
            }
            ConversationState::Idle => debug!("result while idle ignored"),
        }
    }

    pub fn on_error(&mut self, error: RecognitionError) {
        match self.session.handle_error(error) {
            Ok(ErrorDisposition::Ignore) => {}
            Ok(ErrorDisposition::Retry { delay, .. }) => {
                self.disarm(TimerKind::Inactivity);
                self.disarm(TimerKind::DictationSilence);
                self.host.listening_changed(false);
                self.arm_after(TimerKind::NetworkRetry, delay);
            }
            Ok(ErrorDisposition::GiveUp { .. }) => {
                self.give_up(DisableReason::NetworkUnavailable, prompts::NETWORK_LOST);
            }
            Ok(ErrorDisposition::Fatal(err)) => {
                self.give_up(
                    DisableReason::PermissionDenied(err.code().to_string()),
                    prompts::PERMISSION_DENIED,
                );
            }
            Err(err) => warn!(error = %err, "failed to handle recognition error"),
        }
    }

    pub fn on_recognition_end(&mut self) {
        match self.session.handle_end() {
            Ok(EndOutcome::Ended) => {}
            Ok(EndOutcome::QueuedStarted) => self.host.listening_changed(true),
            Ok(EndOutcome::Interrupted(mode)) => {
                if self.may_listen(mode.kind) {
                    debug!(mode = %mode.kind, "resuming recognition after backend end");
                    if let Err(err) = self.session.start(mode) {
                        warn!(error = %err, "could not resume recognition");
                        self.host.listening_changed(false);
                    }
                } else {
                    self.host.listening_changed(false);
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to handle recognition end");
                self.host.listening_changed(false);
            }
        }
    }

    pub fn on_timer(&mut self, token: TimerToken) {
        if self.armed.get(&token.kind) != Some(&token) {
            debug!(?token, "ignoring stale timer");
            return;
        }
        self.armed.remove(&token.kind);

        match token.kind {
            TimerKind::Inactivity => self.on_inactivity(),
            TimerKind::DictationSilence => self.on_dictation_silence(),
            TimerKind::NetworkRetry => self.on_network_retry(),
        }
    }

    fn dispatch(&mut self, command: &str) {
        match VoiceCommand::parse(command) {
            Some(VoiceCommand::AddReminder) => {
                self.say(prompts::OPENING_ADD, AfterSpeech::OpenAddForm)
            }
            Some(VoiceCommand::OpenSettings) => {
                self.say(prompts::OPENING_SETTINGS, AfterSpeech::OpenSettings)
            }
            Some(VoiceCommand::ReadReminders) => {
                let summary = self.reminder_summary();
                self.say(&summary, AfterSpeech::AskAnythingElse);
            }
            None => {
                let prompt = format!("{} {}", prompts::NOT_UNDERSTOOD, prompts::WELCOME);
                self.say(&prompt, AfterSpeech::ListenCommands);
            }
        }
    }

    fn form_command(&mut self, command: FormCommand) {
        match command {
            FormCommand::Cancel => self.say(prompts::CANCELLING, AfterSpeech::ReturnHome),
            FormCommand::Save => {
                self.submit_dictation();
            }
            FormCommand::Dictate => {
                self.say(prompts::DICTATION_EXAMPLE, AfterSpeech::ResumeDictation)
            }
        }
    }

    fn reminder_summary(&self) -> String {
        match self.reminders.reminders() {
            Ok(reminders) => today_summary(&reminders, &self.clock.now()),
            Err(err) => {
                warn!(error = %err, "failed to load reminders");
                prompts::READ_FAILED.to_string()
            }
        }
    }

    fn answer_finished(&mut self, answer: &str) {
        match FinishedAnswer::classify(answer) {
            FinishedAnswer::Yes => {
                self.submit_dictation();
            }
            FinishedAnswer::No => {
                self.set_state(ConversationState::Dictating);
                let prompt = format!("{} {}", prompts::REPEAT_EXAMPLE, prompts::DICTATION_EXAMPLE);
                self.say(&prompt, AfterSpeech::ResumeDictation);
            }
            FinishedAnswer::Unclear => {
                self.set_state(ConversationState::Dictating);
                self.say(prompts::STILL_LISTENING, AfterSpeech::ResumeDictation);
            }
        }
    }

    fn on_inactivity(&mut self) {
        match self.state {
            ConversationState::ListeningCommand => {
                self.set_state(ConversationState::AwaitingConfirmation);
                self.say(prompts::STILL_THERE, AfterSpeech::ListenStillThere);
            }
            ConversationState::AwaitingConfirmation => {
                self.disable_voice(DisableReason::Inactivity);
            }
            other => debug!(state = other.label(), "inactivity timer outside command listening"),
        }
    }

    fn on_dictation_silence(&mut self) {
        match self.state {
            ConversationState::Dictating => {
                self.set_state(ConversationState::AwaitingDictationConfirmation);
                self.say(prompts::FINISHED_QUESTION, AfterSpeech::ListenFinished);
            }
            ConversationState::AwaitingDictationConfirmation => {
                self.say(prompts::CANCELLED_BY_INACTIVITY, AfterSpeech::CloseDictation);
            }
            other => debug!(state = other.label(), "silence timer outside dictation"),
        }
    }

    fn on_network_retry(&mut self) {
        let Some(mode) = self.session.mode().cloned() else {
            return;
        };
        if self.state == ConversationState::Idle || !self.may_listen(mode.kind) {
            debug!("network retry skipped");
            return;
        }
        info!(attempt = self.session.network_failures(), "retrying recognition");
        self.listen(mode);
    }

    fn continue_with(&mut self, then: AfterSpeech) {
        debug!(?then, "speech finished");
        let lang = self.settings.lang.clone();
        match then {
            AfterSpeech::ListenCommands => {
                if self.voice_enabled() {
                    self.set_state(ConversationState::ListeningCommand);
                    self.listen(RecognitionMode::command(&lang));
                } else {
                    self.set_state(ConversationState::Idle);
                }
            }
            AfterSpeech::ListenStillThere => self.listen(RecognitionMode::confirmation(&lang)),
            AfterSpeech::AnnounceHome => self.announce_home(),
            AfterSpeech::OpenAddForm => {
                self.host.show_add_form();
                self.open_dictation();
            }
            AfterSpeech::StartDictation | AfterSpeech::ResumeDictation => {
                self.set_state(ConversationState::Dictating);
                self.listen(RecognitionMode::dictation(&lang));
            }
            AfterSpeech::ListenFinished => self.listen(RecognitionMode::confirmation(&lang)),
            AfterSpeech::SaveDraft => self.save_draft(),
            AfterSpeech::CloseDictation => self.close_dictation(),
            AfterSpeech::ReturnHome => {
                self.close_dictation();
                self.announce_home();
            }
            AfterSpeech::OpenSettings => {
                self.set_state(ConversationState::Idle);
                self.host.open_settings();
            }
            AfterSpeech::AskAnythingElse => {
                self.say(prompts::ANYTHING_ELSE, AfterSpeech::ListenCommands)
            }
            AfterSpeech::Nothing => {}
        }
    }

    fn save_draft(&mut self) {
        match self.reminders.save(&self.draft) {
            Ok(()) => {
                info!(name = ?self.draft.name, "reminder saved");
                self.host.close_dictation_surface();
                self.transcript.clear();
                self.draft = MedicationDraft::default();
                self.set_state(ConversationState::Idle);
            }
            Err(err) => {
                warn!(error = %err, "failed to save reminder");
                self.set_state(ConversationState::Dictating);
                self.say(prompts::SAVE_FAILED, AfterSpeech::ResumeDictation);
            }
        }
    }

    fn disable_voice(&mut self, reason: DisableReason) {
        self.stop_listening();
        self.disarm(TimerKind::NetworkRetry);
        if reason == DisableReason::Inactivity {
            if let Err(err) = self.preferences.set_voice_help(false) {
                warn!(error = %err, "failed to persist voice preference");
            }
        } else {
            self.disabled = Some(reason.clone());
        }
        info!(?reason, "voice help disabled");
        self.set_state(ConversationState::Idle);
        self.host.voice_disabled(&reason);
    }

    fn give_up(&mut self, reason: DisableReason, message: &str) {
        self.disable_voice(reason);
        self.say(message, AfterSpeech::Nothing);
    }

    fn may_listen(&self, kind: ModeKind) -> bool {
        if self.speaking.is_some() || self.disabled.is_some() {
            return false;
        }
        match self.state {
            ConversationState::Idle => false,
            ConversationState::ListeningCommand | ConversationState::AwaitingConfirmation => {
                kind != ModeKind::Dictation && self.voice_enabled()
            }
            ConversationState::Dictating | ConversationState::AwaitingDictationConfirmation => {
                kind != ModeKind::Command
            }
        }
    }

    fn say(&mut self, text: &str, then: AfterSpeech) {
        self.stop_listening();
        self.next_utterance += 1;
        let id = UtteranceId(self.next_utterance);
        if let Some(previous) = self.speaking.replace(PendingSpeech { id, then }) {
            debug!(superseded = ?previous.then, "replacing pending prompt");
        }
        debug!(?id, text, "speaking");

        if let Err(err) = self.speech.speak(id, text) {
            warn!(error = %err, "speech output failed, continuing silently");
            self.on_speech_finished(id);
        }
    }

    fn cancel_speech(&mut self) {
        if self.speaking.take().is_some() {
            self.speech.cancel();
        }
    }

    fn listen(&mut self, mode: RecognitionMode) {
        if self.speaking.is_some() {
            warn!(mode = %mode.kind, "not listening while a prompt is playing");
            return;
        }
        if self.disabled.is_some() {
            return;
        }
        match self.session.start(mode) {
            Ok(outcome) => {
                // A queued start is reported from the end event instead.
                if outcome == StartOutcome::Started {
                    self.host.listening_changed(true);
                }
                match self.state {
                    ConversationState::ListeningCommand | ConversationState::AwaitingConfirmation => {
                        self.arm(TimerKind::Inactivity)
                    }
                    ConversationState::Dictating
                    | ConversationState::AwaitingDictationConfirmation => {
                        self.arm(TimerKind::DictationSilence)
                    }
                    ConversationState::Idle => {}
                }
            }
            Err(err) => warn!(error = %err, "could not start listening"),
        }
    }

    fn stop_listening(&mut self) {
        self.disarm(TimerKind::Inactivity);
        self.disarm(TimerKind::DictationSilence);
        let was_running = self.session.is_running();
        if let Err(err) = self.session.stop(true) {
            warn!(error = %err, "failed to stop recognition");
        }
        if was_running {
            self.host.listening_changed(false);
        }
    }

    fn arm(&mut self, kind: TimerKind) {
        let after = match kind {
            TimerKind::Inactivity => self.settings.inactivity_timeout(),
            TimerKind::DictationSilence => self.settings.dictation_silence(),
            TimerKind::NetworkRetry => self.settings.network_retry_delay(),
        };
        self.arm_after(kind, after);
    }

    fn arm_after(&mut self, kind: TimerKind, after: Duration) {
        self.disarm(kind);
        self.timer_generation += 1;
        let token = TimerToken {
            kind,
            generation: self.timer_generation,
        };
        self.timers.schedule(token, after);
        self.armed.insert(kind, token);
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(token) = self.armed.remove(&kind) {
            self.timers.cancel(token);
        }
    }

    fn set_state(&mut self, next: ConversationState) {
        if self.state != next {
            debug!(from = self.state.label(), to = next.label(), "conversation state");
            self.state = next;
        }
    }
}
