use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    error::{RecognitionError, VoiceError, VoiceResult},
    provider::{RecognitionMode, ResultEvent, SpeechRecognizer, StopCompletion, Utterance},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// The previous run has not ended yet; the start is issued on its end
    /// event.
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    Ended,
    QueuedStarted,
    /// The backend stopped without a manual stop. The owner decides whether
    /// to listen again in `mode`.
    Interrupted(RecognitionMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisposition {
    Ignore,
    Retry { attempt: u32, delay: Duration },
    GiveUp { attempts: u32 },
    Fatal(RecognitionError),
}

/// Sole owner of the recognition backend.
///
/// Serializes start/stop so two listening runs never overlap on the
/// microphone, and keeps the network retry budget.
pub struct RecognitionSession {
    backend: Box<dyn SpeechRecognizer>,
    state: SessionState,
    mode: Option<RecognitionMode>,
    manual_stop: bool,
    awaiting_end: bool,
    queued: Option<RecognitionMode>,
    network_failures: u32,
    max_network_retries: u32,
    retry_delay: Duration,
}

impl RecognitionSession {
    pub fn new(
        backend: Box<dyn SpeechRecognizer>,
        max_network_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            backend,
            state: SessionState::Stopped,
            mode: None,
            manual_stop: false,
            awaiting_end: false,
            queued: None,
            network_failures: 0,
            max_network_retries,
            retry_delay,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn mode(&self) -> Option<&RecognitionMode> {
        self.mode.as_ref()
    }

    pub fn network_failures(&self) -> u32 {
        self.network_failures
    }

    pub fn start(&mut self, mode: RecognitionMode) -> VoiceResult<StartOutcome> {
        if self.state == SessionState::Running {
            let active = self.mode.as_ref().map_or(mode.kind, |m| m.kind);
            return Err(VoiceError::SessionBusy(active));
        }
        if self.awaiting_end {
            if let Some(queued) = &self.queued {
                return Err(VoiceError::SessionBusy(queued.kind));
            }
            debug!(mode = %mode.kind, "backend still stopping, queueing start");
            self.queued = Some(mode);
            return Ok(StartOutcome::Queued);
        }

        self.launch(mode)?;
        Ok(StartOutcome::Started)
    }

    /// Stop listening. A `manual` stop means the end event that follows is
    /// expected and must not lead to listening again.
    pub fn stop(&mut self, manual: bool) -> VoiceResult<()> {
        if manual {
            self.queued = None;
        }
        if self.state == SessionState::Stopped {
            self.manual_stop |= manual;
            return Ok(());
        }

        self.state = SessionState::Stopped;
        self.manual_stop = manual;
        match self.backend.stop() {
            Ok(StopCompletion::Immediate) => {
                self.awaiting_end = false;
                Ok(())
            }
            Ok(StopCompletion::Pending) => {
                self.awaiting_end = true;
                Ok(())
            }
            Err(err) => {
                self.awaiting_end = false;
                Err(VoiceError::backend(err))
            }
        }
    }

    pub fn handle_end(&mut self) -> VoiceResult<EndOutcome> {
        let was_running = self.state == SessionState::Running;
        self.state = SessionState::Stopped;

        if self.awaiting_end {
            self.awaiting_end = false;
            if let Some(mode) = self.queued.take() {
                self.launch(mode)?;
                return Ok(EndOutcome::QueuedStarted);
            }
        }

        if self.manual_stop && !was_running {
            return Ok(EndOutcome::Ended);
        }
        match &self.mode {
            Some(mode) => {
                debug!(mode = %mode.kind, "recognition ended on its own");
                Ok(EndOutcome::Interrupted(mode.clone()))
            }
            None => Ok(EndOutcome::Ended),
        }
    }

    /// Split a result event into new final and interim text. Any result
    /// proves the connection works again, so the retry budget resets.
    pub fn accept(&mut self, event: &ResultEvent) -> Utterance {
        self.network_failures = 0;
        Utterance::from(event)
    }

    pub fn handle_error(&mut self, error: RecognitionError) -> VoiceResult<ErrorDisposition> {
        match error {
            RecognitionError::NoSpeech | RecognitionError::Aborted => Ok(ErrorDisposition::Ignore),
            RecognitionError::Network => {
                self.network_failures += 1;
                self.stop(true)?;
                if self.network_failures < self.max_network_retries {
                    warn!(
                        attempt = self.network_failures,
                        delay_ms = self.retry_delay.as_millis() as u64,
                        "network error, retrying recognition"
                    );
                    Ok(ErrorDisposition::Retry {
                        attempt: self.network_failures,
                        delay: self.retry_delay,
                    })
                } else {
                    warn!(attempts = self.network_failures, "network error, giving up");
                    Ok(ErrorDisposition::GiveUp {
                        attempts: self.network_failures,
                    })
                }
            }
            err if err.is_fatal() => {
                self.stop(true)?;
                warn!(code = %err, "recognition not permitted");
                Ok(ErrorDisposition::Fatal(err))
            }
            other => {
                warn!(code = %other, "ignoring recognition error");
                Ok(ErrorDisposition::Ignore)
            }
        }
    }

    fn launch(&mut self, mode: RecognitionMode) -> VoiceResult<()> {
        self.backend.start(&mode).map_err(VoiceError::backend)?;
        info!(mode = %mode.kind, continuous = mode.continuous, "recognition started");
        self.state = SessionState::Running;
        self.manual_stop = false;
        self.mode = Some(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::provider::ModeKind;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Start(ModeKind),
        Stop,
    }

    struct FakeRecognizer {
        calls: Arc<Mutex<Vec<Call>>>,
        completion: StopCompletion,
    }

    impl SpeechRecognizer for FakeRecognizer {
        fn start(&mut self, mode: &RecognitionMode) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Start(mode.kind));
            Ok(())
        }

        fn stop(&mut self) -> Result<StopCompletion> {
            self.calls.lock().unwrap().push(Call::Stop);
            Ok(self.completion)
        }
    }

    fn session(completion: StopCompletion) -> (RecognitionSession, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let backend = FakeRecognizer {
            calls: calls.clone(),
            completion,
        };
        (
            RecognitionSession::new(Box::new(backend), 3, Duration::from_secs(4)),
            calls,
        )
    }

    #[test]
    fn second_start_while_running_is_rejected() {
        let (mut session, calls) = session(StopCompletion::Immediate);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        let err = session.start(RecognitionMode::dictation("es-ES")).unwrap_err();
        assert!(matches!(err, VoiceError::SessionBusy(ModeKind::Command)));
        assert_eq!(*calls.lock().unwrap(), vec![Call::Start(ModeKind::Command)]);
    }

    #[test]
    fn switching_modes_needs_stop_then_start() {
        let (mut session, calls) = session(StopCompletion::Immediate);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.stop(true).unwrap();
        assert_eq!(
            session.start(RecognitionMode::dictation("es-ES")).unwrap(),
            StartOutcome::Started
        );
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Start(ModeKind::Command), Call::Stop, Call::Start(ModeKind::Dictation)]
        );
    }

    #[test]
    fn start_during_pending_stop_waits_for_end() {
        let (mut session, calls) = session(StopCompletion::Pending);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.stop(true).unwrap();
        assert_eq!(
            session.start(RecognitionMode::dictation("es-ES")).unwrap(),
            StartOutcome::Queued
        );
        assert!(!session.is_running());

        assert_eq!(session.handle_end().unwrap(), EndOutcome::QueuedStarted);
        assert!(session.is_running());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Start(ModeKind::Command), Call::Stop, Call::Start(ModeKind::Dictation)]
        );
    }

    #[test]
    fn manual_stop_swallows_end_event() {
        let (mut session, calls) = session(StopCompletion::Pending);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.stop(true).unwrap();
        assert_eq!(session.handle_end().unwrap(), EndOutcome::Ended);
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn spontaneous_end_is_reported_not_restarted() {
        let (mut session, calls) = session(StopCompletion::Pending);
        session.start(RecognitionMode::dictation("es-ES")).unwrap();
        let outcome = session.handle_end().unwrap();
        assert_eq!(outcome, EndOutcome::Interrupted(RecognitionMode::dictation("es-ES")));
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn non_manual_stop_reports_interruption() {
        let (mut session, _calls) = session(StopCompletion::Pending);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.stop(false).unwrap();
        assert_eq!(
            session.handle_end().unwrap(),
            EndOutcome::Interrupted(RecognitionMode::command("es-ES"))
        );
    }

    #[test]
    fn manual_stop_cancels_queued_start() {
        let (mut session, _calls) = session(StopCompletion::Pending);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.stop(true).unwrap();
        session.start(RecognitionMode::dictation("es-ES")).unwrap();
        session.stop(true).unwrap();
        assert_eq!(session.handle_end().unwrap(), EndOutcome::Ended);
        assert!(!session.is_running());
    }

    #[test]
    fn network_errors_retry_until_ceiling() {
        let (mut session, _calls) = session(StopCompletion::Immediate);
        let delay = Duration::from_secs(4);

        session.start(RecognitionMode::command("es-ES")).unwrap();
        assert_eq!(
            session.handle_error(RecognitionError::Network).unwrap(),
            ErrorDisposition::Retry { attempt: 1, delay }
        );
        assert!(!session.is_running());

        session.start(RecognitionMode::command("es-ES")).unwrap();
        assert_eq!(
            session.handle_error(RecognitionError::Network).unwrap(),
            ErrorDisposition::Retry { attempt: 2, delay }
        );

        session.start(RecognitionMode::command("es-ES")).unwrap();
        assert_eq!(
            session.handle_error(RecognitionError::Network).unwrap(),
            ErrorDisposition::GiveUp { attempts: 3 }
        );
    }

    #[test]
    fn results_reset_the_retry_budget() {
        let (mut session, _calls) = session(StopCompletion::Immediate);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.handle_error(RecognitionError::Network).unwrap();
        session.start(RecognitionMode::command("es-ES")).unwrap();
        session.accept(&ResultEvent::default());
        assert_eq!(session.network_failures(), 0);
    }

    #[test]
    fn no_speech_is_ignored_and_keeps_listening() {
        let (mut session, _calls) = session(StopCompletion::Immediate);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        assert_eq!(
            session.handle_error(RecognitionError::NoSpeech).unwrap(),
            ErrorDisposition::Ignore
        );
        assert!(session.is_running());
    }

    #[test]
    fn permission_denial_is_fatal_without_retry() {
        let (mut session, _calls) = session(StopCompletion::Immediate);
        session.start(RecognitionMode::command("es-ES")).unwrap();
        assert_eq!(
            session.handle_error(RecognitionError::NotAllowed).unwrap(),
            ErrorDisposition::Fatal(RecognitionError::NotAllowed)
        );
        assert!(!session.is_running());
        assert_eq!(session.network_failures(), 0);
    }
}
