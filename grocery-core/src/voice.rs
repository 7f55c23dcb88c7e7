//! Voice capture seam.
//!
//! Speech-to-text is done by the host (a browser speech API, a dictation
//! service, ...). This module only defines the one-shot contract the host
//! implements and tracks whether a capture is in flight. Each `start` yields
//! at most one outcome: a final transcript or an error code. Nothing here
//! retries or times out; the host owns silence detection.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use thiserror::Error;

use crate::error::{GroceryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no speech detected")]
    NoSpeech,

    #[error("could not capture audio")]
    AudioCapture,

    #[error("speech service unreachable")]
    Network,

    #[error("speech recognition not supported")]
    NotSupported,
}

impl VoiceError {
    /// Host error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture-failure",
            Self::Network => "network-error",
            Self::NotSupported => "not-supported",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "permission-denied" | "not-allowed" => Some(Self::PermissionDenied),
            "no-speech" => Some(Self::NoSpeech),
            "audio-capture-failure" | "audio-capture" => Some(Self::AudioCapture),
            "network-error" | "network" => Some(Self::Network),
            "not-supported" => Some(Self::NotSupported),
            _ => None,
        }
    }
}

/// Final transcript, or why there is none.
pub type CaptureOutcome = std::result::Result<String, VoiceError>;

/// Completion callback handed to [`VoiceCapture::start`].
pub type OnResult = Box<dyn FnOnce(CaptureOutcome) + Send>;

/// Host-provided speech-to-text source.
pub trait VoiceCapture {
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin one capture. `on_result` is called at most once, possibly
    /// before `start` returns.
    fn start(&mut self, on_result: OnResult) -> std::result::Result<(), VoiceError>;

    /// Cancel the capture in flight, if any. A cancelled capture may drop
    /// its callback without calling it.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    Listening,
}

/// Tracks one capture at a time over a [`VoiceCapture`].
pub struct VoiceSession<C: VoiceCapture> {
    capture: C,
    pending: Option<Receiver<CaptureOutcome>>,
}

impl<C: VoiceCapture> VoiceSession<C> {
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            pending: None,
        }
    }

    pub fn state(&self) -> ListenState {
        if self.pending.is_some() {
            ListenState::Listening
        } else {
            ListenState::Idle
        }
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    /// Start listening. Does nothing while a capture is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Ok(());
        }
        if !self.capture.is_supported() {
            return Err(GroceryError::VoiceUnsupported);
        }

        let (tx, rx) = mpsc::channel();
        self.pending = Some(rx);
        let started = self.capture.start(Box::new(move |outcome: CaptureOutcome| {
            // The receiver is gone once the capture was stopped.
            let _ = tx.send(outcome);
        }));
        if let Err(err) = started {
            self.pending = None;
            return Err(err.into());
        }

        tracing::debug!("Voice capture started");
        Ok(())
    }

    /// Cancel the running capture. Any late result is discarded.
    pub fn stop(&mut self) {
        if self.pending.take().is_some() {
            self.capture.stop();
            tracing::debug!("Voice capture stopped");
        }
    }

    /// Non-blocking check for the outcome of the running capture.
    pub fn poll(&mut self) -> Option<Result<String>> {
        let rx = self.pending.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(VoiceError::NoSpeech),
        };
        self.pending = None;
        Some(finish(outcome))
    }

    /// Block until the running capture completes.
    pub fn wait(&mut self) -> Result<String> {
        let Some(rx) = self.pending.take() else {
            return Err(VoiceError::NoSpeech.into());
        };
        let outcome = rx.recv().unwrap_or(Err(VoiceError::NoSpeech));
        finish(outcome)
    }
}

fn finish(outcome: CaptureOutcome) -> Result<String> {
    let transcript = outcome?.trim().to_lowercase();
    if transcript.is_empty() {
        return Err(VoiceError::NoSpeech.into());
    }
    tracing::debug!("Heard \"{}\"", transcript);
    Ok(transcript)
}

/// Capture that replays queued outcomes, one per `start`.
///
/// With nothing queued, `start` leaves the capture running until
/// [`ScriptedCapture::deliver`] or `stop` is called.
#[derive(Default)]
pub struct ScriptedCapture {
    outcomes: VecDeque<CaptureOutcome>,
    waiting: Option<OnResult>,
    unsupported: bool,
    pub starts: usize,
    pub stops: usize,
}

impl ScriptedCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.outcomes.push_back(Ok(transcript.into()));
        self
    }

    pub fn with_error(mut self, err: VoiceError) -> Self {
        self.outcomes.push_back(Err(err));
        self
    }

    /// Complete the running capture, if any.
    pub fn deliver(&mut self, outcome: CaptureOutcome) {
        if let Some(on_result) = self.waiting.take() {
            on_result(outcome);
        }
    }
}

impl VoiceCapture for ScriptedCapture {
    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    fn start(&mut self, on_result: OnResult) -> std::result::Result<(), VoiceError> {
        if self.unsupported {
            return Err(VoiceError::NotSupported);
        }
        self.starts += 1;
        match self.outcomes.pop_front() {
            Some(outcome) => on_result(outcome),
            None => self.waiting = Some(on_result),
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.waiting = None;
    }
}
