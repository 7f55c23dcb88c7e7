//! Line-based transcript source for the `listen` command.
//!
//! Reads one line per capture, as produced by a dictation tool piping its
//! transcript to standard input. A line of the form `error: <code>` reports a
//! host error code instead of a transcript.

use std::io::BufRead;

use grocery_core::voice::{OnResult, VoiceCapture, VoiceError};

pub struct LineCapture<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineCapture<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> VoiceCapture for LineCapture<R> {
    fn start(&mut self, on_result: OnResult) -> Result<(), VoiceError> {
        let mut line = String::new();
        let outcome = match self.reader.read_line(&mut line) {
            Ok(0) => Err(VoiceError::NoSpeech),
            Ok(_) => match line.trim().strip_prefix("error:") {
                Some(code) => {
                    Err(VoiceError::from_code(code.trim()).unwrap_or(VoiceError::AudioCapture))
                }
                None => Ok(line),
            },
            Err(err) => {
                tracing::warn!("Failed to read transcript: {}", err);
                Err(VoiceError::AudioCapture)
            }
        };
        on_result(outcome);
        Ok(())
    }

    fn stop(&mut self) {}
}
