//! Text-to-speech playback over recognized text.
//!
//! The engine contract is deliberately small: `speak` replaces any utterance
//! already in progress, and `stop` is a no-op when nothing is playing.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("No speech synthesizer found (install espeak or espeak-ng)")]
    NotAvailable,
    #[error("Speech synthesizer error: {0}")]
    Engine(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait SpeechEngine {
    /// Start speaking `text`, interrupting any in-progress playback.
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;

    /// Stop playback. A no-op when nothing is currently speaking.
    fn stop(&mut self);

    fn is_speaking(&mut self) -> bool;
}

// ── Mock engine (tests) ───────────────────────────────────────────────────────

/// Records every utterance and tracks the playing state, so replace and stop
/// semantics can be asserted without audio hardware.
#[derive(Debug, Default)]
pub struct MockSpeaker {
    utterances: Vec<String>,
    speaking: bool,
    stops: usize,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl SpeechEngine for MockSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.utterances.push(text.to_string());
        self.speaking = true;
        Ok(())
    }

    fn stop(&mut self) {
        if self.speaking {
            self.speaking = false;
            self.stops += 1;
        }
    }

    fn is_speaking(&mut self) -> bool {
        self.speaking
    }
}

// ── System-binary engine ──────────────────────────────────────────────────────

/// Drives a command-line synthesizer (`espeak`, `espeak-ng`, or macOS `say`)
/// as a child process. Replacing an utterance kills the previous child.
pub struct CommandSpeaker {
    program: PathBuf,
    child: Option<Child>,
}

impl CommandSpeaker {
    /// Find the first available synthesizer binary on the PATH.
    pub fn detect() -> Result<Self, SpeechError> {
        for candidate in ["espeak-ng", "espeak", "say"] {
            if let Ok(program) = which::which(candidate) {
                tracing::debug!("using speech synthesizer {}", program.display());
                return Ok(Self { program, child: None });
            }
        }
        Err(SpeechError::NotAvailable)
    }

    pub fn with_program(program: PathBuf) -> Self {
        Self { program, child: None }
    }
}

impl SpeechEngine for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.stop();
        let child = Command::new(&self.program)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SpeechError::NotAvailable,
                _ => SpeechError::Io(e),
            })?;
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_speaking(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                // Still running.
                Ok(None) => true,
                _ => {
                    self.child = None;
                    false
                }
            },
            None => false,
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speak_replaces_previous_utterance() {
        let mut speaker = MockSpeaker::new();
        speaker.speak("first page").unwrap();
        speaker.speak("second page").unwrap();
        assert_eq!(speaker.utterances(), &["first page", "second page"]);
        assert!(speaker.is_speaking());
    }

    #[test]
    fn stop_is_noop_when_idle() {
        let mut speaker = MockSpeaker::new();
        speaker.stop();
        assert_eq!(speaker.stops(), 0);
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn stop_halts_playback_once() {
        let mut speaker = MockSpeaker::new();
        speaker.speak("text").unwrap();
        speaker.stop();
        speaker.stop();
        assert_eq!(speaker.stops(), 1);
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn command_speaker_missing_binary_reports_not_available() {
        let mut speaker = CommandSpeaker::with_program(PathBuf::from(
            "/nonexistent/quickscan-test-synth",
        ));
        assert!(matches!(
            speaker.speak("hello"),
            Err(SpeechError::NotAvailable)
        ));
        assert!(!speaker.is_speaking());
    }
}
