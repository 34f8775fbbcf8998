//! Speech-to-text capture boundary.
//!
//! A capture device delivers finished transcript chunks through a channel;
//! [`crate::journal::CheckIn::apply_transcripts`] appends them to the draft.
//! Platforms without speech recognition use [`NoSpeechCapture`].

use tokio::sync::mpsc;
use tracing::debug;

/// Receiving end for finished transcript chunks.
pub type TranscriptSink = mpsc::UnboundedSender<String>;

/// An optional speech recognition capability.
pub trait SpeechCapture: Send {
    /// Whether this platform can capture speech at all.
    fn available(&self) -> bool;

    /// Starts listening. Returns `false` when capture is unavailable.
    fn start(&mut self, sink: TranscriptSink) -> bool;

    /// Stops listening. Calling it while not listening does nothing.
    fn stop(&mut self);
}

/// Capture for platforms without speech recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeechCapture;

impl SpeechCapture for NoSpeechCapture {
    fn available(&self) -> bool {
        false
    }

    fn start(&mut self, _sink: TranscriptSink) -> bool {
        debug!("Speech capture is not supported on this platform");
        false
    }

    fn stop(&mut self) {}
}

/// Replays fixed chunks on start. Stands in for a recognizer in scripted
/// sessions and tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedCapture {
    chunks: Vec<String>,
    listening: bool,
}

impl ScriptedCapture {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            listening: false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl SpeechCapture for ScriptedCapture {
    fn available(&self) -> bool {
        true
    }

    fn start(&mut self, sink: TranscriptSink) -> bool {
        self.listening = true;
        for chunk in self.chunks.drain(..) {
            if sink.send(chunk).is_err() {
                break;
            }
        }
        true
    }

    fn stop(&mut self) {
        self.listening = false;
    }
}
