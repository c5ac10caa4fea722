//! Local MP3 playback via rodio.

use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::SpeechError;

/// Plays synthesized audio files on the default output device.
///
/// The output stream is opened lazily on the first play request so the app
/// still launches on hosts without audio hardware; the failure surfaces as
/// a notice and every later request retries the device.  Playing a new file
/// replaces whatever was playing before.
pub struct AudioPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self {
            output: None,
            sink: None,
        }
    }

    /// Decode `path` as MP3 and start playback, replacing any current sink.
    pub fn play_file(&mut self, path: &Path) -> Result<(), SpeechError> {
        self.stop();

        if self.output.is_none() {
            let pair = OutputStream::try_default()
                .map_err(|e| SpeechError::Playback(format!("no audio output: {e}")))?;
            self.output = Some(pair);
        }
        let Some((_, handle)) = self.output.as_ref() else {
            return Err(SpeechError::Playback("no audio output".into()));
        };

        let sink = Sink::try_new(handle).map_err(|e| SpeechError::Playback(e.to_string()))?;

        let file = std::fs::File::open(path).map_err(|e| SpeechError::Io(e.to_string()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| SpeechError::Playback(e.to_string()))?;

        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    /// Halt playback immediately.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    /// Whether a sink exists and still has audio queued.
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
