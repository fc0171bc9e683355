//! Alarm audio sink.
//!
//! The alarm asset is loaded and decoded once at startup so a missing or
//! corrupt file fails the launch instead of the first alarm. Playback handles
//! are created and stopped on the alarm worker thread.

use crate::Result;

/// Running playback started by an [`AudioSink`]
pub trait Playback {
    /// Stop playback and release the output device
    fn stop(self: Box<Self>);
}

/// Sink able to loop the alarm sound
pub trait AudioSink: Send + Sync {
    /// Start looped playback of the alarm sound
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output is available
    fn play_looped(&self) -> Result<Box<dyn Playback>>;
}

#[cfg(feature = "desktop")]
pub use self::rodio_sink::RodioAlarm;

#[cfg(feature = "desktop")]
mod rodio_sink {
    use super::{AudioSink, Playback};
    use crate::{Error, Result};
    use log::info;
    use rodio::{Decoder, OutputStream, Sink, Source};
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    /// Alarm sound played through the default output device
    pub struct RodioAlarm {
        data: Arc<[u8]>,
    }

    impl RodioAlarm {
        /// Load and validate the alarm asset
        ///
        /// # Errors
        ///
        /// Returns `Error::Audio` if the file is missing or cannot be decoded
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let data: Arc<[u8]> = std::fs::read(path)
                .map_err(|e| Error::Audio(format!("Failed to read alarm sound {}: {e}", path.display())))?
                .into();

            Decoder::new(Cursor::new(Arc::clone(&data)))
                .map_err(|e| Error::Audio(format!("Unsupported alarm sound {}: {e}", path.display())))?;

            info!("Loaded alarm sound from {}", path.display());
            Ok(Self { data })
        }
    }

    impl AudioSink for RodioAlarm {
        fn play_looped(&self) -> Result<Box<dyn Playback>> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| Error::Audio(format!("No audio output: {e}")))?;
            let sink = Sink::try_new(&handle).map_err(|e| Error::Audio(format!("Failed to open sink: {e}")))?;
            let source = Decoder::new(Cursor::new(Arc::clone(&self.data)))
                .map_err(|e| Error::Audio(e.to_string()))?
                .repeat_infinite();

            sink.append(source);

            Ok(Box::new(RodioPlayback { sink, _stream: stream }))
        }
    }

    struct RodioPlayback {
        sink: Sink,
        // Dropping the stream closes the device
        _stream: OutputStream,
    }

    impl Playback for RodioPlayback {
        fn stop(self: Box<Self>) {
            self.sink.stop();
        }
    }
}
