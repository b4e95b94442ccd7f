//! Notification cue played when a prompt sequence starts.
//!
//! Playback is fire-and-forget: failures are logged and never reach the cycle.

use log::{debug, warn};
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;

pub trait Chime {
    fn play(&self);
}

/// No-op cue for `--mute`, headless tests, and missing sound files
pub struct Silent;

impl Chime for Silent {
    fn play(&self) {}
}

/// Plays a sound file on a detached audio thread
pub struct SoundChime {
    path: PathBuf,
}

impl SoundChime {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SoundChime { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Chime for SoundChime {
    fn play(&self) {
        let path = self.path.clone();
        let spawned = thread::Builder::new()
            .name("moodstock-chime".to_string())
            .spawn(move || {
                if let Err(e) = play_file(&path) {
                    warn!("Notification cue failed ({}): {}", path.display(), e);
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn audio thread: {}", e);
        }
    }
}

fn play_file(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("failed to open sound file: {e}"))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| format!("failed to decode sound: {e}"))?;

    // The stream must outlive the sink or playback stops immediately
    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| format!("failed to create audio output stream: {e}"))?;
    let sink = Sink::try_new(&handle).map_err(|e| format!("failed to create audio sink: {e}"))?;

    sink.set_volume(1.0);
    sink.append(source);
    sink.sleep_until_end();
    debug!("Notification cue finished");
    Ok(())
}

/// Pick the cue for the given settings: silent when muted or when the file is missing
pub fn chime_for(sound: &Path, mute: bool) -> Box<dyn Chime> {
    if mute {
        return Box::new(Silent);
    }
    if !sound.exists() {
        warn!(
            "Sound file {} not found; prompts will be silent",
            sound.display()
        );
        return Box::new(Silent);
    }
    Box::new(SoundChime::new(sound))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sound_file_falls_back_to_silent() {
        let dir = tempfile::tempdir().unwrap();
        let chime = chime_for(&dir.path().join("nope.mp3"), false);
        // Must not panic or block
        chime.play();
    }

    #[test]
    fn test_sound_chime_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-audio.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let chime = SoundChime::new(&path);
        assert_eq!(chime.path(), path.as_path());
        chime.play();
    }
}
