use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

const APP_NAME: &str = "respite";

pub fn show_desktop_notification(title: &str, message: &str) -> Result<(), NotificationError> {
    notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(title)
        .body(message)
        .show()?;
    Ok(())
}

/// Plays `path` on a background thread; failures are only logged.
pub fn play_sound(path: PathBuf, volume: f32) {
    thread::spawn(move || {
        if let Err(err) = play_sound_sync(&path, volume) {
            tracing::warn!("{err}");
        }
    });
}

fn play_sound_sync(path: &Path, volume: f32) -> Result<(), NotificationError> {
    let (_stream, stream_handle) = OutputStream::try_default()?;
    let file = File::open(path).map_err(|e| NotificationError::OpenSound(path.to_path_buf(), e))?;
    let audio = Decoder::new(BufReader::new(file))?;

    let sink = Sink::try_new(&stream_handle)?;
    sink.append(audio);
    sink.set_volume(volume);
    sink.sleep_until_end();

    Ok(())
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to show desktop notification: {0}")]
    Show(#[from] notify_rust::error::Error),
    #[error("failed to open sound file {0}: {1}")]
    OpenSound(PathBuf, io::Error),
    #[error("failed to create audio stream for break sound: {0}")]
    StreamCreation(#[from] rodio::StreamError),
    #[error("failed to play break sound: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("failed to decode break sound: {0}")]
    Decoding(#[from] rodio::decoder::DecoderError),
}
