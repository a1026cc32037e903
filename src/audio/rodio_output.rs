//! rodio-backed audio output
//!
//! rodio's `OutputStream` cannot leave the thread that opened it, so the
//! device lives on a dedicated thread that takes commands over a channel.
//! Files are read and decoded on the caller's side so decode errors come
//! back from `play_from` instead of being lost on the audio thread.

use rodio::source::SkipDuration;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::io::Cursor;
use std::path::Path;
use std::sync::mpsc::{sync_channel, SyncSender};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use super::{AudioError, AudioOutput};

type Track = SkipDuration<Decoder<Cursor<Vec<u8>>>>;

enum AudioCommand {
    /// Start a track and report whether the device accepted it
    Play(Track, SyncSender<Result<(), AudioError>>),
    Stop,
    SetVolume(f32),
}

/// Handle to the audio thread
pub struct RodioOutput {
    commands: mpsc::UnboundedSender<AudioCommand>,
    /// When the current song started, None while stopped
    started: Option<Instant>,
}

impl RodioOutput {
    /// Open the default output device on a new audio thread
    pub async fn open() -> Result<Self, AudioError> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("ultra-audio".to_string())
            .spawn(move || audio_thread(cmd_rx, ready_tx))
            .map_err(|e| AudioError::Device(e.to_string()))?;

        ready_rx.await.map_err(|_| AudioError::Disconnected)??;

        Ok(Self::with_channel(cmd_tx))
    }

    fn with_channel(commands: mpsc::UnboundedSender<AudioCommand>) -> Self {
        Self {
            commands,
            started: None,
        }
    }

    fn send(&self, command: AudioCommand) -> Result<(), AudioError> {
        self.commands
            .send(command)
            .map_err(|_| AudioError::Disconnected)
    }
}

impl AudioOutput for RodioOutput {
    fn play_from(&mut self, path: &Path, offset: Duration) -> Result<(), AudioError> {
        let bytes = std::fs::read(path).map_err(|source| AudioError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        self.started = None;
        let (ack_tx, ack_rx) = sync_channel(1);
        self.send(AudioCommand::Play(source.skip_duration(offset), ack_tx))?;
        ack_rx.recv().map_err(|_| AudioError::Disconnected)??;
        self.started = Some(Instant::now());

        debug!("Started {} at {:?}", path.display(), offset);
        Ok(())
    }

    fn stop(&mut self) {
        self.started = None;
        if self.send(AudioCommand::Stop).is_err() {
            error!("Audio thread is gone; stop ignored");
        }
    }

    fn position(&self) -> Duration {
        self.started
            .map(|started| started.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn set_volume(&mut self, volume: f32) {
        if self
            .send(AudioCommand::SetVolume(volume.clamp(0.0, 1.0)))
            .is_err()
        {
            error!("Audio thread is gone; volume change ignored");
        }
    }
}

fn audio_thread(
    mut commands: mpsc::UnboundedReceiver<AudioCommand>,
    ready: oneshot::Sender<Result<(), AudioError>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(AudioError::Device(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut sink: Option<Sink> = None;
    let mut volume = 1.0_f32;

    // ends when the RodioOutput handle is dropped
    while let Some(command) = commands.blocking_recv() {
        match command {
            AudioCommand::Play(track, ack) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                // a fresh sink per song avoids sample rate glitches between files
                let result = match Sink::try_new(&handle) {
                    Ok(new_sink) => {
                        new_sink.set_volume(volume);
                        new_sink.append(track);
                        sink = Some(new_sink);
                        Ok(())
                    }
                    Err(e) => {
                        error!("Failed to create audio sink: {}", e);
                        Err(AudioError::Device(e.to_string()))
                    }
                };
                let _ = ack.send(result);
            }
            AudioCommand::Stop => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
            }
            AudioCommand::SetVolume(v) => {
                volume = v;
                if let Some(current) = &sink {
                    current.set_volume(v);
                }
            }
        }
    }

    debug!("Audio thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A short silent 16-bit mono WAV file
    fn silent_wav(samples: u32) -> Vec<u8> {
        let data_len = samples * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&8_000u32.to_le_bytes());
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(wav.len() + data_len as usize, 0);
        wav
    }

    /// Output whose audio thread answers every play with `reply`
    fn output_replying(
        reply: fn() -> Result<(), AudioError>,
    ) -> (RodioOutput, std::thread::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let thread = std::thread::spawn(move || {
            while let Some(command) = rx.blocking_recv() {
                if let AudioCommand::Play(_, ack) = command {
                    let _ = ack.send(reply());
                }
            }
        });
        (RodioOutput::with_channel(tx), thread)
    }

    #[test]
    fn test_sink_failure_is_reported_to_the_caller() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, silent_wav(800)).unwrap();

        let (mut output, thread) =
            output_replying(|| Err(AudioError::Device("no sink".to_string())));

        let err = output.play_from(&path, Duration::ZERO).unwrap_err();
        assert!(matches!(err, AudioError::Device(_)));
        assert_eq!(output.position(), Duration::ZERO);

        drop(output);
        thread.join().unwrap();
    }

    #[test]
    fn test_accepted_play_starts_the_clock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, silent_wav(800)).unwrap();

        let (mut output, thread) = output_replying(|| Ok(()));

        output.play_from(&path, Duration::ZERO).unwrap();
        assert!(output.started.is_some());

        output.stop();
        assert_eq!(output.position(), Duration::ZERO);

        drop(output);
        thread.join().unwrap();
    }

    #[test]
    fn test_undecodable_file_never_reaches_the_device() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, b"not audio").unwrap();

        let (mut output, thread) = output_replying(|| Ok(()));

        let err = output.play_from(&path, Duration::ZERO).unwrap_err();
        assert!(matches!(err, AudioError::Decode { .. }));

        drop(output);
        thread.join().unwrap();
    }
}
