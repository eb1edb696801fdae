use std::{
    io::{self, Write},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use log::{debug, error};
#[cfg(feature = "audio")]
use log::warn;

use crate::LanewatchError;

/// Something that can sound the obstacle alert.
pub trait TonePlayer: Send {
    /// Starts playback without blocking. `done` must receive exactly one
    /// message once the tone has finished.
    fn play(&mut self, done: Sender<()>) -> Result<(), LanewatchError>;
}

/// Obstacle alert with at most one playback in flight.
///
/// `trigger` is a no-op while a tone is playing. The playing flag clears only
/// when the player reports completion and [`AlertTone::poll`] observes it, so
/// a player that never reports leaves the alert silent from then on.
pub struct AlertTone {
    player: Box<dyn TonePlayer>,
    playing: bool,
    done_tx: Sender<()>,
    done_rx: Receiver<()>,
}

impl AlertTone {
    pub fn new(player: Box<dyn TonePlayer>) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            player,
            playing: false,
            done_tx,
            done_rx,
        }
    }

    /// Returns true if a new playback was started.
    pub fn trigger(&mut self) -> bool {
        self.poll();
        if self.playing {
            debug!("Alert tone already playing");
            return false;
        }
        self.playing = true;
        if let Err(e) = self.player.play(self.done_tx.clone()) {
            error!("Could not play alert tone: {}", e);
            self.playing = false;
            return false;
        }
        true
    }

    /// Picks up completion signals from the player.
    pub fn poll(&mut self) {
        while self.done_rx.try_recv().is_ok() {
            self.playing = false;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Rings the terminal bell and reports completion after a fixed duration.
pub struct BellTone {
    duration: Duration,
}

impl BellTone {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl TonePlayer for BellTone {
    fn play(&mut self, done: Sender<()>) -> Result<(), LanewatchError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| LanewatchError::AudioOutput {
                description: e.to_string(),
            })?;

        let duration = self.duration;
        thread::Builder::new()
            .name("lanewatch-bell".to_string())
            .spawn(move || {
                thread::sleep(duration);
                let _ = done.send(());
            })
            .map_err(|e| LanewatchError::AudioOutput {
                description: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(feature = "audio")]
pub use clip::{ClipTone, download_clip};

#[cfg(feature = "audio")]
mod clip {
    use std::{io::Cursor, sync::Arc, sync::mpsc::Sender, thread, time::Duration};

    use log::error;

    use crate::LanewatchError;

    use super::TonePlayer;

    /// Downloads the alarm clip once, at startup.
    pub async fn download_clip(url: &str, timeout: Duration) -> Result<Vec<u8>, LanewatchError> {
        let fetch_error = |e| LanewatchError::AlertSoundFetch {
            url: url.to_string(),
            source: e,
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LanewatchError::HttpClientBuild { source: e })?;
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        let bytes = response.bytes().await.map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }

    /// Plays a decoded audio clip on the default output device.
    pub struct ClipTone {
        clip: Arc<Vec<u8>>,
    }

    impl ClipTone {
        pub fn new(clip: Vec<u8>) -> Self {
            Self {
                clip: Arc::new(clip),
            }
        }
    }

    fn play_to_end(clip: &[u8]) -> Result<(), LanewatchError> {
        let audio_error = |e: &dyn std::fmt::Display| LanewatchError::AudioOutput {
            description: e.to_string(),
        };
        // the stream must outlive the sink, and neither is Send
        let (_stream, handle) = rodio::OutputStream::try_default().map_err(|e| audio_error(&e))?;
        let sink = rodio::Sink::try_new(&handle).map_err(|e| audio_error(&e))?;
        let source = rodio::Decoder::new(Cursor::new(clip.to_vec())).map_err(|e| audio_error(&e))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }

    impl TonePlayer for ClipTone {
        fn play(&mut self, done: Sender<()>) -> Result<(), LanewatchError> {
            let clip = Arc::clone(&self.clip);
            thread::Builder::new()
                .name("lanewatch-clip".to_string())
                .spawn(move || {
                    if let Err(e) = play_to_end(&clip) {
                        error!("Alert clip playback failed: {}", e);
                    }
                    let _ = done.send(());
                })
                .map_err(|e| LanewatchError::AudioOutput {
                    description: e.to_string(),
                })?;
            Ok(())
        }
    }
}

/// Picks the alert player for this build.
///
/// With the `audio` feature the clip at `sound_url` is downloaded and played
/// through the sound card, falling back to the terminal bell if the download
/// fails. Without it the bell is always used.
pub fn default_player(sound_url: &str, duration: Duration) -> Box<dyn TonePlayer> {
    #[cfg(feature = "audio")]
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        match runtime.map(|rt| rt.block_on(download_clip(sound_url, Duration::from_secs(10)))) {
            Ok(Ok(clip)) => return Box::new(ClipTone::new(clip)),
            Ok(Err(e)) => warn!("{}, using terminal bell", e),
            Err(e) => warn!("Could not start runtime to load alert sound: {}", e),
        }
    }
    #[cfg(not(feature = "audio"))]
    debug!(
        "Built without audio support, alert sound {} not loaded",
        sound_url
    );
    Box::new(BellTone::new(duration))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingPlayer {
        pending: Arc<Mutex<Vec<Sender<()>>>>,
        plays: Arc<Mutex<usize>>,
    }

    impl RecordingPlayer {
        fn finish_all(&self) {
            for done in self.pending.lock().unwrap().drain(..) {
                done.send(()).unwrap();
            }
        }

        fn plays(&self) -> usize {
            *self.plays.lock().unwrap()
        }
    }

    impl TonePlayer for RecordingPlayer {
        fn play(&mut self, done: Sender<()>) -> Result<(), LanewatchError> {
            *self.plays.lock().unwrap() += 1;
            self.pending.lock().unwrap().push(done);
            Ok(())
        }
    }

    struct BrokenPlayer;

    impl TonePlayer for BrokenPlayer {
        fn play(&mut self, _done: Sender<()>) -> Result<(), LanewatchError> {
            Err(LanewatchError::AudioOutput {
                description: "no device".to_string(),
            })
        }
    }

    #[test]
    fn test_no_overlapping_playback() {
        let player = RecordingPlayer::default();
        let mut alert = AlertTone::new(Box::new(player.clone()));

        assert!(alert.trigger());
        assert!(!alert.trigger());
        assert!(!alert.trigger());
        assert_eq!(player.plays(), 1);
        assert!(alert.is_playing());
    }

    #[test]
    fn test_replay_after_completion() {
        let player = RecordingPlayer::default();
        let mut alert = AlertTone::new(Box::new(player.clone()));

        assert!(alert.trigger());
        player.finish_all();
        alert.poll();
        assert!(!alert.is_playing());
        assert!(alert.trigger());
        assert_eq!(player.plays(), 2);
    }

    #[test]
    fn test_stays_playing_without_completion() {
        let player = RecordingPlayer::default();
        let mut alert = AlertTone::new(Box::new(player.clone()));

        alert.trigger();
        for _ in 0..10 {
            alert.poll();
            assert!(!alert.trigger());
        }
        assert_eq!(player.plays(), 1);
    }

    #[test]
    fn test_failed_start_does_not_wedge() {
        let mut alert = AlertTone::new(Box::new(BrokenPlayer));
        assert!(!alert.trigger());
        assert!(!alert.is_playing());
    }

    #[test]
    fn test_bell_reports_completion() {
        let mut bell = BellTone::new(Duration::from_millis(10));
        let (done_tx, done_rx) = mpsc::channel();
        bell.play(done_tx).unwrap();
        done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    }
}
