//! Playback state machine for a single media element.
//!
//! ```text
//! Idle ──LoadStart──▶ Loading ──LoadedMetadata──▶ Ready ⇄ Playing ⇄ Paused
//!                                                          │  ▲
//!                                                  Waiting ▼  │ Playing
//!                                                        Buffering
//!
//! Seeking { resume } is entered from Ready/Playing/Paused/Buffering by
//! `begin_seek` and returns to `resume` on `end_seek`.
//! ```
//!
//! The controller never reads wall-clock time. All progress comes from
//! `MediaEvent`s and the element's own `current_time`, so tests drive it with
//! synthetic events.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::time::format_time;

/// Default volume for a freshly bound element
pub const DEFAULT_VOLUME: f64 = 0.8;

/// Upper bound of the scrub fraction (the range input's max)
pub const MAX_FRACTION: f64 = 0.999_999;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    #[error("Invalid playback transition: {from:?} → {to:?}")]
    InvalidTransition {
        from: PlaybackState,
        to: PlaybackState,
    },
}

/// Abstraction over an audio/video element
pub trait MediaElement {
    /// Current media time in seconds
    fn current_time(&self) -> f64;

    /// Total duration in seconds (may be NaN before metadata loads)
    fn duration(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f64);

    /// Ask the element to start playing; the environment may refuse
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);
}

/// Events reported by the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEvent {
    LoadStart,
    LoadedMetadata,
    TimeUpdate,
    Waiting,
    Playing,
    Ended,
}

/// State a seek gesture returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resume {
    Ready,
    Playing,
    Paused,
}

impl From<Resume> for PlaybackState {
    fn from(resume: Resume) -> Self {
        match resume {
            Resume::Ready => PlaybackState::Ready,
            Resume::Playing => PlaybackState::Playing,
            Resume::Paused => PlaybackState::Paused,
        }
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    /// Scrub gesture in progress
    Seeking { resume: Resume },
    /// Playing, waiting for data
    Buffering,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Ready => write!(f, "ready"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Seeking { .. } => write!(f, "seeking"),
            PlaybackState::Buffering => write!(f, "buffering"),
        }
    }
}

/// Result of a play/pause request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Playing,
    Paused,
    /// The element refused to play; the controller is paused
    Blocked { reason: String },
}

/// Per-binding playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub volume: f64,
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            autoplay: true,
        }
    }
}

/// Owns the timing state for one element and one source URL
#[derive(Debug)]
pub struct PlaybackController<E: MediaElement> {
    element: E,
    url: String,
    state: PlaybackState,
    /// Known duration in seconds (0 until metadata loads)
    duration: f64,
    /// Last true position reported by the element
    position: f64,
    /// Pending scrub fraction while seeking
    pending: f64,
    volume: f64,
    autoplay: bool,
    blocked: Option<String>,
}

impl<E: MediaElement> PlaybackController<E> {
    /// Bind a controller to an element playing `url`
    pub fn new(mut element: E, url: impl Into<String>, settings: PlaybackSettings) -> Self {
        let volume = clamp_volume(settings.volume).unwrap_or(DEFAULT_VOLUME);
        element.set_volume(volume);

        Self {
            element,
            url: url.into(),
            state: PlaybackState::Idle,
            duration: 0.0,
            position: 0.0,
            pending: 0.0,
            volume,
            autoplay: settings.autoplay,
            blocked: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    /// The bound element. Its clock is read back on the next `TimeUpdate`.
    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// Tear down the binding and hand the element back
    pub fn into_element(self) -> E {
        self.element
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Reason the most recent play request was refused, if it was
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked.as_deref()
    }

    pub fn is_seeking(&self) -> bool {
        matches!(self.state, PlaybackState::Seeking { .. })
    }

    /// Whether the user expects sound (playing, buffering, or scrubbing
    /// out of either)
    pub fn is_playing(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Playing
                | PlaybackState::Buffering
                | PlaybackState::Seeking {
                    resume: Resume::Playing
                }
        )
    }

    /// Loading indicator
    pub fn is_loading(&self) -> bool {
        matches!(self.state, PlaybackState::Loading | PlaybackState::Buffering)
    }

    /// Displayed position in seconds
    pub fn position(&self) -> f64 {
        if self.is_seeking() {
            self.pending * self.duration
        } else {
            self.position
        }
    }

    /// Displayed position as a fraction of the duration
    pub fn played_fraction(&self) -> f64 {
        if self.is_seeking() {
            self.pending
        } else if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Elapsed label, e.g. `1:05`
    pub fn elapsed_label(&self) -> String {
        format_time(self.position())
    }

    /// Duration label, e.g. `3:20`
    pub fn duration_label(&self) -> String {
        format_time(self.duration)
    }

    /// Feed one element event. Returns the resulting state.
    pub fn handle(&mut self, event: MediaEvent) -> PlaybackState {
        let before = self.state;

        match event {
            MediaEvent::LoadStart => {
                if self.state == PlaybackState::Idle {
                    self.state = PlaybackState::Loading;
                }
            }
            MediaEvent::LoadedMetadata => {
                self.duration = sanitize_seconds(self.element.duration());
                if matches!(self.state, PlaybackState::Idle | PlaybackState::Loading) {
                    self.element.set_volume(self.volume);
                    self.state = PlaybackState::Ready;
                    if self.autoplay {
                        self.request_play();
                    }
                }
            }
            MediaEvent::TimeUpdate => {
                if !self.is_seeking() {
                    let now = sanitize_seconds(self.element.current_time());
                    self.position = if self.state == PlaybackState::Buffering {
                        self.position.max(now)
                    } else {
                        now
                    };
                }
            }
            MediaEvent::Waiting => {
                if self.state == PlaybackState::Playing {
                    self.state = PlaybackState::Buffering;
                }
            }
            MediaEvent::Playing => match self.state {
                PlaybackState::Loading
                | PlaybackState::Ready
                | PlaybackState::Paused
                | PlaybackState::Buffering => {
                    self.blocked = None;
                    self.state = PlaybackState::Playing;
                }
                _ => {}
            },
            MediaEvent::Ended => match self.state {
                PlaybackState::Playing | PlaybackState::Buffering => {
                    self.position = self.duration;
                    self.state = PlaybackState::Paused;
                }
                PlaybackState::Seeking { .. } => {
                    self.state = PlaybackState::Seeking {
                        resume: Resume::Paused,
                    };
                }
                _ => {}
            },
        }

        if before != self.state {
            debug!(url = %self.url, from = %before, to = %self.state, ?event, "Playback transition");
        }
        self.state
    }

    /// User play/pause toggle
    pub fn toggle(&mut self) -> Result<PlayOutcome, PlaybackError> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Buffering => {
                self.element.pause();
                self.state = PlaybackState::Paused;
                Ok(PlayOutcome::Paused)
            }
            PlaybackState::Ready | PlaybackState::Paused => Ok(self.request_play()),
            from => Err(PlaybackError::InvalidTransition {
                from,
                to: PlaybackState::Playing,
            }),
        }
    }

    /// Start a scrub gesture. A second call during the same gesture is a no-op.
    pub fn begin_seek(&mut self) -> Result<(), PlaybackError> {
        let resume = match self.state {
            PlaybackState::Seeking { .. } => return Ok(()),
            PlaybackState::Ready => Resume::Ready,
            PlaybackState::Playing | PlaybackState::Buffering => Resume::Playing,
            PlaybackState::Paused => Resume::Paused,
            from => {
                return Err(PlaybackError::InvalidTransition {
                    from,
                    to: PlaybackState::Seeking {
                        resume: Resume::Paused,
                    },
                })
            }
        };

        self.pending = self.played_fraction().min(MAX_FRACTION);
        self.state = PlaybackState::Seeking { resume };
        Ok(())
    }

    /// Move the pending scrub position. Last write wins; non-finite input
    /// is ignored.
    pub fn update_seek(&mut self, fraction: f64) -> Result<(), PlaybackError> {
        if !self.is_seeking() {
            return Err(PlaybackError::InvalidTransition {
                from: self.state,
                to: PlaybackState::Seeking {
                    resume: Resume::Paused,
                },
            });
        }
        if fraction.is_finite() {
            self.pending = fraction.clamp(0.0, MAX_FRACTION);
        }
        Ok(())
    }

    /// Finish the gesture: commit the pending position to the element and
    /// return to the state the gesture started from. Returns the committed
    /// time in seconds.
    pub fn end_seek(&mut self) -> Result<f64, PlaybackError> {
        let PlaybackState::Seeking { resume } = self.state else {
            return Err(PlaybackError::InvalidTransition {
                from: self.state,
                to: PlaybackState::Paused,
            });
        };

        let time = self.pending * self.duration;
        self.element.set_current_time(time);
        self.position = time;
        self.state = resume.into();

        debug!(url = %self.url, time, "Seek committed");
        Ok(time)
    }

    /// Jump back to the start, whatever the state
    pub fn restart(&mut self) {
        self.element.set_current_time(0.0);
        self.position = 0.0;
        self.pending = 0.0;
    }

    /// Set volume in [0, 1]. Non-finite input is ignored.
    pub fn set_volume(&mut self, volume: f64) {
        if let Some(volume) = clamp_volume(volume) {
            self.volume = volume;
            self.element.set_volume(volume);
        }
    }

    fn request_play(&mut self) -> PlayOutcome {
        match self.element.play() {
            Ok(()) => {
                self.blocked = None;
                self.state = PlaybackState::Playing;
                PlayOutcome::Playing
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(url = %self.url, "Playback failed: {}", reason);
                self.element.pause();
                self.state = PlaybackState::Paused;
                self.blocked = Some(reason.clone());
                PlayOutcome::Blocked { reason }
            }
        }
    }
}

fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn clamp_volume(volume: f64) -> Option<f64> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Element {
        time: f64,
        duration: f64,
        volume: f64,
        playing: bool,
        refuse_play: bool,
    }

    impl MediaElement for Element {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn duration(&self) -> f64 {
            self.duration
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.time = seconds;
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn play(&mut self) -> Result<(), PlaybackError> {
            if self.refuse_play {
                return Err(PlaybackError::PlayRejected("autoplay blocked".to_string()));
            }
            self.playing = true;
            Ok(())
        }
        fn pause(&mut self) {
            self.playing = false;
        }
    }

    fn ready(duration: f64, autoplay: bool) -> PlaybackController<Element> {
        let element = Element {
            duration,
            ..Default::default()
        };
        let mut c = PlaybackController::new(
            element,
            "https://x/a.m4a",
            PlaybackSettings {
                autoplay,
                ..Default::default()
            },
        );
        c.handle(MediaEvent::LoadStart);
        c.handle(MediaEvent::LoadedMetadata);
        c
    }

    #[test]
    fn test_load_sequence() {
        let mut c = PlaybackController::new(Element::default(), "u", PlaybackSettings::default());
        assert_eq!(c.state(), PlaybackState::Idle);
        assert_eq!(c.element().volume, DEFAULT_VOLUME);

        assert_eq!(c.handle(MediaEvent::LoadStart), PlaybackState::Loading);
        assert!(c.is_loading());
    }

    #[test]
    fn test_autoplay_on_metadata() {
        let c = ready(120.0, true);
        assert_eq!(c.state(), PlaybackState::Playing);
        assert!(c.element().playing);
        assert_eq!(c.duration(), 120.0);
    }

    #[test]
    fn test_no_autoplay_stays_ready() {
        let c = ready(120.0, false);
        assert_eq!(c.state(), PlaybackState::Ready);
        assert!(!c.element().playing);
    }

    #[test]
    fn test_toggle_pause_and_play() {
        let mut c = ready(120.0, true);
        assert_eq!(c.toggle().unwrap(), PlayOutcome::Paused);
        assert_eq!(c.state(), PlaybackState::Paused);
        assert_eq!(c.toggle().unwrap(), PlayOutcome::Playing);
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_blocked_play_reverts_to_paused() {
        let mut c = ready(120.0, false);
        c.element.refuse_play = true;

        let outcome = c.toggle().unwrap();
        assert!(matches!(outcome, PlayOutcome::Blocked { .. }));
        assert_eq!(c.state(), PlaybackState::Paused);
        assert!(c.blocked_reason().is_some());
    }

    #[test]
    fn test_toggle_while_loading_rejected() {
        let mut c = PlaybackController::new(Element::default(), "u", PlaybackSettings::default());
        c.handle(MediaEvent::LoadStart);
        assert!(matches!(
            c.toggle(),
            Err(PlaybackError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_seek_commits_fraction_of_duration() {
        let mut c = ready(200.0, true);
        c.begin_seek().unwrap();
        c.update_seek(0.5).unwrap();
        assert_eq!(c.position(), 100.0);

        let committed = c.end_seek().unwrap();
        assert_eq!(committed, 100.0);
        assert_eq!(c.element().time, 100.0);
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_seek_ignores_time_updates() {
        let mut c = ready(200.0, true);
        c.begin_seek().unwrap();
        c.update_seek(0.25).unwrap();

        c.element.time = 10.0;
        c.handle(MediaEvent::TimeUpdate);
        assert_eq!(c.position(), 50.0);
        assert_eq!(c.played_fraction(), 0.25);
    }

    #[test]
    fn test_seek_returns_to_paused() {
        let mut c = ready(200.0, false);
        c.toggle().unwrap();
        c.toggle().unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);

        c.begin_seek().unwrap();
        c.end_seek().unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_seek_fraction_clamped() {
        let mut c = ready(100.0, true);
        c.begin_seek().unwrap();
        c.update_seek(1.5).unwrap();
        assert_eq!(c.played_fraction(), MAX_FRACTION);
        c.update_seek(f64::NAN).unwrap();
        assert_eq!(c.played_fraction(), MAX_FRACTION);
        c.update_seek(-1.0).unwrap();
        assert_eq!(c.played_fraction(), 0.0);
    }

    #[test]
    fn test_update_seek_outside_gesture_rejected() {
        let mut c = ready(100.0, true);
        assert!(c.update_seek(0.3).is_err());
        assert!(c.end_seek().is_err());
    }

    #[test]
    fn test_buffering_never_regresses() {
        let mut c = ready(100.0, true);
        c.element.time = 40.0;
        c.handle(MediaEvent::TimeUpdate);

        assert_eq!(c.handle(MediaEvent::Waiting), PlaybackState::Buffering);
        c.element.time = 38.0;
        c.handle(MediaEvent::TimeUpdate);
        assert_eq!(c.position(), 40.0);

        assert_eq!(c.handle(MediaEvent::Playing), PlaybackState::Playing);
        c.element.time = 41.0;
        c.handle(MediaEvent::TimeUpdate);
        assert_eq!(c.position(), 41.0);
    }

    #[test]
    fn test_seek_from_buffering_resumes_playing() {
        let mut c = ready(100.0, true);
        c.handle(MediaEvent::Waiting);
        c.begin_seek().unwrap();
        c.end_seek().unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_restart_in_any_state() {
        let mut c = ready(100.0, true);
        c.element.time = 70.0;
        c.handle(MediaEvent::TimeUpdate);
        c.toggle().unwrap();

        c.restart();
        assert_eq!(c.position(), 0.0);
        assert_eq!(c.element().time, 0.0);
        assert_eq!(c.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_volume_is_independent() {
        let mut c = ready(100.0, true);
        c.set_volume(0.3);
        assert_eq!(c.element().volume, 0.3);
        assert_eq!(c.state(), PlaybackState::Playing);

        c.set_volume(4.0);
        assert_eq!(c.volume(), 1.0);
        c.set_volume(f64::NAN);
        assert_eq!(c.volume(), 1.0);
    }

    #[test]
    fn test_ended_pauses_at_end() {
        let mut c = ready(90.0, true);
        assert_eq!(c.handle(MediaEvent::Ended), PlaybackState::Paused);
        assert_eq!(c.position(), 90.0);
        assert_eq!(c.elapsed_label(), "1:30");
        assert_eq!(c.duration_label(), "1:30");
    }

    #[test]
    fn test_nan_duration_is_zero() {
        let c = ready(f64::NAN, false);
        assert_eq!(c.duration(), 0.0);
        assert_eq!(c.played_fraction(), 0.0);
        assert_eq!(c.duration_label(), "0:00");
    }
}
