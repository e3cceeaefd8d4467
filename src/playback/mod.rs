//! Playback timing and scrubbing.
//!
//! - `controller`: state machine over one media element
//! - `session`: the single live binding for the open lesson
//! - `time`: `M:SS` / `H:MM:SS` labels

pub mod controller;
pub mod session;
pub mod time;

pub use controller::{
    MediaElement, MediaEvent, PlayOutcome, PlaybackController, PlaybackError, PlaybackSettings,
    PlaybackState, Resume, DEFAULT_VOLUME, MAX_FRACTION,
};
pub use session::{BindingId, LessonSession};
pub use time::format_time;
