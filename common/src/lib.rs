//! Host-independent core of the `<video-input>` recording widget.

pub mod blob_store;
pub mod capture;
pub mod config;
pub mod error;
pub mod render;
pub mod timer;
pub mod upload;
pub mod widget;

pub use blob_store::{BlobStore, MediaChunk, Recording, ARTIFACT_MIME_TYPE};
pub use capture::{negotiate_mime_type, CaptureConstraints, PREFERRED_MIME_TYPES};
pub use config::{LabelLocation, WidgetConfig, OBSERVED_ATTRIBUTES};
pub use error::WidgetError;
pub use render::{render, ControlsView, ElementIds, LabelText, RecordButton};
pub use timer::{Countdown, Tick, TimerLabel, TICK_INTERVAL_MS};
pub use upload::{artifact_filename, UploadRequest, DATA_FIELD, FILENAME_FIELD};
pub use widget::{Effect, Phase, RecordingWidget, SessionId, StopReason};
