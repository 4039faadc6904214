//! Browser side of the `<video-input>` widget: capture, recording, playback
//! and upload driven by the core state machine

pub mod chunk;
pub mod element;
pub mod media_recorder;
pub mod media_streams;
pub mod playback;
pub mod state;
pub mod ui;
pub mod upload;
pub mod utils;

// Re-export main entry points
pub use element::{define_element, TAG_NAME};
pub use state::WidgetHost;
