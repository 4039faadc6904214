//! Capture constraints and recorder encoding negotiation.

use serde::Serialize;

use crate::config::WidgetConfig;
use crate::error::WidgetError;

/// Recorder mime types, best first.
pub const PREFERRED_MIME_TYPES: [&str; 3] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
];

/// Pick the first entry of [`PREFERRED_MIME_TYPES`] the platform supports.
///
/// Falls back to the empty string, which lets the recorder choose its own
/// default. Running out of preferences is not an error.
pub fn negotiate_mime_type<F>(is_supported: F) -> &'static str
where
    F: Fn(&str) -> bool,
{
    for mime in PREFERRED_MIME_TYPES {
        if is_supported(mime) {
            return mime;
        }
        log::warn!("{}", WidgetError::UnsupportedEncoding(mime.to_string()));
    }
    ""
}

/// `getUserMedia` constraints, serialized in the shape the browser expects:
/// `{ audio: { echoCancellation: { exact: false } }, video: { width, height } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureConstraints {
    pub audio: AudioConstraints,
    pub video: VideoConstraints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: ExactBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExactBool {
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
}

impl CaptureConstraints {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            audio: AudioConstraints {
                echo_cancellation: ExactBool { exact: false },
            },
            video: VideoConstraints { width, height },
        }
    }
}

impl From<&WidgetConfig> for CaptureConstraints {
    fn from(config: &WidgetConfig) -> Self {
        Self::new(config.width, config.height)
    }
}
