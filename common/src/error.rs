use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    #[error("Capture permission denied: {0}")]
    PermissionDenied(String),

    #[error("Encoding not supported: {0}")]
    UnsupportedEncoding(String),

    #[error("Failed to create recorder: {0}")]
    RecorderConstruction(String),

    #[error("Upload rejected with HTTP {status}")]
    Upload { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid value {value:?} for attribute {name}: {reason}")]
    InvalidAttribute {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("No recording to submit")]
    NothingToSubmit,

    #[error("No submission URL configured")]
    MissingAction,

    #[error("Blob assembly failed: {0}")]
    Blob(String),
}

impl WidgetError {
    pub fn invalid_attribute(name: &str, value: &str, reason: &'static str) -> Self {
        WidgetError::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// Short text shown to the user in the widget label, if the error is
    /// user-visible at all.
    pub fn label_text(&self) -> Option<String> {
        match self {
            WidgetError::Upload { status } => Some(format!("Upload failed (HTTP {}).", status)),
            WidgetError::Network(reason) => Some(format!("Upload failed: {}", reason)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_errors_have_label_text() {
        assert_eq!(
            WidgetError::Upload { status: 503 }.label_text().as_deref(),
            Some("Upload failed (HTTP 503).")
        );
        assert_eq!(
            WidgetError::Network("connection reset".into()).label_text().as_deref(),
            Some("Upload failed: connection reset")
        );
    }

    #[test]
    fn test_capture_errors_are_not_user_visible() {
        assert!(WidgetError::PermissionDenied("NotAllowedError".into()).label_text().is_none());
        assert!(WidgetError::RecorderConstruction("boom".into()).label_text().is_none());
    }

    #[test]
    fn test_invalid_attribute_display() {
        let err = WidgetError::invalid_attribute("maxtime", "-5", "must be a non-negative integer");
        assert_eq!(
            err.to_string(),
            "Invalid value \"-5\" for attribute maxtime: must be a non-negative integer"
        );
    }
}
