//! Upload request description and response classification.

use crate::error::WidgetError;

/// Multipart field carrying the file name
pub const FILENAME_FIELD: &str = "fname";
/// Multipart field carrying the recording
pub const DATA_FIELD: &str = "data";

/// File name used for both downloads and uploads of a widget's recording
pub fn artifact_filename(widget_id: &str) -> String {
    format!("{}.webm", widget_id)
}

/// A single best-effort POST of one recording
#[derive(Debug, Clone)]
pub struct UploadRequest<C> {
    pub url: String,
    pub filename: String,
    pub payload: C,
}

/// Map a finished HTTP exchange to an outcome. Only 2xx counts as success.
pub fn check_status(status: u16) -> Result<u16, WidgetError> {
    if (200..300).contains(&status) {
        Ok(status)
    } else {
        Err(WidgetError::Upload { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_filename() {
        assert_eq!(artifact_filename("interview"), "interview.webm");
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status(200), Ok(200));
        assert_eq!(check_status(204), Ok(204));
        assert_eq!(check_status(302), Err(WidgetError::Upload { status: 302 }));
        assert_eq!(check_status(500), Err(WidgetError::Upload { status: 500 }));
    }
}
