use web_sys::{Blob, BlobPropertyBag};

use videofield_common::{MediaChunk, WidgetError};

use crate::recorder::utils::js_error_text;

/// A recorded piece of media as handed out by the browser's MediaRecorder.
#[derive(Debug, Clone)]
pub struct BlobChunk(pub Blob);

impl MediaChunk for BlobChunk {
    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    fn concat(parts: &[Self], mime_type: &str) -> Result<Self, WidgetError> {
        let sequence: js_sys::Array = parts.iter().map(|part| &part.0).collect();
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);

        Blob::new_with_blob_sequence_and_options(&sequence, &options)
            .map(BlobChunk)
            .map_err(|e| WidgetError::Blob(js_error_text(&e)))
    }
}
