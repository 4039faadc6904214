use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobEvent, Event, MediaRecorder, MediaRecorderOptions, MediaStream};

use videofield_common::{negotiate_mime_type, WidgetError};

use crate::recorder::utils::js_error_text;

/// How often the recorder hands out a chunk, in milliseconds
pub const CHUNK_TIMESLICE_MS: i32 = 1000;

/// A started MediaRecorder together with the handlers it reports through.
///
/// Dropping the recorder detaches the handlers, so events still queued for
/// it are never delivered.
pub struct Recorder {
    inner: MediaRecorder,
    mime_type: &'static str,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
    _on_stop: Closure<dyn FnMut(Event)>,
}

impl Recorder {
    pub fn start<D, S>(stream: &MediaStream, mut on_chunk: D, mut on_stop: S) -> Result<Self, WidgetError>
    where
        D: FnMut(Blob) + 'static,
        S: FnMut() + 'static,
    {
        let mime_type = negotiate_mime_type(MediaRecorder::is_type_supported);

        let options = MediaRecorderOptions::new();
        options.set_mime_type(mime_type);
        let inner = MediaRecorder::new_with_media_stream_and_media_recorder_options(stream, &options)
            .map_err(|e| WidgetError::RecorderConstruction(js_error_text(&e)))?;

        let on_data = Closure::wrap(Box::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                on_chunk(blob);
            }
        }) as Box<dyn FnMut(BlobEvent)>);
        inner.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

        let on_stopped = Closure::wrap(Box::new(move |_event: Event| on_stop()) as Box<dyn FnMut(Event)>);
        inner.set_onstop(Some(on_stopped.as_ref().unchecked_ref()));

        let recorder = Self {
            inner,
            mime_type,
            _on_data: on_data,
            _on_stop: on_stopped,
        };
        recorder
            .inner
            .start_with_time_slice(CHUNK_TIMESLICE_MS)
            .map_err(|e| WidgetError::RecorderConstruction(js_error_text(&e)))?;

        Ok(recorder)
    }

    pub fn stop(&self) -> Result<(), JsValue> {
        self.inner.stop()
    }

    /// Negotiated mime type; empty when the browser picked its default
    pub fn mime_type(&self) -> &str {
        self.mime_type
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.inner.set_ondataavailable(None);
        self.inner.set_onstop(None);
    }
}
