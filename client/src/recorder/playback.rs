use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlAnchorElement, HtmlVideoElement, Url};

use videofield_common::{MediaChunk, ARTIFACT_MIME_TYPE};

use crate::recorder::chunk::BlobChunk;
use crate::recorder::utils::{document, to_js_error};

const REVOKE_DELAY_MS: u32 = 100;

/// Play the recorded chunks back in the preview element.
pub fn play(preview: &HtmlVideoElement, chunks: &[BlobChunk]) -> Result<(), JsValue> {
    let recording = BlobChunk::concat(chunks, ARTIFACT_MIME_TYPE).map_err(to_js_error)?;

    clear(preview);
    let url = Url::create_object_url_with_blob(&recording.0)?;
    preview.set_src(&url);
    preview.set_controls(true);
    preview.set_muted(false);
    let _ = preview.play()?;
    Ok(())
}

/// Detach the live stream or previous playback from the preview.
pub fn clear(preview: &HtmlVideoElement) {
    preview.set_src_object(None);
    let old_src = preview.src();
    if old_src.starts_with("blob:") {
        let _ = Url::revoke_object_url(&old_src);
    }
    preview.set_src("");
    preview.set_controls(false);
}

/// Save `recording` on the user's machine under `filename`.
pub fn download(recording: &BlobChunk, filename: &str) -> Result<(), JsValue> {
    let document = document()?;
    let body = document.body().ok_or("No body")?;

    let url = Url::create_object_url_with_blob(&recording.0)?;
    let a: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    a.style().set_property("display", "none")?;
    a.set_href(&url);
    a.set_download(filename);
    body.append_child(&a)?;
    a.click();

    Timeout::new(REVOKE_DELAY_MS, move || {
        let _ = body.remove_child(&a);
        let _ = Url::revoke_object_url(&url);
    })
    .forget();

    Ok(())
}
