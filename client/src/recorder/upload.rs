use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, RequestInit, Response};

use videofield_common::{UploadRequest, WidgetError, DATA_FIELD, FILENAME_FIELD};

use crate::recorder::chunk::BlobChunk;
use crate::recorder::utils::js_error_text;

/// POST the recording as multipart form data. Resolves to the HTTP status,
/// whatever it is; only a failed exchange is an error.
pub async fn post_recording(request: &UploadRequest<BlobChunk>) -> Result<u16, WidgetError> {
    let network = |e: JsValue| WidgetError::Network(js_error_text(&e));

    let form = FormData::new().map_err(network)?;
    form.append_with_str(FILENAME_FIELD, &request.filename).map_err(network)?;
    form.append_with_blob(DATA_FIELD, &request.payload.0).map_err(network)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(&form);

    let window = web_sys::window().ok_or_else(|| WidgetError::Network("No window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_str_and_init(&request.url, &opts))
        .await
        .map_err(network)?;
    let resp: Response = resp_value.dyn_into().map_err(network)?;

    if let Ok(text) = resp.text() {
        if let Ok(body) = JsFuture::from(text).await {
            log::debug!("[video-input] upload response: {}", body.as_string().unwrap_or_default());
        }
    }

    Ok(resp.status())
}
