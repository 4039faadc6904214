use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamConstraints, MediaStreamTrack};

use videofield_common::CaptureConstraints;

/// Ask for camera and microphone access under `constraints`.
pub async fn get_user_media(constraints: &CaptureConstraints) -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let media_devices = window.navigator().media_devices()?;

    let constraints_js = serde_wasm_bindgen::to_value(constraints)?;
    let constraints_js: MediaStreamConstraints = constraints_js.unchecked_into();

    let promise = media_devices.get_user_media_with_constraints(&constraints_js)?;
    let stream_js = JsFuture::from(promise).await?;
    Ok(MediaStream::from(stream_js))
}

pub fn stop_stream(stream: &MediaStream) {
    let tracks = stream.get_tracks();
    for i in 0..tracks.length() {
        let track = MediaStreamTrack::from(tracks.get(i));
        track.stop();
    }
}
