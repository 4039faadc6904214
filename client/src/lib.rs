use wasm_bindgen::prelude::*;

pub mod recorder;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    match recorder::define_element() {
        Ok(()) => log::info!("WASM client initialized"),
        Err(e) => log::error!("Failed to define <{}>: {}", recorder::TAG_NAME, recorder::utils::js_error_text(&e)),
    }
}
