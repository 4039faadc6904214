use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

use videofield_common::WidgetError;

/// Best readable description of a thrown JS value
pub fn js_error_text(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        let name = String::from(error.name());
        let message = String::from(error.message());
        return if message.is_empty() { name } else { format!("{}: {}", name, message) };
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub fn to_js_error(error: WidgetError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or_else(|| "No document".into())
}

pub fn get_element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element {} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Element {} has unexpected type", id)))
}

pub fn find_element_by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}
