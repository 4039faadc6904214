//! The `<video-input>` custom element and the functions exported to pages.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, HtmlElement};

use videofield_common::OBSERVED_ATTRIBUTES;

use crate::recorder::state::{dispatch, press, Widget, WidgetEffect, WidgetHost};
use crate::recorder::ui::Control;
use crate::recorder::utils::to_js_error;

pub const TAG_NAME: &str = "video-input";

thread_local! {
    static WIDGETS: RefCell<HashMap<String, Rc<RefCell<WidgetHost>>>> = RefCell::new(HashMap::new());
    static NEXT_ID: Cell<u32> = const { Cell::new(1) };
}

#[wasm_bindgen(module = "/js/video_input.js")]
extern "C" {
    #[wasm_bindgen(catch, js_name = defineVideoInput)]
    fn define_video_input(
        tag_name: &str,
        observed: &Array,
        connected: &Closure<dyn FnMut(HtmlElement)>,
        disconnected: &Closure<dyn FnMut(HtmlElement)>,
        attribute_changed: &Closure<dyn FnMut(HtmlElement, JsValue, JsValue)>,
    ) -> Result<(), JsValue>;
}

/// Register the custom element with the browser.
pub fn define_element() -> Result<(), JsValue> {
    let observed: Array = OBSERVED_ATTRIBUTES.iter().map(|name| JsValue::from_str(name)).collect();

    let connected = Closure::wrap(Box::new(|element: HtmlElement| {
        let host = host_for(&element);
        dispatch(&host, |widget| widget.mount());
    }) as Box<dyn FnMut(_)>);

    let disconnected = Closure::wrap(Box::new(|element: HtmlElement| {
        let Some((id, host)) = registered(&element) else {
            return;
        };
        dispatch(&host, |widget| widget.unmount());
        WIDGETS.with(|widgets| widgets.borrow_mut().remove(&id));
    }) as Box<dyn FnMut(_)>);

    let attribute_changed = Closure::wrap(Box::new(|element: HtmlElement, name: JsValue, value: JsValue| {
        let Some(name) = name.as_string() else {
            return;
        };
        let value = value.as_string();
        let host = host_for(&element);
        dispatch(&host, |widget| {
            widget.set_attribute(&name, value.as_deref()).unwrap_or_else(|e| {
                log::warn!("[{}] {}", widget.id(), e);
                Vec::new()
            })
        });
    }) as Box<dyn FnMut(_, _, _)>);

    define_video_input(TAG_NAME, &observed, &connected, &disconnected, &attribute_changed)?;

    // The element class holds on to these for the lifetime of the page.
    connected.forget();
    disconnected.forget();
    attribute_changed.forget();

    log::info!("<{}> defined", TAG_NAME);
    Ok(())
}

fn generated_id(n: u32) -> String {
    format!("{}-{}", TAG_NAME, n)
}

fn ensure_id(element: &HtmlElement) -> String {
    let id = element.id();
    if !id.is_empty() {
        return id;
    }
    let id = NEXT_ID.with(|next| {
        let n = next.get();
        next.set(n + 1);
        generated_id(n)
    });
    element.set_id(&id);
    id
}

/// Key of the first entry whose value satisfies `is_match`.
fn find_key<'a, K, V>(entries: &'a HashMap<K, V>, is_match: impl Fn(&V) -> bool) -> Option<&'a K> {
    entries.iter().find(|(_, value)| is_match(value)).map(|(key, _)| key)
}

/// The registered host of `element` and the id it was created under. The
/// element's current `id` may have changed since.
fn registered(element: &HtmlElement) -> Option<(String, Rc<RefCell<WidgetHost>>)> {
    WIDGETS.with(|widgets| {
        let widgets = widgets.borrow();
        let id = find_key(&widgets, |host| {
            host.try_borrow().map_or(false, |host| host.element() == element)
        })?;
        Some((id.clone(), widgets.get(id)?.clone()))
    })
}

/// The host of `element`, created on first use.
fn host_for(element: &HtmlElement) -> Rc<RefCell<WidgetHost>> {
    if let Some((_, host)) = registered(element) {
        return host;
    }

    let id = ensure_id(element);
    let host = WidgetHost::new(id.clone(), element.clone());
    let replaced = WIDGETS.with(|widgets| widgets.borrow_mut().insert(id.clone(), host.clone()));
    if let Some(previous) = replaced {
        log::warn!("[{}] id reused by another element, replacing its widget", id);
        dispatch(&previous, |widget| widget.unmount());
    }
    host
}

fn lookup(id: &str) -> Result<Rc<RefCell<WidgetHost>>, JsValue> {
    WIDGETS
        .with(|widgets| widgets.borrow().get(id).cloned())
        .ok_or_else(|| JsValue::from_str(&format!("No {} with id {}", TAG_NAME, id)))
}

fn send(id: &str, event: impl FnOnce(&mut Widget) -> Vec<WidgetEffect>) -> Result<(), JsValue> {
    let host = lookup(id)?;
    dispatch(&host, event);
    Ok(())
}

/// Start or stop recording, like pressing the record button.
#[wasm_bindgen]
pub fn video_input_record(id: &str) -> Result<(), JsValue> {
    send(id, |widget| press(widget, Control::Record))
}

#[wasm_bindgen]
pub fn video_input_play(id: &str) -> Result<(), JsValue> {
    send(id, |widget| widget.press_play())
}

#[wasm_bindgen]
pub fn video_input_download(id: &str) -> Result<(), JsValue> {
    send(id, |widget| widget.press_download())
}

/// Upload the recording to the widget's `action` URL.
///
/// Fails when there is nothing recorded or no `action` is configured.
#[wasm_bindgen]
pub fn video_input_submit(id: &str) -> Result<(), JsValue> {
    let host = lookup(id)?;
    let mut rejected = None;
    dispatch(&host, |widget| {
        widget.press_submit().unwrap_or_else(|e| {
            rejected = Some(e);
            Vec::new()
        })
    });
    match rejected {
        Some(e) => Err(to_js_error(e)),
        None => Ok(()),
    }
}

#[wasm_bindgen]
pub fn video_input_delete_recording(id: &str) -> Result<(), JsValue> {
    send(id, |widget| widget.delete_recording())
}

/// The finished recording as a single `video/webm` blob.
#[wasm_bindgen]
pub fn video_input_get_blob(id: &str) -> Result<Option<Blob>, JsValue> {
    let host = lookup(id)?;
    let host = host.borrow();
    Ok(host.widget.store().artifact().map(|chunk| chunk.0.clone()))
}

/// The recorded chunks, in order.
#[wasm_bindgen]
pub fn video_input_get_all_blobs(id: &str) -> Result<Array, JsValue> {
    let host = lookup(id)?;
    let host = host.borrow();
    let chunks = host.widget.store().chunks().unwrap_or_default();
    Ok(chunks.iter().map(|chunk| JsValue::from(chunk.0.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id() {
        assert_eq!(generated_id(1), "video-input-1");
        assert_eq!(generated_id(12), "video-input-12");
    }

    #[test]
    fn test_find_key_matches_value_not_key() {
        let mut entries = HashMap::new();
        entries.insert("video-input-1".to_string(), "first");
        entries.insert("renamed".to_string(), "second");

        assert_eq!(find_key(&entries, |v| *v == "second").map(String::as_str), Some("renamed"));
        assert_eq!(find_key(&entries, |v| *v == "third"), None);
    }

    #[test]
    fn test_tag_name_is_valid_custom_element_name() {
        assert!(TAG_NAME.contains('-'));
        assert_eq!(TAG_NAME, TAG_NAME.to_lowercase());
    }
}
