//! Typed handles to the controls of one rendered widget.
//!
//! Every render replaces the element's markup, so bindings are rebuilt after
//! each render and the old ones (with their click listeners) are dropped.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlVideoElement, MediaStream};

use videofield_common::{ControlsView, ElementIds};

use crate::recorder::utils::{find_element_by_id, get_element_by_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Record,
    Play,
    Download,
    Submit,
}

pub struct ViewBindings {
    pub preview: HtmlVideoElement,
    /// `None` when the label row is hidden
    pub controls: Option<ControlBindings>,
}

pub struct ControlBindings {
    pub record: HtmlButtonElement,
    pub play: HtmlButtonElement,
    pub download: HtmlButtonElement,
    pub submit: HtmlButtonElement,
    pub label: HtmlElement,
    pub timer_label: Option<HtmlElement>,
    _listeners: Vec<Closure<dyn FnMut(web_sys::Event)>>,
}

impl ViewBindings {
    pub fn bind(document: &Document, widget_id: &str, on_click: Rc<dyn Fn(Control)>) -> Result<Self, JsValue> {
        let ids = ElementIds::new(widget_id);
        let preview = get_element_by_id(document, &ids.preview)?;

        let controls = match find_element_by_id::<HtmlButtonElement>(document, &ids.record_button) {
            Some(record) => Some(ControlBindings::bind(document, &ids, record, on_click)?),
            None => None,
        };

        Ok(Self { preview, controls })
    }

    pub fn apply(&self, view: &ControlsView, label_html: &str) {
        if let Some(controls) = &self.controls {
            controls.apply(view, label_html);
        }
    }

    /// Show the live capture in the preview. Muted, the microphone would
    /// otherwise echo through the speakers.
    pub fn attach_stream(&self, stream: &MediaStream) {
        self.preview.set_src_object(Some(stream));
        self.preview.set_muted(true);
        self.preview.set_controls(false);
        if let Err(e) = self.preview.play() {
            log::debug!("[video-input] preview play failed: {:?}", e);
        }
    }
}

impl ControlBindings {
    fn bind(
        document: &Document,
        ids: &ElementIds,
        record: HtmlButtonElement,
        on_click: Rc<dyn Fn(Control)>,
    ) -> Result<Self, JsValue> {
        let mut bindings = Self {
            record,
            play: get_element_by_id(document, &ids.play)?,
            download: get_element_by_id(document, &ids.download)?,
            submit: get_element_by_id(document, &ids.submit)?,
            label: get_element_by_id(document, &ids.label)?,
            timer_label: find_element_by_id(document, &ids.timer_label),
            _listeners: Vec::new(),
        };

        let buttons = [
            (bindings.record.clone(), Control::Record),
            (bindings.play.clone(), Control::Play),
            (bindings.download.clone(), Control::Download),
            (bindings.submit.clone(), Control::Submit),
        ];
        for (button, control) in buttons {
            let on_click = on_click.clone();
            let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                on_click(control);
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            bindings._listeners.push(closure);
        }

        Ok(bindings)
    }

    fn apply(&self, view: &ControlsView, label_html: &str) {
        self.record.set_text_content(Some(view.record_button.text()));
        self.record.set_disabled(!view.record_enabled);
        self.play.set_disabled(!view.play_enabled);
        self.download.set_disabled(!view.download_enabled);
        self.submit.set_disabled(!view.submit_enabled);
        self.label.set_inner_html(label_html);

        if let (Some(element), Some(timer)) = (&self.timer_label, &view.timer_label) {
            element.set_text_content(Some(&timer.text()));
        }
    }
}
