use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MediaStream};

use videofield_common::{
    Effect, RecordingWidget, SessionId, UploadRequest, WidgetConfig, WidgetError, OBSERVED_ATTRIBUTES,
};

use crate::recorder::chunk::BlobChunk;
use crate::recorder::media_recorder::Recorder;
use crate::recorder::media_streams::{get_user_media, stop_stream};
use crate::recorder::playback;
use crate::recorder::ui::{Control, ViewBindings};
use crate::recorder::upload::post_recording;
use crate::recorder::utils::{document, js_error_text};

pub type Widget = RecordingWidget<BlobChunk>;
pub type WidgetEffect = Effect<BlobChunk>;

/// Browser-side state of one `<video-input>` element.
///
/// Each element owns its own capture stream, recorder and countdown
/// interval; nothing is shared between elements.
pub struct WidgetHost {
    pub widget: Widget,
    element: HtmlElement,
    bindings: Option<ViewBindings>,
    capture: Option<(SessionId, MediaStream)>,
    recorder: Option<(SessionId, Recorder)>,
    interval: Option<(SessionId, Interval)>,
    this: Weak<RefCell<WidgetHost>>,
}

impl WidgetHost {
    /// Create the host and apply the attributes already present on `element`.
    pub fn new(id: String, element: HtmlElement) -> Rc<RefCell<Self>> {
        let mut widget = Widget::new(id, WidgetConfig::default());
        for name in OBSERVED_ATTRIBUTES {
            if let Some(value) = element.get_attribute(name) {
                if let Err(e) = widget.set_attribute(name, Some(&value)) {
                    log::warn!("[{}] {}", widget.id(), e);
                }
            }
        }

        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                widget,
                element,
                bindings: None,
                capture: None,
                recorder: None,
                interval: None,
                this: this.clone(),
            })
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn click_handler(&self) -> Rc<dyn Fn(Control)> {
        let this = self.this.clone();
        Rc::new(move |control| {
            if let Some(host) = this.upgrade() {
                dispatch(&host, |widget| press(widget, control));
            }
        })
    }

    /// Carry out one effect. Returns effects the widget produced in reaction
    /// to something that failed synchronously.
    fn execute(&mut self, effect: WidgetEffect) -> Vec<WidgetEffect> {
        match effect {
            Effect::Render(html) => {
                self.render(&html);
                Vec::new()
            }
            Effect::SyncControls(view) => {
                if let Some(bindings) = &self.bindings {
                    bindings.apply(&view, &self.widget.label_markup());
                }
                Vec::new()
            }
            Effect::RequestCapture { session, constraints } => {
                let this = self.this.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = get_user_media(&constraints).await;
                    on_capture_result(this, session, result);
                });
                Vec::new()
            }
            Effect::StartRecorder { session } => self.start_recorder(session),
            Effect::StopRecorder { session } => self.stop_recorder(session),
            Effect::ReleaseCapture { session } => {
                if matches!(&self.capture, Some((s, _)) if *s == session) {
                    if let Some((_, stream)) = self.capture.take() {
                        stop_stream(&stream);
                        log::debug!("[{}] capture released", self.widget.id());
                    }
                }
                Vec::new()
            }
            Effect::StartTimer { session, interval_ms } => {
                self.cancel_interval();
                let this = self.this.clone();
                let interval = Interval::new(interval_ms, move || {
                    if let Some(host) = this.upgrade() {
                        dispatch(&host, |widget| widget.on_tick(session));
                    }
                });
                self.interval = Some((session, interval));
                Vec::new()
            }
            Effect::CancelTimer { session } => {
                if matches!(&self.interval, Some((s, _)) if *s == session) {
                    self.cancel_interval();
                }
                Vec::new()
            }
            Effect::Upload(request) => {
                let this = self.this.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = post_recording(&request).await;
                    finish_upload(this, request, result);
                });
                Vec::new()
            }
            Effect::Download { artifact, filename } => {
                if let Err(e) = playback::download(&artifact, &filename) {
                    log::error!("[{}] download failed: {}", self.widget.id(), js_error_text(&e));
                }
                Vec::new()
            }
            Effect::Play { chunks } => {
                if let Some(bindings) = &self.bindings {
                    if let Err(e) = playback::play(&bindings.preview, &chunks) {
                        log::error!("[{}] playback failed: {}", self.widget.id(), js_error_text(&e));
                    }
                }
                Vec::new()
            }
            Effect::ClearPreview => {
                if let Some(bindings) = &self.bindings {
                    playback::clear(&bindings.preview);
                }
                Vec::new()
            }
        }
    }

    fn render(&mut self, html: &str) {
        self.bindings = None;
        self.element.set_inner_html(html);

        let bindings = document().and_then(|doc| ViewBindings::bind(&doc, self.widget.id(), self.click_handler()));
        match bindings {
            Ok(bindings) => {
                if let Some((_, stream)) = &self.capture {
                    bindings.attach_stream(stream);
                }
                self.bindings = Some(bindings);
            }
            Err(e) => log::error!("[{}] binding controls failed: {}", self.widget.id(), js_error_text(&e)),
        }
    }

    fn start_recorder(&mut self, session: SessionId) -> Vec<WidgetEffect> {
        let stream = match &self.capture {
            Some((s, stream)) if *s == session => stream.clone(),
            _ => {
                let error = WidgetError::RecorderConstruction("no capture stream".into());
                return self.widget.on_recorder_failed(session, error);
            }
        };

        if let Some(bindings) = &self.bindings {
            bindings.attach_stream(&stream);
        }

        let on_chunk = {
            let this = self.this.clone();
            move |blob| {
                if let Some(host) = this.upgrade() {
                    dispatch(&host, |widget| {
                        widget.on_chunk(session, BlobChunk(blob));
                        Vec::new()
                    });
                }
            }
        };
        let on_stop = {
            let this = self.this.clone();
            move || {
                if let Some(host) = this.upgrade() {
                    dispatch(&host, |widget| widget.on_recorder_stopped(session));
                }
            }
        };

        match Recorder::start(&stream, on_chunk, on_stop) {
            Ok(recorder) => {
                log::info!(
                    "[{}] MediaRecorder started with mime type {:?}",
                    self.widget.id(),
                    recorder.mime_type()
                );
                self.recorder = Some((session, recorder));
                Vec::new()
            }
            Err(e) => self.widget.on_recorder_failed(session, e),
        }
    }

    fn stop_recorder(&mut self, session: SessionId) -> Vec<WidgetEffect> {
        let Some((s, recorder)) = &self.recorder else {
            return self.widget.on_recorder_stopped(session);
        };
        if *s != session {
            return Vec::new();
        }

        match recorder.stop() {
            Ok(()) => Vec::new(),
            Err(e) => {
                // An inactive recorder will never fire its stop event.
                log::warn!("[{}] recorder stop failed: {}", self.widget.id(), js_error_text(&e));
                self.widget.on_recorder_stopped(session)
            }
        }
    }

    fn cancel_interval(&mut self) {
        if let Some((_, interval)) = self.interval.take() {
            // The interval may be cancelled from inside its own tick, so its
            // closure is only dropped once the current callback has returned.
            let callback = interval.cancel();
            wasm_bindgen_futures::spawn_local(async move {
                drop(callback);
            });
        }
    }
}

impl Drop for WidgetHost {
    fn drop(&mut self) {
        if let Some((_, stream)) = self.capture.take() {
            stop_stream(&stream);
        }
        self.cancel_interval();
    }
}

/// Feed one event to the widget and run the effects it answers with.
pub fn dispatch<F>(host: &Rc<RefCell<WidgetHost>>, event: F)
where
    F: FnOnce(&mut Widget) -> Vec<WidgetEffect>,
{
    let effects = match host.try_borrow_mut() {
        Ok(mut guard) => event(&mut guard.widget),
        Err(_) => {
            log::warn!("[video-input] widget busy, event dropped");
            return;
        }
    };
    run_effects(host, effects);
}

fn run_effects(host: &Rc<RefCell<WidgetHost>>, effects: Vec<WidgetEffect>) {
    let mut queue = VecDeque::from(effects);
    while let Some(effect) = queue.pop_front() {
        let follow_up = match host.try_borrow_mut() {
            Ok(mut guard) => guard.execute(effect),
            Err(_) => {
                log::warn!("[video-input] widget busy, {} effects dropped", queue.len() + 1);
                return;
            }
        };
        queue.extend(follow_up);
    }
}

/// Route a control activation to the widget.
pub fn press(widget: &mut Widget, control: Control) -> Vec<WidgetEffect> {
    match control {
        Control::Record => widget.press_record(),
        Control::Play => widget.press_play(),
        Control::Download => widget.press_download(),
        Control::Submit => widget.press_submit().unwrap_or_else(|e| {
            log::error!("[{}] submit rejected: {}", widget.id(), e);
            Vec::new()
        }),
    }
}

fn on_capture_result(this: Weak<RefCell<WidgetHost>>, session: SessionId, result: Result<MediaStream, JsValue>) {
    let Some(host) = this.upgrade() else {
        if let Ok(stream) = result {
            stop_stream(&stream);
        }
        return;
    };

    match result {
        Ok(stream) => {
            log::debug!("[video-input] getUserMedia() got stream for {:?}", session);
            {
                let mut guard = host.borrow_mut();
                if guard.widget.session() != session {
                    drop(guard);
                    stop_stream(&stream);
                    return;
                }
                if let Some((_, previous)) = guard.capture.replace((session, stream)) {
                    stop_stream(&previous);
                }
            }
            dispatch(&host, |widget| widget.on_capture_granted(session));
        }
        Err(e) => {
            let error = WidgetError::PermissionDenied(js_error_text(&e));
            dispatch(&host, |widget| widget.on_capture_failed(session, error));
        }
    }
}

fn finish_upload(this: Weak<RefCell<WidgetHost>>, request: UploadRequest<BlobChunk>, result: Result<u16, WidgetError>) {
    match this.upgrade() {
        Some(host) => dispatch(&host, |widget| widget.on_upload_finished(result)),
        None => log::info!("[video-input] upload of {} finished after removal: {:?}", request.filename, result),
    }
}
