//! Markup and control state for a widget.
//!
//! `render` produces the full inner markup. `ControlsView` is the part that
//! changes between renders (button states and label texts) and is pushed to
//! the live controls without replacing them.

use crate::config::{LabelLocation, WidgetConfig};
use crate::timer::TimerLabel;

/// Element ids derived from the widget's own id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub preview: String,
    pub record_button: String,
    pub play: String,
    pub download: String,
    pub submit: String,
    pub label: String,
    pub timer_label: String,
}

impl ElementIds {
    pub fn new(widget_id: &str) -> Self {
        Self {
            preview: format!("gum{}", widget_id),
            record_button: format!("{}recordbutton", widget_id),
            play: format!("{}play", widget_id),
            download: format!("{}download", widget_id),
            submit: format!("{}submit", widget_id),
            label: format!("{}label", widget_id),
            timer_label: format!("{}timerlabel", widget_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordButton {
    Record,
    Stop,
}

impl RecordButton {
    pub fn text(&self) -> &'static str {
        match self {
            RecordButton::Record => "Record",
            RecordButton::Stop => "Stop",
        }
    }
}

/// Content of the main label span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelText {
    /// The `label` attribute
    Configured,
    Uploading,
    UploadComplete,
    UploadFailed(String),
}

impl LabelText {
    pub fn markup(&self, configured: &str) -> String {
        match self {
            LabelText::Configured => escape_html(configured),
            LabelText::Uploading => notice("Uploading response... This can take a few minutes."),
            LabelText::UploadComplete => notice("Upload complete! Thank you."),
            LabelText::UploadFailed(msg) => notice(msg),
        }
    }
}

fn notice(text: &str) -> String {
    format!("<span style='color:red;'>{}</span>", escape_html(text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub record_button: RecordButton,
    pub record_enabled: bool,
    pub play_enabled: bool,
    pub download_enabled: bool,
    pub submit_enabled: bool,
    pub label: LabelText,
    /// `None` when the widget has no time limit
    pub timer_label: Option<TimerLabel>,
}

pub fn render(widget_id: &str, config: &WidgetConfig, view: &ControlsView) -> String {
    let ids = ElementIds::new(&escape_html(widget_id));

    let preview = format!(
        "<video style='width:{}px;height:{}px;' id='{}' playsinline autoplay></video><br/>",
        config.width, config.height, ids.preview
    );

    if config.label_location == LabelLocation::Hidden {
        return preview;
    }

    let mut label = format!("<span id='{}'>{}</span>", ids.label, view.label.markup(&config.label));
    if let Some(timer) = &view.timer_label {
        label.push_str(&format!("<br/><span id='{}'>{}</span>", ids.timer_label, timer.text()));
    }

    let buttons = [
        button(&ids.record_button, view.record_button.text(), view.record_enabled),
        button(&ids.play, "Play", view.play_enabled),
        button(&ids.download, "Download", view.download_enabled),
        button(&ids.submit, "Submit", view.submit_enabled),
    ]
    .concat();

    let panel = format!(
        "<div class='videofieldlabel' style='width:{}px;'>{}<br/>{}</div>",
        config.width, label, buttons
    );

    match config.label_location {
        LabelLocation::Top => panel + &preview,
        _ => preview + &panel,
    }
}

fn button(id: &str, text: &str, enabled: bool) -> String {
    let disabled = if enabled { "" } else { " disabled" };
    format!("<button id='{}'{}>{}</button>", id, disabled, text)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial_view(config: &WidgetConfig) -> ControlsView {
        ControlsView {
            record_button: RecordButton::Record,
            record_enabled: true,
            play_enabled: false,
            download_enabled: false,
            submit_enabled: false,
            label: LabelText::Configured,
            timer_label: config
                .has_time_limit()
                .then_some(TimerLabel::MaxTime(config.max_time)),
        }
    }

    fn config_with(loc: LabelLocation, max_time: u32) -> WidgetConfig {
        WidgetConfig {
            label_location: loc,
            label: "Your answer".to_string(),
            max_time,
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_element_ids() {
        let ids = ElementIds::new("q1");
        assert_eq!(ids.preview, "gumq1");
        assert_eq!(ids.record_button, "q1recordbutton");
        assert_eq!(ids.play, "q1play");
        assert_eq!(ids.download, "q1download");
        assert_eq!(ids.submit, "q1submit");
        assert_eq!(ids.label, "q1label");
        assert_eq!(ids.timer_label, "q1timerlabel");
    }

    #[test]
    fn test_hidden_renders_only_preview() {
        let config = config_with(LabelLocation::Hidden, 10);
        let html = render("q1", &config, &initial_view(&config));
        assert_eq!(
            html,
            "<video style='width:640px;height:480px;' id='gumq1' playsinline autoplay></video><br/>"
        );
        assert!(!html.contains("videofieldlabel"));
        assert!(!html.contains("<button"));
    }

    #[test]
    fn test_bottom_places_panel_after_preview() {
        let config = config_with(LabelLocation::Bottom, 0);
        let html = render("q1", &config, &initial_view(&config));
        let video_at = html.find("<video").unwrap();
        let panel_at = html.find("videofieldlabel").unwrap();
        assert!(video_at < panel_at);
        assert!(!html.contains("q1timerlabel"));
    }

    #[test]
    fn test_top_places_panel_before_preview() {
        let config = config_with(LabelLocation::Top, 0);
        let html = render("q1", &config, &initial_view(&config));
        assert!(html.starts_with("<div class='videofieldlabel' style='width:640px;'>"));
        assert!(html.ends_with("</video><br/>"));
    }

    #[test]
    fn test_initial_buttons() {
        let config = config_with(LabelLocation::Bottom, 0);
        let html = render("q1", &config, &initial_view(&config));
        assert!(html.contains("<button id='q1recordbutton'>Record</button>"));
        assert!(html.contains("<button id='q1play' disabled>Play</button>"));
        assert!(html.contains("<button id='q1download' disabled>Download</button>"));
        assert!(html.contains("<button id='q1submit' disabled>Submit</button>"));
    }

    #[test]
    fn test_timer_label_present_with_limit() {
        let config = config_with(LabelLocation::Bottom, 45);
        let html = render("q1", &config, &initial_view(&config));
        assert!(html.contains("<span id='q1label'>Your answer</span><br/><span id='q1timerlabel'>Max Time: 45 seconds</span>"));
    }

    #[test]
    fn test_label_is_escaped() {
        let mut config = config_with(LabelLocation::Bottom, 0);
        config.label = "<b>Tom & Jerry</b>".to_string();
        let html = render("q1", &config, &initial_view(&config));
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
    }

    #[test]
    fn test_upload_notices() {
        assert_eq!(
            LabelText::UploadComplete.markup("ignored"),
            "<span style='color:red;'>Upload complete! Thank you.</span>"
        );
        assert_eq!(LabelText::Configured.markup("plain"), "plain");
    }
}
