use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Attributes the `<video-input>` element observes.
pub const OBSERVED_ATTRIBUTES: [&str; 6] = ["width", "height", "labelloc", "label", "action", "maxtime"];

/// Where the label and button row are placed relative to the preview
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocation {
    Top,
    #[default]
    Bottom,
    /// No label, no buttons: only the bare preview element is rendered
    Hidden,
}

impl LabelLocation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(LabelLocation::Top),
            "bottom" => Some(LabelLocation::Bottom),
            "hidden" => Some(LabelLocation::Hidden),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelLocation::Top => "top",
            LabelLocation::Bottom => "bottom",
            LabelLocation::Hidden => "hidden",
        }
    }
}

/// Validated widget configuration, built from the element's attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Preview and capture width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Preview and capture height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub label_location: LabelLocation,

    /// Free text shown in the label span
    #[serde(default)]
    pub label: String,

    /// Submission URL; empty means submit is not possible
    #[serde(default)]
    pub action: String,

    /// Maximum recording length in seconds, 0 = unlimited
    #[serde(default)]
    pub max_time: u32,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            label_location: LabelLocation::default(),
            label: String::new(),
            action: String::new(),
            max_time: 0,
        }
    }
}

impl WidgetConfig {
    /// Apply a single attribute change. `None` means the attribute was
    /// removed and restores the default. Returns whether the config changed.
    ///
    /// On error the previous value is kept.
    pub fn apply_attribute(&mut self, name: &str, value: Option<&str>) -> Result<bool, WidgetError> {
        let defaults = Self::default();
        let before = self.clone();

        match (name, value) {
            ("width", None) => self.width = defaults.width,
            ("width", Some(v)) => self.width = parse_dimension(name, v)?,
            ("height", None) => self.height = defaults.height,
            ("height", Some(v)) => self.height = parse_dimension(name, v)?,
            ("labelloc", None) => self.label_location = defaults.label_location,
            ("labelloc", Some(v)) => {
                self.label_location = LabelLocation::parse(v.trim()).ok_or_else(|| {
                    WidgetError::invalid_attribute(name, v, "expected top, bottom or hidden")
                })?;
            }
            ("label", v) => self.label = v.unwrap_or_default().to_string(),
            ("action", v) => self.action = v.unwrap_or_default().trim().to_string(),
            ("maxtime", None) => self.max_time = defaults.max_time,
            ("maxtime", Some(v)) => {
                let v_trim = v.trim();
                self.max_time = if v_trim.is_empty() {
                    0
                } else {
                    v_trim.parse::<u32>().map_err(|_| {
                        WidgetError::invalid_attribute(name, v, "must be a non-negative integer")
                    })?
                };
            }
            _ => return Ok(false),
        }

        Ok(*self != before)
    }

    pub fn has_time_limit(&self) -> bool {
        self.max_time > 0
    }
}

fn parse_dimension(name: &str, value: &str) -> Result<u32, WidgetError> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    match trimmed.parse::<u32>() {
        Ok(px) if px > 0 => Ok(px),
        _ => Err(WidgetError::invalid_attribute(name, value, "must be a positive integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.label_location, LabelLocation::Bottom);
        assert_eq!(config.max_time, 0);
        assert!(!config.has_time_limit());
    }

    #[test]
    fn test_apply_all_attributes() {
        let mut config = WidgetConfig::default();
        for (name, value) in [
            ("width", "320"),
            ("height", "240px"),
            ("labelloc", "top"),
            ("label", "Say hello"),
            ("action", " /upload "),
            ("maxtime", "30"),
        ] {
            assert!(config.apply_attribute(name, Some(value)).unwrap());
        }

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.label_location, LabelLocation::Top);
        assert_eq!(config.label, "Say hello");
        assert_eq!(config.action, "/upload");
        assert_eq!(config.max_time, 30);
    }

    #[test]
    fn test_negative_maxtime_rejected_and_previous_kept() {
        let mut config = WidgetConfig::default();
        config.apply_attribute("maxtime", Some("10")).unwrap();

        let err = config.apply_attribute("maxtime", Some("-3")).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidAttribute { .. }));
        assert_eq!(config.max_time, 10);
    }

    #[test]
    fn test_zero_and_non_positive_dimensions_rejected() {
        let mut config = WidgetConfig::default();
        assert!(config.apply_attribute("width", Some("0")).is_err());
        assert!(config.apply_attribute("height", Some("abc")).is_err());
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
    }

    #[test]
    fn test_unknown_labelloc_rejected() {
        let mut config = WidgetConfig::default();
        assert!(config.apply_attribute("labelloc", Some("left")).is_err());
        assert_eq!(config.label_location, LabelLocation::Bottom);
    }

    #[test]
    fn test_removed_attribute_restores_default() {
        let mut config = WidgetConfig::default();
        config.apply_attribute("width", Some("100")).unwrap();
        assert!(config.apply_attribute("width", None).unwrap());
        assert_eq!(config.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_change_detection() {
        let mut config = WidgetConfig::default();
        assert!(!config.apply_attribute("width", Some("640")).unwrap());
        assert!(config.apply_attribute("label", Some("Hi")).unwrap());
        assert!(!config.apply_attribute("unrelated", Some("x")).unwrap());
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: WidgetConfig = serde_json::from_str(r#"{"label_location":"hidden"}"#).unwrap();
        assert_eq!(config.label_location, LabelLocation::Hidden);
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
    }
}
