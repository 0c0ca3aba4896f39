//! Ruler construction options and config-file loading

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_RULER_ID, DEFAULT_WIDTH};
use crate::error::{Result, RulerError};
use crate::geometry::{Axis, ModePreference, Size};
use crate::host::{MountTarget, ScrollTargetId, ScrollTargetRef};
use crate::style::StylePatch;

/// How the ruler markup is laid out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulerType {
    /// Both rulers plus the unit corner
    #[default]
    Wrapped,
    /// A single ruler along `direction`
    Single,
}

impl RulerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulerType::Wrapped => "wrapped",
            RulerType::Single => "single",
        }
    }
}

impl FromStr for RulerType {
    type Err = RulerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wrapped" => Ok(RulerType::Wrapped),
            "single" => Ok(RulerType::Single),
            other => Err(RulerError::IllegalRenderType(other.to_string())),
        }
    }
}

/// Callback receiving `(scroll_left, scroll_top)` on every throttled scroll
#[derive(Clone)]
pub struct OnScroll(Arc<dyn Fn(f32, f32) + Send + Sync>);

impl OnScroll {
    pub fn new(callback: impl Fn(f32, f32) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, scroll_left: f32, scroll_top: f32) {
        (self.0)(scroll_left, scroll_top);
    }
}

impl fmt::Debug for OnScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnScroll(..)")
    }
}

fn default_render_type() -> String {
    RulerType::Wrapped.as_str().to_string()
}

/// Options for constructing a ruler
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulerConfig {
    /// Wrapper element the ruler is mounted in and measured from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<String>,
    /// Mount ref; takes precedence over `wrapper`, its parent is measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_ref: Option<String>,
    pub mode: ModePreference,
    /// `wrapped` or `single`, checked at construction
    #[serde(rename = "type", default = "default_render_type")]
    pub render_type: String,
    /// Axis of a `single` ruler
    pub direction: Axis,
    pub content_width: f32,
    pub content_height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_element: Option<ScrollTargetId>,
    pub ruler_id: String,
    pub style: StylePatch,
    #[serde(skip)]
    pub on_scroll: Option<OnScroll>,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            wrapper: None,
            mount_ref: None,
            mode: ModePreference::Auto,
            render_type: default_render_type(),
            direction: Axis::Horizontal,
            content_width: DEFAULT_WIDTH,
            content_height: DEFAULT_HEIGHT,
            scroll_selector: None,
            scroll_element: None,
            ruler_id: DEFAULT_RULER_ID.to_string(),
            style: StylePatch::default(),
            on_scroll: None,
        }
    }
}

impl RulerConfig {
    #[must_use]
    pub fn new(wrapper: impl Into<String>) -> Self {
        Self {
            wrapper: Some(wrapper.into()),
            ..Self::default()
        }
    }

    /// Read a YAML, TOML or JSON config, picked by file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read ruler config {path:?}: {e}");
            RulerError::config(path, e.to_string())
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let parsed: std::result::Result<Self, String> = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
            other => Err(format!("unsupported config format {other:?}")),
        };

        match parsed {
            Ok(config) => {
                debug!("Loaded ruler config from {path:?}");
                Ok(config)
            }
            Err(e) => {
                error!("Failed to parse ruler config {path:?}: {e}");
                Err(RulerError::config(path, e))
            }
        }
    }

    /// Default configuration rendered as YAML
    pub fn defaults_yaml() -> Result<String> {
        serde_yaml::to_string(&Self::default())
            .map_err(|e| RulerError::config("<defaults>", e.to_string()))
    }

    /// Mount target, preferring the mount ref
    #[must_use]
    pub fn mount_target(&self) -> Option<MountTarget> {
        self.mount_ref
            .clone()
            .map(MountTarget::MountRef)
            .or_else(|| self.wrapper.clone().map(MountTarget::Wrapper))
    }

    /// Scroll target, preferring an explicit element
    #[must_use]
    pub fn scroll_target(&self) -> Option<ScrollTargetRef> {
        self.scroll_element
            .map(ScrollTargetRef::Element)
            .or_else(|| self.scroll_selector.clone().map(ScrollTargetRef::Selector))
    }

    pub fn ruler_type(&self) -> Result<RulerType> {
        self.render_type.parse()
    }

    #[must_use]
    pub fn content(&self) -> Size {
        Size::new(self.content_width, self.content_height)
    }

    #[must_use]
    pub fn with_on_scroll(mut self, callback: impl Fn(f32, f32) + Send + Sync + 'static) -> Self {
        self.on_scroll = Some(OnScroll::new(callback));
        self
    }
}

/// Log the effective configuration once at start-up
pub fn log_config(config: &RulerConfig) {
    info!(
        "Ruler {}: {} mode, {}x{} content, type {}",
        config.ruler_id,
        match config.mode {
            ModePreference::Auto => "auto",
            ModePreference::Screen => "screen",
            ModePreference::Offscreen => "offscreen",
            ModePreference::Infinite => "infinite",
        },
        config.content_width,
        config.content_height,
        config.render_type
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(extension: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = RulerConfig::default();
        assert_eq!(config.content(), Size::new(1920.0, 1080.0));
        assert_eq!(config.ruler_id, "easy-canvas-ruler");
        assert_eq!(config.ruler_type().unwrap(), RulerType::Wrapped);
        assert_eq!(config.mode, ModePreference::Auto);
    }

    #[test]
    fn loads_yaml_with_camel_case_keys() {
        let file = write_config(
            "yaml",
            "wrapper: app\nmode: infinite\ncontentWidth: 30000\nrulerId: big\nstyle:\n  gap: 8\n  tickColor: '#ff0000'\n",
        );
        let config = RulerConfig::load(file.path()).unwrap();
        assert_eq!(config.mode, ModePreference::Infinite);
        assert_eq!(config.content_width, 30_000.0);
        assert_eq!(config.content_height, 1080.0);
        assert_eq!(config.ruler_id, "big");
        assert_eq!(config.style.gap, Some(8.0));
        assert_eq!(
            config.mount_target(),
            Some(MountTarget::Wrapper("app".into()))
        );
    }

    #[test]
    fn loads_toml_and_json() {
        let toml = write_config("toml", "type = \"single\"\ndirection = \"vertical\"\n");
        let config = RulerConfig::load(toml.path()).unwrap();
        assert_eq!(config.ruler_type().unwrap(), RulerType::Single);
        assert_eq!(config.direction, Axis::Vertical);

        let json = write_config("json", r##"{"scrollSelector": "#stage", "mountRef": "ref"}"##);
        let config = RulerConfig::load(json.path()).unwrap();
        assert_eq!(
            config.scroll_target(),
            Some(ScrollTargetRef::Selector("#stage".into()))
        );
        assert_eq!(
            config.mount_target(),
            Some(MountTarget::MountRef("ref".into()))
        );
    }

    #[test]
    fn bad_files_are_config_errors() {
        let file = write_config("yaml", "contentWidth: [1, 2]\n");
        let err = RulerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, RulerError::Config { .. }));
        assert!(!err.is_configuration());

        let file = write_config("ini", "a=b");
        assert!(RulerConfig::load(file.path()).is_err());
    }

    #[test]
    fn illegal_type_is_reported() {
        let config = RulerConfig {
            render_type: "range".into(),
            ..RulerConfig::default()
        };
        assert!(matches!(
            config.ruler_type(),
            Err(RulerError::IllegalRenderType(t)) if t == "range"
        ));
    }

    #[test]
    fn defaults_yaml_round_trips() {
        let yaml = RulerConfig::defaults_yaml().unwrap();
        assert!(yaml.contains("contentWidth: 1920"));
        let parsed: RulerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.ruler_id, "easy-canvas-ruler");
    }
}
