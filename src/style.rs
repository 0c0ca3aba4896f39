//! Ruler style: colors, fonts, tick spacing and the unit-label corner

use std::fmt;
use std::str::FromStr;

use resvg::tiny_skia;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GAP, DEFAULT_SCALE, DEFAULT_SIZE, MAX_SIZE};
use crate::error::{Result, RulerError};

/// An sRGB color with straight (non-premultiplied) alpha
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RulerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RulerColor {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            3 | 4 => {
                let r = nibble(0)? * 0x11;
                let g = nibble(1)? * 0x11;
                let b = nibble(2)? * 0x11;
                let a = if hex.len() == 4 { nibble(3)? * 0x11 } else { 0xff };
                Some(Self::rgba(r, g, b, a))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { byte(6)? } else { 0xff };
                Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
            }
            _ => None,
        }
    }
}

impl FromStr for RulerColor {
    type Err = RulerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed.to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "transparent" => Some(Self::TRANSPARENT),
            other => other.strip_prefix('#').and_then(Self::parse_hex),
        };
        parsed.ok_or_else(|| RulerError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for RulerColor {
    type Error = RulerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RulerColor> for String {
    fn from(color: RulerColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for RulerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Anchoring of labels and tick lengths
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Labels centered on their tick, origin label hidden
    #[default]
    Center,
    /// Labels beside their tick, ticks grow from the far edge
    Edge,
}

/// Style of the square corner where both rulers meet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStyle {
    pub background_color: RulerColor,
    pub font_color: RulerColor,
    pub font_size: f32,
    pub text: String,
}

impl Default for UnitStyle {
    fn default() -> Self {
        Self {
            background_color: RulerColor::rgb(0x17, 0x18, 0x19),
            font_color: RulerColor::WHITE,
            font_size: 12.0,
            text: "px".to_string(),
        }
    }
}

/// Fully normalized ruler style.
///
/// Invariants: `0 < size <= max_size <= MAX_SIZE`, `gap > 0`, `scale > 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulerStyle {
    /// Track thickness shared by both rulers
    pub size: f32,
    pub background_color: RulerColor,
    pub font_color: RulerColor,
    /// Label size; derived from the track thickness when unset
    pub font_size: Option<f32>,
    pub font_weight: String,
    pub tick_color: RulerColor,
    pub unit: UnitStyle,
    /// Pixel spacing between minor ticks
    pub gap: f32,
    pub max_size: f32,
    /// Display units per pixel
    pub scale: f32,
    pub show: bool,
    pub mode: LabelMode,
}

impl Default for RulerStyle {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            background_color: RulerColor::rgb(0x17, 0x18, 0x19),
            font_color: RulerColor::WHITE,
            font_size: None,
            font_weight: String::new(),
            tick_color: RulerColor::rgb(0x4b, 0x4d, 0x4f),
            unit: UnitStyle::default(),
            gap: DEFAULT_GAP,
            max_size: MAX_SIZE,
            scale: DEFAULT_SCALE,
            show: true,
            mode: LabelMode::Center,
        }
    }
}

impl RulerStyle {
    /// Normalize a user patch against the defaults
    pub fn from_patch(patch: &StylePatch) -> Result<Self> {
        Self::default().merged(patch)
    }

    /// Return a copy with `patch` applied, or an error leaving `self` as is.
    pub fn merged(&self, patch: &StylePatch) -> Result<Self> {
        let mut next = self.clone();

        if let Some(max_size) = patch.max_size {
            if !max_size.is_finite() || max_size <= 0.0 {
                return Err(RulerError::invalid_style(format!("maxSize {max_size}")));
            }
            next.max_size = max_size.min(MAX_SIZE);
        }
        if let Some(size) = patch.size {
            if !size.is_finite() || size <= 0.0 {
                return Err(RulerError::invalid_style(format!("size {size}")));
            }
            next.size = size;
        }
        next.size = next.size.min(next.max_size);

        if let Some(gap) = patch.gap {
            if !gap.is_finite() || gap <= 0.0 {
                return Err(RulerError::invalid_style(format!("gap {gap}")));
            }
            next.gap = gap;
        }
        if let Some(scale) = patch.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(RulerError::InvalidScale(scale));
            }
            next.scale = scale;
        }
        if let Some(font_size) = patch.font_size {
            if !font_size.is_finite() || font_size <= 0.0 {
                return Err(RulerError::invalid_style(format!("fontSize {font_size}")));
            }
            next.font_size = Some(font_size);
        }

        if let Some(color) = patch.background_color {
            next.background_color = color;
        }
        if let Some(color) = patch.font_color {
            next.font_color = color;
        }
        if let Some(color) = patch.tick_color {
            next.tick_color = color;
        }
        if let Some(weight) = &patch.font_weight {
            next.font_weight = weight.clone();
        }
        if let Some(show) = patch.show {
            next.show = show;
        }
        if let Some(mode) = patch.mode {
            next.mode = mode;
        }
        if let Some(unit) = &patch.unit {
            next.unit = next.unit.merged(unit)?;
        }

        Ok(next)
    }

    /// Label size for a ruler whose cross-axis thickness is `track`
    #[must_use]
    pub fn label_size(&self, track: f32) -> f32 {
        self.font_size.unwrap_or_else(|| (track * 0.55).round())
    }

    /// True when the font weight asks for heavier strokes
    #[must_use]
    pub fn is_bold(&self) -> bool {
        let weight = self.font_weight.trim();
        matches!(weight, "bold" | "bolder") || weight.parse::<u32>().is_ok_and(|w| w >= 600)
    }
}

impl UnitStyle {
    fn merged(&self, patch: &UnitPatch) -> Result<Self> {
        let mut next = self.clone();
        if let Some(color) = patch.background_color {
            next.background_color = color;
        }
        if let Some(color) = patch.font_color {
            next.font_color = color;
        }
        if let Some(font_size) = patch.font_size {
            if !font_size.is_finite() || font_size <= 0.0 {
                return Err(RulerError::invalid_style(format!("unit fontSize {font_size}")));
            }
            next.font_size = font_size;
        }
        if let Some(text) = &patch.text {
            next.text = text.clone();
        }
        Ok(next)
    }
}

/// Partial style as given by users; unset fields keep their current value
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<RulerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<RulerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_color: Option<RulerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<LabelMode>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<RulerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<RulerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&RulerStyle> for StylePatch {
    fn from(style: &RulerStyle) -> Self {
        Self {
            size: Some(style.size),
            background_color: Some(style.background_color),
            font_color: Some(style.font_color),
            font_size: style.font_size,
            font_weight: Some(style.font_weight.clone()),
            tick_color: Some(style.tick_color),
            unit: Some(UnitPatch {
                background_color: Some(style.unit.background_color),
                font_color: Some(style.unit.font_color),
                font_size: Some(style.unit.font_size),
                text: Some(style.unit.text.clone()),
            }),
            gap: Some(style.gap),
            max_size: Some(style.max_size),
            scale: Some(style.scale),
            show: Some(style.show),
            mode: Some(style.mode),
        }
    }
}
