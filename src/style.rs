//! Styles and configuration
//!
//! `StyleOptions` mirrors the recognized host options one-to-one and may be
//! loaded from TOML. `StyleConfig` is the resolved, read-only form threaded
//! through the measure and draw passes: every role already has a concrete
//! style, so neither pass ever falls back at runtime.

use crate::error::{Result, ViewError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_TEXT_SIZE: f32 = 20.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        match hex.len() {
            8 => Some(Color { r: pair(0)?, g: pair(2)?, b: pair(4)?, a: pair(6)? }),
            6 => Some(Color { r: pair(0)?, g: pair(2)?, b: pair(4)?, a: 255 }),
            4 => Some(Color { r: nibble(0)?, g: nibble(1)?, b: nibble(2)?, a: nibble(3)? }),
            3 => Some(Color { r: nibble(0)?, g: nibble(1)?, b: nibble(2)?, a: 255 }),
            _ => None,
        }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// `0x00RRGGBB`, the framebuffer pixel format
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_string()
    }
}

/// Color and size of one text role
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Style {
    pub color: Color,
    pub font_size: f32,
}

/// What a painted token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// `{` `}` `[` `]` `:` `,`
    Skeleton,
    PropertyName,
    PropertyValue,
}

/// Recognized options, all optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleOptions {
    pub text_size: Option<f32>,
    pub text_color: Option<Color>,
    pub property_name_color: Option<Color>,
    pub property_value_color: Option<Color>,
    pub enquote_strings: Option<bool>,
    pub enquote_property_names: Option<bool>,
}

impl StyleOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn resolve(&self) -> Result<StyleConfig> {
        let text_size = self.text_size.unwrap_or(DEFAULT_TEXT_SIZE);
        if !text_size.is_finite() || text_size <= 0.0 {
            return Err(ViewError::Config(format!("textSize must be a positive number, got {}", text_size)));
        }

        let skeleton = Style {
            color: self.text_color.unwrap_or(Color::BLACK),
            font_size: text_size,
        };
        let property_name = Style {
            color: self.property_name_color.unwrap_or(skeleton.color),
            ..skeleton
        };
        let property_value = Style {
            color: self.property_value_color.unwrap_or(skeleton.color),
            ..skeleton
        };

        Ok(StyleConfig {
            enquote_strings: self.enquote_strings.unwrap_or(true),
            enquote_property_names: self.enquote_property_names.unwrap_or(false),
            skeleton,
            property_name,
            property_value,
            line_height_px: text_size * LINE_HEIGHT_FACTOR,
            indent_width_px: text_size,
        })
    }
}

/// Resolved configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    enquote_strings: bool,
    enquote_property_names: bool,
    skeleton: Style,
    property_name: Style,
    property_value: Style,
    line_height_px: f32,
    indent_width_px: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let skeleton = Style {
            color: Color::BLACK,
            font_size: DEFAULT_TEXT_SIZE,
        };
        Self {
            enquote_strings: true,
            enquote_property_names: false,
            skeleton,
            property_name: skeleton,
            property_value: skeleton,
            line_height_px: DEFAULT_TEXT_SIZE * LINE_HEIGHT_FACTOR,
            indent_width_px: DEFAULT_TEXT_SIZE,
        }
    }
}

impl StyleConfig {
    pub fn style(&self, role: Role) -> &Style {
        match role {
            Role::Skeleton => &self.skeleton,
            Role::PropertyName => &self.property_name,
            Role::PropertyValue => &self.property_value,
        }
    }

    pub fn enquote_strings(&self) -> bool {
        self.enquote_strings
    }

    pub fn enquote_property_names(&self) -> bool {
        self.enquote_property_names
    }

    pub fn font_size_px(&self) -> f32 {
        self.skeleton.font_size
    }

    pub fn line_height_px(&self) -> f32 {
        self.line_height_px
    }

    /// Horizontal step per nesting level; tied to the font size
    pub fn indent_width_px(&self) -> f32 {
        self.indent_width_px
    }
}
