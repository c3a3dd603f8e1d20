//! Named page sizes

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference resolution for all preset dimensions
pub const REFERENCE_DPI: f32 = 96.0;

/// Standard paper sizes, portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePreset {
    #[default]
    Letter,
    A4,
    A3,
    A5,
    Legal,
    Tabloid,
}

/// Page box and margins of a preset, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSize {
    pub page_height: f32,
    pub page_width: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

const fn size(
    page_height: f32,
    page_width: f32,
    margin_top: f32,
    margin_bottom: f32,
    margin_left: f32,
    margin_right: f32,
) -> PresetSize {
    PresetSize {
        page_height,
        page_width,
        margin_top,
        margin_bottom,
        margin_left,
        margin_right,
    }
}

impl PagePreset {
    pub const ALL: [PagePreset; 6] = [
        PagePreset::Letter,
        PagePreset::A4,
        PagePreset::A3,
        PagePreset::A5,
        PagePreset::Legal,
        PagePreset::Tabloid,
    ];

    /// Dimensions at 96 DPI
    pub const fn size(self) -> PresetSize {
        match self {
            // 8.5" x 11", 1" margins
            PagePreset::Letter => size(1056.0, 816.0, 96.0, 96.0, 96.0, 96.0),
            PagePreset::A4 => size(1123.0, 794.0, 95.0, 95.0, 76.0, 76.0),
            PagePreset::A3 => size(1591.0, 1123.0, 95.0, 95.0, 76.0, 76.0),
            PagePreset::A5 => size(794.0, 419.0, 76.0, 76.0, 57.0, 57.0),
            PagePreset::Legal => size(1404.0, 818.0, 96.0, 96.0, 96.0, 96.0),
            PagePreset::Tabloid => size(1635.0, 1060.0, 96.0, 96.0, 96.0, 96.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PagePreset::Letter => "letter",
            PagePreset::A4 => "a4",
            PagePreset::A3 => "a3",
            PagePreset::A5 => "a5",
            PagePreset::Legal => "legal",
            PagePreset::Tabloid => "tabloid",
        }
    }
}

impl fmt::Display for PagePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PagePreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "letter" | "us-letter" | "us_letter" => Ok(PagePreset::Letter),
            "a4" => Ok(PagePreset::A4),
            "a3" => Ok(PagePreset::A3),
            "a5" => Ok(PagePreset::A5),
            "legal" => Ok(PagePreset::Legal),
            "tabloid" => Ok(PagePreset::Tabloid),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}
