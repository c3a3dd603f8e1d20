//! Host-facing configuration

use crate::error::ConfigError;
use crate::geometry::{PageGeometry, PagePreset};
use crate::header_footer::HeaderFooterSpec;
use crate::reflow::DEFAULT_DEBOUNCE_MS;
use serde::{Deserialize, Serialize};

/// Everything a host can pass at construction.
///
/// Geometry fields override the preset one by one; unset fields keep the
/// preset's values. Unknown keys (e.g. callback names) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    /// Preset name, US Letter when absent
    pub preset: Option<String>,
    pub page_height: Option<f32>,
    pub page_width: Option<f32>,
    pub margin_top: Option<f32>,
    pub margin_bottom: Option<f32>,
    pub margin_left: Option<f32>,
    pub margin_right: Option<f32>,
    pub page_gap: Option<f32>,
    pub page_gap_border_size: Option<f32>,
    pub page_gap_border_color: Option<String>,
    pub page_break_background: Option<String>,
    pub content_margin_top: Option<f32>,
    pub content_margin_bottom: Option<f32>,
    pub header_left: String,
    pub header_right: String,
    pub footer_left: String,
    pub footer_right: String,
    /// Band height assumed before the first measurement
    pub header_min_height: f32,
    pub footer_min_height: f32,
    pub debounce_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            preset: None,
            page_height: None,
            page_width: None,
            margin_top: None,
            margin_bottom: None,
            margin_left: None,
            margin_right: None,
            page_gap: None,
            page_gap_border_size: None,
            page_gap_border_color: None,
            page_break_background: None,
            content_margin_top: None,
            content_margin_bottom: None,
            header_left: String::new(),
            header_right: String::new(),
            footer_left: String::new(),
            footer_right: String::new(),
            header_min_height: 0.0,
            footer_min_height: 0.0,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl PaginationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn preset(&self) -> Result<PagePreset, ConfigError> {
        match &self.preset {
            Some(name) => name.parse(),
            None => Ok(PagePreset::default()),
        }
    }

    /// Resolve preset and overrides into a validated geometry
    pub fn geometry(&self) -> Result<PageGeometry, ConfigError> {
        let mut builder = PageGeometry::builder(self.preset()?);

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        builder = builder.$field(value.clone());
                    }
                )*
            };
        }
        apply!(
            page_height,
            page_width,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
            page_gap,
            page_gap_border_size,
            content_margin_top,
            content_margin_bottom,
        );
        if let Some(color) = &self.page_gap_border_color {
            builder = builder.page_gap_border_color(color);
        }
        if let Some(color) = &self.page_break_background {
            builder = builder.page_break_background(color);
        }

        Ok(builder.build(self.header_min_height, self.footer_min_height)?)
    }

    pub fn header_footer(&self) -> HeaderFooterSpec {
        HeaderFooterSpec::new(
            self.header_left.as_str(),
            self.header_right.as_str(),
            self.footer_left.as_str(),
            self.footer_right.as_str(),
        )
    }
}
