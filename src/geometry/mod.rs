//! Page geometry: dimensions, margins and inter-page styling

mod preset;

pub use preset::{PagePreset, PresetSize, REFERENCE_DPI};

use crate::error::InvalidGeometryError;
use serde::{Deserialize, Serialize};

/// Default gap between consecutive pages
pub const DEFAULT_PAGE_GAP: f32 = 20.0;

/// Default border drawn around the page gap
pub const DEFAULT_GAP_BORDER_SIZE: f32 = 1.0;

pub const DEFAULT_GAP_BORDER_COLOR: &str = "#e5e5e5";

pub const DEFAULT_PAGE_BACKGROUND: &str = "#ffffff";

/// Page dimensions and decoration, in CSS pixels.
///
/// Replaced wholesale on a live engine; build a new one with
/// [`PageGeometry::builder`] instead of patching fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_height: f32,
    pub page_width: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub page_gap: f32,
    pub page_gap_border_size: f32,
    pub page_gap_border_color: String,
    pub page_break_background: String,
    pub content_margin_top: f32,
    pub content_margin_bottom: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::from_preset(PagePreset::Letter)
    }
}

impl PageGeometry {
    /// Preset page box with default gap styling and no content margins
    pub fn from_preset(preset: PagePreset) -> Self {
        let size = preset.size();
        Self {
            page_height: size.page_height,
            page_width: size.page_width,
            margin_top: size.margin_top,
            margin_bottom: size.margin_bottom,
            margin_left: size.margin_left,
            margin_right: size.margin_right,
            page_gap: DEFAULT_PAGE_GAP,
            page_gap_border_size: DEFAULT_GAP_BORDER_SIZE,
            page_gap_border_color: DEFAULT_GAP_BORDER_COLOR.to_string(),
            page_break_background: DEFAULT_PAGE_BACKGROUND.to_string(),
            content_margin_top: 0.0,
            content_margin_bottom: 0.0,
        }
    }

    pub fn builder(preset: PagePreset) -> PageGeometryBuilder {
        PageGeometryBuilder {
            geometry: Self::from_preset(preset),
        }
    }

    /// Builder over explicit page dimensions, margins zeroed
    pub fn custom(page_width: f32, page_height: f32) -> PageGeometryBuilder {
        let mut geometry = Self::from_preset(PagePreset::Letter);
        geometry.page_width = page_width;
        geometry.page_height = page_height;
        geometry.margin_top = 0.0;
        geometry.margin_bottom = 0.0;
        geometry.margin_left = 0.0;
        geometry.margin_right = 0.0;
        PageGeometryBuilder { geometry }
    }

    /// Horizontal space between the side margins
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Vertical space left for blocks once margins and bands are taken
    pub fn usable_height(&self, header_band: f32, footer_band: f32) -> f32 {
        self.page_height
            - self.margin_top
            - self.margin_bottom
            - self.content_margin_top
            - self.content_margin_bottom
            - header_band
            - footer_band
    }

    /// Distance from one page's top edge to the next
    pub fn page_stride(&self) -> f32 {
        self.page_height + self.page_gap
    }

    /// Top edge of a page in the stacked layout
    pub fn page_top(&self, page_index: usize) -> f32 {
        page_index as f32 * self.page_stride()
    }

    /// Height of `page_count` stacked pages and the gaps between them
    pub fn document_height(&self, page_count: usize) -> f32 {
        let pages = page_count.max(1) as f32;
        pages * self.page_height + (pages - 1.0) * self.page_gap
    }

    /// Check dimensions and that content still fits between the bands
    pub fn validate(&self, header_band: f32, footer_band: f32) -> Result<(), InvalidGeometryError> {
        for (field, value) in [
            ("pageHeight", self.page_height),
            ("pageWidth", self.page_width),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidGeometryError::NonPositiveDimension { field, value });
            }
        }

        for (field, value) in [
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
            ("marginRight", self.margin_right),
            ("pageGap", self.page_gap),
            ("pageGapBorderSize", self.page_gap_border_size),
            ("contentMarginTop", self.content_margin_top),
            ("contentMarginBottom", self.content_margin_bottom),
            ("headerBand", header_band),
            ("footerBand", footer_band),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidGeometryError::NegativeInset { field, value });
            }
        }

        let width = self.content_width();
        if width <= 0.0 {
            return Err(InvalidGeometryError::NoContentWidth { usable: width });
        }

        let usable = self.usable_height(header_band, footer_band);
        if usable <= 0.0 {
            return Err(InvalidGeometryError::NoContentSpace { usable });
        }

        Ok(())
    }
}

/// Field-by-field construction of a [`PageGeometry`]
#[derive(Debug, Clone)]
pub struct PageGeometryBuilder {
    geometry: PageGeometry,
}

macro_rules! setter {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(mut self, value: $ty) -> Self {
                self.geometry.$name = value.into();
                self
            }
        )*
    };
}

impl PageGeometryBuilder {
    setter! {
        page_height: f32,
        page_width: f32,
        margin_top: f32,
        margin_bottom: f32,
        margin_left: f32,
        margin_right: f32,
        page_gap: f32,
        page_gap_border_size: f32,
        page_gap_border_color: &str,
        page_break_background: &str,
        content_margin_top: f32,
        content_margin_bottom: f32,
    }

    /// Same margin on all four sides
    pub fn margins(self, value: f32) -> Self {
        self.margin_top(value)
            .margin_bottom(value)
            .margin_left(value)
            .margin_right(value)
    }

    /// Validate against the band heights the engine will reserve
    pub fn build(self, header_band: f32, footer_band: f32) -> Result<PageGeometry, InvalidGeometryError> {
        self.geometry.validate(header_band, footer_band)?;
        Ok(self.geometry)
    }
}
