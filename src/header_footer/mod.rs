//! Header and footer templates and their measured band heights

mod height_map;

pub use height_map::{BandHeights, HeightMap};

use crate::error::MeasureError;
use crate::measure::HeightMeasurer;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only placeholder recognised in templates
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Header or footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    Header,
    Footer,
}

/// Left or right half of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One of the four text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub band: BandKind,
    pub side: Side,
}

impl ZoneId {
    pub const HEADER_LEFT: ZoneId = ZoneId::new(BandKind::Header, Side::Left);
    pub const HEADER_RIGHT: ZoneId = ZoneId::new(BandKind::Header, Side::Right);
    pub const FOOTER_LEFT: ZoneId = ZoneId::new(BandKind::Footer, Side::Left);
    pub const FOOTER_RIGHT: ZoneId = ZoneId::new(BandKind::Footer, Side::Right);

    pub const ALL: [ZoneId; 4] = [
        Self::HEADER_LEFT,
        Self::HEADER_RIGHT,
        Self::FOOTER_LEFT,
        Self::FOOTER_RIGHT,
    ];

    pub const fn new(band: BandKind, side: Side) -> Self {
        Self { band, side }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let band = match self.band {
            BandKind::Header => "header",
            BandKind::Footer => "footer",
        };
        let side = match self.side {
            Side::Left => "left",
            Side::Right => "right",
        };
        write!(f, "{band}-{side}")
    }
}

/// Raw header/footer templates, owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderFooterSpec {
    pub header_left: String,
    pub header_right: String,
    pub footer_left: String,
    pub footer_right: String,
}

impl HeaderFooterSpec {
    pub fn new(
        header_left: impl Into<String>,
        header_right: impl Into<String>,
        footer_left: impl Into<String>,
        footer_right: impl Into<String>,
    ) -> Self {
        Self {
            header_left: header_left.into(),
            header_right: header_right.into(),
            footer_left: footer_left.into(),
            footer_right: footer_right.into(),
        }
    }

    /// Template text of a slot
    pub fn slot(&self, zone: ZoneId) -> &str {
        match (zone.band, zone.side) {
            (BandKind::Header, Side::Left) => &self.header_left,
            (BandKind::Header, Side::Right) => &self.header_right,
            (BandKind::Footer, Side::Left) => &self.footer_left,
            (BandKind::Footer, Side::Right) => &self.footer_right,
        }
    }

    fn band(&self, kind: BandKind) -> (&str, &str) {
        match kind {
            BandKind::Header => (&self.header_left, &self.header_right),
            BandKind::Footer => (&self.footer_left, &self.footer_right),
        }
    }

    /// Whether a band's text changes from page to page
    pub fn is_page_dependent(&self, kind: BandKind) -> bool {
        let (left, right) = self.band(kind);
        left.contains(PAGE_PLACEHOLDER) || right.contains(PAGE_PLACEHOLDER)
    }
}

/// Replace every `{page}` with the 1-based page number.
///
/// Purely textual: stray or escaped braces pass through untouched.
pub fn expand(template: &str, page_index: usize) -> String {
    if !template.contains(PAGE_PLACEHOLDER) {
        return template.to_string();
    }
    template.replace(PAGE_PLACEHOLDER, &page_index.saturating_add(1).to_string())
}

/// Expanded text of both halves of a band on one page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BandContent {
    pub left: String,
    pub right: String,
}

impl BandContent {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// What the surface needs to lay out a band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStyle {
    pub kind: BandKind,
    pub page_index: usize,
    /// Width available to the band (content width of the page)
    pub width: f32,
    pub min_height: f32,
}

/// Holds the current templates and caches measured band heights per page.
///
/// Header and footer caches are independent: updating one band never drops
/// the other's measurements.
#[derive(Debug, Clone)]
pub struct HeaderFooterManager {
    spec: HeaderFooterSpec,
    header_min: f32,
    footer_min: f32,
    band_width: f32,
    header_heights: FxHashMap<usize, f32>,
    footer_heights: FxHashMap<usize, f32>,
}

impl HeaderFooterManager {
    pub fn new(spec: HeaderFooterSpec, header_min: f32, footer_min: f32, band_width: f32) -> Self {
        Self {
            spec,
            header_min,
            footer_min,
            band_width,
            header_heights: FxHashMap::default(),
            footer_heights: FxHashMap::default(),
        }
    }

    pub fn spec(&self) -> &HeaderFooterSpec {
        &self.spec
    }

    /// Replace all four templates
    pub fn set_content(
        &mut self,
        header_left: impl Into<String>,
        header_right: impl Into<String>,
        footer_left: impl Into<String>,
        footer_right: impl Into<String>,
    ) {
        self.spec = HeaderFooterSpec::new(header_left, header_right, footer_left, footer_right);
        self.header_heights.clear();
        self.footer_heights.clear();
    }

    /// Replace the header templates only
    pub fn update_header(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.spec = HeaderFooterSpec {
            header_left: left.into(),
            header_right: right.into(),
            ..self.spec.clone()
        };
        self.header_heights.clear();
    }

    /// Replace the footer templates only
    pub fn update_footer(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.spec = HeaderFooterSpec {
            footer_left: left.into(),
            footer_right: right.into(),
            ..self.spec.clone()
        };
        self.footer_heights.clear();
    }

    /// Drop every measurement, e.g. after the surface was resized
    pub fn invalidate_all(&mut self) {
        self.header_heights.clear();
        self.footer_heights.clear();
    }

    /// Width the bands are laid out at; a change invalidates measurements
    pub fn set_band_width(&mut self, width: f32) {
        if self.band_width != width {
            self.band_width = width;
            self.invalidate_all();
        }
    }

    pub fn min_height(&self, kind: BandKind) -> f32 {
        match kind {
            BandKind::Header => self.header_min,
            BandKind::Footer => self.footer_min,
        }
    }

    /// Band heights assumed for pages that were never measured
    pub fn default_heights(&self) -> BandHeights {
        BandHeights::new(self.header_min, self.footer_min)
    }

    pub fn band_content(&self, kind: BandKind, page_index: usize) -> BandContent {
        let (left, right) = self.spec.band(kind);
        BandContent {
            left: expand(left, page_index),
            right: expand(right, page_index),
        }
    }

    /// Last measured height of a band, or its minimum before measurement
    pub fn band_height(&self, kind: BandKind, page_index: usize) -> f32 {
        let key = self.cache_key(kind, page_index);
        self.cache(kind)
            .get(&key)
            .copied()
            .unwrap_or_else(|| self.min_height(kind))
    }

    /// Header and footer heights of a page, measuring whatever is not cached
    pub fn measure_page<M: HeightMeasurer + ?Sized>(
        &mut self,
        page_index: usize,
        measurer: &mut M,
    ) -> Result<BandHeights, MeasureError> {
        let header = self.measure_band(BandKind::Header, page_index, measurer)?;
        let footer = self.measure_band(BandKind::Footer, page_index, measurer)?;
        Ok(BandHeights { header, footer })
    }

    fn measure_band<M: HeightMeasurer + ?Sized>(
        &mut self,
        kind: BandKind,
        page_index: usize,
        measurer: &mut M,
    ) -> Result<f32, MeasureError> {
        let key = self.cache_key(kind, page_index);
        if let Some(&height) = self.cache(kind).get(&key) {
            return Ok(height);
        }

        let content = self.band_content(kind, page_index);
        let style = BandStyle {
            kind,
            page_index,
            width: self.band_width,
            min_height: self.min_height(kind),
        };
        let measured = measurer.measure_band(&content, &style)?;
        if !measured.is_finite() || measured < 0.0 {
            return Err(MeasureError::InvalidBandHeight {
                page: page_index,
                height: measured,
            });
        }

        let height = measured.max(style.min_height);
        self.cache_mut(kind).insert(key, height);
        Ok(height)
    }

    // Bands without `{page}` look the same on every page and share one entry.
    fn cache_key(&self, kind: BandKind, page_index: usize) -> usize {
        if self.spec.is_page_dependent(kind) {
            page_index
        } else {
            0
        }
    }

    fn cache(&self, kind: BandKind) -> &FxHashMap<usize, f32> {
        match kind {
            BandKind::Header => &self.header_heights,
            BandKind::Footer => &self.footer_heights,
        }
    }

    fn cache_mut(&mut self, kind: BandKind) -> &mut FxHashMap<usize, f32> {
        match kind {
            BandKind::Header => &mut self.header_heights,
            BandKind::Footer => &mut self.footer_heights,
        }
    }
}
