//! Per-page band heights

use serde::{Deserialize, Serialize};

/// Header and footer band height of one page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandHeights {
    pub header: f32,
    pub footer: f32,
}

impl BandHeights {
    pub fn new(header: f32, footer: f32) -> Self {
        Self { header, footer }
    }

    pub fn total(&self) -> f32 {
        self.header + self.footer
    }
}

/// Band heights indexed by page (0-based).
///
/// Pages past the last entry fall back to the default heights.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightMap {
    header: Vec<f32>,
    footer: Vec<f32>,
    default: BandHeights,
}

impl HeightMap {
    /// Empty map falling back to `default`
    pub fn new(default: BandHeights) -> Self {
        Self {
            header: Vec::new(),
            footer: Vec::new(),
            default,
        }
    }

    /// Same band heights on every page
    pub fn uniform(header: f32, footer: f32) -> Self {
        Self::new(BandHeights::new(header, footer))
    }

    /// Record the heights of the next page
    pub fn push(&mut self, heights: BandHeights) {
        self.header.push(heights.header);
        self.footer.push(heights.footer);
    }

    pub fn heights(&self, page_index: usize) -> BandHeights {
        BandHeights {
            header: self.header(page_index),
            footer: self.footer(page_index),
        }
    }

    pub fn header(&self, page_index: usize) -> f32 {
        self.header.get(page_index).copied().unwrap_or(self.default.header)
    }

    pub fn footer(&self, page_index: usize) -> f32 {
        self.footer.get(page_index).copied().unwrap_or(self.default.footer)
    }

    /// Number of pages with explicit entries
    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}
