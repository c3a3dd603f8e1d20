//! Height measurement adapter
//!
//! The rendering surface is the only place where real heights exist. Everything
//! the engine knows about block and band heights flows through
//! [`HeightMeasurer`], so the calculator stays a pure function and tests can
//! substitute a [`StaticMeasurer`].

use crate::error::MeasureError;
use crate::header_footer::{BandContent, BandKind, BandStyle};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Host-assigned identifier of a top-level content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

/// A block with its rendered height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBlock {
    pub id: BlockId,
    pub height: f32,
}

impl MeasuredBlock {
    pub fn new(id: BlockId, height: f32) -> Self {
        Self { id, height }
    }
}

/// Access to the host rendering surface.
///
/// Each call forces a layout pass on the surface, so blocks are measured in a
/// single batch per pagination pass. Callers must only measure after the
/// surface has committed the content they are paginating.
pub trait HeightMeasurer {
    /// Pixel height of every block in `ids`
    fn measure_blocks(&mut self, ids: &[BlockId]) -> Result<FxHashMap<BlockId, f32>, MeasureError>;

    /// Pixel height of one header or footer band
    fn measure_band(&mut self, content: &BandContent, style: &BandStyle) -> Result<f32, MeasureError>;
}

/// Measure `ids` in one batch and return them in document order.
///
/// Fails if any block is missing from the batch or reports an unusable height.
pub fn measure_sequence<M: HeightMeasurer + ?Sized>(
    measurer: &mut M,
    ids: &[BlockId],
) -> Result<Vec<MeasuredBlock>, MeasureError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let heights = measurer.measure_blocks(ids)?;
    ids.iter()
        .map(|&id| {
            let height = *heights.get(&id).ok_or(MeasureError::BlockNotAttached(id))?;
            check_height(id, height)?;
            Ok(MeasuredBlock::new(id, height))
        })
        .collect()
}

pub(crate) fn check_height(id: BlockId, height: f32) -> Result<(), MeasureError> {
    if height.is_finite() && height >= 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidHeight { id, height })
    }
}

/// How a [`StaticMeasurer`] sizes a band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandSizing {
    /// Same height whatever the text
    Fixed(f32),
    /// Text wraps every `chars_per_line` characters
    Wrapped { chars_per_line: usize, line_height: f32 },
}

impl BandSizing {
    fn height_for(&self, content: &BandContent) -> f32 {
        match *self {
            BandSizing::Fixed(height) => height,
            BandSizing::Wrapped {
                chars_per_line,
                line_height,
            } => {
                let longest = content
                    .left
                    .chars()
                    .count()
                    .max(content.right.chars().count());
                let lines = longest.div_ceil(chars_per_line.max(1)).max(1);
                lines as f32 * line_height
            }
        }
    }
}

/// Deterministic measurer backed by a fixed height table
#[derive(Debug, Clone)]
pub struct StaticMeasurer {
    heights: FxHashMap<BlockId, f32>,
    header: BandSizing,
    footer: BandSizing,
    ready: bool,
    block_batches: usize,
    band_measurements: usize,
}

impl Default for StaticMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticMeasurer {
    pub fn new() -> Self {
        Self {
            heights: FxHashMap::default(),
            header: BandSizing::Fixed(0.0),
            footer: BandSizing::Fixed(0.0),
            ready: true,
            block_batches: 0,
            band_measurements: 0,
        }
    }

    /// Blocks numbered `0..heights.len()` with the given heights
    pub fn from_heights(heights: &[f32]) -> Self {
        let mut measurer = Self::new();
        for (idx, &height) in heights.iter().enumerate() {
            measurer.set_block(BlockId(idx as u64), height);
        }
        measurer
    }

    pub fn set_block(&mut self, id: BlockId, height: f32) {
        self.heights.insert(id, height);
    }

    pub fn remove_block(&mut self, id: BlockId) {
        self.heights.remove(&id);
    }

    pub fn with_bands(mut self, header: BandSizing, footer: BandSizing) -> Self {
        self.header = header;
        self.footer = footer;
        self
    }

    pub fn set_band_sizing(&mut self, kind: BandKind, sizing: BandSizing) {
        match kind {
            BandKind::Header => self.header = sizing,
            BandKind::Footer => self.footer = sizing,
        }
    }

    /// Simulate a surface that has not committed its content yet
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Number of `measure_blocks` calls so far
    pub fn block_batches(&self) -> usize {
        self.block_batches
    }

    /// Number of `measure_band` calls so far
    pub fn band_measurements(&self) -> usize {
        self.band_measurements
    }
}

impl HeightMeasurer for StaticMeasurer {
    fn measure_blocks(&mut self, ids: &[BlockId]) -> Result<FxHashMap<BlockId, f32>, MeasureError> {
        if !self.ready {
            return Err(MeasureError::SurfaceNotReady);
        }
        self.block_batches += 1;

        let mut out = FxHashMap::default();
        out.reserve(ids.len());
        for &id in ids {
            if let Some(&height) = self.heights.get(&id) {
                out.insert(id, height);
            }
        }
        Ok(out)
    }

    fn measure_band(&mut self, content: &BandContent, style: &BandStyle) -> Result<f32, MeasureError> {
        if !self.ready {
            return Err(MeasureError::SurfaceNotReady);
        }
        self.band_measurements += 1;

        let sizing = match style.kind {
            BandKind::Header => self.header,
            BandKind::Footer => self.footer,
        };
        Ok(sizing.height_for(content))
    }
}
