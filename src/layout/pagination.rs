//! Greedy block-aligned pagination

use crate::geometry::PageGeometry;
use crate::header_footer::{BandHeights, HeightMap};
use crate::measure::MeasuredBlock;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::ops::Range;

/// Boundary between two pages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreak {
    /// Index of the first block on the next page
    pub block_index: usize,
    /// Content height of the page ending here
    pub page_height: f32,
    /// Content height of every page up to and including the one ending here
    pub cumulative_height: f32,
}

/// Blocks assigned to one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpan {
    /// Page index (0-based)
    pub page_index: usize,
    /// First block on the page
    pub start_block: usize,
    /// One past the last block on the page
    pub end_block: usize,
    /// Sum of block heights on the page
    pub content_height: f32,
    /// Usable height for blocks on this page
    pub capacity: f32,
    /// Band heights reserved on this page
    pub bands: BandHeights,
    /// A block taller than the capacity is the only non-empty block here
    pub overflows: bool,
}

impl PageSpan {
    fn open(page_index: usize, start_block: usize, capacity: f32, bands: BandHeights) -> Self {
        Self {
            page_index,
            start_block,
            end_block: start_block,
            content_height: 0.0,
            capacity,
            bands,
            overflows: false,
        }
    }

    pub fn blocks(&self) -> Range<usize> {
        self.start_block..self.end_block
    }

    pub fn is_empty(&self) -> bool {
        self.start_block == self.end_block
    }

    /// Unused capacity at the bottom of the page
    pub fn remaining(&self) -> f32 {
        (self.capacity - self.content_height).max(0.0)
    }

    /// Check if this page contains a given block
    pub fn contains_block(&self, block_index: usize) -> bool {
        self.blocks().contains(&block_index)
    }
}

/// Output of one pagination pass, replaced wholesale on the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub page_count: usize,
    pub breaks: Vec<PageBreak>,
    pub pages: Vec<PageSpan>,
    pub height_map: HeightMap,
    /// Engine generation this result was computed for
    pub generation: u64,
}

impl PaginationResult {
    /// One empty page, used before the first pass
    pub fn empty(geometry: &PageGeometry, bands: BandHeights) -> Self {
        paginate_with_map(&[], geometry, &HeightMap::new(bands))
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Page holding a block, `None` if the index is past the end
    pub fn page_of_block(&self, block_index: usize) -> Option<usize> {
        let last = self.pages.last()?;
        if block_index >= last.end_block {
            return None;
        }
        Some(
            self.breaks
                .partition_point(|b| b.block_index <= block_index),
        )
    }

    pub fn page(&self, page_index: usize) -> Option<&PageSpan> {
        self.pages.get(page_index)
    }
}

/// Walk `blocks` once, breaking before any block that would overflow the page.
///
/// `band_heights` is queried once per page, in order, when the page opens; its
/// answer sets that page's capacity. A block taller than a whole page is the
/// only non-empty block on its page. An exact fit stays on the current page.
pub fn paginate<F, E>(
    blocks: &[MeasuredBlock],
    geometry: &PageGeometry,
    mut band_heights: F,
) -> Result<PaginationResult, E>
where
    F: FnMut(usize) -> Result<BandHeights, E>,
{
    let first_bands = band_heights(0)?;
    let mut height_map = HeightMap::new(first_bands);
    let mut breaks = Vec::new();
    let mut pages = Vec::new();
    let mut cumulative = 0.0f32;

    let capacity = geometry.usable_height(first_bands.header, first_bands.footer);
    let mut page = PageSpan::open(0, 0, capacity, first_bands);

    for (idx, block) in blocks.iter().enumerate() {
        // Zero-height blocks never open a page, and a page ends only once it holds content
        let breaks_here = block.height > 0.0
            && page.content_height > 0.0
            && page.content_height + block.height > page.capacity;
        if breaks_here {
            cumulative += page.content_height;
            breaks.push(PageBreak {
                block_index: idx,
                page_height: page.content_height,
                cumulative_height: cumulative,
            });
            tracing::trace!(
                page = page.page_index,
                block = idx,
                height = page.content_height,
                "page break"
            );

            height_map.push(page.bands);
            pages.push(page);

            let bands = band_heights(pages.len())?;
            let capacity = geometry.usable_height(bands.header, bands.footer);
            page = PageSpan::open(pages.len(), idx, capacity, bands);
        }

        page.content_height += block.height;
        page.end_block = idx + 1;

        if !page.overflows && page.content_height > page.capacity {
            page.overflows = true;
            tracing::warn!(
                page = page.page_index,
                block = ?block.id,
                height = block.height,
                capacity = page.capacity,
                "block taller than page capacity"
            );
        }
    }

    height_map.push(page.bands);
    pages.push(page);

    Ok(PaginationResult {
        page_count: pages.len(),
        breaks,
        pages,
        height_map,
        generation: 0,
    })
}

/// [`paginate`] with band heights read from an existing map
pub fn paginate_with_map(
    blocks: &[MeasuredBlock],
    geometry: &PageGeometry,
    height_map: &HeightMap,
) -> PaginationResult {
    let result = paginate(blocks, geometry, |page| {
        Ok::<_, Infallible>(height_map.heights(page))
    });
    match result {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::BlockId;

    /// 1000px page, 100px margins: 800px usable without bands
    fn geometry() -> PageGeometry {
        PageGeometry::custom(600.0, 1000.0)
            .margin_top(100.0)
            .margin_bottom(100.0)
            .build(0.0, 0.0)
            .unwrap()
    }

    fn blocks(heights: &[f32]) -> Vec<MeasuredBlock> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| MeasuredBlock::new(BlockId(i as u64), h))
            .collect()
    }

    fn no_bands() -> HeightMap {
        HeightMap::uniform(0.0, 0.0)
    }

    /// Small linear congruential generator for repeatable height sequences
    fn pseudo_random_heights(seed: u64, count: usize) -> Vec<f32> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) % 400 + 1) as f32
            })
            .collect()
    }

    fn assert_invariants(result: &PaginationResult, heights: &[f32]) {
        assert_eq!(result.page_count, result.pages.len());
        assert_eq!(result.breaks.len(), result.page_count - 1);
        assert_eq!(result.height_map.len(), result.page_count);

        // Pages tile the block sequence with no gaps
        let mut next = 0;
        for page in &result.pages {
            assert_eq!(page.start_block, next);
            next = page.end_block;
        }
        assert_eq!(next, heights.len());

        for (page, brk) in result.pages.iter().zip(&result.breaks) {
            assert_eq!(brk.block_index, page.end_block);
            assert_eq!(brk.page_height, page.content_height);
        }

        for pair in result.breaks.windows(2) {
            assert!(pair[0].block_index < pair[1].block_index);
            assert!(pair[0].cumulative_height < pair[1].cumulative_height);
        }

        for page in &result.pages {
            let sum: f32 = heights[page.blocks()].iter().sum();
            assert_eq!(sum, page.content_height);
            if page.overflows {
                let positive = heights[page.blocks()].iter().filter(|&&h| h > 0.0).count();
                assert_eq!(positive, 1);
            } else {
                assert!(page.content_height <= page.capacity);
            }
        }
    }

    #[test]
    fn test_empty_document_is_one_page() {
        let result = paginate_with_map(&[], &geometry(), &no_bands());
        assert_eq!(result.page_count, 1);
        assert!(result.breaks.is_empty());
        assert!(result.pages[0].is_empty());
        assert_eq!(result.page_of_block(0), None);
    }

    #[test]
    fn test_blocks_fill_pages_greedily() {
        let heights = [300.0, 300.0, 300.0, 300.0, 300.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_count, 3);
        assert_eq!(
            result.breaks,
            vec![
                PageBreak { block_index: 2, page_height: 600.0, cumulative_height: 600.0 },
                PageBreak { block_index: 4, page_height: 600.0, cumulative_height: 1200.0 },
            ]
        );
        assert_invariants(&result, &heights);
    }

    #[test]
    fn test_exact_fit_stays_on_page() {
        let heights = [400.0, 400.0, 10.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.breaks.len(), 1);
        assert_eq!(result.breaks[0].block_index, 2);
        assert_eq!(result.pages[0].remaining(), 0.0);
    }

    #[test]
    fn test_single_oversized_block() {
        let heights = [2500.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_count, 1);
        assert!(result.breaks.is_empty());
        assert!(result.pages[0].overflows);
        assert_eq!(result.pages[0].blocks(), 0..1);
    }

    #[test]
    fn test_oversized_block_is_isolated() {
        let heights = [100.0, 2000.0, 100.0, 100.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_count, 3);
        assert_eq!(result.pages[0].blocks(), 0..1);
        assert_eq!(result.pages[1].blocks(), 1..2);
        assert!(result.pages[1].overflows);
        assert_eq!(result.pages[2].blocks(), 2..4);
        assert!(!result.pages[2].overflows);
        assert_invariants(&result, &heights);
    }

    #[test]
    fn test_consecutive_oversized_blocks_terminate() {
        let heights = [900.0, 900.0, 900.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_count, 3);
        assert!(result.pages.iter().all(|p| p.overflows));
        assert_invariants(&result, &heights);
    }

    #[test]
    fn test_capacity_follows_each_pages_bands() {
        // Page 0 has a 200px header, later pages fall back to none
        let mut map = no_bands();
        map.push(BandHeights::new(200.0, 0.0));

        let heights = [300.0, 300.0, 300.0, 300.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &map);

        assert_eq!(result.pages[0].capacity, 600.0);
        assert_eq!(result.pages[0].blocks(), 0..2);
        assert_eq!(result.pages[1].capacity, 800.0);
        assert_eq!(result.pages[1].blocks(), 2..4);
        assert_eq!(result.height_map.header(0), 200.0);
        assert_eq!(result.height_map.header(1), 0.0);
    }

    #[test]
    fn test_band_heights_queried_once_per_page_in_order() {
        let heights = [500.0, 500.0, 500.0];
        let mut asked = Vec::new();
        let result = paginate(&blocks(&heights), &geometry(), |page| {
            asked.push(page);
            Ok::<_, ()>(BandHeights::new(50.0, 50.0))
        })
        .unwrap();

        assert_eq!(result.page_count, 3);
        assert_eq!(asked, vec![0, 1, 2]);
    }

    #[test]
    fn test_band_height_failure_propagates() {
        let heights = [500.0, 500.0];
        let result = paginate(&blocks(&heights), &geometry(), |page| {
            if page == 1 {
                Err("surface gone")
            } else {
                Ok(BandHeights::default())
            }
        });
        assert_eq!(result, Err("surface gone"));
    }

    #[test]
    fn test_deterministic() {
        let heights = pseudo_random_heights(7, 500);
        let a = paginate_with_map(&blocks(&heights), &geometry(), &HeightMap::uniform(40.0, 30.0));
        let b = paginate_with_map(&blocks(&heights), &geometry(), &HeightMap::uniform(40.0, 30.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_invariants_hold_for_varied_inputs() {
        for seed in 0..20 {
            let heights = pseudo_random_heights(seed, 200);
            let result = paginate_with_map(&blocks(&heights), &geometry(), &HeightMap::uniform(120.0, 90.0));
            assert_invariants(&result, &heights);
        }
    }

    #[test]
    fn test_invariants_hold_with_zero_height_blocks() {
        for seed in 0..20 {
            let mut heights = pseudo_random_heights(seed, 200);
            for h in heights.iter_mut().step_by(3) {
                *h = 0.0;
            }
            // Oversized blocks next to empty ones
            heights.extend([900.0, 0.0, 900.0, 0.0, 0.0, 2000.0]);
            let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());
            assert_invariants(&result, &heights);
        }
    }

    #[test]
    fn test_zero_height_block_stays_on_overflowing_page() {
        let heights = [900.0, 0.0, 900.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_count, 2);
        assert_eq!(
            result.breaks,
            vec![PageBreak { block_index: 2, page_height: 900.0, cumulative_height: 900.0 }]
        );
        assert_eq!(result.pages[0].blocks(), 0..2);
        assert!(result.pages.iter().all(|p| p.overflows));
        assert_invariants(&result, &heights);
    }

    #[test]
    fn test_leading_empty_block_never_leaves_blank_page() {
        let heights = [0.0, 900.0, 100.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.pages[0].blocks(), 0..2);
        assert_eq!(result.breaks.len(), 1);
        assert_eq!(result.breaks[0].block_index, 2);
        assert_invariants(&result, &heights);
    }

    #[test]
    fn test_page_of_block() {
        let heights = [300.0, 300.0, 300.0, 300.0, 300.0];
        let result = paginate_with_map(&blocks(&heights), &geometry(), &no_bands());

        assert_eq!(result.page_of_block(0), Some(0));
        assert_eq!(result.page_of_block(1), Some(0));
        assert_eq!(result.page_of_block(2), Some(1));
        assert_eq!(result.page_of_block(4), Some(2));
        assert_eq!(result.page_of_block(5), None);
        assert!(result.pages[1].contains_block(3));
    }
}
