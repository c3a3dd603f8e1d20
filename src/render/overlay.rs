//! Overlay layout: page backgrounds, gaps and header/footer bands
//!
//! The overlay never enters the document's block sequence. It is a separate
//! list of rectangles the host draws over (or around) its content, rebuilt in
//! full from every new [`PaginationResult`].

use crate::geometry::PageGeometry;
use crate::header_footer::{expand, BandKind, HeaderFooterSpec, Side, ZoneId};
use crate::layout::{PageSpan, PaginationResult};
use crate::Rect;
use serde::Serialize;
use smallvec::SmallVec;

/// A decoration to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OverlayItem {
    /// Page sheet
    PageBackground { rect: Rect },
    /// Space between two pages, drawn before every page but the first
    #[serde(rename_all = "camelCase")]
    PageGap {
        rect: Rect,
        background: String,
        border_size: f32,
        border_color: String,
    },
    /// One half of a header or footer band
    Band { zone: ZoneId, rect: Rect, text: String },
}

/// Decorations of one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOverlay {
    pub page_index: usize,
    pub bounds: Rect,
    /// Where the page's blocks are laid out
    pub content_rect: Rect,
    pub items: SmallVec<[OverlayItem; 6]>,
}

impl PageOverlay {
    /// Header/footer zones of this page with their expanded text
    pub fn band_regions(&self) -> impl Iterator<Item = (ZoneId, &Rect, &str)> {
        self.items.iter().filter_map(|item| match item {
            OverlayItem::Band { zone, rect, text } => Some((*zone, rect, text.as_str())),
            _ => None,
        })
    }

    pub fn band_text(&self, zone: ZoneId) -> Option<&str> {
        self.band_regions()
            .find(|(z, _, _)| *z == zone)
            .map(|(_, _, text)| text)
    }
}

/// Vertical space the host inserts before a block so it starts on the next page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakSpacer {
    /// Block the spacer goes in front of
    pub before_block: usize,
    /// Page that block opens
    pub page_index: usize,
    pub height: f32,
}

/// Complete overlay for one pagination result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    pub generation: u64,
    pub page_width: f32,
    pub total_height: f32,
    /// Offset of the first block from the top of the first page
    pub content_top: f32,
    pub pages: Vec<PageOverlay>,
    pub spacers: Vec<BreakSpacer>,
}

impl OverlayLayout {
    /// Build overlays for every page of `result`
    pub fn build(
        result: &PaginationResult,
        geometry: &PageGeometry,
        spec: &HeaderFooterSpec,
    ) -> Self {
        let pages: Vec<PageOverlay> = result
            .pages
            .iter()
            .map(|span| Self::page_overlay(span, geometry, spec))
            .collect();

        let spacers = result
            .pages
            .windows(2)
            .map(|pair| BreakSpacer {
                before_block: pair[1].start_block,
                page_index: pair[1].page_index,
                height: Self::spacer_height(&pair[0], &pair[1], geometry),
            })
            .collect();

        let content_top = result
            .pages
            .first()
            .map(|first| geometry.margin_top + first.bands.header + geometry.content_margin_top)
            .unwrap_or(geometry.margin_top);

        tracing::debug!(
            generation = result.generation,
            pages = pages.len(),
            "overlay rebuilt"
        );

        Self {
            generation: result.generation,
            page_width: geometry.page_width,
            total_height: geometry.document_height(result.page_count),
            content_top,
            pages,
            spacers,
        }
    }

    fn page_overlay(span: &PageSpan, geometry: &PageGeometry, spec: &HeaderFooterSpec) -> PageOverlay {
        let top = geometry.page_top(span.page_index);
        let bounds = Rect::new(0.0, top, geometry.page_width, geometry.page_height);
        let content_width = geometry.content_width();
        let half = content_width / 2.0;

        let mut items = SmallVec::new();

        if span.page_index > 0 {
            items.push(OverlayItem::PageGap {
                rect: Rect::new(0.0, top - geometry.page_gap, geometry.page_width, geometry.page_gap),
                background: geometry.page_break_background.clone(),
                border_size: geometry.page_gap_border_size,
                border_color: geometry.page_gap_border_color.clone(),
            });
        }

        items.push(OverlayItem::PageBackground { rect: bounds });

        let header_y = top + geometry.margin_top;
        let footer_y = top + geometry.page_height - geometry.margin_bottom - span.bands.footer;

        for zone in ZoneId::ALL {
            let (y, height) = match zone.band {
                BandKind::Header => (header_y, span.bands.header),
                BandKind::Footer => (footer_y, span.bands.footer),
            };
            let x = match zone.side {
                Side::Left => geometry.margin_left,
                Side::Right => geometry.margin_left + half,
            };
            items.push(OverlayItem::Band {
                zone,
                rect: Rect::new(x, y, half, height),
                text: expand(spec.slot(zone), span.page_index),
            });
        }

        let content_rect = Rect::new(
            geometry.margin_left,
            header_y + span.bands.header + geometry.content_margin_top,
            content_width,
            span.capacity.max(0.0),
        );

        PageOverlay {
            page_index: span.page_index,
            bounds,
            content_rect,
            items,
        }
    }

    // Unused capacity, the rest of `prev`, the gap, then `next` down to its content.
    fn spacer_height(prev: &PageSpan, next: &PageSpan, geometry: &PageGeometry) -> f32 {
        let bottom = geometry.content_margin_bottom + prev.bands.footer + geometry.margin_bottom;
        let top = geometry.margin_top + next.bands.header + geometry.content_margin_top;
        prev.remaining() + bottom + geometry.page_gap + top
    }

    pub fn page(&self, page_index: usize) -> Option<&PageOverlay> {
        self.pages.get(page_index)
    }

    /// Pages intersecting a viewport, for hosts that only draw what is visible
    pub fn visible_pages(&self, viewport: Rect) -> impl Iterator<Item = &PageOverlay> {
        self.pages
            .iter()
            .filter(move |page| page.bounds.intersects(&viewport))
    }

    /// Page whose sheet contains `y`; gaps belong to no page
    pub fn page_at_y(&self, y: f32, geometry: &PageGeometry) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let index = (y / geometry.page_stride()).floor() as usize;
        let page = self.pages.get(index)?;
        (y <= page.bounds.y + page.bounds.height).then_some(index)
    }
}
