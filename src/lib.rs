//! page-flow: pagination for continuously-flowing rich-text documents
//!
//! This crate turns the measured heights of a document's top-level blocks into
//! fixed-size pages with headers and footers, without touching the document:
//! - Block-aligned greedy page breaks (no block is ever split)
//! - Per-page header/footer bands with `{page}` substitution
//! - Overlay layout the host draws around its content
//! - Generation-checked reflow so stale passes are never shown

pub mod config;
pub mod error;
pub mod geometry;
pub mod header_footer;
pub mod interaction;
pub mod layout;
pub mod measure;
pub mod reflow;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use config::PaginationConfig;
pub use error::{ConfigError, Error, InvalidGeometryError, MeasureError};
pub use geometry::{PageGeometry, PagePreset};
pub use header_footer::{expand, BandKind, HeaderFooterManager, HeaderFooterSpec, HeightMap, Side, ZoneId};
pub use interaction::{classify_region, ClickContext, ClickEvent, InteractionRouter, ZoneHit};
pub use layout::{paginate, paginate_with_map, PageBreak, PageSpan, PaginationResult};
pub use measure::{BlockId, HeightMeasurer, MeasuredBlock, StaticMeasurer};
pub use reflow::{PassTicket, ReflowScheduler, Trigger};
pub use render::{OverlayItem, OverlayLayout, PageOverlay};

use serde::{Deserialize, Serialize};

/// Overlay coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Overlay rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// What a reflow attempt did
#[derive(Debug, Clone, PartialEq)]
pub enum ReflowOutcome {
    /// A new result replaced the previous one
    Applied { generation: u64, page_count: usize },
    /// Measurement failed; the previous result stays
    Skipped(MeasureError),
    /// Something newer started first; the result was discarded
    Stale { generation: u64 },
    /// Nothing to do yet
    Idle,
}

/// The pagination engine, owning all state for one document
#[derive(Debug)]
pub struct Paginator {
    geometry: PageGeometry,
    header_footer: HeaderFooterManager,
    blocks: Vec<BlockId>,
    result: PaginationResult,
    overlay: OverlayLayout,
    router: InteractionRouter,
    scheduler: ReflowScheduler,
    print_mode: bool,
}

impl Paginator {
    /// Create an engine from a host configuration
    pub fn new(config: &PaginationConfig) -> error::Result<Self> {
        let geometry = config.geometry()?;
        let header_footer = HeaderFooterManager::new(
            config.header_footer(),
            config.header_min_height,
            config.footer_min_height,
            geometry.content_width(),
        );
        let result = PaginationResult::empty(&geometry, header_footer.default_heights());
        let overlay = OverlayLayout::build(&result, &geometry, header_footer.spec());

        Ok(Self {
            geometry,
            header_footer,
            blocks: Vec::new(),
            result,
            overlay,
            router: InteractionRouter::new(),
            scheduler: ReflowScheduler::new(config.debounce_ms),
            print_mode: false,
        })
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn spec(&self) -> &HeaderFooterSpec {
        self.header_footer.spec()
    }

    pub fn header_footer(&self) -> &HeaderFooterManager {
        &self.header_footer
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Last applied pagination result
    pub fn result(&self) -> &PaginationResult {
        &self.result
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.result.page_count.max(1)
    }

    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    pub fn is_dirty(&self) -> bool {
        self.scheduler.is_dirty()
    }

    /// Overlay to draw, hidden while printing
    pub fn overlay(&self) -> Option<&OverlayLayout> {
        (!self.print_mode).then_some(&self.overlay)
    }

    /// Replace the geometry; a rejected one leaves the current geometry in place
    pub fn set_geometry(&mut self, geometry: PageGeometry) -> Result<(), InvalidGeometryError> {
        let header = self.header_footer.band_height(BandKind::Header, 0);
        let footer = self.header_footer.band_height(BandKind::Footer, 0);
        if let Err(err) = geometry.validate(header, footer) {
            tracing::warn!(%err, "page geometry rejected");
            return Err(err);
        }

        self.header_footer.set_band_width(geometry.content_width());
        self.geometry = geometry;
        self.note_change(Trigger::GeometryChanged);
        Ok(())
    }

    /// Switch page size, keeping gap styling and content margins
    pub fn set_preset(&mut self, preset: PagePreset) -> Result<(), InvalidGeometryError> {
        let size = preset.size();
        let geometry = PageGeometry {
            page_height: size.page_height,
            page_width: size.page_width,
            margin_top: size.margin_top,
            margin_bottom: size.margin_bottom,
            margin_left: size.margin_left,
            margin_right: size.margin_right,
            ..self.geometry.clone()
        };
        self.set_geometry(geometry)
    }

    /// The document changed; `blocks` is its new top-level block order
    pub fn set_blocks(&mut self, blocks: Vec<BlockId>) {
        self.blocks = blocks;
        self.note_change(Trigger::DocumentChanged);
    }

    /// Content changed inside blocks whose order did not
    pub fn document_changed(&mut self) {
        self.note_change(Trigger::DocumentChanged);
    }

    /// Replace all four header/footer templates
    pub fn set_content(
        &mut self,
        header_left: &str,
        header_right: &str,
        footer_left: &str,
        footer_right: &str,
    ) {
        self.header_footer
            .set_content(header_left, header_right, footer_left, footer_right);
        self.note_change(Trigger::HeaderFooterChanged);
    }

    pub fn update_header_content(&mut self, left: &str, right: &str) {
        self.header_footer.update_header(left, right);
        self.note_change(Trigger::HeaderFooterChanged);
    }

    pub fn update_footer_content(&mut self, left: &str, right: &str) {
        self.header_footer.update_footer(left, right);
        self.note_change(Trigger::HeaderFooterChanged);
    }

    /// The rendering surface changed size; every band must be measured again
    pub fn surface_resized(&mut self) {
        self.header_footer.invalidate_all();
        self.note_change(Trigger::SurfaceResized);
    }

    /// Native printing takes over pagination while active
    pub fn set_print_mode(&mut self, active: bool) {
        self.print_mode = active;
    }

    pub fn print_mode(&self) -> bool {
        self.print_mode
    }

    pub fn on_header_click(&mut self, handler: impl FnMut(Side, &ClickContext<'_>) + 'static) {
        self.router.on_header_click(handler);
    }

    pub fn on_footer_click(&mut self, handler: impl FnMut(Side, &ClickContext<'_>) + 'static) {
        self.router.on_footer_click(handler);
    }

    /// Route a click to the header/footer callbacks
    pub fn route_click(&mut self, event: ClickEvent) -> Option<ZoneHit> {
        if self.print_mode {
            return None;
        }
        self.router
            .route_click(&event, &self.overlay, self.header_footer.spec())
    }

    /// Start a pass over the current content; anything started earlier goes stale
    pub fn begin_pass(&mut self) -> PassTicket {
        let generation = self.scheduler.start_pass();
        tracing::debug!(generation, blocks = self.blocks.len(), "pagination pass started");
        PassTicket {
            generation,
            blocks: self.blocks.clone(),
            geometry: self.geometry.clone(),
        }
    }

    /// Measure and paginate for `ticket`, applying the result if still current
    pub fn complete_pass<M: HeightMeasurer + ?Sized>(
        &mut self,
        ticket: PassTicket,
        measurer: &mut M,
    ) -> ReflowOutcome {
        if !self.scheduler.is_current(ticket.generation) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.scheduler.generation(),
                "discarding stale pass"
            );
            return ReflowOutcome::Stale {
                generation: ticket.generation,
            };
        }

        let blocks = match measure::measure_sequence(measurer, &ticket.blocks) {
            Ok(blocks) => blocks,
            Err(err) => return self.skip(err),
        };

        let header_footer = &mut self.header_footer;
        let geometry = &ticket.geometry;
        let result = paginate(&blocks, geometry, |page| {
            let bands = header_footer.measure_page(page, &mut *measurer)?;
            let usable = geometry.usable_height(bands.header, bands.footer);
            if usable <= 0.0 {
                return Err(MeasureError::NoContentSpace { page, usable });
            }
            Ok(bands)
        });
        let result = match result {
            Ok(result) => result.with_generation(ticket.generation),
            Err(err) => return self.skip(err),
        };

        tracing::debug!(
            generation = ticket.generation,
            pages = result.page_count,
            breaks = result.breaks.len(),
            "pagination pass applied"
        );

        self.overlay = OverlayLayout::build(&result, &ticket.geometry, self.header_footer.spec());
        let page_count = result.page_count;
        self.result = result;

        ReflowOutcome::Applied {
            generation: ticket.generation,
            page_count,
        }
    }

    /// Run a full pass now
    pub fn reflow<M: HeightMeasurer + ?Sized>(&mut self, measurer: &mut M) -> ReflowOutcome {
        let ticket = self.begin_pass();
        self.complete_pass(ticket, measurer)
    }

    /// Reflow if a change is pending and the debounce window has passed
    pub fn poll<M: HeightMeasurer + ?Sized>(&mut self, measurer: &mut M) -> ReflowOutcome {
        self.poll_at(reflow::current_timestamp(), measurer)
    }

    pub fn poll_at<M: HeightMeasurer + ?Sized>(&mut self, now_ms: u64, measurer: &mut M) -> ReflowOutcome {
        if !self.scheduler.is_due(now_ms) {
            return ReflowOutcome::Idle;
        }
        self.reflow(measurer)
    }

    fn note_change(&mut self, trigger: Trigger) {
        self.scheduler
            .note_change(trigger, reflow::current_timestamp());
    }

    fn skip(&mut self, err: MeasureError) -> ReflowOutcome {
        tracing::warn!(%err, "pagination pass skipped, keeping previous result");
        self.scheduler.defer(reflow::current_timestamp());
        ReflowOutcome::Skipped(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::BandSizing;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Letter page, 40px header and 30px footer minimums: 794px usable
    fn config() -> PaginationConfig {
        PaginationConfig {
            header_left: "USCIS Document".to_string(),
            header_right: "Page {page}".to_string(),
            footer_left: "Confidential".to_string(),
            footer_right: "Draft - January 2026".to_string(),
            header_min_height: 40.0,
            footer_min_height: 30.0,
            debounce_ms: 0,
            ..Default::default()
        }
    }

    fn ids(n: u64) -> Vec<BlockId> {
        (0..n).map(BlockId).collect()
    }

    fn measurer(heights: &[f32]) -> StaticMeasurer {
        StaticMeasurer::from_heights(heights)
            .with_bands(BandSizing::Fixed(40.0), BandSizing::Fixed(30.0))
    }

    #[test]
    fn test_new_engine_has_one_page() {
        let paginator = Paginator::new(&config()).unwrap();
        assert_eq!(paginator.page_count(), 1);
        assert!(paginator.result().breaks.is_empty());
        assert_eq!(paginator.overlay().unwrap().pages.len(), 1);
        assert!(paginator.is_dirty());
    }

    #[test]
    fn test_reflow_paginates_blocks() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut measurer = measurer(&[300.0; 5]);
        paginator.set_blocks(ids(5));

        let outcome = paginator.reflow(&mut measurer);
        assert!(matches!(outcome, ReflowOutcome::Applied { page_count: 3, .. }));
        assert_eq!(paginator.page_count(), 3);
        assert_eq!(measurer.block_batches(), 1);

        let overlay = paginator.overlay().unwrap();
        assert_eq!(overlay.pages.len(), 3);
        assert_eq!(overlay.pages[2].band_text(ZoneId::HEADER_RIGHT), Some("Page 3"));
        assert_eq!(overlay.generation, paginator.result().generation);
    }

    #[test]
    fn test_stale_pass_is_discarded() {
        let mut paginator = Paginator::new(&config()).unwrap();
        paginator.set_blocks(ids(2));
        let pass_a = paginator.begin_pass();

        paginator.set_blocks(ids(5));
        let pass_b = paginator.begin_pass();

        let mut surface = measurer(&[300.0; 5]);
        let b = paginator.complete_pass(pass_b, &mut surface);
        let a = paginator.complete_pass(pass_a, &mut surface);

        assert!(matches!(b, ReflowOutcome::Applied { page_count: 3, .. }));
        assert!(matches!(a, ReflowOutcome::Stale { .. }));
        assert_eq!(paginator.page_count(), 3);
    }

    #[test]
    fn test_stale_pass_never_rendered_even_if_finished_first() {
        let mut paginator = Paginator::new(&config()).unwrap();
        paginator.set_blocks(ids(2));
        let pass_a = paginator.begin_pass();
        let pass_b = paginator.begin_pass();

        let mut surface = measurer(&[300.0; 2]);
        assert!(matches!(
            paginator.complete_pass(pass_a, &mut surface),
            ReflowOutcome::Stale { .. }
        ));
        assert_eq!(paginator.result().generation, 0);

        let generation = pass_b.generation();
        paginator.complete_pass(pass_b, &mut surface);
        assert_eq!(paginator.result().generation, generation);
    }

    #[test]
    fn test_measurement_failure_keeps_previous_result() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[300.0; 5]);
        paginator.set_blocks(ids(5));
        paginator.reflow(&mut surface);
        let before = paginator.result().clone();

        paginator.set_blocks(ids(6));
        let outcome = paginator.reflow(&mut surface);

        assert_eq!(outcome, ReflowOutcome::Skipped(MeasureError::BlockNotAttached(BlockId(5))));
        assert_eq!(paginator.result(), &before);
        assert!(paginator.is_dirty());

        surface.set_block(BlockId(5), 300.0);
        assert!(matches!(paginator.reflow(&mut surface), ReflowOutcome::Applied { .. }));
        assert_eq!(paginator.page_count(), 3);
    }

    #[test]
    fn test_measured_band_taller_than_page_skips_pass() {
        let mut config = config();
        config.header_min_height = 0.0;
        config.footer_min_height = 0.0;
        let mut paginator = Paginator::new(&config).unwrap();
        let mut surface = StaticMeasurer::from_heights(&[10.0; 4]);
        paginator.set_blocks(ids(4));
        assert!(matches!(paginator.reflow(&mut surface), ReflowOutcome::Applied { page_count: 1, .. }));
        let before = paginator.result().clone();

        // 1056 - 192 = 864 left for bands and content
        surface.set_band_sizing(BandKind::Header, BandSizing::Fixed(900.0));
        paginator.update_header_content("A header that wraps far too much", "");
        assert_eq!(
            paginator.reflow(&mut surface),
            ReflowOutcome::Skipped(MeasureError::NoContentSpace { page: 0, usable: -36.0 })
        );
        assert_eq!(paginator.result(), &before);
        assert!(paginator.is_dirty());
    }

    #[test]
    fn test_surface_not_ready_is_transient() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[300.0; 3]);
        surface.set_ready(false);
        paginator.set_blocks(ids(3));

        assert_eq!(
            paginator.reflow(&mut surface),
            ReflowOutcome::Skipped(MeasureError::SurfaceNotReady)
        );
        assert_eq!(paginator.page_count(), 1);
    }

    #[test]
    fn test_header_update_leaves_footer_alone() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[100.0]).with_bands(BandSizing::Fixed(60.0), BandSizing::Fixed(50.0));
        paginator.set_blocks(ids(1));
        paginator.reflow(&mut surface);

        paginator.update_header_content("New header", "{page} of many");

        assert_eq!(paginator.spec().footer_left, "Confidential");
        assert_eq!(paginator.spec().footer_right, "Draft - January 2026");
        assert_eq!(paginator.header_footer().band_height(BandKind::Footer, 0), 50.0);
        assert_eq!(paginator.header_footer().band_height(BandKind::Header, 0), 40.0);
        assert!(paginator.is_dirty());
    }

    #[test]
    fn test_footer_update_leaves_header_alone() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[100.0]).with_bands(BandSizing::Fixed(60.0), BandSizing::Fixed(50.0));
        paginator.set_blocks(ids(1));
        paginator.reflow(&mut surface);

        paginator.update_footer_content("Public", "");

        assert_eq!(paginator.spec().header_left, "USCIS Document");
        assert_eq!(paginator.spec().header_right, "Page {page}");
        assert_eq!(paginator.header_footer().band_height(BandKind::Header, 0), 60.0);
        assert_eq!(paginator.header_footer().band_height(BandKind::Footer, 0), 30.0);
    }

    #[test]
    fn test_taller_header_reduces_capacity() {
        let mut paginator = Paginator::new(&config()).unwrap();
        // 1056 - 192 - 40 - 30 = 794: two 390px blocks fit
        let mut surface = measurer(&[390.0; 2]);
        paginator.set_blocks(ids(2));
        paginator.reflow(&mut surface);
        assert_eq!(paginator.page_count(), 1);

        surface.set_band_sizing(BandKind::Header, BandSizing::Fixed(100.0));
        paginator.update_header_content("A much taller header", "");
        paginator.reflow(&mut surface);
        assert_eq!(paginator.page_count(), 2);
    }

    #[test]
    fn test_rejected_geometry_keeps_previous() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let before = paginator.geometry().clone();
        let generation = paginator.generation();

        let bad = PageGeometry {
            margin_top: 600.0,
            margin_bottom: 600.0,
            ..before.clone()
        };
        assert!(matches!(
            paginator.set_geometry(bad),
            Err(InvalidGeometryError::NoContentSpace { .. })
        ));
        assert_eq!(paginator.geometry(), &before);
        assert_eq!(paginator.generation(), generation);
    }

    #[test]
    fn test_set_preset_keeps_styling() {
        let mut config = config();
        config.page_gap = Some(32.0);
        let mut paginator = Paginator::new(&config).unwrap();

        paginator.set_preset(PagePreset::A4).unwrap();
        assert_eq!(paginator.geometry().page_height, 1123.0);
        assert_eq!(paginator.geometry().margin_left, 76.0);
        assert_eq!(paginator.geometry().page_gap, 32.0);
    }

    #[test]
    fn test_print_mode_hides_overlay_without_recomputing() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[300.0; 5]);
        paginator.set_blocks(ids(5));
        paginator.reflow(&mut surface);
        let result = paginator.result().clone();
        let generation = paginator.generation();

        paginator.set_print_mode(true);
        assert!(paginator.overlay().is_none());
        assert_eq!(paginator.result(), &result);
        assert_eq!(paginator.generation(), generation);
        assert_eq!(paginator.route_click(ClickEvent::at(200.0, 110.0)), None);

        paginator.set_print_mode(false);
        assert_eq!(paginator.overlay().unwrap().pages.len(), 3);
    }

    #[test]
    fn test_click_routes_to_host_callback() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[100.0]);
        paginator.set_blocks(ids(1));
        paginator.reflow(&mut surface);

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        paginator.on_header_click(move |side, ctx| {
            *sink.borrow_mut() = Some((side, ctx.text.to_string()));
        });

        // Letter: header band spans y 96..136, right half from x 408
        let hit = paginator.route_click(ClickEvent::at(500.0, 110.0));
        assert_eq!(hit.map(|h| h.zone), Some(ZoneId::HEADER_RIGHT));
        assert_eq!(*seen.borrow(), Some((Side::Right, "Page {page}".to_string())));

        // The router never edits templates
        assert_eq!(paginator.spec().header_right, "Page {page}");
    }

    #[test]
    fn test_poll_waits_for_quiet_period() {
        let mut config = config();
        config.debounce_ms = 10_000;
        let mut paginator = Paginator::new(&config).unwrap();
        let mut surface = measurer(&[300.0; 3]);

        paginator.set_blocks(ids(1));
        paginator.set_blocks(ids(2));
        paginator.set_blocks(ids(3));

        let now = reflow::current_timestamp();
        assert_eq!(paginator.poll_at(now, &mut surface), ReflowOutcome::Idle);

        let outcome = paginator.poll_at(now + 20_000, &mut surface);
        assert!(matches!(outcome, ReflowOutcome::Applied { page_count: 2, .. }));
        assert_eq!(surface.block_batches(), 1);
        assert_eq!(paginator.poll_at(now + 40_000, &mut surface), ReflowOutcome::Idle);
    }

    #[test]
    fn test_document_changed_picks_up_new_heights() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[300.0; 3]);
        paginator.set_blocks(ids(3));
        paginator.reflow(&mut surface);
        assert_eq!(paginator.page_count(), 2);
        assert!(!paginator.is_dirty());

        // Same blocks, the middle one grew
        surface.set_block(BlockId(1), 700.0);
        paginator.document_changed();
        assert!(paginator.is_dirty());
        paginator.reflow(&mut surface);
        assert_eq!(paginator.page_count(), 3);
    }

    #[test]
    fn test_surface_resize_remeasures_bands() {
        let mut paginator = Paginator::new(&config()).unwrap();
        let mut surface = measurer(&[100.0]);
        paginator.set_blocks(ids(1));
        paginator.reflow(&mut surface);
        let measured = surface.band_measurements();

        paginator.surface_resized();
        paginator.reflow(&mut surface);
        assert_eq!(surface.band_measurements(), measured + 2);
    }
}
