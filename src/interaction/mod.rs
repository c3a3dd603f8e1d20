//! Pointer routing for header and footer zones

use crate::header_footer::{BandKind, HeaderFooterSpec, Side, ZoneId};
use crate::render::OverlayLayout;
use crate::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pointer press in overlay coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClickEvent {
    pub point: Point,
}

impl ClickEvent {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            point: Point { x, y },
        }
    }
}

/// Which zone of which page was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneHit {
    pub page_index: usize,
    pub zone: ZoneId,
}

/// Handed to click callbacks
#[derive(Debug)]
pub struct ClickContext<'a> {
    pub event: &'a ClickEvent,
    pub page_index: usize,
    /// Current template of the clicked slot
    pub text: &'a str,
    /// The slot as drawn on this page
    pub displayed: &'a str,
}

pub type ClickHandler = Box<dyn FnMut(Side, &ClickContext<'_>)>;

/// Find the header/footer zone under `point`
pub fn classify_region(point: Point, overlay: &OverlayLayout) -> Option<ZoneHit> {
    let page = overlay
        .pages
        .iter()
        .find(|page| page.bounds.contains_point(point))?;

    page.band_regions()
        .find(|(_, rect, _)| rect.width > 0.0 && rect.height > 0.0 && rect.contains_point(point))
        .map(|(zone, _, _)| ZoneHit {
            page_index: page.page_index,
            zone,
        })
}

/// Dispatches clicks on bands to host callbacks.
///
/// Never edits the templates itself; a callback that wants new text goes
/// through the engine's update calls.
#[derive(Default)]
pub struct InteractionRouter {
    on_header_click: Option<ClickHandler>,
    on_footer_click: Option<ClickHandler>,
}

impl fmt::Debug for InteractionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionRouter")
            .field("on_header_click", &self.on_header_click.is_some())
            .field("on_footer_click", &self.on_footer_click.is_some())
            .finish()
    }
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_header_click(&mut self, handler: impl FnMut(Side, &ClickContext<'_>) + 'static) {
        self.on_header_click = Some(Box::new(handler));
    }

    pub fn on_footer_click(&mut self, handler: impl FnMut(Side, &ClickContext<'_>) + 'static) {
        self.on_footer_click = Some(Box::new(handler));
    }

    /// Hit-test `event` and fire the matching callback, if any
    pub fn route_click(
        &mut self,
        event: &ClickEvent,
        overlay: &OverlayLayout,
        spec: &HeaderFooterSpec,
    ) -> Option<ZoneHit> {
        let hit = classify_region(event.point, overlay)?;
        let displayed = overlay
            .page(hit.page_index)
            .and_then(|page| page.band_text(hit.zone))
            .unwrap_or_default();

        let handler = match hit.zone.band {
            BandKind::Header => self.on_header_click.as_mut(),
            BandKind::Footer => self.on_footer_click.as_mut(),
        };

        if let Some(handler) = handler {
            let context = ClickContext {
                event,
                page_index: hit.page_index,
                text: spec.slot(hit.zone),
                displayed,
            };
            handler(hit.zone.side, &context);
        } else {
            tracing::debug!(zone = %hit.zone, "no handler for zone");
        }

        Some(hit)
    }
}
