//! Render output: page overlays regenerated from each pagination result

mod overlay;

pub use overlay::{BreakSpacer, OverlayItem, OverlayLayout, PageOverlay};
