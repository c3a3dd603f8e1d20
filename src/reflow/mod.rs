//! Reflow scheduling: generations, pass tickets and debouncing
//!
//! Every triggering signal bumps the generation. A pass remembers the
//! generation it started at and its result is applied only if nothing newer
//! happened meanwhile, so a slow pass can never overwrite a fresher one.

use crate::geometry::PageGeometry;
use crate::measure::BlockId;
use std::fmt;

/// Quiescence window after the last change before a scheduled reflow runs
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Why a reflow was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    DocumentChanged,
    HeaderFooterChanged,
    GeometryChanged,
    SurfaceResized,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::DocumentChanged => "document",
            Trigger::HeaderFooterChanged => "header/footer",
            Trigger::GeometryChanged => "geometry",
            Trigger::SurfaceResized => "resize",
        })
    }
}

/// Snapshot a pagination pass works on
#[derive(Debug, Clone)]
pub struct PassTicket {
    pub(crate) generation: u64,
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) geometry: PageGeometry,
}

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Blocks to measure, in document order
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }
}

/// Tracks the latest generation and when the next pass is due
#[derive(Debug, Clone)]
pub struct ReflowScheduler {
    generation: u64,
    dirty: bool,
    last_change_ms: u64,
    debounce_ms: u64,
}

impl Default for ReflowScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl ReflowScheduler {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            generation: 0,
            // Nothing has been paginated yet
            dirty: true,
            last_change_ms: 0,
            debounce_ms,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    pub fn set_debounce_ms(&mut self, debounce_ms: u64) {
        self.debounce_ms = debounce_ms;
    }

    /// Record a change; any pass started before it becomes stale
    pub fn note_change(&mut self, trigger: Trigger, now_ms: u64) -> u64 {
        self.generation += 1;
        self.dirty = true;
        self.last_change_ms = now_ms;
        tracing::trace!(generation = self.generation, %trigger, "reflow requested");
        self.generation
    }

    /// Claim a new generation for a pass about to start
    pub fn start_pass(&mut self) -> u64 {
        self.generation += 1;
        self.dirty = false;
        self.generation
    }

    /// Ask for another pass after a skipped one
    pub fn defer(&mut self, now_ms: u64) {
        self.dirty = true;
        self.last_change_ms = now_ms;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty and quiet for at least the debounce window
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.dirty && now_ms.saturating_sub(self.last_change_ms) >= self.debounce_ms
    }
}

/// Current time in milliseconds
pub fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
