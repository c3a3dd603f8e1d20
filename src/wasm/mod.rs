//! WASM bindings for the paginator

use crate::error::MeasureError;
use crate::header_footer::{BandContent, BandKind, BandStyle, Side};
use crate::measure::{BlockId, HeightMeasurer};
use crate::reflow::PassTicket;
use crate::{ClickEvent, PagePreset, PageGeometry, PaginationConfig, Paginator, ReflowOutcome};
use js_sys::{Array, Function};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn host_error(err: JsValue) -> MeasureError {
    MeasureError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

fn outcome_name(outcome: &ReflowOutcome) -> &'static str {
    match outcome {
        ReflowOutcome::Applied { .. } => "applied",
        ReflowOutcome::Skipped(_) => "skipped",
        ReflowOutcome::Stale { .. } => "stale",
        ReflowOutcome::Idle => "idle",
    }
}

/// Where block heights come from for one pass
enum BlockSource<'a> {
    /// `measureBlocks(ids) -> number[] | null`
    Callback(&'a Function),
    /// Heights the host measured after `beginPass`
    Measured(FxHashMap<BlockId, f32>),
}

/// Adapter from JS measuring functions to [`HeightMeasurer`]
struct JsMeasurer<'a> {
    blocks: BlockSource<'a>,
    /// `measureBand(kind, left, right, width) -> number`
    measure_band: &'a Function,
}

impl HeightMeasurer for JsMeasurer<'_> {
    fn measure_blocks(&mut self, ids: &[BlockId]) -> Result<FxHashMap<BlockId, f32>, MeasureError> {
        let measure = match &self.blocks {
            BlockSource::Measured(heights) => return Ok(heights.clone()),
            BlockSource::Callback(measure) => measure,
        };

        let batch: Array = ids.iter().map(|id| JsValue::from_f64(id.0 as f64)).collect();
        let returned = measure.call1(&JsValue::NULL, &batch).map_err(host_error)?;
        if returned.is_null() || returned.is_undefined() {
            return Err(MeasureError::SurfaceNotReady);
        }

        let heights = Array::from(&returned);
        ids.iter()
            .enumerate()
            .map(|(idx, &id)| {
                let height = heights
                    .get(idx as u32)
                    .as_f64()
                    .ok_or(MeasureError::BlockNotAttached(id))?;
                Ok((id, height as f32))
            })
            .collect()
    }

    fn measure_band(&mut self, content: &BandContent, style: &BandStyle) -> Result<f32, MeasureError> {
        let kind = match style.kind {
            BandKind::Header => "header",
            BandKind::Footer => "footer",
        };
        let args = Array::of4(
            &JsValue::from_str(kind),
            &JsValue::from_str(&content.left),
            &JsValue::from_str(&content.right),
            &JsValue::from_f64(style.width as f64),
        );
        let returned = self
            .measure_band
            .apply(&JsValue::NULL, &args)
            .map_err(host_error)?;
        returned
            .as_f64()
            .map(|height| height as f32)
            .ok_or(MeasureError::SurfaceNotReady)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PassInfo {
    generation: u64,
    blocks: Vec<u64>,
    page_width: f32,
    content_width: f32,
}

/// WASM-exposed paginator wrapper
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator,
    /// Newest pass started with `beginPass`; older ones can never apply
    pending: Option<PassTicket>,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator from a JSON config (empty string for US Letter defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmPaginator, JsValue> {
        let config = if config_json.trim().is_empty() {
            PaginationConfig::default()
        } else {
            PaginationConfig::from_json(config_json).map_err(to_js)?
        };
        let paginator = Paginator::new(&config).map_err(to_js)?;

        Ok(Self {
            paginator,
            pending: None,
        })
    }

    /// Document changed: new top-level block order
    #[wasm_bindgen(js_name = setBlocks)]
    pub fn set_blocks(&mut self, ids: &[f64]) {
        let blocks = ids.iter().map(|&id| BlockId(id as u64)).collect();
        self.paginator.set_blocks(blocks);
    }

    #[wasm_bindgen(js_name = documentChanged)]
    pub fn document_changed(&mut self) {
        self.paginator.document_changed();
    }

    #[wasm_bindgen(js_name = updateHeaderContent)]
    pub fn update_header_content(&mut self, left: &str, right: &str) {
        self.paginator.update_header_content(left, right);
    }

    #[wasm_bindgen(js_name = updateFooterContent)]
    pub fn update_footer_content(&mut self, left: &str, right: &str) {
        self.paginator.update_footer_content(left, right);
    }

    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, header_left: &str, header_right: &str, footer_left: &str, footer_right: &str) {
        self.paginator
            .set_content(header_left, header_right, footer_left, footer_right);
    }

    /// Switch to a named page size ("letter", "a4", ...)
    #[wasm_bindgen(js_name = setPreset)]
    pub fn set_preset(&mut self, name: &str) -> Result<(), JsValue> {
        let preset: PagePreset = name.parse().map_err(to_js)?;
        self.paginator.set_preset(preset).map_err(to_js)
    }

    /// Replace the geometry with a JSON `PageGeometry`
    #[wasm_bindgen(js_name = setGeometry)]
    pub fn set_geometry(&mut self, geometry_json: &str) -> Result<(), JsValue> {
        let geometry: PageGeometry = serde_json::from_str(geometry_json).map_err(to_js)?;
        self.paginator.set_geometry(geometry).map_err(to_js)
    }

    #[wasm_bindgen(js_name = surfaceResized)]
    pub fn surface_resized(&mut self) {
        self.paginator.surface_resized();
    }

    #[wasm_bindgen(js_name = setPrintMode)]
    pub fn set_print_mode(&mut self, active: bool) {
        self.paginator.set_print_mode(active);
    }

    /// Measure and paginate now through the given JS measuring functions
    pub fn reflow(&mut self, measure_blocks: &Function, measure_band: &Function) -> String {
        let mut measurer = JsMeasurer {
            blocks: BlockSource::Callback(measure_blocks),
            measure_band,
        };
        let outcome = self.paginator.reflow(&mut measurer);
        outcome_name(&outcome).to_string()
    }

    /// Reflow only once the debounce window has passed since the last change
    pub fn poll(&mut self, measure_blocks: &Function, measure_band: &Function) -> String {
        let mut measurer = JsMeasurer {
            blocks: BlockSource::Callback(measure_blocks),
            measure_band,
        };
        let outcome = self.paginator.poll(&mut measurer);
        outcome_name(&outcome).to_string()
    }

    /// Start an asynchronous pass; returns `{generation, blocks, ...}` as JSON
    #[wasm_bindgen(js_name = beginPass)]
    pub fn begin_pass(&mut self) -> Result<String, JsValue> {
        let ticket = self.paginator.begin_pass();
        let geometry = self.paginator.geometry();
        let info = PassInfo {
            generation: ticket.generation(),
            blocks: ticket.blocks().iter().map(|id| id.0).collect(),
            page_width: geometry.page_width,
            content_width: geometry.content_width(),
        };
        let json = serde_json::to_string(&info).map_err(to_js)?;
        self.pending = Some(ticket);
        Ok(json)
    }

    /// Finish a pass with heights measured in `blocks` order
    #[wasm_bindgen(js_name = completePass)]
    pub fn complete_pass(&mut self, generation: f64, heights: &[f64], measure_band: &Function) -> Result<String, JsValue> {
        let generation = generation as u64;
        let ticket = match self.pending.take() {
            Some(ticket) if ticket.generation() == generation => ticket,
            newer => {
                self.pending = newer;
                tracing::debug!(generation, "completed pass is not the newest");
                return Ok(outcome_name(&ReflowOutcome::Stale { generation }).to_string());
            }
        };

        let measured = ticket
            .blocks()
            .iter()
            .zip(heights)
            .map(|(&id, &height)| (id, height as f32))
            .collect();
        let mut measurer = JsMeasurer {
            blocks: BlockSource::Measured(measured),
            measure_band,
        };
        let outcome = self.paginator.complete_pass(ticket, &mut measurer);
        Ok(outcome_name(&outcome).to_string())
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.paginator.page_count()
    }

    /// Latest generation; a pass is applied only if it still holds this one
    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> f64 {
        self.paginator.generation() as f64
    }

    /// Overlay layout as JSON, `null` while printing
    #[wasm_bindgen(js_name = getOverlay)]
    pub fn get_overlay(&self) -> Result<String, JsValue> {
        match self.paginator.overlay() {
            Some(overlay) => serde_json::to_string(overlay).map_err(to_js),
            None => Ok("null".to_string()),
        }
    }

    /// Last pagination result as JSON
    #[wasm_bindgen(js_name = getResult)]
    pub fn get_result(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.paginator.result()).map_err(to_js)
    }

    /// Route a click; returns the zone name ("header-left", ...) or undefined
    #[wasm_bindgen(js_name = routeClick)]
    pub fn route_click(&mut self, x: f32, y: f32) -> Option<String> {
        self.paginator
            .route_click(ClickEvent::at(x, y))
            .map(|hit| hit.zone.to_string())
    }

    /// `callback(side, text, pageIndex)` for header clicks
    #[wasm_bindgen(js_name = onHeaderClick)]
    pub fn on_header_click(&mut self, callback: Function) {
        self.paginator.on_header_click(move |side, ctx| {
            let result = callback.call3(
                &JsValue::NULL,
                &JsValue::from_str(side_name(side)),
                &JsValue::from_str(ctx.text),
                &JsValue::from_f64(ctx.page_index as f64),
            );
            if let Err(err) = result {
                tracing::warn!(error = ?err, "header click callback threw");
            }
        });
    }

    /// `callback(side, text, pageIndex)` for footer clicks
    #[wasm_bindgen(js_name = onFooterClick)]
    pub fn on_footer_click(&mut self, callback: Function) {
        self.paginator.on_footer_click(move |side, ctx| {
            let result = callback.call3(
                &JsValue::NULL,
                &JsValue::from_str(side_name(side)),
                &JsValue::from_str(ctx.text),
                &JsValue::from_f64(ctx.page_index as f64),
            );
            if let Err(err) = result {
                tracing::warn!(error = ?err, "footer click callback threw");
            }
        });
    }
}
