use lumeq_core::ClaheParams as CoreParams;
use wasm_bindgen::prelude::*;

/// Clip limit and grid size for one enhancement run.
#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct ClaheParams {
    pub(crate) inner: CoreParams,
}

#[wasm_bindgen]
impl ClaheParams {
    /// `gridSize` arrives as a JS number; fractional values are floored.
    #[wasm_bindgen(constructor)]
    pub fn new(clip_limit: f64, grid_size: f64) -> Self {
        Self {
            inner: CoreParams::new(clip_limit, floor_grid(grid_size)),
        }
    }

    /// Standard preset: clip 2.0, 8x8 tiles.
    pub fn standard() -> Self {
        Self {
            inner: CoreParams::standard(),
        }
    }

    pub fn gentle() -> Self {
        Self {
            inner: CoreParams::gentle(),
        }
    }

    pub fn strong() -> Self {
        Self {
            inner: CoreParams::strong(),
        }
    }

    /// Fine preset: 16x16 tiles.
    pub fn fine() -> Self {
        Self {
            inner: CoreParams::fine(),
        }
    }

    pub fn coarse() -> Self {
        Self {
            inner: CoreParams::coarse(),
        }
    }

    #[wasm_bindgen(js_name = fromPreset)]
    pub fn from_preset(name: &str) -> Result<ClaheParams, JsValue> {
        lookup_preset(name)
            .map(|inner| Self { inner })
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(getter, js_name = clipLimit)]
    pub fn clip_limit(&self) -> f64 {
        self.inner.clip_limit
    }

    #[wasm_bindgen(getter, js_name = gridSize)]
    pub fn grid_size(&self) -> f64 {
        self.inner.grid_size as f64
    }
}

fn lookup_preset(name: &str) -> Result<CoreParams, String> {
    CoreParams::from_preset(name).ok_or_else(|| format!("Unknown preset: {}", name))
}

/// NaN maps to 0, which the core clamps to the minimum grid.
fn floor_grid(grid_size: f64) -> i64 {
    grid_size.floor() as i64
}
