use wasm_bindgen::prelude::*;

mod params;
mod processor;
mod utils;

pub use params::ClaheParams;
pub use processor::LumeqProcessor;

/// Initialize the WASM module (sets up panic hook).
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}

/// Names accepted by `ClaheParams.fromPreset`.
#[wasm_bindgen(js_name = presetNames)]
pub fn preset_names() -> js_sys::Array {
    lumeq_core::ClaheParams::all_presets()
        .into_iter()
        .map(|(name, _)| JsValue::from_str(name))
        .collect()
}
