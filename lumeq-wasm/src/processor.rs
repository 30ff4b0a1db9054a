use lumeq_core::pipeline::{encode_png, enhance_image, fit_within, load_image_from_bytes};
use lumeq_core::{enhance, PixelLayout};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;

use crate::params::ClaheParams;
use crate::utils::console_log;

/// Entry points for browser callers.
#[wasm_bindgen]
pub struct LumeqProcessor;

#[wasm_bindgen]
impl LumeqProcessor {
    /// Enhance canvas `ImageData` bytes (RGBA8, row-major) of `width` x `height`.
    ///
    /// The result can be passed straight to `new ImageData(...)`; alpha is 255.
    #[wasm_bindgen(js_name = enhanceImageData)]
    pub fn enhance_image_data(
        data: &[u8],
        width: u32,
        height: u32,
        params: &ClaheParams,
    ) -> Result<Clamped<Vec<u8>>, JsValue> {
        enhance(data, width, height, PixelLayout::Rgba, &params.inner)
            .map(Clamped)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Decode an encoded image, correct its orientation, downscale to
    /// `max_dimension` (0 keeps full size), enhance and encode as PNG.
    ///
    /// # Arguments
    /// * `image_bytes` - Input image as byte array (PNG, JPEG, WebP, etc.)
    /// * `params` - Clip limit and grid size
    /// * `max_dimension` - Longest allowed side of the output
    #[wasm_bindgen(js_name = processImage)]
    pub fn process_image(
        image_bytes: &[u8],
        params: &ClaheParams,
        max_dimension: u32,
    ) -> Result<Vec<u8>, JsValue> {
        console_log!(
            "lumeq: enhancing {} bytes (clip {}, grid {}, max {})",
            image_bytes.len(),
            params.inner.clip_limit,
            params.inner.grid_size,
            max_dimension
        );
        process_bytes(image_bytes, params, max_dimension).map_err(|e| JsValue::from_str(&e))
    }
}

fn process_bytes(image_bytes: &[u8], params: &ClaheParams, max_dimension: u32) -> Result<Vec<u8>, String> {
    let img = load_image_from_bytes(image_bytes).map_err(|e| format!("Failed to load image: {}", e))?;
    let img = fit_within(img, max_dimension);
    let result =
        enhance_image(&img, &params.inner).map_err(|e| format!("Failed to process image: {}", e))?;
    encode_png(&result).map_err(|e| format!("Failed to encode PNG: {}", e))
}
