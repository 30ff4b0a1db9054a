/// C ABI exports for shared library consumers.
use std::ffi::CString;
use std::os::raw::c_char;

use crate::clahe::{enhance, ClaheParams};
use crate::error::EnhanceError;
use crate::ycbcr::PixelLayout;

// Error codes (must stay in sync with the C header shipped to consumers)
pub const LUMEQ_OK: i32 = 0;
pub const LUMEQ_ERR_NULL_POINTER: i32 = -1;
pub const LUMEQ_ERR_INVALID_DIMENSIONS: i32 = -2;
pub const LUMEQ_ERR_INVALID_PARAMETER: i32 = -3;
pub const LUMEQ_ERR_BUFFER_SIZE: i32 = -4;
pub const LUMEQ_ERR_INVALID_PATH: i32 = -5;
pub const LUMEQ_ERR_PROCESSING_FAILED: i32 = -6;

fn error_code(err: &EnhanceError) -> i32 {
    match err {
        EnhanceError::InvalidDimensions { .. } => LUMEQ_ERR_INVALID_DIMENSIONS,
        EnhanceError::InvalidParameter { .. } => LUMEQ_ERR_INVALID_PARAMETER,
        EnhanceError::BufferSize { .. } => LUMEQ_ERR_BUFFER_SIZE,
    }
}

/// Enhance an RGBA8 buffer of `width * height * 4` bytes into `output`,
/// which must have room for the same number of bytes.
/// Returns 0 on success, negative error codes on failure.
///
/// # Safety
/// - `pixels` must be valid for reads of `len` bytes.
/// - `output` must be valid for writes of `len` bytes and must not overlap `pixels`.
#[no_mangle]
pub unsafe extern "C" fn lumeq_enhance_rgba(
    pixels: *const u8,
    len: usize,
    width: u32,
    height: u32,
    clip_limit: f64,
    grid_size: i32,
    output: *mut u8,
) -> i32 {
    if pixels.is_null() || output.is_null() {
        return LUMEQ_ERR_NULL_POINTER;
    }

    let input = unsafe { std::slice::from_raw_parts(pixels, len) };
    let params = ClaheParams::new(clip_limit, grid_size as i64);
    let result = match enhance(input, width, height, PixelLayout::Rgba, &params) {
        Ok(data) => data,
        Err(e) => return error_code(&e),
    };

    let output_slice = unsafe { std::slice::from_raw_parts_mut(output, result.len()) };
    output_slice.copy_from_slice(&result);
    LUMEQ_OK
}

/// Enhance an image file and write the result (format chosen by extension).
/// `max_dimension` of 0 disables downscaling.
///
/// # Safety
/// `input_path` and `output_path` must be valid null-terminated UTF-8 strings.
#[cfg(feature = "io")]
#[no_mangle]
pub unsafe extern "C" fn lumeq_process_file(
    input_path: *const c_char,
    output_path: *const c_char,
    clip_limit: f64,
    grid_size: i32,
    max_dimension: u32,
) -> i32 {
    use crate::error::PipelineError;
    use crate::pipeline::process_file;
    use std::ffi::CStr;
    use std::path::Path;

    if input_path.is_null() || output_path.is_null() {
        return LUMEQ_ERR_NULL_POINTER;
    }
    let input = match unsafe { CStr::from_ptr(input_path) }.to_str() {
        Ok(s) => s,
        Err(_) => return LUMEQ_ERR_INVALID_PATH,
    };
    let output = match unsafe { CStr::from_ptr(output_path) }.to_str() {
        Ok(s) => s,
        Err(_) => return LUMEQ_ERR_INVALID_PATH,
    };

    let params = ClaheParams::new(clip_limit, grid_size as i64);
    match process_file(Path::new(input), Path::new(output), &params, max_dimension) {
        Ok(()) => LUMEQ_OK,
        Err(PipelineError::Enhance(e)) => error_code(&e),
        Err(_) => LUMEQ_ERR_PROCESSING_FAILED,
    }
}

/// JSON object mapping preset names to `{"clip_limit": .., "grid_size": ..}`.
/// The returned string must be freed with `lumeq_free_string`.
#[no_mangle]
pub extern "C" fn lumeq_list_presets() -> *mut c_char {
    let presets: serde_json::Map<String, serde_json::Value> = ClaheParams::all_presets()
        .into_iter()
        .map(|(name, p)| {
            (
                name.to_string(),
                serde_json::json!({ "clip_limit": p.clip_limit, "grid_size": p.grid_size }),
            )
        })
        .collect();

    let json = serde_json::Value::Object(presets).to_string();
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string returned by `lumeq_list_presets`.
///
/// # Safety
/// `s` must be a pointer returned by `lumeq_list_presets`, or null.
#[no_mangle]
pub unsafe extern "C" fn lumeq_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
