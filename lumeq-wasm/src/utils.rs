/// Install the panic hook so Rust panics show up in the browser console.
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Write one line to the browser console.
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

macro_rules! console_log {
    ($($t:tt)*) => (crate::utils::log(&format!($($t)*)))
}

pub(crate) use console_log;
