//! Console logging
//!
//! Messages go to the browser console on wasm32. Native builds (and the
//! unit tests) format the message and drop it, so nothing calls into JS
//! outside a browser.

/// Log an informational message: `console_log!("[Component] {}", x)`
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {{
        let _msg = format!($($arg)*);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&_msg));
    }};
}

/// Log a recovered problem at warn level
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {{
        let _msg = format!($($arg)*);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(&_msg));
    }};
}

/// Log a failure the user should hear about
#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {{
        let _msg = format!($($arg)*);
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(&_msg));
    }};
}
