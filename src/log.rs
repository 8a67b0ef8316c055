//! Console logging
//!
//! Goes to `web_sys::console` inside the browser and to stderr everywhere
//! else, so code paths that log stay callable from native tests.

#[doc(hidden)]
pub fn emit(level: Level, message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let value = wasm_bindgen::JsValue::from_str(message);
        match level {
            Level::Log => web_sys::console::log_1(&value),
            Level::Warn => web_sys::console::warn_1(&value),
            Level::Error => web_sys::console::error_1(&value),
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("[{}] {}", level.as_str(), message);
    }
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
    Error,
}

impl Level {
    #[allow(dead_code)]
    fn as_str(&self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Log, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        $crate::log::emit($crate::log::Level::Error, &format!($($arg)*))
    };
}
