//! Diagnostic output.
//!
//! Lines are printed through `esp-println` when the `esp32-log` feature is
//! enabled and compile to nothing otherwise.

/// Log an informational line, tagged `[Type.method]` by convention.
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        esp_println::println!($($arg)*);
    }};
}

/// Log a recoverable failure.
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        esp_println::println!("WARN {}", format_args!($($arg)*));
    }};
}

pub(crate) use log_info;
pub(crate) use log_warn;
