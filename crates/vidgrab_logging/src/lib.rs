#![deny(missing_docs)]
//! Shared logging utilities for the vidgrab workspace.
//!
//! Every crate logs through the `vg_*` macros so the facade can be swapped
//! in one place. The macros re-export `log` through this crate, callers do
//! not need their own `log` dependency.

use std::sync::Once;

#[doc(hidden)]
pub use log as __log;

/// Log target used by the coordinator state machine.
pub const TARGET_CORE: &str = "vidgrab::core";
/// Log target used by the engine and its collaborators.
pub const TARGET_ENGINE: &str = "vidgrab::engine";
/// Log target used by the host event loop.
pub const TARGET_HOST: &str = "vidgrab::host";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! vg_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! vg_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! vg_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! vg_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! vg_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// Safe to call from every test: only the first call installs a logger, and
/// it silently no-ops if another logger was installed elsewhere.
pub fn initialize_for_tests() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

        let _ = CombinedLogger::init(vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )]);
    });
}

#[cfg(test)]
mod tests {
    use super::initialize_for_tests;

    #[test]
    fn repeated_initialization_is_harmless() {
        initialize_for_tests();
        initialize_for_tests();
        vg_info!(target: super::TARGET_CORE, "logger ready");
    }
}
