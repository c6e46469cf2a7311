//! Instance-prefixed logging on top of the `log` facade.
//!
//! Nothing here influences control flow: the helpers only format and hand
//! off to whatever logger the application installed (or none).

use std::backtrace::Backtrace;
use std::fmt::Display;

pub use log::Level;

use crate::object::Instance;

pub fn should_log(level: Level) -> bool {
    log::log_enabled!(level)
}

impl Instance {
    pub fn log(&self, message: impl Display) {
        log::info!("{}: {message}", self.describe());
    }

    /// Warnings carry a backtrace when trace logging is on.
    pub fn warn(&self, message: impl Display) {
        if !should_log(Level::Warn) {
            return;
        }
        if should_log(Level::Trace) {
            log::warn!(
                "{}: {message}\n{}",
                self.describe(),
                Backtrace::force_capture()
            );
        } else {
            log::warn!("{}: {message}", self.describe());
        }
    }

    pub fn error(&self, message: impl Display) {
        log::error!("{}: {message}", self.describe());
    }
}
