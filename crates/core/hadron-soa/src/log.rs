//! Leveled logging hook for container diagnostics.
//!
//! The container never prints on its own. An embedder registers a sink with
//! [`set_log_fn`] (for example, forwarding to the kernel's `klog!`); until
//! then every message is silently discarded. Messages record capacity
//! failures at [`LogLevel::Debug`] and bulk moves at [`LogLevel::Trace`].

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Log severity level. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Something failed and the caller will see an error.
    Error = 1,
    /// Unexpected condition, not necessarily an error.
    Warn = 2,
    /// High-level progress messages.
    Info = 3,
    /// Detailed diagnostics, such as rejected capacity requests.
    Debug = 4,
    /// Very verbose per-operation tracing.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

/// The signature of the global log sink.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

/// Registers the global log sink.
///
/// May be called more than once; the latest sink wins. Uses `Release`
/// ordering so subsequent loads see the new function.
pub fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

/// Restores the default sink, which discards every message.
pub fn clear_log_fn() {
    set_log_fn(null_log);
}

#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: Only valid `LogFn` pointers (or `null_log`) are ever stored into LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Implementation detail for the logging macros. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    load_log_fn()(level, args);
}

/// Logs a message at the given level.
macro_rules! soa_log {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::_log($level, format_args!($($arg)*))
    };
}

/// Logs a debug-level message.
macro_rules! soa_debug {
    ($($arg:tt)*) => { $crate::log::soa_log!($crate::log::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message.
macro_rules! soa_trace {
    ($($arg:tt)*) => { $crate::log::soa_log!($crate::log::LogLevel::Trace, $($arg)*) };
}

pub(crate) use {soa_debug, soa_log, soa_trace};

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;
    use core::sync::atomic::AtomicUsize;

    use super::*;
    use crate::{Soa, SoaArray};

    static DEBUG_COUNT: AtomicUsize = AtomicUsize::new(0);

    fn count_debug(level: LogLevel, _args: fmt::Arguments<'_>) {
        if level == LogLevel::Debug {
            DEBUG_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[derive(Clone, Copy, Soa)]
    struct Sample {
        value: u16,
    }

    #[test]
    fn level_names_are_fixed_width() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.name().len(), 5);
        }
    }

    #[test]
    fn capacity_failure_reaches_sink() {
        set_log_fn(count_debug);
        let mut soa = SoaArray::<Sample, 1>::new();
        soa.append(Sample { value: 1 }).unwrap();
        assert!(soa.append(Sample { value: 2 }).is_err());
        assert!(DEBUG_COUNT.load(Ordering::Relaxed) >= 1);
        clear_log_fn();
    }
}
