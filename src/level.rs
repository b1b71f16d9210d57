//! Event severity levels and the runtime-adjustable [`LevelSwitch`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Severity of an emitted request event, ordered from most to least verbose.
///
/// The ordering is total: `Verbose < Debug < Information < Warning < Error <
/// Fatal`. A sink with a minimum level of `Information` accepts events at
/// `Information` or above and drops `Verbose` and `Debug` events.
///
/// # Examples
///
/// ```rust
/// use turnstile::Level;
///
/// assert!(Level::Verbose < Level::Information);
/// assert!(Level::Fatal > Level::Error);
/// assert_eq!(Level::default(), Level::Information);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Tracing-grade detail, rarely enabled outside development.
    Verbose,
    /// Internal diagnostics.
    Debug,
    /// Normal request summaries. The default summary severity.
    #[default]
    Information,
    /// Suspicious but recoverable conditions.
    Warning,
    /// Failed requests.
    Error,
    /// Unrecoverable faults.
    Fatal,
}

impl Level {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Verbose,
            1 => Self::Debug,
            2 => Self::Information,
            3 => Self::Warning,
            4 => Self::Error,
            _ => Self::Fatal,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbose => write!(f, "Verbose"),
            Self::Debug => write!(f, "Debug"),
            Self::Information => write!(f, "Information"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// A live-adjustable minimum-level holder.
///
/// Clones share the same underlying value, so a switch handed to a custom
/// [`EventSink`](crate::EventSink) can be tightened or relaxed at runtime
/// while requests are in flight. Reads and writes are atomic.
///
/// # Examples
///
/// ```rust
/// use turnstile::{Level, LevelSwitch};
///
/// let switch = LevelSwitch::new(Level::Verbose);
/// let shared = switch.clone();
///
/// switch.set_minimum(Level::Warning);
/// assert_eq!(shared.minimum(), Level::Warning);
/// ```
#[derive(Debug, Clone)]
pub struct LevelSwitch {
    level: Arc<AtomicU8>,
}

impl LevelSwitch {
    /// Creates a switch with the given initial minimum level.
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    /// Returns the current minimum level.
    pub fn minimum(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Replaces the minimum level, visible immediately to all clones.
    pub fn set_minimum(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }
}

impl Default for LevelSwitch {
    fn default() -> Self {
        Self::new(Level::Information)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_from_verbose_to_fatal() {
        let ordered = [
            Level::Verbose,
            Level::Debug,
            Level::Information,
            Level::Warning,
            Level::Error,
            Level::Fatal,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn switch_updates_are_visible_through_clones() {
        let switch = LevelSwitch::default();
        let clone = switch.clone();
        assert_eq!(clone.minimum(), Level::Information);

        switch.set_minimum(Level::Verbose);
        assert_eq!(clone.minimum(), Level::Verbose);

        clone.set_minimum(Level::Fatal);
        assert_eq!(switch.minimum(), Level::Fatal);
    }

    #[test]
    fn level_round_trips_through_storage() {
        for level in [
            Level::Verbose,
            Level::Debug,
            Level::Information,
            Level::Warning,
            Level::Error,
            Level::Fatal,
        ] {
            let switch = LevelSwitch::new(level);
            assert_eq!(switch.minimum(), level);
        }
    }
}
