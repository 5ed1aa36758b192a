//! # Run modes.
//!
//! A [`RunMode`] decides how long the sharing routine is kept alive:
//! - [`RunMode::Background`] only while the hosting app is active;
//! - [`RunMode::Foreground`] also after the app is terminated (holds a wake lock).
//!
//! Exactly one mode may own the sharing routine at a time.

use std::fmt;

/// How the supervisor keeps the sharing routine alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Visible, long-lived mode that survives app termination.
    Foreground,
    /// Background-only mode bound to the app's lifetime.
    Background,
}

impl RunMode {
    /// All modes, in a stable order.
    pub const ALL: [RunMode; 2] = [RunMode::Foreground, RunMode::Background];

    /// Stable lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Foreground => "foreground",
            RunMode::Background => "background",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
