//! Run-mode exclusion.

use crate::state::RunMode;

/// Decides which mode must yield before another one starts.
pub struct ModeArbiter;

impl ModeArbiter {
    /// Mode to stop before `starting` may run.
    ///
    /// Background displaces foreground; foreground never displaces background
    /// here and is instead refused by the routine's single-owner rule.
    pub fn conflicting(starting: RunMode) -> Option<RunMode> {
        match starting {
            RunMode::Background => Some(RunMode::Foreground),
            RunMode::Foreground => None,
        }
    }
}
