//! Single-owner access to the process-wide sharing routine.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::DeviceIdentity;
use crate::error::RoutineError;
use crate::routine::{EventCallback, SharingRoutine};
use crate::state::RunMode;

/// Wraps a [`SharingRoutine`] so that at most one run mode drives it.
pub struct RoutineClient {
    routine: Arc<dyn SharingRoutine>,
    owner: Mutex<Option<RunMode>>,
}

impl RoutineClient {
    /// Wraps `routine`.
    pub fn new(routine: Arc<dyn SharingRoutine>) -> Self {
        Self {
            routine,
            owner: Mutex::new(None),
        }
    }

    /// Initializes the routine for `device`.
    pub fn initialize(&self, device: &DeviceIdentity) -> Result<(), RoutineError> {
        self.routine.initialize(device.id(), device.name())
    }

    /// Starts the routine on behalf of `mode`.
    ///
    /// # Errors
    /// [`RoutineError::Busy`] when another mode owns the routine.
    pub fn start(
        &self,
        mode: RunMode,
        api_token: &str,
        on_event: EventCallback,
    ) -> Result<(), RoutineError> {
        let mut owner = self.owner.lock();
        match *owner {
            Some(current) if current != mode => Err(RoutineError::Busy { owner: current }),
            _ => {
                *owner = Some(mode);
                self.routine.start(api_token, on_event);
                Ok(())
            }
        }
    }

    /// Stops the routine if `mode` owns it. Returns whether it did.
    pub fn stop(&self, mode: RunMode) -> bool {
        let mut owner = self.owner.lock();
        if *owner != Some(mode) {
            return false;
        }
        *owner = None;
        self.routine.stop();
        true
    }

    /// Mode currently driving the routine.
    pub fn owner(&self) -> Option<RunMode> {
        *self.owner.lock()
    }
}
