use crate::state::{Demands, VehicleState, AXIS_PITCH, AXIS_ROLL, AXIS_YAW};

/// Sink for the vehicle state, run by the serial task.
pub trait Telemetry {
    fn update(&mut self, state: &VehicleState, demands: &Demands);
}

impl<T: Telemetry + ?Sized> Telemetry for Box<T> {
    fn update(&mut self, state: &VehicleState, demands: &Demands) {
        (**self).update(state, demands)
    }
}

/// Writes the vehicle state to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTelemetry {
    count: u64,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates logged.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Telemetry for LogTelemetry {
    fn update(&mut self, state: &VehicleState, demands: &Demands) {
        self.count += 1;

        let orientation = &state.orientation;
        log::debug!(
            "armed={} failsafe={} angles=({:.3}, {:.3}, {:.3}) rates=({:.3}, {:.3}, {:.3}) demands={:?}",
            state.armed,
            state.failsafe,
            orientation[AXIS_ROLL].value,
            orientation[AXIS_PITCH].value,
            orientation[AXIS_YAW].value,
            orientation[AXIS_ROLL].deriv,
            orientation[AXIS_PITCH].deriv,
            orientation[AXIS_YAW].deriv,
            demands
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_updates() {
        let mut telemetry: Box<dyn Telemetry> = Box::new(LogTelemetry::new());
        telemetry.update(&VehicleState::default(), &Demands::default());

        let mut telemetry = LogTelemetry::new();
        telemetry.update(&VehicleState::default(), &Demands::default());
        telemetry.update(&VehicleState::default(), &Demands::default());
        assert_eq!(telemetry.count(), 2);
    }
}
