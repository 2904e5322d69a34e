//! PID correction of stick demands.

mod stabilizer;
pub use stabilizer::Stabilizer;

use crate::hal::Actuator;
use crate::receiver::Receiver;
use crate::scheduler::TimerTask;
use crate::state::{Demands, VehicleState};

/// A correction stage run on the demands before they reach the actuator.
pub trait PidController {
    /// Correct `demands` in place from the current vehicle state.
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands);

    /// Called every PID cycle while the throttle is down.
    fn reset_on_inactivity(&mut self) {}
}

impl<T: PidController + ?Sized> PidController for Box<T> {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        (**self).modify_demands(state, demands)
    }

    fn reset_on_inactivity(&mut self) {
        (**self).reset_on_inactivity()
    }
}

struct Entry {
    controller: Box<dyn PidController>,

    /// Lowest aux2 switch position at which this controller runs.
    aux_state: u8,
}

/// Periodic task running the PID controllers in registration order
/// and sending the corrected demands to the actuator.
pub struct PidTask {
    timer: TimerTask,
    controllers: Vec<Entry>,
}

impl PidTask {
    pub fn new(hz: f32) -> Self {
        Self {
            timer: TimerTask::new(hz),
            controllers: Vec::new(),
        }
    }

    pub fn add_controller(&mut self, controller: Box<dyn PidController>, aux_state: u8) {
        self.controllers.push(Entry {
            controller,
            aux_state,
        });
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Run the controllers if the task is due.
    /// Returns the corrected demands when it ran.
    pub fn update<R, A>(
        &mut self,
        time: f32,
        receiver: &R,
        actuator: &mut A,
        state: &VehicleState,
    ) -> Option<Demands>
    where
        R: Receiver + ?Sized,
        A: Actuator + ?Sized,
    {
        if !self.timer.ready(time) {
            return None;
        }

        let mut demands = receiver.demands();
        let throttle_is_down = receiver.throttle_is_down();
        let aux2_state = receiver.aux2_state();

        for entry in &mut self.controllers {
            if throttle_is_down {
                entry.controller.reset_on_inactivity();
            }

            if entry.aux_state <= aux2_state {
                entry.controller.modify_demands(state, &mut demands);
            }
        }

        if state.armed && !state.failsafe && !throttle_is_down {
            actuator.run(demands);
        }

        Some(demands)
    }
}
