//! Arming gestures, angle envelope and failsafe.

use crate::filter::deg2rad;
use crate::hal::{Actuator, Board};
use crate::receiver::Receiver;
use crate::state::{VehicleState, AXIS_PITCH, AXIS_ROLL, AXIS_YAW};

/// A transition of the arming state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmingEvent {
    Armed,
    Disarmed,
    /// The receiver lost signal while armed.
    Failsafe,
}

/// Decides when the vehicle is armed from the arming switch, throttle and attitude.
///
/// Arming requires the switch to have been seen off at least once since boot,
/// the throttle down and roll and pitch inside the arming envelope.
/// Losing the receiver signal while armed cuts the motors and latches failsafe
/// until restart.
#[derive(Clone, Copy, Debug)]
pub struct ArmingController {
    armed: bool,
    failsafe: bool,
    safe_to_arm: bool,

    /// Heading (in radians) when the vehicle was armed.
    yaw_initial: f32,

    /// Largest roll or pitch (in radians) at which the vehicle may be armed.
    max_arming_angle: f32,
}

impl ArmingController {
    pub fn new(max_arming_angle_degrees: f32) -> Self {
        Self {
            armed: false,
            failsafe: false,
            safe_to_arm: false,
            yaw_initial: 0.,
            max_arming_angle: deg2rad(max_arming_angle_degrees),
        }
    }

    /// Builder method to start armed, for simulation.
    pub fn with_armed(mut self, armed: bool) -> Self {
        self.armed = armed;
        self
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_failsafe(&self) -> bool {
        self.failsafe
    }

    pub fn is_safe_to_arm(&self) -> bool {
        self.safe_to_arm
    }

    pub fn yaw_initial(&self) -> f32 {
        self.yaw_initial
    }

    /// Run the safety checks for one loop at `time` (in seconds).
    ///
    /// New receiver data is read here, with the heading change since arming
    /// as the headless offset. The armed and failsafe flags are mirrored into `state`.
    pub fn check<R, A, B>(
        &mut self,
        time: f32,
        receiver: &mut R,
        actuator: &mut A,
        board: &mut B,
        state: &mut VehicleState,
    ) -> Option<ArmingEvent>
    where
        R: Receiver + ?Sized,
        A: Actuator + ?Sized,
        B: Board + ?Sized,
    {
        if receiver.lost_signal() && self.armed {
            actuator.cut();
            self.armed = false;
            self.failsafe = true;
            self.mirror(state);
            board.show_armed_status(false);

            log::warn!("receiver signal lost, entering failsafe");
            return Some(ArmingEvent::Failsafe);
        }

        let mut event = None;

        let yaw = state.orientation[AXIS_YAW].value;
        if receiver.get_demands(yaw - self.yaw_initial) {
            let aux1 = receiver.aux1_state();

            if self.armed && !aux1 {
                actuator.cut();
                self.armed = false;
                event = Some(ArmingEvent::Disarmed);
                log::info!("disarmed");
            }

            // The switch must be seen off once before arming
            if !self.safe_to_arm {
                self.safe_to_arm = !aux1;
            }

            if self.safe_to_arm
                && !self.armed
                && receiver.throttle_is_down()
                && aux1
                && !self.failsafe
            {
                if self.safe_angle(state, AXIS_ROLL) && self.safe_angle(state, AXIS_PITCH) {
                    self.armed = true;
                    self.yaw_initial = yaw;
                    event = Some(ArmingEvent::Armed);
                    log::info!("armed");
                } else {
                    log::warn!(
                        "arming refused: roll {:.3} pitch {:.3} outside {:.3} radians",
                        state.orientation[AXIS_ROLL].value,
                        state.orientation[AXIS_PITCH].value,
                        self.max_arming_angle
                    );
                }
            }
        }

        // Cut the motors on the ground
        if self.armed && receiver.throttle_is_down() {
            actuator.cut();
        }

        self.mirror(state);

        // The armed indicator would turn a flashing LED back off
        if self.failsafe {
            board.flash_led(time);
        } else {
            board.show_armed_status(self.armed);
        }

        event
    }

    /// Disarm immediately, cutting the actuator, e.g. when the loop can no longer run.
    pub fn disarm<A>(&mut self, actuator: &mut A, state: &mut VehicleState)
    where
        A: Actuator + ?Sized,
    {
        actuator.cut();
        if self.armed {
            log::warn!("disarmed by the flight loop");
        }
        self.armed = false;
        self.mirror(state);
    }

    fn safe_angle(&self, state: &VehicleState, axis: usize) -> bool {
        state.orientation[axis].value.abs() < self.max_arming_angle
    }

    fn mirror(&self, state: &mut VehicleState) {
        state.armed = self.armed;
        state.failsafe = self.failsafe;
    }
}
