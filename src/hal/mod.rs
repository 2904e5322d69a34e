//! Hardware abstraction layer: the collaborators the control loop drives.

use crate::state::Demands;

pub mod board;
pub use board::{Board, LedBoard};

pub mod motor;
pub use motor::{Motor, PwmMotor};

/// Output stage for corrected demands: a motor mixer or a receiver proxy.
pub trait Actuator {
    /// Output the corrected demands.
    fn run(&mut self, demands: Demands);

    /// Force the safe, idle output immediately.
    fn cut(&mut self);

    /// Output sent every loop while disarmed.
    fn send_disarmed(&mut self) {
        self.cut()
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn run(&mut self, demands: Demands) {
        (**self).run(demands)
    }

    fn cut(&mut self) {
        (**self).cut()
    }

    fn send_disarmed(&mut self) {
        (**self).send_disarmed()
    }
}
