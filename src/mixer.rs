use crate::filter::constrain_min_max;
use crate::hal::{Actuator, Motor};
use crate::state::Demands;

/// Contribution of each demand to one motor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorMix {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl MotorMix {
    pub const fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }

    fn mix(&self, demands: &Demands) -> f32 {
        demands.throttle * self.throttle
            + demands.roll * self.roll
            + demands.pitch * self.pitch
            + demands.yaw * self.yaw
    }
}

/// Mixes corrected demands into `N` motor outputs in [0, 1].
pub struct Mixer<M, const N: usize> {
    motors: [M; N],
    directions: [MotorMix; N],

    /// Last value written to each motor
    previous: [f32; N],

    /// Values written by [`run_disarmed`](Mixer::run_disarmed), set from a ground station.
    pub disarmed: [f32; N],
}

impl<M: Motor> Mixer<M, 4> {
    /// Quad-copter in X configuration.
    /// Motors are right rear, right front, left rear, left front.
    pub fn quad_x(motors: [M; 4]) -> Self {
        Self::new(
            motors,
            [
                MotorMix::new(1., -1., 1., 1.),
                MotorMix::new(1., -1., -1., -1.),
                MotorMix::new(1., 1., 1., -1.),
                MotorMix::new(1., 1., -1., 1.),
            ],
        )
    }
}

impl<M: Motor, const N: usize> Mixer<M, N> {
    pub fn new(mut motors: [M; N], directions: [MotorMix; N]) -> Self {
        for motor in &mut motors {
            motor.init();
        }

        Self {
            motors,
            directions,
            previous: [0.; N],
            disarmed: [0.; N],
        }
    }

    pub fn motors(&self) -> &[M; N] {
        &self.motors
    }

    /// Values most recently written to the motors.
    pub fn outputs(&self) -> [f32; N] {
        self.previous
    }

    /// Spin the motors at the disarmed values, e.g. for a motor test.
    pub fn run_disarmed(&mut self) {
        for i in 0..N {
            self.safe_write_motor(i, self.disarmed[i]);
        }
    }

    /// Calculate the output of each motor, in [0, 1], for `demands`.
    pub fn mix(&self, demands: &Demands) -> [f32; N] {
        let mut values = self.directions.map(|direction| direction.mix(demands));

        // Keep corrections when at least one motor saturates
        let max_motor = values.iter().copied().fold(f32::MIN, f32::max);
        for value in &mut values {
            if max_motor > 1. {
                *value -= max_motor - 1.;
            }
            *value = constrain_min_max(*value, 0., 1.);
        }

        values
    }

    fn safe_write_motor(&mut self, index: usize, value: f32) {
        // Avoid sending the same value over and over
        if self.previous[index] != value {
            self.motors[index].write(value);
        }
        self.previous[index] = value;
    }
}

impl<M: Motor, const N: usize> Actuator for Mixer<M, N> {
    fn run(&mut self, demands: Demands) {
        let values = self.mix(&demands);
        for (i, value) in values.into_iter().enumerate() {
            self.safe_write_motor(i, value);
        }
    }

    fn cut(&mut self) {
        for (motor, previous) in self.motors.iter_mut().zip(&mut self.previous) {
            motor.write(0.);
            *previous = 0.;
        }
    }

    fn send_disarmed(&mut self) {
        self.run_disarmed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct TestMotor {
        value: f32,
        writes: usize,
        initialized: bool,
    }

    impl Motor for TestMotor {
        fn init(&mut self) {
            self.initialized = true;
        }

        fn write(&mut self, value: f32) {
            self.value = value;
            self.writes += 1;
        }
    }

    fn quad() -> Mixer<TestMotor, 4> {
        Mixer::quad_x(Default::default())
    }

    #[test]
    fn motors_initialized() {
        assert!(quad().motors().iter().all(|motor| motor.initialized));
    }

    #[test]
    fn hover_is_even() {
        let mixer = quad();
        let values = mixer.mix(&Demands::new(0.5, 0., 0., 0.));
        assert_eq!(values, [0.5; 4]);
    }

    #[test]
    fn roll_right_speeds_up_left_motors() {
        let mixer = quad();
        let values = mixer.mix(&Demands::new(0.5, 0.1, 0., 0.));

        assert_relative_eq!(values[0], 0.4);
        assert_relative_eq!(values[1], 0.4);
        assert_relative_eq!(values[2], 0.6);
        assert_relative_eq!(values[3], 0.6);
    }

    #[test]
    fn saturation_shifts_all_motors_down() {
        let mixer = quad();
        let values = mixer.mix(&Demands::new(1., 0.2, 0., 0.));

        // Left motors would be 1.2
        assert_relative_eq!(values[2], 1.);
        assert_relative_eq!(values[3], 1.);
        assert_relative_eq!(values[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(values[1], 0.6, epsilon = 1e-6);
    }

    #[test]
    fn outputs_clamped_to_zero() {
        let mixer = quad();
        let values = mixer.mix(&Demands::new(0., 0.3, 0., 0.));
        assert_eq!(values[0], 0.);
        assert!(values[2] > 0.);
    }

    #[test]
    fn unchanged_values_are_not_rewritten() {
        let mut mixer = quad();
        mixer.run(Demands::new(0.5, 0., 0., 0.));
        mixer.run(Demands::new(0.5, 0., 0., 0.));

        assert!(mixer.motors().iter().all(|motor| motor.writes == 1));
        assert_eq!(mixer.outputs(), [0.5; 4]);
    }

    #[test]
    fn cut_always_writes_zero() {
        let mut mixer = quad();
        mixer.cut();
        mixer.cut();

        assert!(mixer
            .motors()
            .iter()
            .all(|motor| motor.writes == 2 && motor.value == 0.));
    }

    #[test]
    fn run_disarmed_spins_test_values() {
        let mut mixer = quad();
        mixer.disarmed = [0., 0.2, 0., 0.];
        mixer.run_disarmed();

        assert_eq!(mixer.motors()[1].value, 0.2);
        assert_eq!(mixer.motors()[0].writes, 0);
    }
    #[test]
    fn send_disarmed_lowers_spinning_motors() {
        let mut mixer = quad();
        mixer.run(Demands::new(0.5, 0., 0., 0.));

        mixer.send_disarmed();
        assert_eq!(mixer.outputs(), [0.; 4]);
        assert!(mixer.motors().iter().all(|motor| motor.value == 0.));

        mixer.disarmed[2] = 0.1;
        mixer.send_disarmed();
        assert_eq!(mixer.motors()[2].value, 0.1);
        assert_eq!(mixer.motors()[0].writes, 2);
    }
}
