use super::Imu;
use crate::state::{VehicleState, AXIS_PITCH, AXIS_ROLL, AXIS_YAW};
use core::f32::consts::PI;
use nalgebra::UnitQuaternion;

/// Euler angles from the IMU attitude quaternion.
///
/// Heading is reported in [0, 2π).
#[derive(Clone, Copy, Debug)]
pub struct Quaternion {
    attitude: UnitQuaternion<f32>,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            attitude: UnitQuaternion::identity(),
        }
    }
}

impl Quaternion {
    pub fn attitude(&self) -> UnitQuaternion<f32> {
        self.attitude
    }

    pub fn ready<I: Imu + ?Sized>(&mut self, imu: &mut I, time: f32) -> bool {
        match imu.quaternion(time) {
            Some(attitude) => {
                self.attitude = attitude;
                true
            }
            None => false,
        }
    }

    pub fn modify_state(&self, state: &mut VehicleState) {
        let (roll, pitch, mut yaw) = self.attitude.euler_angles();

        if yaw < 0. {
            yaw += 2. * PI;
        }

        state.orientation[AXIS_ROLL].value = roll;
        state.orientation[AXIS_PITCH].value = pitch;
        state.orientation[AXIS_YAW].value = yaw;
    }
}
