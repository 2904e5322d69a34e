//! Sensors polled once per loop to update the [`VehicleState`].

use crate::state::VehicleState;
use nalgebra::{UnitQuaternion, Vector3};

mod gyrometer;
pub use gyrometer::Gyrometer;

mod quaternion;
pub use quaternion::Quaternion;

/// A sensor that updates the vehicle state when it has new data.
pub trait Sensor {
    /// Returns `true` if new data is available at `time` (in seconds).
    fn ready(&mut self, time: f32) -> bool;

    /// Write the latest data into `state`. Only called after [`ready`](Sensor::ready).
    fn modify_state(&mut self, state: &mut VehicleState, time: f32);
}

impl<T: Sensor + ?Sized> Sensor for Box<T> {
    fn ready(&mut self, time: f32) -> bool {
        (**self).ready(time)
    }

    fn modify_state(&mut self, state: &mut VehicleState, time: f32) {
        (**self).modify_state(state, time)
    }
}

/// Inertial measurement unit on the board.
pub trait Imu {
    /// Start the device.
    fn begin(&mut self) {}

    /// Angular rates in radians/second, if a new reading is available.
    fn gyrometer(&mut self) -> Option<Vector3<f32>>;

    /// Attitude estimate at `time` (in seconds), if a new one is available.
    fn quaternion(&mut self, time: f32) -> Option<UnitQuaternion<f32>>;
}

impl<T: Imu + ?Sized> Imu for Box<T> {
    fn begin(&mut self) {
        (**self).begin()
    }

    fn gyrometer(&mut self) -> Option<Vector3<f32>> {
        (**self).gyrometer()
    }

    fn quaternion(&mut self, time: f32) -> Option<UnitQuaternion<f32>> {
        (**self).quaternion(time)
    }
}

/// The mandatory sensors backed by the board IMU, polled before any optional sensor.
pub struct SurfaceMount<I> {
    pub imu: I,
    pub gyrometer: Gyrometer,
    pub quaternion: Quaternion,
}

impl<I: Imu> SurfaceMount<I> {
    pub fn new(mut imu: I) -> Self {
        imu.begin();
        Self {
            imu,
            gyrometer: Gyrometer::default(),
            quaternion: Quaternion::default(),
        }
    }

    /// Poll the gyrometer then the quaternion.
    pub fn update(&mut self, state: &mut VehicleState, time: f32) {
        if self.gyrometer.ready(&mut self.imu) {
            self.gyrometer.modify_state(state);
        }

        if self.quaternion.ready(&mut self.imu, time) {
            self.quaternion.modify_state(state);
        }
    }
}
