use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub const AXIS_ROLL: usize = 0;
pub const AXIS_PITCH: usize = 1;
pub const AXIS_YAW: usize = 2;

/// Angle (radians) and angular rate (radians/second) of a single axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub value: f32,
    pub deriv: f32,
}

/// Mutable record of the vehicle written by sensors and the arming controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Roll, pitch and yaw, indexed by [`AXIS_ROLL`], [`AXIS_PITCH`] and [`AXIS_YAW`].
    pub orientation: [Axis; 3],
    pub armed: bool,
    pub failsafe: bool,
}

impl VehicleState {
    /// Euler angles in radians.
    pub fn angles(&self) -> Vector3<f32> {
        Vector3::from_fn(|i, _| self.orientation[i].value)
    }

    /// Angular rates in radians/second.
    pub fn rates(&self) -> Vector3<f32> {
        Vector3::from_fn(|i, _| self.orientation[i].deriv)
    }

    pub fn set_angles(&mut self, angles: Vector3<f32>) {
        for (axis, angle) in self.orientation.iter_mut().zip(angles.iter()) {
            axis.value = *angle;
        }
    }

    pub fn set_rates(&mut self, rates: Vector3<f32>) {
        for (axis, rate) in self.orientation.iter_mut().zip(rates.iter()) {
            axis.deriv = *rate;
        }
    }

    /// Set the angle and rate of one axis together.
    pub fn set_axis(&mut self, axis: usize, value: f32, deriv: f32) {
        self.orientation[axis] = Axis { value, deriv };
    }
}

/// Stick demands, raw from the receiver or corrected by the PID controllers.
///
/// Roll, pitch and yaw are signed (nominally -0.5 ~ +0.5 after receiver shaping),
/// throttle is 0 ~ 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Demands {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Demands {
    pub fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}
