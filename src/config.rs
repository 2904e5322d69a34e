use crate::Error;
use serde::{Deserialize, Serialize};

/// PID gains for the [`Stabilizer`](crate::control::Stabilizer).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilizerGains {
    pub level_p: f32,
    pub gyro_cyclic_p: f32,
    pub gyro_cyclic_i: f32,
    pub gyro_cyclic_d: f32,
    pub gyro_yaw_p: f32,
    pub gyro_yaw_i: f32,
}

impl Default for StabilizerGains {
    fn default() -> Self {
        Self {
            level_p: 0.20,
            gyro_cyclic_p: 0.225,
            gyro_cyclic_i: 0.001875,
            gyro_cyclic_d: 0.375,
            gyro_yaw_p: 1.0625,
            gyro_yaw_i: 0.005625,
        }
    }
}

impl StabilizerGains {
    /// Check that every gain is finite and not negative.
    pub fn validate(&self) -> Result<(), Error> {
        let gains = [
            ("level_p", self.level_p),
            ("gyro_cyclic_p", self.gyro_cyclic_p),
            ("gyro_cyclic_i", self.gyro_cyclic_i),
            ("gyro_cyclic_d", self.gyro_cyclic_d),
            ("gyro_yaw_p", self.gyro_yaw_p),
            ("gyro_yaw_i", self.gyro_yaw_i),
        ];

        for (name, value) in gains {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidGain { name, value });
            }
        }
        Ok(())
    }
}

/// Integral reset thresholds and angle limits, in degrees where applicable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerLimits {
    /// Largest magnitude of the accumulated rate error.
    pub gyro_windup_max: f32,

    /// Angular rate above which the integral is reset.
    pub big_gyro_degrees_per_second: f32,

    /// Yaw stick demand above which the yaw integral is reset.
    pub big_yaw_demand: f32,

    pub max_arming_angle_degrees: f32,
}

impl Default for StabilizerLimits {
    fn default() -> Self {
        Self {
            gyro_windup_max: 16.,
            big_gyro_degrees_per_second: 40.,
            big_yaw_demand: 0.1,
            max_arming_angle_degrees: 25.,
        }
    }
}

/// Task rates and safety envelope of the [`Hackflight`](crate::Hackflight) loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rate (in hz) of the PID controller task.
    pub pid_hz: f32,

    /// Rate (in hz) of the serial telemetry task.
    pub serial_hz: f32,

    /// Largest roll or pitch angle at which the vehicle may be armed.
    pub max_arming_angle_degrees: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pid_hz: 300.,
            serial_hz: 66.,
            max_arming_angle_degrees: 25.,
        }
    }
}
