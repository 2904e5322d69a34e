use super::Imu;
use crate::state::VehicleState;
use nalgebra::Vector3;

/// Angular rates from the IMU gyro.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gyrometer {
    rates: Vector3<f32>,
}

impl Gyrometer {
    pub fn rates(&self) -> Vector3<f32> {
        self.rates
    }

    pub fn ready<I: Imu + ?Sized>(&mut self, imu: &mut I) -> bool {
        match imu.gyrometer() {
            Some(rates) => {
                self.rates = rates;
                true
            }
            None => false,
        }
    }

    pub fn modify_state(&self, state: &mut VehicleState) {
        state.set_rates(self.rates);
    }
}
