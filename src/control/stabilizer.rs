use super::PidController;
use crate::config::{StabilizerGains, StabilizerLimits};
use crate::filter::{complementary, constrain_abs, deg2rad};
use crate::state::{Demands, VehicleState, AXIS_PITCH, AXIS_ROLL, AXIS_YAW};
use nalgebra::Vector3;

/// Cyclic demand at which the blend is pure rate control.
const MAX_CYCLIC_DEMAND: f32 = 0.5;

/// Overshoot allowed on the corrected yaw demand.
const YAW_JUMP_MARGIN: f32 = 0.1;

/// Attitude stabilization for roll, pitch and yaw.
///
/// Roll and pitch blend angle leveling with rate control, weighted by how far
/// the cyclic sticks are deflected. Yaw is rate only.
///
/// ```
/// use hackflight::control::Stabilizer;
/// use hackflight::{Demands, VehicleState};
///
/// let mut stabilizer = Stabilizer::default();
/// let mut demands = Demands::new(0.5, 0.1, 0., 0.);
///
/// stabilizer.update_demands(&VehicleState::default(), &mut demands);
/// assert!(demands.roll > 0.);
/// ```
#[derive(Clone, Debug)]
pub struct Stabilizer {
    gains: StabilizerGains,
    gyro_windup_max: f32,
    big_gyro_rate: f32,
    big_yaw_demand: f32,
    max_arming_angle: f32,
    last_gyro: [f32; 2],
    delta1: [f32; 2],
    delta2: [f32; 2],
    error_gyro_i: [f32; 3],
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(StabilizerGains::default())
    }
}

impl Stabilizer {
    pub fn new(gains: StabilizerGains) -> Self {
        Self::with_limits(gains, StabilizerLimits::default())
    }

    pub fn with_limits(gains: StabilizerGains, limits: StabilizerLimits) -> Self {
        Self {
            gains,
            gyro_windup_max: limits.gyro_windup_max,
            big_gyro_rate: deg2rad(limits.big_gyro_degrees_per_second),
            big_yaw_demand: limits.big_yaw_demand,
            max_arming_angle: deg2rad(limits.max_arming_angle_degrees),
            last_gyro: [0.; 2],
            delta1: [0.; 2],
            delta2: [0.; 2],
            error_gyro_i: [0.; 3],
        }
    }

    pub fn gains(&self) -> &StabilizerGains {
        &self.gains
    }

    /// Accumulated rate error of each axis.
    pub fn error_integral(&self) -> [f32; 3] {
        self.error_gyro_i
    }

    /// Zero the rate error integral of every axis.
    pub fn reset_integral(&mut self) {
        self.error_gyro_i = [0.; 3];
    }

    /// Correct `demands` in place from the current vehicle state.
    pub fn update_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        let angles = state.angles();
        let rates = state.rates();

        // Proportion of cyclic demand compared to its maximum
        let prop = demands.roll.abs().max(demands.pitch.abs()) / MAX_CYCLIC_DEMAND;

        demands.roll = self.compute_cyclic_pid(demands.roll, prop, &angles, &rates, AXIS_ROLL);
        demands.pitch = self.compute_cyclic_pid(demands.pitch, prop, &angles, &rates, AXIS_PITCH);

        // Yaw P term comes straight from the stick and D term is zero
        let i_term_yaw = self.compute_i_term_gyro(
            self.gains.gyro_yaw_p,
            self.gains.gyro_yaw_i,
            demands.yaw,
            &rates,
            AXIS_YAW,
        );
        demands.yaw = compute_pid(
            self.gains.gyro_yaw_p,
            demands.yaw,
            i_term_yaw,
            0.,
            &rates,
            AXIS_YAW,
        );

        // Prevent yaw jump during correction
        demands.yaw = constrain_abs(demands.yaw, YAW_JUMP_MARGIN + demands.yaw.abs());
    }

    /// Scale a cyclic demand down as the vehicle approaches the arming angle limit.
    pub fn constrain_cyclic_demand(&self, euler_angle: f32, demand: f32) -> f32 {
        demand * (1. - euler_angle.abs() / self.max_arming_angle)
    }

    fn compute_i_term_gyro(
        &mut self,
        rate_p: f32,
        rate_i: f32,
        command: f32,
        rates: &Vector3<f32>,
        axis: usize,
    ) -> f32 {
        let error = command * rate_p - rates[axis];

        self.error_gyro_i[axis] =
            constrain_abs(self.error_gyro_i[axis] + error, self.gyro_windup_max);

        // Reset on a quick gyro change or a large yaw command
        if rates[axis].abs() > self.big_gyro_rate
            || (axis == AXIS_YAW && command.abs() > self.big_yaw_demand)
        {
            self.error_gyro_i[axis] = 0.;
        }

        self.error_gyro_i[axis] * rate_i
    }

    fn compute_cyclic_pid(
        &mut self,
        command: f32,
        prop: f32,
        angles: &Vector3<f32>,
        rates: &Vector3<f32>,
        axis: usize,
    ) -> f32 {
        let i_term_gyro = self.compute_i_term_gyro(
            self.gains.gyro_cyclic_p,
            self.gains.gyro_cyclic_i,
            command,
            rates,
            axis,
        );

        let p_term_euler = (command - angles[axis]) * self.gains.level_p;
        let p_term = complementary(command, p_term_euler, prop);
        let i_term = i_term_gyro * prop;

        // Three sample moving sum of rate deltas
        let delta = rates[axis] - self.last_gyro[axis];
        self.last_gyro[axis] = rates[axis];
        let delta_sum = self.delta1[axis] + self.delta2[axis] + delta;
        self.delta2[axis] = self.delta1[axis];
        self.delta1[axis] = delta;

        let d_term = delta_sum * self.gains.gyro_cyclic_d;

        compute_pid(self.gains.gyro_cyclic_p, p_term, i_term, d_term, rates, axis)
    }
}

/// The P term carries the rate damping: `p - rate * rate_p + i - d`.
fn compute_pid(
    rate_p: f32,
    p_term: f32,
    i_term: f32,
    d_term: f32,
    rates: &Vector3<f32>,
    axis: usize,
) -> f32 {
    let p_term = p_term - rates[axis] * rate_p;

    p_term + i_term - d_term
}

impl PidController for Stabilizer {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        self.update_demands(state, demands);
    }

    fn reset_on_inactivity(&mut self) {
        self.reset_integral();
    }
}
