#![allow(dead_code)]

use embedded_time::{clock, fraction::Fraction, Clock, Instant};
use hackflight::hal::{Actuator, Board, Motor};
use hackflight::receiver::{
    ChannelReceiver, ChannelSource, CHANNEL_AUX1, CHANNEL_AUX2, CHANNEL_THROTTLE, MAX_CHANNELS,
};
use hackflight::safety::ArmingEvent;
use hackflight::sensor::Imu;
use hackflight::{Demands, Hackflight};
use nalgebra::{UnitQuaternion, Vector3};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Microsecond clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: Cell<u32>,
    failed: Cell<bool>,
}

impl ManualClock {
    pub fn starting_at(micros: u32) -> Self {
        Self {
            micros: Cell::new(micros),
            failed: Cell::new(false),
        }
    }

    /// Advance like a hardware counter, wrapping around at `u32::MAX`.
    pub fn advance(&self, micros: u32) {
        self.micros.set(self.micros.get().wrapping_add(micros));
    }

    /// Make every following read fail.
    pub fn fail(&self) {
        self.failed.set(true);
    }
}

impl Clock for ManualClock {
    type T = u32;

    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
        if self.failed.get() {
            return Err(clock::Error::Unspecified);
        }
        Ok(Instant::new(self.micros.get()))
    }
}

/// Raw sticks with a new frame on every poll.
pub struct Sticks {
    pub raw: [f32; MAX_CHANNELS],
    pub lost: bool,
}

impl Default for Sticks {
    fn default() -> Self {
        let mut raw = [0.; MAX_CHANNELS];
        raw[CHANNEL_THROTTLE] = -1.;
        raw[CHANNEL_AUX1] = -1.;
        raw[CHANNEL_AUX2] = -1.;
        Self { raw, lost: false }
    }
}

impl ChannelSource for Sticks {
    fn got_new_frame(&mut self) -> bool {
        true
    }

    fn read_raw(&mut self, raw: &mut [f32; MAX_CHANNELS]) {
        *raw = self.raw;
    }

    fn lost_signal(&self) -> bool {
        self.lost
    }
}

#[derive(Debug, Default)]
pub struct RecordingActuator {
    pub runs: Vec<Demands>,
    pub cuts: usize,
    pub disarmed: usize,
}

impl Actuator for RecordingActuator {
    fn run(&mut self, demands: Demands) {
        self.runs.push(demands);
    }

    fn cut(&mut self) {
        self.cuts += 1;
    }

    fn send_disarmed(&mut self) {
        self.disarmed += 1;
    }
}

#[derive(Debug, Default)]
pub struct TestBoard {
    pub armed: bool,
    pub flashes: usize,
}

impl Board for TestBoard {
    fn show_armed_status(&mut self, armed: bool) {
        self.armed = armed;
    }

    fn flash_led(&mut self, _time: f32) {
        self.flashes += 1;
    }
}

/// IMU with a fresh reading on every poll, shared with the test.
#[derive(Clone)]
pub struct TestImu {
    pub attitude: Rc<Cell<UnitQuaternion<f32>>>,
    pub rates: Rc<Cell<Vector3<f32>>>,
}

impl Default for TestImu {
    fn default() -> Self {
        Self {
            attitude: Rc::new(Cell::new(UnitQuaternion::identity())),
            rates: Rc::new(Cell::new(Vector3::zeros())),
        }
    }
}

impl TestImu {
    pub fn set_euler(&self, roll: f32, pitch: f32, yaw: f32) {
        self.attitude
            .set(UnitQuaternion::from_euler_angles(roll, pitch, yaw));
    }
}

impl Imu for TestImu {
    fn gyrometer(&mut self) -> Option<Vector3<f32>> {
        Some(self.rates.get())
    }

    fn quaternion(&mut self, _time: f32) -> Option<UnitQuaternion<f32>> {
        Some(self.attitude.get())
    }
}

/// Motor whose outputs are shared with the test.
#[derive(Clone, Default)]
pub struct SharedMotor {
    pub values: Rc<RefCell<Vec<f32>>>,
}

impl Motor for SharedMotor {
    fn write(&mut self, value: f32) {
        self.values.borrow_mut().push(value);
    }
}

pub type TestFlight<A = RecordingActuator> =
    Hackflight<ManualClock, TestBoard, ChannelReceiver<Sticks>, A>;

/// Loop period of the tests, above the default PID task period.
pub const TICK_MICROS: u32 = 10_000;

pub fn builder<A: Actuator>(
    actuator: A,
) -> hackflight::Builder<ManualClock, TestBoard, ChannelReceiver<Sticks>, A> {
    Hackflight::builder()
        .clock(ManualClock::default())
        .board(TestBoard::default())
        .receiver(ChannelReceiver::new(Sticks::default()))
        .actuator(actuator)
}

pub fn tick<A: Actuator>(hackflight: &mut TestFlight<A>) -> Option<ArmingEvent> {
    hackflight.clock().advance(TICK_MICROS);
    hackflight.update().unwrap()
}

pub fn sticks<A: Actuator>(hackflight: &mut TestFlight<A>) -> &mut Sticks {
    hackflight.receiver_mut().source_mut()
}

/// Cycle the arming switch with the throttle down.
pub fn arm<A: Actuator>(hackflight: &mut TestFlight<A>) -> Option<ArmingEvent> {
    sticks(hackflight).raw[CHANNEL_AUX1] = -1.;
    tick(hackflight);
    sticks(hackflight).raw[CHANNEL_AUX1] = 1.;
    tick(hackflight)
}
