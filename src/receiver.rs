//! Pilot stick demands and switch state.

use crate::state::Demands;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Normalized stick demands, aux switches and link status.
pub trait Receiver {
    /// Read a new frame if one is available, rotating cyclic demands by
    /// `yaw_offset` (radians) in headless mode. Returns `false` when there is no new data.
    fn get_demands(&mut self, yaw_offset: f32) -> bool;

    /// The demands of the last frame read.
    fn demands(&self) -> Demands;

    fn throttle_is_down(&self) -> bool;

    /// Whether the arming switch is asserted.
    fn aux1_state(&self) -> bool;

    /// Position of the second aux switch, used to select PID controllers.
    fn aux2_state(&self) -> u8 {
        0
    }

    fn lost_signal(&self) -> bool;
}

impl<T: Receiver + ?Sized> Receiver for &mut T {
    fn get_demands(&mut self, yaw_offset: f32) -> bool {
        (**self).get_demands(yaw_offset)
    }

    fn demands(&self) -> Demands {
        (**self).demands()
    }

    fn throttle_is_down(&self) -> bool {
        (**self).throttle_is_down()
    }

    fn aux1_state(&self) -> bool {
        (**self).aux1_state()
    }

    fn aux2_state(&self) -> u8 {
        (**self).aux2_state()
    }

    fn lost_signal(&self) -> bool {
        (**self).lost_signal()
    }
}

/// Number of raw channels read from a [`ChannelSource`].
pub const MAX_CHANNELS: usize = 8;

/// Logical channels, indices into [`ReceiverConfig::channel_map`].
pub const CHANNEL_THROTTLE: usize = 0;
pub const CHANNEL_ROLL: usize = 1;
pub const CHANNEL_PITCH: usize = 2;
pub const CHANNEL_YAW: usize = 3;
pub const CHANNEL_AUX1: usize = 4;
pub const CHANNEL_AUX2: usize = 5;

/// Raw channel values in [-1, 1] from a radio link decoder.
pub trait ChannelSource {
    /// Returns `true` if a frame arrived since the last call.
    fn got_new_frame(&mut self) -> bool;

    fn read_raw(&mut self, raw: &mut [f32; MAX_CHANNELS]);

    fn lost_signal(&self) -> bool;
}

/// Stick shaping parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Raw channel index of throttle, roll, pitch, yaw, aux1 and aux2.
    pub channel_map: [usize; 6],
    pub cyclic_expo: f32,
    pub cyclic_rate: f32,
    pub throttle_mid: f32,
    pub throttle_expo: f32,
    pub aux_threshold: f32,
    pub throttle_margin: f32,
    pub trim_roll: f32,
    pub trim_pitch: f32,
    pub trim_yaw: f32,
    /// Rotate cyclic demands into the heading captured at arm time.
    pub headless: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            channel_map: [0, 1, 2, 3, 4, 5],
            cyclic_expo: 0.65,
            cyclic_rate: 0.90,
            throttle_mid: 0.5,
            throttle_expo: 0.20,
            aux_threshold: 0.4,
            throttle_margin: 0.1,
            trim_roll: 0.,
            trim_pitch: 0.,
            trim_yaw: 0.,
            headless: false,
        }
    }
}

impl ReceiverConfig {
    /// Check that every mapped channel exists and the throttle curve is defined.
    pub fn validate(&self) -> Result<(), Error> {
        for (channel, &index) in self.channel_map.iter().enumerate() {
            if index >= MAX_CHANNELS {
                return Err(Error::InvalidChannel { channel, index });
            }
        }

        let mid = self.throttle_mid;
        if !(mid > 0. && mid < 1.) {
            return Err(Error::InvalidThrottleMid(mid));
        }

        Ok(())
    }
}

/// A [`Receiver`] that shapes raw channels from a [`ChannelSource`].
///
/// Cyclic sticks pass through an expo curve and are scaled to -0.5 ~ +0.5,
/// throttle passes through an expo curve centered on `throttle_mid` to 0 ~ 1.
pub struct ChannelReceiver<S> {
    source: S,
    config: ReceiverConfig,
    raw: [f32; MAX_CHANNELS],
    demands: Demands,
    aux1_state: u8,
    aux2_state: u8,
}

impl<S: ChannelSource> ChannelReceiver<S> {
    pub fn new(source: S) -> Self {
        Self::from_valid_config(source, ReceiverConfig::default())
    }

    pub fn with_config(source: S, config: ReceiverConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::from_valid_config(source, config))
    }

    fn from_valid_config(source: S, config: ReceiverConfig) -> Self {
        // Sticks centered, throttle at minimum until the first frame
        let mut raw = [0.; MAX_CHANNELS];
        raw[config.channel_map[CHANNEL_THROTTLE]] = -1.;
        raw[config.channel_map[CHANNEL_AUX1]] = -1.;
        raw[config.channel_map[CHANNEL_AUX2]] = -1.;

        Self {
            source,
            config,
            raw,
            demands: Demands::default(),
            aux1_state: 0,
            aux2_state: 0,
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Three-position state of the arming switch.
    pub fn aux1_position(&self) -> u8 {
        self.aux1_state
    }

    fn raw_value(&self, channel: usize) -> f32 {
        self.raw[self.config.channel_map[channel]]
    }

    fn cyclic_command(&self, channel: usize) -> f32 {
        let raw = self.raw_value(channel);
        let command = rc_fun(raw.abs(), self.config.cyclic_expo, self.config.cyclic_rate) / 2.;

        if raw < 0. {
            -command
        } else {
            command
        }
    }

    fn yaw_command(&self) -> f32 {
        let raw = self.raw_value(CHANNEL_YAW);
        let command = raw.abs() / 2.;

        if raw < 0. {
            -command
        } else {
            command
        }
    }

    fn throttle_fun(&self, x: f32) -> f32 {
        let mid = self.config.throttle_mid;
        let expo = self.config.throttle_expo;

        let tmp = (x + 1.) / 2. - mid;
        let y = if tmp > 0. {
            1. - mid
        } else if tmp < 0. {
            mid
        } else {
            1.
        };

        mid + tmp * (1. - expo + expo * (tmp * tmp) / (y * y))
    }
}

/// Expo curve: `(1 + e(x² - 1)) x r`.
fn rc_fun(x: f32, e: f32, r: f32) -> f32 {
    (1. + e * (x * x - 1.)) * x * r
}

impl<S: ChannelSource> Receiver for ChannelReceiver<S> {
    fn get_demands(&mut self, yaw_offset: f32) -> bool {
        if !self.source.got_new_frame() {
            return false;
        }

        self.source.read_raw(&mut self.raw);

        let mut demands = Demands {
            throttle: self.throttle_fun(self.raw_value(CHANNEL_THROTTLE)),
            roll: self.cyclic_command(CHANNEL_ROLL) + self.config.trim_roll,
            pitch: self.cyclic_command(CHANNEL_PITCH) + self.config.trim_pitch,
            yaw: self.yaw_command() + self.config.trim_yaw,
        };

        if self.config.headless {
            let (s, c) = yaw_offset.sin_cos();
            let pitch = demands.pitch;
            let roll = demands.roll;
            demands.pitch = c * pitch + s * roll;
            demands.roll = c * roll - s * pitch;
        }

        // Yaw stick is reversed
        demands.yaw = -demands.yaw;
        self.demands = demands;

        let threshold = self.config.aux_threshold;
        let aux1 = self.raw_value(CHANNEL_AUX1);
        self.aux1_state = if aux1 < 0. {
            0
        } else if aux1 > threshold {
            2
        } else {
            1
        };
        self.aux2_state = if self.raw_value(CHANNEL_AUX2) >= threshold { 1 } else { 0 };

        true
    }

    fn demands(&self) -> Demands {
        self.demands
    }

    fn throttle_is_down(&self) -> bool {
        self.raw_value(CHANNEL_THROTTLE) < -1. + self.config.throttle_margin
    }

    fn aux1_state(&self) -> bool {
        self.aux1_state > 0
    }

    fn aux2_state(&self) -> u8 {
        self.aux2_state
    }

    fn lost_signal(&self) -> bool {
        self.source.lost_signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f32::consts::FRAC_PI_2;

    #[derive(Default)]
    struct TestSource {
        raw: [f32; MAX_CHANNELS],
        fresh: bool,
        lost: bool,
    }

    impl TestSource {
        fn sticks(throttle: f32, roll: f32, pitch: f32, yaw: f32, aux1: f32) -> Self {
            let mut raw = [0.; MAX_CHANNELS];
            raw[..5].copy_from_slice(&[throttle, roll, pitch, yaw, aux1]);
            raw[5] = -1.;
            Self {
                raw,
                fresh: true,
                lost: false,
            }
        }
    }

    impl ChannelSource for TestSource {
        fn got_new_frame(&mut self) -> bool {
            core::mem::take(&mut self.fresh)
        }

        fn read_raw(&mut self, raw: &mut [f32; MAX_CHANNELS]) {
            *raw = self.raw;
        }

        fn lost_signal(&self) -> bool {
            self.lost
        }
    }

    #[test]
    fn no_frame_no_demands() {
        let mut receiver = ChannelReceiver::new(TestSource::default());
        assert!(!receiver.get_demands(0.));
        assert!(receiver.throttle_is_down());
        assert!(!receiver.aux1_state());
    }

    #[test]
    fn full_stick_is_scaled_to_half() {
        let mut receiver = ChannelReceiver::new(TestSource::sticks(1., 1., -1., 1., 1.));
        assert!(receiver.get_demands(0.));

        let demands = receiver.demands();
        assert_relative_eq!(demands.roll, 0.45);
        assert_relative_eq!(demands.pitch, -0.45);
        assert_relative_eq!(demands.yaw, -0.5);
        assert_relative_eq!(demands.throttle, 1.);
        assert!(!receiver.throttle_is_down());
        assert!(receiver.aux1_state());
        assert_eq!(receiver.aux1_position(), 2);
        assert_eq!(receiver.aux2_state(), 0);

        // Frame already consumed
        assert!(!receiver.get_demands(0.));
    }

    #[test]
    fn centered_sticks() {
        let mut receiver = ChannelReceiver::new(TestSource::sticks(-1., 0., 0., 0., 0.2));
        receiver.get_demands(0.);

        let demands = receiver.demands();
        assert_eq!(demands.roll, 0.);
        assert_eq!(demands.pitch, 0.);
        assert_relative_eq!(demands.throttle, 0.);
        assert!(receiver.throttle_is_down());
        assert_eq!(receiver.aux1_position(), 1);
        assert!(receiver.aux1_state());
    }

    #[test]
    fn throttle_curve_passes_through_mid() {
        let mut receiver = ChannelReceiver::new(TestSource::sticks(0., 0., 0., 0., -1.));
        receiver.get_demands(0.);
        assert_relative_eq!(receiver.demands().throttle, 0.5);
        assert!(!receiver.aux1_state());
    }

    #[test]
    fn headless_rotates_cyclic() {
        let config = ReceiverConfig {
            headless: true,
            ..Default::default()
        };
        let mut receiver =
            ChannelReceiver::with_config(TestSource::sticks(0., 0., 1., 0., 0.), config).unwrap();
        receiver.get_demands(FRAC_PI_2);

        let demands = receiver.demands();
        assert_relative_eq!(demands.pitch, 0., epsilon = 1e-6);
        assert_relative_eq!(demands.roll, -0.45, epsilon = 1e-6);
    }

    #[test]
    fn remapped_channels() {
        let config = ReceiverConfig {
            channel_map: [7, 1, 2, 3, 4, 5],
            ..Default::default()
        };
        let mut source = TestSource::sticks(-1., 0., 0., 0., 1.);
        source.raw[7] = 1.;

        let mut receiver = ChannelReceiver::with_config(source, config).unwrap();
        receiver.get_demands(0.);
        assert_relative_eq!(receiver.demands().throttle, 1.);
    }

    #[test]
    fn channel_past_the_frame_is_rejected() {
        let config = ReceiverConfig {
            channel_map: [0, 1, 2, 3, 4, 9],
            ..Default::default()
        };

        match ChannelReceiver::with_config(TestSource::default(), config) {
            Err(Error::InvalidChannel { channel, index }) => {
                assert_eq!(channel, CHANNEL_AUX2);
                assert_eq!(index, 9);
            }
            Err(other) => panic!("unexpected {:?}", other),
            Ok(_) => panic!("accepted channel 9"),
        }
    }

    #[test]
    fn throttle_mid_at_the_ends_is_rejected() {
        for throttle_mid in [0., 1., f32::NAN] {
            let config = ReceiverConfig {
                throttle_mid,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidThrottleMid(_))
            ));
        }
        assert!(ReceiverConfig::default().validate().is_ok());
    }

    #[test]
    fn lost_signal_from_source() {
        let mut source = TestSource::default();
        source.lost = true;
        let receiver = ChannelReceiver::new(source);
        assert!(receiver.lost_signal());
    }
}
