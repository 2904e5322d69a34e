use crate::hal::Actuator;
use crate::receiver::{CHANNEL_PITCH, CHANNEL_ROLL, CHANNEL_THROTTLE, CHANNEL_YAW};
use crate::state::Demands;

/// Receiver-style channel outputs, e.g. PWM or PPM to a downstream flight controller.
pub trait ChannelOutput {
    /// Write a channel value in [-1, 1].
    fn write_channel(&mut self, channel: usize, value: f32);
}

impl<T: ChannelOutput + ?Sized> ChannelOutput for &mut T {
    fn write_channel(&mut self, channel: usize, value: f32) {
        (**self).write_channel(channel, value)
    }
}

/// Passes receiver demands through to channel outputs without stabilization.
///
/// Demands are written back on the receiver scale: throttle in [-1, 1],
/// cyclic sticks doubled from [-0.5, 0.5].
pub struct RxProxy<O> {
    output: O,
}

impl<O: ChannelOutput> RxProxy<O> {
    pub fn new(output: O) -> Self {
        Self { output }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    fn send(&mut self, throttle: f32, roll: f32, pitch: f32, yaw: f32) {
        self.output.write_channel(CHANNEL_THROTTLE, throttle);
        self.output.write_channel(CHANNEL_ROLL, roll);
        self.output.write_channel(CHANNEL_PITCH, pitch);
        self.output.write_channel(CHANNEL_YAW, yaw);
    }
}

impl<O: ChannelOutput> Actuator for RxProxy<O> {
    fn run(&mut self, demands: Demands) {
        self.send(
            2. * demands.throttle - 1.,
            2. * demands.roll,
            2. * demands.pitch,
            2. * demands.yaw,
        );
    }

    fn cut(&mut self) {
        self.send_disarmed();
    }

    /// Throttle at minimum with centered sticks.
    fn send_disarmed(&mut self) {
        self.send(-1., 0., 0., 0.);
    }
}
