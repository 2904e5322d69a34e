use core::fmt::Debug;
use embedded_hal::digital::v2::OutputPin;

/// Seconds between LED toggles while flashing.
const FLASH_PERIOD: f32 = 0.25;

/// Status indicators of the flight controller board.
pub trait Board {
    /// Show whether the vehicle is armed, called every loop.
    fn show_armed_status(&mut self, armed: bool);

    /// Flash the status LED, called every loop while in failsafe.
    fn flash_led(&mut self, _time: f32) {}
}

impl<T: Board + ?Sized> Board for &mut T {
    fn show_armed_status(&mut self, armed: bool) {
        (**self).show_armed_status(armed)
    }

    fn flash_led(&mut self, time: f32) {
        (**self).flash_led(time)
    }
}

/// A board with a single status LED.
pub struct LedBoard<P> {
    pin: P,
    active_low: bool,
    led_on: bool,
    time_prev: f32,
}

impl<P> LedBoard<P>
where
    P: OutputPin,
    P::Error: Debug,
{
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
            led_on: false,
            time_prev: 0.,
        }
    }

    /// Builder method to drive the LED pin low to turn it on.
    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub fn is_led_on(&self) -> bool {
        self.led_on
    }

    pub fn set_led(&mut self, is_on: bool) {
        self.led_on = is_on;

        let result = if is_on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        if let Err(error) = result {
            log::warn!("status LED write failed: {:?}", error);
        }
    }
}

impl<P> Board for LedBoard<P>
where
    P: OutputPin,
    P::Error: Debug,
{
    fn show_armed_status(&mut self, armed: bool) {
        if armed != self.led_on {
            self.set_led(armed);
        }
    }

    fn flash_led(&mut self, time: f32) {
        if time - self.time_prev > FLASH_PERIOD {
            let is_on = !self.led_on;
            self.set_led(is_on);
            self.time_prev = time;
        }
    }
}
