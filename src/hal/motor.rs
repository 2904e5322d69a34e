use embedded_hal::PwmPin;
use num_traits::{Num, NumCast, ToPrimitive, Zero};

/// A single motor driven with a value in [0, 1].
pub trait Motor {
    /// Prepare the motor for output.
    fn init(&mut self) {}

    fn write(&mut self, value: f32);
}

impl<T: Motor + ?Sized> Motor for &mut T {
    fn init(&mut self) {
        (**self).init()
    }

    fn write(&mut self, value: f32) {
        (**self).write(value)
    }
}

/// A motor behind an ESC driven by a PWM pin.
///
/// Values in [0, 1] are mapped linearly onto the duty range `min ~ max`.
pub struct PwmMotor<T: PwmPin> {
    min: T::Duty,
    max: T::Duty,
    pin: T,
}

impl<T> PwmMotor<T>
where
    T: PwmPin,
    T::Duty: Num + NumCast + ToPrimitive + Copy,
{
    pub fn new(min: T::Duty, max: T::Duty, pin: T) -> Self {
        Self { min, max, pin }
    }

    /// Create a motor for the full duty range of the pin.
    pub fn with_full_range(pin: T) -> Self {
        let max = pin.get_max_duty();
        Self::new(T::Duty::zero(), max, pin)
    }

    pub fn pin(&self) -> &T {
        &self.pin
    }

    pub fn release(self) -> T {
        self.pin
    }

    fn duty(&self, value: f32) -> Option<T::Duty> {
        let min = self.min.to_f32()?;
        let max = self.max.to_f32()?;
        let value = value.max(0.).min(1.);

        <T::Duty as NumCast>::from(min + value * (max - min))
    }
}

impl<T> Motor for PwmMotor<T>
where
    T: PwmPin,
    T::Duty: Num + NumCast + ToPrimitive + Copy,
{
    fn init(&mut self) {
        self.pin.enable();
        self.pin.set_duty(self.min);
    }

    fn write(&mut self, value: f32) {
        match self.duty(value) {
            Some(duty) => self.pin.set_duty(duty),
            None => self.pin.set_duty(self.min),
        }
    }
}
