//! Periodic task cadence for the cooperative control loop.

/// A task that runs at a desired frequency, polled once per loop.
///
/// Nothing blocks: [`ready`](TimerTask::ready) compares the time since the
/// last run against the task period.
#[derive(Clone, Copy, Debug)]
pub struct TimerTask {
    /// The desired period (in seconds) between runs.
    period: f32,

    /// The last time (in seconds) this task ran.
    time_prev: f32,
}

impl TimerTask {
    /// Create a new task from the desired frequency (in hz).
    /// A 0hz task runs every time it is polled.
    pub fn new(hz: f32) -> Self {
        let period = if hz > 0. { 1. / hz } else { 0. };
        Self {
            period,
            time_prev: 0.,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Returns `true` and records `time` if the task is due to run.
    ///
    /// A time before the last run restarts the cadence from `time`.
    pub fn ready(&mut self, time: f32) -> bool {
        if time < self.time_prev || time - self.time_prev >= self.period {
            self.time_prev = time;
            true
        } else {
            false
        }
    }
}
