//! Host runner driving the flight loop from a tokio timer.

use crate::hackflight::Hackflight;
use crate::hal::{Actuator, Board};
use crate::receiver::Receiver;
use crate::state::VehicleState;
use crate::Error;
use embedded_time::Clock;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Runs [`Hackflight::update`] at a fixed period until shut down.
///
/// The loop is the only owner of the flight loop while it runs; other tasks
/// observe it through the published [`VehicleState`].
#[derive(Clone, Copy, Debug)]
pub struct FlightLoop {
    period: Duration,
}

impl FlightLoop {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Create a loop running at `hz`, or as fast as possible at 0hz.
    pub fn from_hz(hz: f32) -> Self {
        let period = if hz > 0. {
            Duration::from_secs_f32(1. / hz)
        } else {
            Duration::ZERO
        };
        Self::new(period)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick `hackflight` until `shutdown` is set or its sender is dropped.
    ///
    /// Missed ticks are skipped rather than bunched up. The vehicle state is
    /// published to `state` after every tick. Returns the number of ticks run.
    pub async fn run<C, B, R, A>(
        &self,
        hackflight: &mut Hackflight<C, B, R, A>,
        mut shutdown: watch::Receiver<bool>,
        state: Option<watch::Sender<VehicleState>>,
    ) -> Result<u64, Error>
    where
        C: Clock<T = u32>,
        B: Board,
        R: Receiver,
        A: Actuator,
    {
        if *shutdown.borrow() {
            return Ok(0);
        }

        let mut interval = time::interval(self.period.max(Duration::from_micros(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks = 0;
        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    hackflight.update()?;
                    ticks += 1;

                    if let Some(sender) = &state {
                        sender.send_replace(*hackflight.state());
                    }
                }
            }
        }

        log::info!("flight loop stopped after {} ticks", ticks);
        Ok(ticks)
    }
}
