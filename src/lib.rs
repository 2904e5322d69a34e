//! # hackflight
//! Flight control loop for small multirotor vehicles.
//!
//! # Core
//! [`Hackflight`] owns the loop: it reads the [`receiver`], updates the
//! [`VehicleState`] from the [`sensor`]s, corrects the stick [`Demands`] with the
//! [`control`] PID controllers and sends them to an [`Actuator`].
//!
//! [`Stabilizer`](control::Stabilizer) is the attitude PID controller.
//!
//! [`ArmingController`](safety::ArmingController) arms and disarms the vehicle
//! and handles loss of the receiver signal.
//!
//! # Hardware
//! [`hal`] contains the board, motor and actuator traits with
//! `embedded-hal` implementations, [`Mixer`](mixer::Mixer) mixes demands into
//! motor outputs and [`RxProxy`](proxy::RxProxy) passes them on to another
//! flight controller.
//!
//! # Host
//! [`FlightLoop`](runner::FlightLoop) drives the loop from a tokio timer.

pub mod config;
pub use config::{Config, StabilizerGains, StabilizerLimits};

pub mod control;

mod error;
pub use error::Error;

pub mod filter;

mod hackflight;
pub use hackflight::{Builder, Hackflight, Variant};

pub mod hal;
pub use hal::Actuator;

pub mod mixer;

pub mod proxy;

pub mod receiver;

pub mod runner;

pub mod safety;

pub mod scheduler;

pub mod sensor;

pub mod state;
pub use state::{Demands, VehicleState};

pub mod telemetry;
