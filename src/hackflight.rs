use crate::config::Config;
use crate::control::{PidController, PidTask, Stabilizer};
use crate::hal::{Actuator, Board};
use crate::receiver::Receiver;
use crate::safety::{ArmingController, ArmingEvent};
use crate::scheduler::TimerTask;
use crate::sensor::{Imu, Sensor, SurfaceMount};
use crate::state::{Demands, VehicleState};
use crate::telemetry::Telemetry;
use crate::Error;
use embedded_time::{duration::Microseconds, Clock, Instant};

/// The flavor of the flight loop, fixed when it is built.
pub enum Variant {
    /// IMU sensors and PID controllers between the receiver and the actuator.
    Full(SurfaceMount<Box<dyn Imu>>),

    /// Receiver demands passed straight to the actuator.
    Lite,
}

impl Variant {
    pub fn is_lite(&self) -> bool {
        matches!(self, Variant::Lite)
    }
}

/// The flight control loop.
///
/// Owns every collaborator; call [`update`](Hackflight::update) once per loop.
/// ```no_run
/// use hackflight::Hackflight;
/// # fn run<C, B, R, A>(mut hackflight: Hackflight<C, B, R, A>) -> Result<(), hackflight::Error>
/// # where
/// #     C: embedded_time::Clock<T = u32>,
/// #     B: hackflight::hal::Board,
/// #     R: hackflight::receiver::Receiver,
/// #     A: hackflight::hal::Actuator,
/// # {
/// loop {
///     hackflight.update()?;
/// }
/// # }
/// ```
pub struct Hackflight<C: Clock, B, R, A> {
    clock: C,
    board: B,
    receiver: R,
    actuator: A,
    arming: ArmingController,
    variant: Variant,
    sensors: Vec<Box<dyn Sensor>>,
    pid_task: PidTask,
    serial_task: TimerTask,
    telemetry: Option<Box<dyn Telemetry>>,
    state: VehicleState,

    /// Demands most recently sent towards the actuator.
    demands: Demands,

    instant_prev: Option<Instant<C>>,

    /// Microseconds counted since the first loop, across clock wrap-arounds.
    elapsed_micros: u64,
}

impl<C, B, R, A> Hackflight<C, B, R, A>
where
    C: Clock<T = u32>,
    B: Board,
    R: Receiver,
    A: Actuator,
{
    pub fn builder() -> Builder<C, B, R, A> {
        Builder::default()
    }

    /// Add an optional sensor, polled after the IMU in the order added.
    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor>) {
        if self.variant.is_lite() {
            log::warn!("lite flight loop ignores sensors");
            return;
        }
        self.sensors.push(sensor);
    }

    /// Add a PID controller, run when the aux2 switch is at or above `aux_state`.
    pub fn add_pid_controller(&mut self, controller: Box<dyn PidController>, aux_state: u8) {
        if self.variant.is_lite() {
            log::warn!("lite flight loop ignores PID controllers");
            return;
        }
        self.pid_task.add_controller(controller, aux_state);
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn demands(&self) -> Demands {
        self.demands
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn arming(&self) -> &ArmingController {
        &self.arming
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Run one loop: safety checks, sensors, PID controllers and telemetry.
    /// Returns the arming transition of this loop, if any.
    ///
    /// The motors are cut and the vehicle disarmed before a clock error is returned.
    pub fn update(&mut self) -> Result<Option<ArmingEvent>, Error> {
        let time = match self.seconds() {
            Ok(time) => time,
            Err(error) => {
                log::error!("flight loop clock failed: {}", error);
                self.arming.disarm(&mut self.actuator, &mut self.state);
                return Err(error);
            }
        };

        let event = self.arming.check(
            time,
            &mut self.receiver,
            &mut self.actuator,
            &mut self.board,
            &mut self.state,
        );

        match &mut self.variant {
            Variant::Full(surface_mount) => {
                surface_mount.update(&mut self.state, time);

                for sensor in &mut self.sensors {
                    if sensor.ready(time) {
                        sensor.modify_state(&mut self.state, time);
                    }
                }

                if !self.state.armed {
                    self.actuator.send_disarmed();
                }
                self.run_pid_task(time);
            }
            Variant::Lite => {
                if self.state.armed {
                    self.run_pid_task(time);
                } else {
                    self.actuator.send_disarmed();
                    self.demands = self.receiver.demands();
                }
            }
        }

        if self.serial_task.ready(time) {
            if let Some(telemetry) = &mut self.telemetry {
                telemetry.update(&self.state, &self.demands);
            }
        }

        Ok(event)
    }

    fn run_pid_task(&mut self, time: f32) {
        match self
            .pid_task
            .update(time, &self.receiver, &mut self.actuator, &self.state)
        {
            Some(demands) => self.demands = demands,
            None => log::trace!("PID task not due at {}", time),
        }
    }

    /// Time in seconds since the clock epoch at the first loop.
    ///
    /// Ticks are counted between loops so the time keeps increasing when the
    /// clock counter wraps around.
    fn seconds(&mut self) -> Result<f32, Error> {
        let now = self.clock.try_now()?;
        let elapsed = match &self.instant_prev {
            Some(prev) => now.checked_duration_since(prev),
            None => Some(now.duration_since_epoch()),
        };
        self.instant_prev = Some(now);

        match elapsed {
            Some(elapsed) => {
                let micros = Microseconds::<u32>::try_from(elapsed)?;
                self.elapsed_micros += u64::from(micros.0);
            }
            None => log::warn!("clock went backwards, holding the loop time"),
        }

        Ok((self.elapsed_micros as f64 * 1e-6) as f32)
    }
}

/// Builder for a [`Hackflight`] loop.
///
/// The clock, board, receiver and actuator are required. A full loop also
/// needs an [`Imu`]; call [`lite`](Builder::lite) for a pass-through loop instead.
pub struct Builder<C, B, R, A> {
    clock: Option<C>,
    board: Option<B>,
    receiver: Option<R>,
    actuator: Option<A>,
    imu: Option<Box<dyn Imu>>,
    lite: bool,
    stabilizer: Option<Stabilizer>,
    sensors: Vec<Box<dyn Sensor>>,
    controllers: Vec<(Box<dyn PidController>, u8)>,
    telemetry: Option<Box<dyn Telemetry>>,
    config: Config,
    armed: bool,
}

impl<C, B, R, A> Default for Builder<C, B, R, A> {
    fn default() -> Self {
        Self {
            clock: None,
            board: None,
            receiver: None,
            actuator: None,
            imu: None,
            lite: false,
            stabilizer: None,
            sensors: Vec::new(),
            controllers: Vec::new(),
            telemetry: None,
            config: Config::default(),
            armed: false,
        }
    }
}

impl<C, B, R, A> Builder<C, B, R, A>
where
    C: Clock<T = u32>,
    B: Board,
    R: Receiver,
    A: Actuator,
{
    pub fn clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn board(mut self, board: B) -> Self {
        self.board = Some(board);
        self
    }

    pub fn receiver(mut self, receiver: R) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn actuator(mut self, actuator: A) -> Self {
        self.actuator = Some(actuator);
        self
    }

    pub fn imu(mut self, imu: impl Imu + 'static) -> Self {
        self.imu = Some(Box::new(imu));
        self
    }

    /// Pass receiver demands straight through to the actuator, without sensors or PID.
    pub fn lite(mut self) -> Self {
        self.lite = true;
        self
    }

    /// The stabilizer, run before any other PID controller at every aux2 position.
    pub fn stabilizer(mut self, stabilizer: Stabilizer) -> Self {
        self.stabilizer = Some(stabilizer);
        self
    }

    pub fn sensor(mut self, sensor: Box<dyn Sensor>) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn pid_controller(mut self, controller: Box<dyn PidController>, aux_state: u8) -> Self {
        self.controllers.push((controller, aux_state));
        self
    }

    pub fn telemetry(mut self, telemetry: Box<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Start armed, for simulation.
    pub fn armed(mut self, armed: bool) -> Self {
        self.armed = armed;
        self
    }

    pub fn build(self) -> Result<Hackflight<C, B, R, A>, Error> {
        let clock = self.clock.ok_or(Error::MissingComponent("clock"))?;
        let board = self.board.ok_or(Error::MissingComponent("board"))?;
        let receiver = self.receiver.ok_or(Error::MissingComponent("receiver"))?;
        let actuator = self.actuator.ok_or(Error::MissingComponent("actuator"))?;

        let mut pid_task = PidTask::new(self.config.pid_hz);
        let mut sensors = Vec::new();

        let variant = if self.lite {
            if self.stabilizer.is_some() || !self.controllers.is_empty() || !self.sensors.is_empty()
            {
                log::warn!("lite flight loop ignores sensors and PID controllers");
            }
            Variant::Lite
        } else {
            let imu = self.imu.ok_or(Error::MissingComponent("imu"))?;

            if let Some(stabilizer) = self.stabilizer {
                stabilizer.gains().validate()?;
                pid_task.add_controller(Box::new(stabilizer), 0);
            }
            for (controller, aux_state) in self.controllers {
                pid_task.add_controller(controller, aux_state);
            }
            sensors = self.sensors;

            Variant::Full(SurfaceMount::new(imu))
        };

        let arming =
            ArmingController::new(self.config.max_arming_angle_degrees).with_armed(self.armed);
        let state = VehicleState {
            armed: self.armed,
            ..Default::default()
        };

        Ok(Hackflight {
            clock,
            board,
            receiver,
            actuator,
            arming,
            variant,
            sensors,
            pid_task,
            serial_task: TimerTask::new(self.config.serial_hz),
            telemetry: self.telemetry,
            state,
            demands: Demands::default(),
            instant_prev: None,
            elapsed_micros: 0,
        })
    }
}
