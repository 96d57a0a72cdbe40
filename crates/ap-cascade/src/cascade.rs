//! Maneuver rate cascade assembly and runtime surface.

use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender, channel};

use ap_controls::{ControlEnvironment, ElementId, PidParameters, PidStatus, Real, SignalSource};
use ap_core::GRAVITY;
use tracing::{debug, info};

use crate::config::CascadeConfig;
use crate::data::{ControllerOutput, ControllerTarget, SensorData};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{CascadeError, CascadeResult};
use crate::loops::{DataRequest, LoopId};
use crate::maneuver::ManeuverOverride;
use crate::tuning::{TuningCommand, TuningHandle};

/// Roll, roll-rate, climb-angle, pitch and velocity loops in one environment.
///
/// Bound for `'a` to the caller's sensor, target and output buffers.
pub struct ManeuverRateCascade<'a> {
    env: ControlEnvironment<'a>,
    pids: BTreeMap<LoopId, ElementId>,
    airspeed_filter: ElementId,
    roll_target_constraint: ElementId,
    roll_rate_target_constraint: ElementId,
    pitch_target_constraint: ElementId,
    diagnostics: Box<dyn DiagnosticSink + 'a>,
    tuning_tx: Sender<TuningCommand>,
    tuning_rx: Receiver<TuningCommand>,
}

impl<'a> ManeuverRateCascade<'a> {
    /// Wire every loop with default parameters.
    pub fn new(
        sensors: &'a SensorData,
        target: &'a ControllerTarget,
        out: &'a ControllerOutput,
    ) -> CascadeResult<Self> {
        let defaults = CascadeConfig::default();
        let params = PidParameters::default();
        let mut env = ControlEnvironment::new(&sensors.timestamp);

        // Roll
        let yaw_rate_target = env.add_input(&target.yaw_rate);
        let airspeed = env.add_input(&sensors.airspeed);
        let airspeed_filter = env.add_low_pass_filter(airspeed, defaults.airspeed_time_constant)?;

        let roll_calc = env.add_function2(yaw_rate_target, airspeed_filter, Self::yaw_rate_to_roll)?;
        let roll_limit = defaults.roll_target_limit;
        let roll_target_constraint = env.add_constraint(roll_calc, -roll_limit, roll_limit)?;

        let roll_input = env.add_input(&sensors.roll);
        let roll_rate_input = env.add_input(&sensors.roll_rate);
        let roll_pid =
            env.add_pid_with_rate(roll_target_constraint, roll_input, roll_rate_input, params)?;
        let rate_limit = defaults.roll_rate_target_limit;
        let roll_rate_target_constraint = env.add_constraint(roll_pid, -rate_limit, rate_limit)?;

        // Roll rate
        let roll_rate_pid = env.add_pid(roll_rate_target_constraint, roll_rate_input, params)?;
        let roll_out = env.add_constraint(roll_rate_pid, -1.0, 1.0)?;
        env.add_output(roll_out, &out.roll_output)?;

        // Climb angle
        let aoa_input = env.add_input(&sensors.angle_of_attack);
        let pitch_input = env.add_input(&sensors.pitch);
        let climb_angle = env.add_difference(pitch_input, aoa_input)?;
        let climb_angle_target = env.add_input(&target.climb_angle);
        let climb_angle_pid = env.add_pid(climb_angle_target, climb_angle, params)?;
        let pitch_limit = defaults.pitch_target_limit;
        let pitch_target_constraint =
            env.add_constraint(climb_angle_pid, -pitch_limit, pitch_limit)?;

        // Pitch
        let pitch_rate_input = env.add_input(&sensors.pitch_rate);
        let pitch_pid =
            env.add_pid_with_rate(pitch_target_constraint, pitch_input, pitch_rate_input, params)?;
        let pitch_out = env.add_constraint(pitch_pid, -1.0, 1.0)?;
        env.add_output(pitch_out, &out.pitch_output)?;

        // Velocity
        let acceleration_input = env.add_input(&sensors.acceleration_x);
        let velocity_target = env.add_input(&target.velocity);
        let velocity_pid =
            env.add_pid_with_rate(velocity_target, airspeed_filter, acceleration_input, params)?;

        // Throttle
        let velocity_offset = env.add_constant(1.0);
        let velocity_difference = env.add_difference(velocity_pid, velocity_offset)?;
        let throttle_out = env.add_constraint(velocity_difference, -1.0, 1.0)?;
        env.add_output(throttle_out, &out.throttle_output)?;

        // Rudder: LoopId::Rudder stays reserved, nothing is wired for it.

        let pids = BTreeMap::from([
            (LoopId::Velocity, velocity_pid),
            (LoopId::Pitch, pitch_pid),
            (LoopId::ClimbAngle, climb_angle_pid),
            (LoopId::Roll, roll_pid),
            (LoopId::RollRate, roll_rate_pid),
        ]);

        let (tuning_tx, tuning_rx) = channel();

        Ok(Self {
            env,
            pids,
            airspeed_filter,
            roll_target_constraint,
            roll_rate_target_constraint,
            pitch_target_constraint,
            diagnostics: Box::new(TracingSink),
            tuning_tx,
            tuning_rx,
        })
    }

    /// Replace the diagnostics sink.
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'a) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    /// Target bank angle (rad) for a coordinated turn at `yaw_rate` (rad/s)
    /// and `airspeed` (m/s).
    pub fn yaw_rate_to_roll(yaw_rate: Real, airspeed: Real) -> Real {
        -(airspeed * yaw_rate).atan2(GRAVITY)
    }

    /// Apply gains, limits and filter settings, then clear loop memory.
    ///
    /// Nothing is applied if the configuration is invalid.
    pub fn configure(&mut self, config: &CascadeConfig) -> CascadeResult<()> {
        if let Err(err) = config.validate() {
            if let CascadeError::Config { message } = &err {
                self.diagnostics.report(&Diagnostic::ConfigRejected {
                    message: message.clone(),
                });
            }
            return Err(err);
        }

        for (id, params) in config.pid_params() {
            self.tune_pid(id, params)?;
        }
        self.env
            .set_constraint_value(self.roll_target_constraint, config.roll_target_limit)?;
        self.env.set_constraint_value(
            self.roll_rate_target_constraint,
            config.roll_rate_target_limit,
        )?;
        self.env
            .set_constraint_value(self.pitch_target_constraint, config.pitch_target_limit)?;
        self.env
            .low_pass_filter_mut(self.airspeed_filter)?
            .set_time_constant(config.airspeed_time_constant);
        self.reset_loops();

        info!(loops = self.pids.len(), "maneuver rate cascade configured");
        Ok(())
    }

    /// Clear integrator and derivative memory of every loop.
    ///
    /// Parameters and active overrides are kept.
    pub fn reset_loops(&mut self) {
        for &element in self.pids.values() {
            if let Ok(pid) = self.env.pid_mut(element) {
                pid.reset();
            }
        }
    }

    /// Replace the parameters of one loop.
    pub fn tune_pid(&mut self, id: LoopId, params: PidParameters) -> CascadeResult<()> {
        let Some(&element) = self.pids.get(&id) else {
            self.diagnostics.report(&Diagnostic::UnknownLoop {
                id,
                operation: "tune_pid",
            });
            return Err(CascadeError::UnknownLoop { id });
        };
        self.env.pid_mut(element)?.set_params(params);
        Ok(())
    }

    #[deprecated(note = "target limits are set through `configure`")]
    pub fn tune_roll_bounds(&mut self, _min: Real, _max: Real) -> CascadeResult<()> {
        self.unsupported("tune_roll_bounds")
    }

    #[deprecated(note = "target limits are set through `configure`")]
    pub fn tune_pitch_bounds(&mut self, _min: Real, _max: Real) -> CascadeResult<()> {
        self.unsupported("tune_pitch_bounds")
    }

    fn unsupported(&self, operation: &'static str) -> CascadeResult<()> {
        self.diagnostics
            .report(&Diagnostic::DeprecatedCall { operation });
        Err(CascadeError::Unsupported { operation })
    }

    /// Last-tick status of every wired loop.
    pub fn pid_status(&self) -> BTreeMap<LoopId, PidStatus> {
        self.pids
            .iter()
            .filter_map(|(&id, &element)| Some((id, self.env.pid(element).ok()?.status())))
            .collect()
    }

    /// Parameters of every wired loop, if `request` asks for them.
    pub fn pid_params(&self, request: DataRequest) -> Option<BTreeMap<LoopId, PidParameters>> {
        if request != DataRequest::PidParams {
            return None;
        }
        Some(
            self.pids
                .iter()
                .filter_map(|(&id, &element)| Some((id, self.env.pid(element).ok()?.params())))
                .collect(),
        )
    }

    /// Clear every loop's override, then apply the entries of `maneuver`.
    ///
    /// Entries for loops that are not wired are reported and skipped.
    pub fn set_maneuver_override(&mut self, maneuver: &ManeuverOverride) {
        for &element in self.pids.values() {
            if let Ok(pid) = self.env.pid_mut(element) {
                pid.disable_override();
            }
        }

        for (&id, &target) in &maneuver.pid {
            match self.pids.get(&id) {
                Some(&element) => {
                    if let Ok(pid) = self.env.pid_mut(element) {
                        pid.override_target(target);
                    }
                }
                None => self.diagnostics.report(&Diagnostic::UnknownLoop {
                    id,
                    operation: "set_maneuver_override",
                }),
            }
        }
    }

    /// Overrides currently in effect.
    pub fn active_override(&self) -> ManeuverOverride {
        let pid = self
            .pids
            .iter()
            .filter_map(|(&id, &element)| Some((id, self.env.pid(element).ok()?.active_override()?)))
            .collect();
        ManeuverOverride { pid }
    }

    /// Handle for queuing tuning commands from another thread.
    pub fn tuning_handle(&self) -> TuningHandle {
        TuningHandle::new(self.tuning_tx.clone())
    }

    /// Airspeed after low-pass filtering, as of the last tick.
    pub fn filtered_airspeed(&self) -> Real {
        self.env.value(self.airspeed_filter)
    }

    pub fn environment(&self) -> &ControlEnvironment<'a> {
        &self.env
    }

    /// Run one control tick: apply queued tuning, then advance the graph and
    /// write the actuator outputs.
    pub fn evaluate(&mut self) {
        while let Ok(command) = self.tuning_rx.try_recv() {
            match command {
                TuningCommand::TunePid { id, params } => {
                    if let Err(err) = self.tune_pid(id, params) {
                        debug!(%err, "queued tuning rejected");
                    }
                }
                TuningCommand::SetOverride(maneuver) => self.set_maneuver_override(&maneuver),
            }
        }
        self.env.evaluate();
    }
}
