//! Integration tests for the maneuver rate cascade.

use std::cell::RefCell;

use ap_cascade::{
    CascadeConfig, CascadeError, ControllerOutput, ControllerTarget, DataRequest, Diagnostic,
    LoopId, ManeuverOverride, ManeuverRateCascade, SensorData,
};
use ap_controls::{PidParameters, Real};
use ap_core::{Tolerances, nearly_equal};
use proptest::prelude::*;

struct Rig {
    sensors: SensorData,
    target: ControllerTarget,
    out: ControllerOutput,
}

impl Rig {
    fn new() -> Self {
        Self {
            sensors: SensorData::default(),
            target: ControllerTarget::default(),
            out: ControllerOutput::default(),
        }
    }

    fn cascade(&self) -> ManeuverRateCascade<'_> {
        ManeuverRateCascade::new(&self.sensors, &self.target, &self.out).unwrap()
    }
}

fn close(a: Real, b: Real) -> bool {
    nearly_equal(a, b, Tolerances::default())
}

fn tuned_config() -> CascadeConfig {
    CascadeConfig {
        roll: PidParameters::new(2.0, 0.0, 0.1),
        roll_rate: PidParameters::new(0.5, 0.0, 0.0),
        climb_angle: PidParameters::new(1.0, 0.0, 0.0),
        pitch: PidParameters::new(1.0, 0.0, 0.0),
        velocity: PidParameters::new(0.1, 0.0, 0.0),
        ..CascadeConfig::default()
    }
}

#[test]
fn override_is_full_replace() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();

    cascade.set_maneuver_override(&ManeuverOverride::new().with(LoopId::Roll, 0.3));
    assert_eq!(cascade.active_override().get(LoopId::Roll), Some(0.3));

    cascade.set_maneuver_override(&ManeuverOverride::new());
    assert!(cascade.active_override().is_empty());
}

#[test]
fn override_replaces_previous_entries() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();

    cascade.set_maneuver_override(
        &ManeuverOverride::new()
            .with(LoopId::Roll, 0.3)
            .with(LoopId::Velocity, 15.0),
    );
    cascade.set_maneuver_override(&ManeuverOverride::new().with(LoopId::Pitch, 0.05));

    let active = cascade.active_override();
    assert_eq!(active.get(LoopId::Roll), None);
    assert_eq!(active.get(LoopId::Velocity), None);
    assert_eq!(active.get(LoopId::Pitch), Some(0.05));
}

#[test]
fn override_for_rudder_is_reported_and_skipped() {
    let rig = Rig::new();
    let seen = RefCell::new(Vec::new());
    let mut cascade = rig
        .cascade()
        .with_diagnostics(|d: &Diagnostic| seen.borrow_mut().push(d.clone()));

    cascade.set_maneuver_override(
        &ManeuverOverride::new()
            .with(LoopId::Rudder, 0.1)
            .with(LoopId::ClimbAngle, 0.2),
    );

    assert_eq!(cascade.active_override().get(LoopId::ClimbAngle), Some(0.2));
    assert_eq!(cascade.active_override().get(LoopId::Rudder), None);
    assert_eq!(
        seen.borrow().as_slice(),
        &[Diagnostic::UnknownLoop {
            id: LoopId::Rudder,
            operation: "set_maneuver_override",
        }]
    );
}

#[test]
fn tune_unknown_loop_leaves_parameters_unchanged() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    cascade.configure(&tuned_config()).unwrap();

    let before = cascade.pid_params(DataRequest::PidParams).unwrap();
    let err = cascade
        .tune_pid(LoopId::Rudder, PidParameters::new(9.0, 9.0, 9.0))
        .unwrap_err();
    assert_eq!(err, CascadeError::UnknownLoop { id: LoopId::Rudder });
    let after = cascade.pid_params(DataRequest::PidParams).unwrap();
    assert_eq!(before, after);
}

#[test]
fn tune_known_loop_replaces_only_that_loop() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    cascade.configure(&tuned_config()).unwrap();

    let params = PidParameters::new(0.7, 0.2, 0.0).with_imax(0.5);
    cascade.tune_pid(LoopId::Velocity, params).unwrap();

    let all = cascade.pid_params(DataRequest::PidParams).unwrap();
    assert_eq!(all[&LoopId::Velocity], params);
    assert_eq!(all[&LoopId::Roll], tuned_config().roll);
}

#[test]
fn pid_params_only_for_params_request() {
    let rig = Rig::new();
    let cascade = rig.cascade();
    assert!(cascade.pid_params(DataRequest::MissionList).is_none());
    assert!(cascade.pid_params(DataRequest::LocalFrame).is_none());
    let params = cascade.pid_params(DataRequest::PidParams).unwrap();
    assert_eq!(params.len(), 5);
}

#[test]
#[allow(deprecated)]
fn deprecated_bound_tuning_is_unsupported() {
    let rig = Rig::new();
    let seen = RefCell::new(Vec::new());
    let mut cascade = rig
        .cascade()
        .with_diagnostics(|d: &Diagnostic| seen.borrow_mut().push(d.clone()));

    assert_eq!(
        cascade.tune_roll_bounds(-0.5, 0.5),
        Err(CascadeError::Unsupported {
            operation: "tune_roll_bounds"
        })
    );
    assert!(matches!(
        cascade.tune_pitch_bounds(-0.2, 0.2),
        Err(CascadeError::Unsupported { .. })
    ));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn invalid_config_is_rejected_without_side_effects() {
    let rig = Rig::new();
    let seen = RefCell::new(Vec::new());
    let mut cascade = rig
        .cascade()
        .with_diagnostics(|d: &Diagnostic| seen.borrow_mut().push(d.clone()));

    let mut config = tuned_config();
    config.roll_target_limit = Real::NAN;
    assert!(matches!(
        cascade.configure(&config),
        Err(CascadeError::Config { .. })
    ));
    let params = cascade.pid_params(DataRequest::PidParams).unwrap();
    assert_eq!(params[&LoopId::Roll], PidParameters::default());
    assert!(matches!(
        seen.borrow().as_slice(),
        [Diagnostic::ConfigRejected { .. }]
    ));
}

#[test]
fn outputs_are_bounded_and_throttle_is_offset() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();

    // Zero gains: every PID outputs 0, throttle = clamp(0 - 1) = -1.
    cascade.evaluate();
    assert_eq!(rig.out.roll_output.get(), 0.0);
    assert_eq!(rig.out.pitch_output.get(), 0.0);
    assert_eq!(rig.out.throttle_output.get(), -1.0);

    cascade.configure(&tuned_config()).unwrap();
    rig.target.velocity.set(40.0);
    rig.sensors.airspeed.set(20.0);
    rig.sensors.timestamp.set(0.02);
    cascade.evaluate();
    // Filtered airspeed still lags near zero, so the throttle saturates.
    assert_eq!(rig.out.throttle_output.get(), 1.0);
}

#[test]
fn roll_target_follows_coordinated_turn_and_limit() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    cascade.configure(&tuned_config()).unwrap();

    rig.sensors.airspeed.set(20.0);
    rig.target.yaw_rate.set(0.1);
    cascade.evaluate();

    let expected = ManeuverRateCascade::yaw_rate_to_roll(0.1, 20.0);
    let roll = cascade.pid_status()[&LoopId::Roll];
    assert!(close(roll.target, expected));

    // A steep turn is capped by the roll target limit.
    rig.target.yaw_rate.set(2.0);
    rig.sensors.timestamp.set(0.02);
    cascade.evaluate();
    let roll = cascade.pid_status()[&LoopId::Roll];
    assert!(close(roll.target, -CascadeConfig::default().roll_target_limit));
}

#[test]
fn loop_recovers_after_non_finite_override() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    cascade
        .tune_pid(LoopId::ClimbAngle, PidParameters::new(1.0, 0.0, 0.0))
        .unwrap();
    cascade
        .tune_pid(LoopId::Pitch, PidParameters::new(1.0, 0.0, 0.0))
        .unwrap();
    rig.target.climb_angle.set(0.1);

    let mut t = 0.0;
    let mut tick = |cascade: &mut ManeuverRateCascade<'_>| {
        t += 0.02;
        rig.sensors.timestamp.set(t);
        cascade.evaluate();
    };

    tick(&mut cascade);
    let healthy = rig.out.pitch_output.get();
    assert!(close(healthy, 0.1));

    cascade.set_maneuver_override(&ManeuverOverride::new().with(LoopId::ClimbAngle, Real::NAN));
    tick(&mut cascade);
    // The bad target is sanitized downstream while it lasts.
    assert_eq!(rig.out.pitch_output.get(), 0.0);

    cascade.set_maneuver_override(&ManeuverOverride::new());
    for _ in 0..48 {
        tick(&mut cascade);
    }
    let status = cascade.pid_status()[&LoopId::ClimbAngle];
    assert!(status.integrator.is_finite());
    assert!(status.i.is_finite());
    assert!(close(status.output, 0.1));
    assert!(close(rig.out.pitch_output.get(), healthy));
}

#[test]
fn configure_and_reset_clear_loop_memory() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    let mut config = tuned_config();
    config.velocity = PidParameters::new(0.0, 0.5, 0.0);
    cascade.configure(&config).unwrap();
    cascade.set_maneuver_override(&ManeuverOverride::new().with(LoopId::Velocity, 20.0));

    for step in 0..10 {
        rig.sensors.timestamp.set(step as Real * 0.1);
        cascade.evaluate();
    }
    assert!(cascade.pid_status()[&LoopId::Velocity].integrator > 0.0);

    cascade.reset_loops();
    assert_eq!(cascade.pid_status()[&LoopId::Velocity].integrator, 0.0);
    assert_eq!(cascade.active_override().get(LoopId::Velocity), Some(20.0));
    assert_eq!(
        cascade.pid_params(DataRequest::PidParams).unwrap()[&LoopId::Velocity],
        config.velocity
    );

    rig.sensors.timestamp.set(1.0);
    cascade.evaluate();
    assert!(cascade.pid_status()[&LoopId::Velocity].integrator > 0.0);
    cascade.configure(&config).unwrap();
    assert_eq!(cascade.pid_status()[&LoopId::Velocity].integrator, 0.0);
}

#[test]
fn climb_angle_is_pitch_minus_angle_of_attack() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    rig.sensors.pitch.set(0.15);
    rig.sensors.angle_of_attack.set(0.05);
    cascade.evaluate();
    let status = cascade.pid_status()[&LoopId::ClimbAngle];
    assert!(close(status.value, 0.1));
}

#[test]
fn velocity_loop_sees_filtered_airspeed_of_same_tick() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    let mut config = tuned_config();
    config.airspeed_time_constant = 0.1;
    cascade.configure(&config).unwrap();

    rig.sensors.airspeed.set(10.0);
    cascade.evaluate();
    assert_eq!(cascade.pid_status()[&LoopId::Velocity].value, 10.0);

    rig.sensors.airspeed.set(20.0);
    rig.sensors.timestamp.set(0.1);
    cascade.evaluate();
    let filtered = cascade.filtered_airspeed();
    assert!(close(filtered, 15.0));
    assert_eq!(cascade.pid_status()[&LoopId::Velocity].value, filtered);
}

#[test]
fn tuning_handle_works_across_threads() {
    let rig = Rig::new();
    let mut cascade = rig.cascade();
    let handle = cascade.tuning_handle();

    std::thread::spawn(move || {
        handle
            .tune_pid(LoopId::RollRate, PidParameters::new(0.3, 0.0, 0.0))
            .unwrap();
        handle
            .set_maneuver_override(ManeuverOverride::new().with(LoopId::Velocity, 22.0))
            .unwrap();
    })
    .join()
    .unwrap();

    cascade.evaluate();
    let params = cascade.pid_params(DataRequest::PidParams).unwrap();
    assert_eq!(params[&LoopId::RollRate].kp, 0.3);
    assert_eq!(cascade.pid_status()[&LoopId::Velocity].target, 22.0);
}

proptest! {
    #[test]
    fn straight_flight_needs_no_bank(airspeed in -100.0_f64..100.0) {
        prop_assert_eq!(ManeuverRateCascade::yaw_rate_to_roll(0.0, airspeed), 0.0);
    }

    #[test]
    fn evaluate_never_faults_on_bad_sensors(
        roll in prop_oneof![Just(Real::NAN), Just(Real::INFINITY), -3.0_f64..3.0],
        airspeed in prop_oneof![Just(Real::NAN), Just(Real::NEG_INFINITY), 0.0_f64..60.0],
    ) {
        let rig = Rig::new();
        let mut cascade = rig.cascade();
        cascade.configure(&tuned_config()).unwrap();
        rig.sensors.roll.set(roll);
        rig.sensors.airspeed.set(airspeed);
        rig.target.yaw_rate.set(0.2);
        for step in 1..5 {
            rig.sensors.timestamp.set(step as Real * 0.02);
            cascade.evaluate();
            for out in [&rig.out.roll_output, &rig.out.pitch_output, &rig.out.throttle_output] {
                let v = out.get();
                prop_assert!(v.is_finite() && (-1.0..=1.0).contains(&v));
            }
        }
    }
}
