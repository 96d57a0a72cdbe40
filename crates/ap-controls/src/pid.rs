//! PID controller element.
//!
//! The controller is an [`Evaluable`] wired to a target element, a measured
//! value element and optionally the measured value's rate:
//! - **With rate**: the derivative term uses `-rate` directly, avoiding
//!   differentiation of a noisy error signal
//! - **Without rate**: the derivative term is the finite difference of the error
//!
//! The output is not clamped here. Loops bound it by wrapping the controller in
//! a [`Constraint`](crate::Constraint) element.

use ap_core::{ElementId, Real, clamp_unordered};
use serde::{Deserialize, Serialize};

use crate::element::Evaluable;

/// Tunable gains of a PID controller.
///
/// Values are accepted as given. Non-finite gains are not rejected; they show
/// up as sanitized zeros at the next sanitizing element downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidParameters {
    /// Proportional gain.
    pub kp: Real,
    /// Integral gain.
    pub ki: Real,
    /// Derivative gain.
    pub kd: Real,
    /// Integrator magnitude limit.
    pub imax: Real,
    /// Feed-forward gain applied to the target.
    pub ff: Real,
}

impl PidParameters {
    pub fn new(kp: Real, ki: Real, kd: Real) -> Self {
        Self {
            kp,
            ki,
            kd,
            ..Self::default()
        }
    }

    /// Set integrator limit.
    pub fn with_imax(mut self, imax: Real) -> Self {
        self.imax = imax;
        self
    }

    /// Set feed-forward gain.
    pub fn with_ff(mut self, ff: Real) -> Self {
        self.ff = ff;
        self
    }
}

impl Default for PidParameters {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            imax: Real::INFINITY,
            ff: 0.0,
        }
    }
}

/// Internal quantities of the last update, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidStatus {
    /// Target used by the last update (override value if active).
    pub target: Real,
    /// Measured value.
    pub value: Real,
    pub error: Real,
    /// Proportional contribution.
    pub p: Real,
    /// Integral contribution.
    pub i: Real,
    /// Derivative contribution.
    pub d: Real,
    /// Feed-forward contribution.
    pub ff: Real,
    pub integrator: Real,
    pub output: Real,
}

/// PID controller with target override.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    /// target, value and optionally rate, in that order.
    inputs: Vec<ElementId>,
    params: PidParameters,
    override_target: Option<Real>,
    integrator: Real,
    last_error: Option<Real>,
    status: PidStatus,
}

impl PidController {
    /// Controller deriving its D term from the finite-differenced error.
    pub fn new(target: ElementId, value: ElementId, params: PidParameters) -> Self {
        Self::with_inputs(vec![target, value], params)
    }

    /// Controller deriving its D term from a measured rate.
    pub fn with_rate(
        target: ElementId,
        value: ElementId,
        rate: ElementId,
        params: PidParameters,
    ) -> Self {
        Self::with_inputs(vec![target, value, rate], params)
    }

    fn with_inputs(inputs: Vec<ElementId>, params: PidParameters) -> Self {
        Self {
            inputs,
            params,
            override_target: None,
            integrator: 0.0,
            last_error: None,
            status: PidStatus::default(),
        }
    }

    pub fn params(&self) -> PidParameters {
        self.params
    }

    /// Replace all gains at once. Integrator state is kept.
    pub fn set_params(&mut self, params: PidParameters) {
        self.params = params;
    }

    pub fn status(&self) -> PidStatus {
        self.status
    }

    /// Use `target` instead of the wired target element until
    /// [`disable_override`](Self::disable_override) is called.
    pub fn override_target(&mut self, target: Real) {
        self.override_target = Some(target);
    }

    pub fn disable_override(&mut self) {
        self.override_target = None;
    }

    pub fn active_override(&self) -> Option<Real> {
        self.override_target
    }

    pub fn has_rate_input(&self) -> bool {
        self.inputs.len() == 3
    }

    /// Clear integrator and derivative memory.
    pub fn reset(&mut self) {
        self.integrator = 0.0;
        self.last_error = None;
        self.status = PidStatus::default();
    }
}

impl Evaluable for PidController {
    fn inputs(&self) -> &[ElementId] {
        &self.inputs
    }

    fn evaluate(&mut self, inputs: &[Real], dt: Real) {
        let (target_input, value) = match inputs {
            [target, value, ..] => (*target, *value),
            _ => return,
        };
        let rate = inputs.get(2).copied();
        let params = self.params;

        let target = self.override_target.unwrap_or(target_input);
        let error = target - value;

        let p = params.kp * error;

        // Non-finite samples are kept out of integrator and derivative memory.
        let increment = error * dt;
        if increment.is_finite() {
            self.integrator =
                clamp_unordered(self.integrator + increment, -params.imax, params.imax);
        }
        let i = params.ki * self.integrator;

        let derivative = match (rate, self.last_error) {
            (Some(rate), _) => -rate,
            (None, Some(last)) if dt > 0.0 => (error - last) / dt,
            (None, _) => 0.0,
        };
        let d = params.kd * derivative;
        self.last_error = error.is_finite().then_some(error);

        let ff = params.ff * target;
        let output = p + i + d + ff;

        self.status = PidStatus {
            target,
            value,
            error,
            p,
            i,
            d,
            ff,
            integrator: self.integrator,
            output,
        };
    }

    fn output(&self) -> Real {
        self.status.output
    }
}
