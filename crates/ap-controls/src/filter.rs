//! First-order low-pass filter element.

use ap_core::{ElementId, Real};

use crate::element::Evaluable;

/// Discrete first-order low-pass filter.
///
/// Update: `y += dt / (tau + dt) * (x - y)`. The first sample seeds the state
/// directly so the filter does not ramp up from zero. A non-positive time
/// constant passes the input straight through.
#[derive(Debug, Clone, PartialEq)]
pub struct LowPassFilter {
    inputs: [ElementId; 1],
    time_constant: Real,
    output: Real,
    initialized: bool,
}

impl LowPassFilter {
    pub fn new(input: ElementId, time_constant: Real) -> Self {
        Self {
            inputs: [input],
            time_constant,
            output: 0.0,
            initialized: false,
        }
    }

    pub fn time_constant(&self) -> Real {
        self.time_constant
    }

    pub fn set_time_constant(&mut self, time_constant: Real) {
        self.time_constant = time_constant;
    }

    fn alpha(&self, dt: Real) -> Real {
        if self.time_constant <= 0.0 {
            return 1.0;
        }
        let alpha = dt / (self.time_constant + dt);
        if alpha.is_finite() { alpha } else { 0.0 }
    }
}

impl Evaluable for LowPassFilter {
    fn inputs(&self) -> &[ElementId] {
        &self.inputs
    }

    fn evaluate(&mut self, inputs: &[Real], dt: Real) {
        // Non-finite samples leave the state untouched.
        let Some(&x) = inputs.first().filter(|x| x.is_finite()) else {
            return;
        };
        if !self.initialized {
            self.output = x;
            self.initialized = true;
            return;
        }
        self.output += self.alpha(dt) * (x - self.output);
    }

    fn output(&self) -> Real {
        self.output
    }
}
