//! Settable pure elements: range constraints and manual switches.

use ap_core::{ElementId, Real, clamp_unordered, sanitize};

/// Clamps an upstream value into `[min, max]`.
///
/// Output anti-windup for the PID loops is built from these: the constraint
/// wraps the controller instead of the controller clamping itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    input: ElementId,
    min: Real,
    max: Real,
}

impl Constraint {
    pub fn new(input: ElementId, min: Real, max: Real) -> Self {
        Self { input, min, max }
    }

    pub fn input(&self) -> ElementId {
        self.input
    }

    /// Current `(min, max)` interval.
    pub fn bounds(&self) -> (Real, Real) {
        (self.min, self.max)
    }

    /// Set the symmetric interval `[-minmax, minmax]`.
    pub fn set_constraint_value(&mut self, minmax: Real) {
        self.max = minmax;
        self.min = -minmax;
    }

    /// Set the interval `[-min, max]`.
    ///
    /// The lower bound is the negated `min` argument, not `-max`. Callers
    /// passing a negative `min` end up with a positive lower bound.
    pub fn set_constraint_bounds(&mut self, min: Real, max: Real) {
        self.max = max;
        self.min = -min;
    }

    /// Clamp `v` into the interval, yielding `0.0` for non-finite input.
    pub fn apply(&self, v: Real) -> Real {
        if !v.is_finite() {
            return 0.0;
        }
        sanitize(clamp_unordered(v, self.min, self.max))
    }
}

/// Selects between two upstream branches.
///
/// Starts on the `on_true` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualSwitch {
    on_true: ElementId,
    on_false: ElementId,
    state: bool,
}

impl ManualSwitch {
    pub fn new(on_true: ElementId, on_false: ElementId) -> Self {
        Self {
            on_true,
            on_false,
            state: true,
        }
    }

    pub fn switch_to(&mut self, state: bool) {
        self.state = state;
    }

    pub fn state(&self) -> bool {
        self.state
    }

    /// Branch read by the next value query.
    pub fn selected(&self) -> ElementId {
        if self.state { self.on_true } else { self.on_false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(min: Real, max: Real) -> Constraint {
        Constraint::new(ElementId::from_index(0), min, max)
    }

    #[test]
    fn clamps_into_interval() {
        let c = constraint(-1.0, 1.0);
        assert_eq!(c.apply(0.25), 0.25);
        assert_eq!(c.apply(7.0), 1.0);
        assert_eq!(c.apply(-7.0), -1.0);
    }

    #[test]
    fn non_finite_input_is_zero() {
        let c = constraint(0.5, 1.0);
        assert_eq!(c.apply(Real::NAN), 0.0);
        assert_eq!(c.apply(Real::INFINITY), 0.0);
        assert_eq!(c.apply(Real::NEG_INFINITY), 0.0);
    }

    #[test]
    fn symmetric_setter() {
        let mut c = constraint(0.0, 0.0);
        c.set_constraint_value(0.3);
        assert_eq!(c.bounds(), (-0.3, 0.3));
    }

    #[test]
    fn two_argument_setter_negates_min_argument() {
        let mut c = constraint(0.0, 0.0);
        c.set_constraint_bounds(0.2, 0.5);
        assert_eq!(c.bounds(), (-0.2, 0.5));

        // Asymmetric as written: a negative `min` yields a positive lower bound.
        c.set_constraint_bounds(-0.2, 0.5);
        assert_eq!(c.bounds(), (0.2, 0.5));
        assert_eq!(c.apply(0.0), 0.2);
    }

    #[test]
    fn switch_starts_on_true_branch() {
        let t = ElementId::from_index(1);
        let f = ElementId::from_index(2);
        let mut s = ManualSwitch::new(t, f);
        assert_eq!(s.selected(), t);
        s.switch_to(false);
        assert_eq!(s.selected(), f);
        s.switch_to(true);
        assert_eq!(s.selected(), t);
    }
}
