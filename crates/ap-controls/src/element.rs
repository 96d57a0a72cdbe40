//! Control element kinds and the capabilities they expose.
//!
//! Every element answers "what is your value right now" given read access to
//! the rest of the graph ([`SignalSource`]). Elements that keep memory between
//! ticks additionally implement [`Evaluable`].

use std::cell::Cell;
use std::fmt;

use ap_core::{ElementId, Real, sanitize};

use crate::constraint::{Constraint, ManualSwitch};
use crate::filter::LowPassFilter;
use crate::pid::PidController;

/// Read access to the current value of any element in an environment.
pub trait SignalSource {
    /// Current value of element `id`.
    fn value(&self, id: ElementId) -> Real;
}

/// Per-tick state update for elements that carry memory between ticks.
pub trait Evaluable {
    /// Upstream elements sampled before each update, in the order `evaluate`
    /// receives them.
    fn inputs(&self) -> &[ElementId];

    /// Advance internal state by one tick of length `dt` seconds.
    fn evaluate(&mut self, inputs: &[Real], dt: Real);

    /// Value held since the last update.
    fn output(&self) -> Real;
}

/// Caller-supplied binary function applied by a `Function2` element.
pub struct BinaryFn<'a>(Box<dyn Fn(Real, Real) -> Real + 'a>);

impl<'a> BinaryFn<'a> {
    pub fn new(f: impl Fn(Real, Real) -> Real + 'a) -> Self {
        Self(Box::new(f))
    }

    pub fn call(&self, a: Real, b: Real) -> Real {
        (self.0)(a, b)
    }
}

impl fmt::Debug for BinaryFn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BinaryFn(..)")
    }
}

/// A node of the control graph.
#[derive(Debug)]
pub enum Element<'a> {
    /// Fixed value.
    Constant(Real),

    /// External scalar read at query time.
    Input(&'a Cell<Real>),

    /// Upstream value times a fixed factor. Not sanitized.
    Gain { input: ElementId, gain: Real },

    /// Sum of two upstream values.
    Sum(ElementId, ElementId),

    /// First upstream value minus the second.
    Difference(ElementId, ElementId),

    /// Upstream value clamped into a settable interval.
    Constraint(Constraint),

    /// Selects one of two upstream values by a settable flag.
    Switch(ManualSwitch),

    /// Arbitrary binary function of two upstream values. Not sanitized.
    Function2 {
        a: ElementId,
        b: ElementId,
        f: BinaryFn<'a>,
    },

    /// First-order low-pass filter.
    LowPass(LowPassFilter),

    /// PID controller.
    Pid(PidController),
}

impl Element<'_> {
    /// Short name of the element kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Input(_) => "input",
            Self::Gain { .. } => "gain",
            Self::Sum(..) => "sum",
            Self::Difference(..) => "difference",
            Self::Constraint(_) => "constraint",
            Self::Switch(_) => "switch",
            Self::Function2 { .. } => "function",
            Self::LowPass(_) => "low-pass filter",
            Self::Pid(_) => "PID controller",
        }
    }

    /// Compute the current value from the upstream elements.
    pub fn value<S: SignalSource + ?Sized>(&self, signals: &S) -> Real {
        match self {
            Self::Constant(v) => sanitize(*v),
            Self::Input(cell) => sanitize(cell.get()),
            Self::Gain { input, gain } => gain * signals.value(*input),
            Self::Sum(a, b) => sanitize(signals.value(*a) + signals.value(*b)),
            Self::Difference(a, b) => sanitize(signals.value(*a) - signals.value(*b)),
            Self::Constraint(c) => c.apply(signals.value(c.input())),
            Self::Switch(s) => sanitize(signals.value(s.selected())),
            Self::Function2 { a, b, f } => f.call(signals.value(*a), signals.value(*b)),
            Self::LowPass(filter) => filter.output(),
            Self::Pid(pid) => pid.output(),
        }
    }

    pub fn as_evaluable(&self) -> Option<&dyn Evaluable> {
        match self {
            Self::LowPass(filter) => Some(filter),
            Self::Pid(pid) => Some(pid),
            _ => None,
        }
    }

    pub fn as_evaluable_mut(&mut self) -> Option<&mut dyn Evaluable> {
        match self {
            Self::LowPass(filter) => Some(filter),
            Self::Pid(pid) => Some(pid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed table of upstream values indexed by element id.
    struct Table(Vec<Real>);

    impl SignalSource for Table {
        fn value(&self, id: ElementId) -> Real {
            self.0[id.index()]
        }
    }

    fn id(i: u32) -> ElementId {
        ElementId::from_index(i)
    }

    #[test]
    fn gain_propagates_nan() {
        let table = Table(vec![Real::NAN]);
        let gain = Element::Gain {
            input: id(0),
            gain: 2.0,
        };
        assert!(gain.value(&table).is_nan());
    }

    #[test]
    fn sum_and_difference_sanitize() {
        let table = Table(vec![Real::INFINITY, Real::NEG_INFINITY, 1.5]);
        assert_eq!(Element::Sum(id(0), id(1)).value(&table), 0.0);
        assert_eq!(Element::Difference(id(0), id(0)).value(&table), 0.0);
        assert_eq!(Element::Difference(id(2), id(2)).value(&table), 0.0);
        assert_eq!(Element::Sum(id(2), id(2)).value(&table), 3.0);
    }

    #[test]
    fn function_does_not_sanitize() {
        let table = Table(vec![1.0, 0.0]);
        let f = Element::Function2 {
            a: id(0),
            b: id(1),
            f: BinaryFn::new(|a, b| a / b),
        };
        assert!(f.value(&table).is_infinite());
    }

    #[test]
    fn input_reads_cell_at_query_time() {
        let cell = Cell::new(1.0);
        let input = Element::Input(&cell);
        let table = Table(vec![]);
        assert_eq!(input.value(&table), 1.0);
        cell.set(4.0);
        assert_eq!(input.value(&table), 4.0);
        cell.set(Real::NAN);
        assert_eq!(input.value(&table), 0.0);
    }

    #[test]
    fn only_stateful_elements_are_evaluable() {
        assert!(Element::Constant(1.0).as_evaluable().is_none());
        let filter = Element::LowPass(LowPassFilter::new(id(0), 0.1));
        assert!(filter.as_evaluable().is_some());
        assert_eq!(filter.kind(), "low-pass filter");
    }
}
