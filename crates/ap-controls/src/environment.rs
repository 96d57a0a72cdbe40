//! Control environment: owner, builder and tick driver of one control graph.
//!
//! The environment is responsible for:
//! - Owning every element in an arena indexed by [`ElementId`]
//! - Validating that new elements only reference existing ones
//! - Advancing stateful elements once per tick, in registration order
//! - Computing one shared `dt` per tick from an external timestamp
//! - Writing bound output cells at the end of each tick

use std::cell::Cell;

use ap_core::{ElementId, Real};
use tracing::debug;

use crate::constraint::{Constraint, ManualSwitch};
use crate::element::{BinaryFn, Element, SignalSource};
use crate::error::{ControlError, ControlResult};
use crate::filter::LowPassFilter;
use crate::pid::{PidController, PidParameters};

/// Largest number of upstream inputs any evaluable element samples.
const MAX_EVALUABLE_INPUTS: usize = 3;

/// Arena of control elements plus the per-tick sequencing state.
///
/// `'a` is the lifetime of the externally owned input, output and timestamp
/// cells the graph is bound to.
#[derive(Debug)]
pub struct ControlEnvironment<'a> {
    elements: Vec<Element<'a>>,
    /// Stateful elements in registration order.
    evaluables: Vec<ElementId>,
    outputs: Vec<(ElementId, &'a Cell<Real>)>,
    timestamp: &'a Cell<Real>,
    last_timestamp: Option<Real>,
    time_diff: Real,
}

impl<'a> ControlEnvironment<'a> {
    /// Create an empty environment reading time (seconds) from `timestamp`.
    pub fn new(timestamp: &'a Cell<Real>) -> Self {
        Self {
            elements: Vec::new(),
            evaluables: Vec::new(),
            outputs: Vec::new(),
            timestamp,
            last_timestamp: None,
            time_diff: 0.0,
        }
    }

    /// Number of elements in the arena.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Stateful elements in the order they are advanced each tick.
    pub fn evaluables(&self) -> &[ElementId] {
        &self.evaluables
    }

    pub fn element(&self, id: ElementId) -> Option<&Element<'a>> {
        self.elements.get(id.index())
    }

    /// Seconds elapsed between the two most recent ticks.
    pub fn time_diff(&self) -> Real {
        self.time_diff
    }

    fn check(&self, id: ElementId) -> ControlResult<ElementId> {
        if id.index() < self.elements.len() {
            Ok(id)
        } else {
            Err(ControlError::InvalidReference {
                what: format!(
                    "element {} does not exist ({} elements built)",
                    id,
                    self.elements.len()
                ),
            })
        }
    }

    fn push(&mut self, element: Element<'a>) -> ElementId {
        let id = ElementId::from_index(self.elements.len() as u32);
        let stateful = element.as_evaluable().is_some();
        self.elements.push(element);
        if stateful {
            self.evaluables.push(id);
        }
        id
    }

    pub fn add_constant(&mut self, value: Real) -> ElementId {
        self.push(Element::Constant(value))
    }

    /// Element reading `cell` each time it is queried.
    pub fn add_input(&mut self, cell: &'a Cell<Real>) -> ElementId {
        self.push(Element::Input(cell))
    }

    pub fn add_gain(&mut self, input: ElementId, gain: Real) -> ControlResult<ElementId> {
        let input = self.check(input)?;
        Ok(self.push(Element::Gain { input, gain }))
    }

    pub fn add_sum(&mut self, a: ElementId, b: ElementId) -> ControlResult<ElementId> {
        let (a, b) = (self.check(a)?, self.check(b)?);
        Ok(self.push(Element::Sum(a, b)))
    }

    /// `a - b`.
    pub fn add_difference(&mut self, a: ElementId, b: ElementId) -> ControlResult<ElementId> {
        let (a, b) = (self.check(a)?, self.check(b)?);
        Ok(self.push(Element::Difference(a, b)))
    }

    pub fn add_constraint(
        &mut self,
        input: ElementId,
        min: Real,
        max: Real,
    ) -> ControlResult<ElementId> {
        let input = self.check(input)?;
        Ok(self.push(Element::Constraint(Constraint::new(input, min, max))))
    }

    /// Switch initially selecting `on_true`.
    pub fn add_switch(
        &mut self,
        on_true: ElementId,
        on_false: ElementId,
    ) -> ControlResult<ElementId> {
        let (on_true, on_false) = (self.check(on_true)?, self.check(on_false)?);
        Ok(self.push(Element::Switch(ManualSwitch::new(on_true, on_false))))
    }

    /// Element computing `f(a, b)`.
    pub fn add_function2(
        &mut self,
        a: ElementId,
        b: ElementId,
        f: impl Fn(Real, Real) -> Real + 'a,
    ) -> ControlResult<ElementId> {
        let (a, b) = (self.check(a)?, self.check(b)?);
        Ok(self.push(Element::Function2 {
            a,
            b,
            f: BinaryFn::new(f),
        }))
    }

    /// Low-pass filter with time constant `time_constant` seconds.
    pub fn add_low_pass_filter(
        &mut self,
        input: ElementId,
        time_constant: Real,
    ) -> ControlResult<ElementId> {
        if !time_constant.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "time_constant must be finite",
            });
        }
        let input = self.check(input)?;
        Ok(self.push(Element::LowPass(LowPassFilter::new(input, time_constant))))
    }

    /// PID controller differentiating its error signal.
    pub fn add_pid(
        &mut self,
        target: ElementId,
        value: ElementId,
        params: PidParameters,
    ) -> ControlResult<ElementId> {
        let (target, value) = (self.check(target)?, self.check(value)?);
        Ok(self.push(Element::Pid(PidController::new(target, value, params))))
    }

    /// PID controller using `rate` as derivative feedback.
    pub fn add_pid_with_rate(
        &mut self,
        target: ElementId,
        value: ElementId,
        rate: ElementId,
        params: PidParameters,
    ) -> ControlResult<ElementId> {
        let (target, value, rate) = (self.check(target)?, self.check(value)?, self.check(rate)?);
        Ok(self.push(Element::Pid(PidController::with_rate(
            target, value, rate, params,
        ))))
    }

    /// Write the value of `element` into `cell` at the end of every tick.
    pub fn add_output(&mut self, element: ElementId, cell: &'a Cell<Real>) -> ControlResult<()> {
        let element = self.check(element)?;
        self.outputs.push((element, cell));
        Ok(())
    }

    pub fn pid(&self, id: ElementId) -> ControlResult<&PidController> {
        match self.lookup(id)? {
            Element::Pid(pid) => Ok(pid),
            other => Err(mismatch(id, "PID controller", other)),
        }
    }

    pub fn pid_mut(&mut self, id: ElementId) -> ControlResult<&mut PidController> {
        match self.lookup_mut(id)? {
            Element::Pid(pid) => Ok(pid),
            other => Err(mismatch(id, "PID controller", other)),
        }
    }

    pub fn low_pass_filter_mut(&mut self, id: ElementId) -> ControlResult<&mut LowPassFilter> {
        match self.lookup_mut(id)? {
            Element::LowPass(filter) => Ok(filter),
            other => Err(mismatch(id, "low-pass filter", other)),
        }
    }

    pub fn constraint_mut(&mut self, id: ElementId) -> ControlResult<&mut Constraint> {
        match self.lookup_mut(id)? {
            Element::Constraint(c) => Ok(c),
            other => Err(mismatch(id, "constraint", other)),
        }
    }

    /// Set the symmetric interval `[-minmax, minmax]` on a constraint.
    pub fn set_constraint_value(&mut self, id: ElementId, minmax: Real) -> ControlResult<()> {
        self.constraint_mut(id)?.set_constraint_value(minmax);
        Ok(())
    }

    /// Set `[-min, max]` on a constraint (see [`Constraint::set_constraint_bounds`]).
    pub fn set_constraint_bounds(&mut self, id: ElementId, min: Real, max: Real) -> ControlResult<()> {
        self.constraint_mut(id)?.set_constraint_bounds(min, max);
        Ok(())
    }

    /// Select the branch a manual switch reads from the next query on.
    pub fn switch_to(&mut self, id: ElementId, state: bool) -> ControlResult<()> {
        match self.lookup_mut(id)? {
            Element::Switch(s) => {
                s.switch_to(state);
                Ok(())
            }
            other => Err(mismatch(id, "switch", other)),
        }
    }

    fn lookup(&self, id: ElementId) -> ControlResult<&Element<'a>> {
        let id = self.check(id)?;
        Ok(&self.elements[id.index()])
    }

    fn lookup_mut(&mut self, id: ElementId) -> ControlResult<&mut Element<'a>> {
        let id = self.check(id)?;
        Ok(&mut self.elements[id.index()])
    }

    /// Advance the graph by one tick.
    ///
    /// Reads the timestamp, advances every evaluable once in registration order
    /// and then writes every bound output. Never fails.
    pub fn evaluate(&mut self) {
        self.update_time_diff();
        let dt = self.time_diff;

        let mut sampled = [0.0; MAX_EVALUABLE_INPUTS];
        for slot in 0..self.evaluables.len() {
            let index = self.evaluables[slot].index();
            let count = match self.elements[index].as_evaluable() {
                Some(node) => {
                    let inputs = node.inputs();
                    for (dst, &up) in sampled.iter_mut().zip(inputs) {
                        *dst = self.value(up);
                    }
                    inputs.len().min(MAX_EVALUABLE_INPUTS)
                }
                None => continue,
            };
            if let Some(node) = self.elements[index].as_evaluable_mut() {
                node.evaluate(&sampled[..count], dt);
            }
        }

        for &(element, cell) in &self.outputs {
            cell.set(self.value(element));
        }
    }

    fn update_time_diff(&mut self) {
        let now = self.timestamp.get();
        let dt = match self.last_timestamp {
            Some(last) => now - last,
            None => 0.0,
        };
        self.time_diff = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            debug!(now, dt, "discarding invalid tick interval");
            0.0
        };
        self.last_timestamp = Some(now);
    }
}

impl SignalSource for ControlEnvironment<'_> {
    fn value(&self, id: ElementId) -> Real {
        self.elements
            .get(id.index())
            .map_or(0.0, |element| element.value(self))
    }
}

fn mismatch(id: ElementId, expected: &'static str, found: &Element<'_>) -> ControlError {
    ControlError::KindMismatch {
        id,
        expected,
        found: found.kind(),
    }
}
