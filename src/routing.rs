// Copyright (C) 2026 The librewinds developers
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! User-remappable controller routing.
//!
//! Each expression [`Parameter`] has a fixed destination and an optional
//! controller chosen by the user. When a controller event arrives on a user
//! assigned number, the router consumes it, runs the value through the
//! parameter's response curve and tells the caller where to send the result.
//! Controllers nobody has claimed pass through untouched.

use std::fmt;

use midly::num::u7;
use serde::Deserialize;

use crate::{
    curve::ResponseCurve,
    error::{CcRejection, Error},
    host::AttributeTarget,
};

/// Controllers that are never redirected: UACC (32) and the sustain pedal (64).
pub const RESERVED_CONTROLLERS: [u8; 2] = [32, 64];

/// The expression parameters a user can map controllers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Dynamics,
    Expression,
    /// Vibrato depth.
    Vibrato,
    VibratoRate,
    /// Flutter/sustain blend.
    Blend,
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::Dynamics,
        Parameter::Expression,
        Parameter::Vibrato,
        Parameter::VibratoRate,
        Parameter::Blend,
    ];

    /// The stable index of the parameter.
    pub fn index(self) -> usize {
        match self {
            Parameter::Dynamics => 0,
            Parameter::Expression => 1,
            Parameter::Vibrato => 2,
            Parameter::VibratoRate => 3,
            Parameter::Blend => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Parameter> {
        Parameter::ALL.get(index).copied()
    }

    /// The label shown in the parameter menu.
    pub fn label(self) -> &'static str {
        match self {
            Parameter::Dynamics => "Dynamics",
            Parameter::Expression => "Expression",
            Parameter::Vibrato => "Vibrato",
            Parameter::VibratoRate => "Vibrato Rate",
            Parameter::Blend => "Flutter",
        }
    }

    /// The controller the parameter's modulator listens to out of the box.
    pub fn default_controller(self) -> u7 {
        u7::from(match self {
            Parameter::Dynamics => 1,
            Parameter::Expression => 11,
            Parameter::Vibrato => 20,
            Parameter::VibratoRate => 21,
            Parameter::Blend => 23,
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a parameter's scaled value ends up.
#[derive(Clone, Debug, PartialEq)]
pub enum Destination {
    /// A real controller number the engine's modulators listen to.
    Controller(u7),
    /// A scripted attribute.
    Internal(AttributeTarget),
    /// An attribute that is also driven by note velocity.
    Velocity(AttributeTarget),
}

impl Destination {
    /// The legacy numeric form: the controller number, -1 for internal
    /// destinations and -2 for velocity-derived ones.
    pub fn default_cc(&self) -> i16 {
        match self {
            Destination::Controller(controller) => i16::from(controller.as_int()),
            Destination::Internal(_) => -1,
            Destination::Velocity(_) => -2,
        }
    }
}

/// The binding of one parameter to its destination, user controller and curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterBinding {
    parameter: Parameter,
    destination: Destination,
    user_cc: Option<u7>,
    curve: ResponseCurve,
}

impl ParameterBinding {
    pub fn new(parameter: Parameter, destination: Destination, curve: ResponseCurve) -> Self {
        ParameterBinding {
            parameter,
            destination,
            user_cc: None,
            curve,
        }
    }

    /// A binding to the parameter's default controller with an identity curve.
    pub fn default_for(parameter: Parameter) -> Self {
        ParameterBinding::new(
            parameter,
            Destination::Controller(parameter.default_controller()),
            ResponseCurve::identity(),
        )
    }

    pub fn parameter(&self) -> Parameter {
        self.parameter
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn user_cc(&self) -> Option<u7> {
        self.user_cc
    }

    pub fn curve(&self) -> &ResponseCurve {
        &self.curve
    }

    /// Scales a raw value through the curve into the destination's units.
    fn forward(&self, value: u7) -> Forward {
        let scaled = self.curve.evaluate(value);
        match &self.destination {
            Destination::Controller(controller) => Forward::Controller {
                controller: *controller,
                value: controller_value(scaled),
            },
            Destination::Internal(target) | Destination::Velocity(target) => Forward::Attribute {
                target: target.clone(),
                value: scaled,
            },
        }
    }
}

/// A value the router wants delivered somewhere.
#[derive(Clone, Debug, PartialEq)]
pub enum Forward {
    Controller { controller: u7, value: u7 },
    Attribute { target: AttributeTarget, value: f64 },
}

/// What the router decided to do with a controller event.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingDecision {
    /// True if the original event must not reach its default routing.
    pub consumed: bool,
    /// The parameter that claimed the event.
    pub parameter: Option<Parameter>,
    /// The remapped value to deliver instead.
    pub forward: Option<Forward>,
}

impl RoutingDecision {
    /// Leave the event alone.
    pub fn pass_through() -> RoutingDecision {
        RoutingDecision {
            consumed: false,
            parameter: None,
            forward: None,
        }
    }
}

/// Maps a curve output onto a controller value in 1..=127.
pub fn controller_value(scaled: f64) -> u7 {
    let value = (1.0 + 126.0 * scaled.clamp(0.0, 1.0)).round();
    u7::from_int_lossy(value as u8)
}

/// Returns true if the controller number is never redirected.
pub fn is_reserved(controller: u8) -> bool {
    RESERVED_CONTROLLERS.contains(&controller)
}

/// The controller routing table.
#[derive(Clone, Debug)]
pub struct Router {
    bindings: Vec<ParameterBinding>,
}

impl Router {
    /// Creates a router. Parameters without a binding get their defaults.
    pub fn new(bindings: Vec<ParameterBinding>) -> Router {
        let mut all: Vec<ParameterBinding> = Parameter::ALL
            .iter()
            .map(|parameter| ParameterBinding::default_for(*parameter))
            .collect();
        for binding in bindings {
            let index = binding.parameter.index();
            all[index] = binding;
        }

        Router { bindings: all }
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn binding(&self, parameter: Parameter) -> &ParameterBinding {
        &self.bindings[parameter.index()]
    }

    /// The user controller assigned to a parameter.
    pub fn user_cc(&self, parameter: Parameter) -> Option<u7> {
        self.binding(parameter).user_cc
    }

    /// Every parameter and its user controller, in parameter order.
    pub fn assignments(&self) -> Vec<(Parameter, Option<u7>)> {
        self.bindings
            .iter()
            .map(|binding| (binding.parameter, binding.user_cc))
            .collect()
    }

    /// Assigns a user controller to a parameter. If another parameter held the
    /// controller, it loses it and is returned.
    pub fn assign(&mut self, parameter: Parameter, cc: u8) -> Result<Option<Parameter>, Error> {
        let reject = |reason| Error::InvalidCcAssignment {
            parameter,
            cc,
            reason,
        };
        if is_reserved(cc) {
            return Err(reject(CcRejection::Reserved));
        }
        let controller = match u7::try_from(cc) {
            Some(controller) if cc >= 1 => controller,
            _ => return Err(reject(CcRejection::OutOfRange)),
        };

        let mut displaced = None;
        for binding in self.bindings.iter_mut() {
            if binding.parameter != parameter && binding.user_cc == Some(controller) {
                binding.user_cc = None;
                displaced = Some(binding.parameter);
            }
        }
        self.bindings[parameter.index()].user_cc = Some(controller);

        Ok(displaced)
    }

    /// Clears the user controller of a parameter.
    pub fn unassign(&mut self, parameter: Parameter) {
        self.bindings[parameter.index()].user_cc = None;
    }

    /// Replaces a parameter's response curve.
    pub fn set_curve(&mut self, parameter: Parameter, curve: ResponseCurve) {
        self.bindings[parameter.index()].curve = curve;
    }

    /// Decides what to do with an incoming controller event.
    pub fn handle_cc(&self, controller: u7, value: u7) -> RoutingDecision {
        if is_reserved(controller.as_int()) {
            return RoutingDecision::pass_through();
        }

        match self
            .bindings
            .iter()
            .find(|binding| binding.user_cc == Some(controller))
        {
            Some(binding) => RoutingDecision {
                consumed: true,
                parameter: Some(binding.parameter),
                forward: Some(binding.forward(value)),
            },
            None => RoutingDecision::pass_through(),
        }
    }

    /// Scales a value set directly on a parameter, e.g. from its value slider.
    pub fn apply_value(&self, parameter: Parameter, value: u7) -> Forward {
        self.binding(parameter).forward(value)
    }

    /// Forwards for every velocity-derived parameter given a note velocity.
    pub fn velocity_forwards(&self, velocity: u7) -> Vec<Forward> {
        self.bindings
            .iter()
            .filter(|binding| matches!(binding.destination, Destination::Velocity(_)))
            .map(|binding| binding.forward(velocity))
            .collect()
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new(Vec::new())
    }
}
