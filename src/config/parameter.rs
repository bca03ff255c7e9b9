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
use std::collections::HashSet;

use serde::Deserialize;

use super::{error::ConfigError, patch::seven_bit};
use crate::{
    curve::ResponseCurve,
    host::AttributeTarget,
    routing::{self, Destination, ParameterBinding, Router},
};

/// A YAML representation of a parameter binding.
#[derive(Deserialize, Clone, Debug)]
pub struct Parameter {
    parameter: routing::Parameter,

    /// Where the scaled value goes. Defaults to the parameter's own controller.
    destination: Option<DestinationConfig>,

    /// Response curve breakpoints. Defaults to a straight line.
    curve: Option<Vec<Point>>,

    /// A controller to assign on startup.
    cc: Option<u8>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationConfig {
    Controller { controller: u8 },
    Internal { processor: String, index: u32 },
    Velocity { processor: String, index: u32 },
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Parameter {
    fn to_binding(&self) -> Result<ParameterBinding, ConfigError> {
        let destination = match &self.destination {
            None => Destination::Controller(self.parameter.default_controller()),
            Some(DestinationConfig::Controller { controller }) => {
                Destination::Controller(seven_bit("destination controller", *controller)?)
            }
            Some(DestinationConfig::Internal { processor, index }) => {
                Destination::Internal(AttributeTarget::new(processor, *index))
            }
            Some(DestinationConfig::Velocity { processor, index }) => {
                Destination::Velocity(AttributeTarget::new(processor, *index))
            }
        };

        let curve = match &self.curve {
            Some(points) => {
                let points: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
                ResponseCurve::from_points(&points).map_err(|source| ConfigError::Curve {
                    parameter: self.parameter,
                    source,
                })?
            }
            None => ResponseCurve::identity(),
        };

        Ok(ParameterBinding::new(self.parameter, destination, curve))
    }
}

/// Builds the router from the configured parameters. Parameters that are not
/// configured keep their defaults.
pub fn to_router(parameters: &[Parameter]) -> Result<Router, ConfigError> {
    let mut seen = HashSet::new();
    let mut bindings = Vec::with_capacity(parameters.len());
    for parameter in parameters.iter() {
        if !seen.insert(parameter.parameter) {
            return Err(ConfigError::DuplicateParameter(parameter.parameter));
        }
        bindings.push(parameter.to_binding()?);
    }

    let mut router = Router::new(bindings);
    for parameter in parameters.iter() {
        if let Some(cc) = parameter.cc {
            router.assign(parameter.parameter, cc)?;
        }
    }
    Ok(router)
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use config::{Config, File, FileFormat};
    use midly::num::u7;
    use serde::Deserialize;

    use super::{to_router, Parameter};
    use crate::{
        config::ConfigError,
        host::AttributeTarget,
        routing::{self, Destination},
    };

    #[derive(Deserialize)]
    struct Parameters {
        parameters: Vec<Parameter>,
    }

    fn parse(yaml: &str) -> Result<Vec<Parameter>, Box<dyn Error>> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Parameters>()?
            .parameters)
    }

    #[test]
    fn destinations_and_assignments() -> Result<(), Box<dyn Error>> {
        let router = to_router(&parse(
            r#"
            parameters:
              - parameter: vibrato
                cc: 30
              - parameter: vibrato_rate
                destination:
                  type: internal
                  processor: vibratoRate
                  index: 3
              - parameter: blend
                destination:
                  type: velocity
                  processor: blendHandler
                  index: 0
                curve:
                  - x: 0
                    y: 1
                  - x: 1
                    y: 0
            "#,
        )?)?;

        assert_eq!(Some(u7::from(30)), router.user_cc(routing::Parameter::Vibrato));
        assert_eq!(
            &Destination::Controller(u7::from(20)),
            router.binding(routing::Parameter::Vibrato).destination()
        );
        assert_eq!(
            &Destination::Internal(AttributeTarget::new("vibratoRate", 3)),
            router.binding(routing::Parameter::VibratoRate).destination()
        );
        assert_eq!(-2, router.binding(routing::Parameter::Blend).destination().default_cc());
        assert_eq!(1.0, router.binding(routing::Parameter::Blend).curve().evaluate(u7::from(0)));
        assert_eq!(
            &Destination::Controller(u7::from(1)),
            router.binding(routing::Parameter::Dynamics).destination()
        );
        Ok(())
    }

    #[test]
    fn duplicate_parameter() -> Result<(), Box<dyn Error>> {
        let parameters = parse(
            r#"
            parameters:
              - parameter: dynamics
              - parameter: dynamics
            "#,
        )?;

        assert!(matches!(
            to_router(&parameters),
            Err(ConfigError::DuplicateParameter(routing::Parameter::Dynamics))
        ));
        Ok(())
    }

    #[test]
    fn reserved_startup_assignment() -> Result<(), Box<dyn Error>> {
        let parameters = parse(
            r#"
            parameters:
              - parameter: expression
                cc: 64
            "#,
        )?;

        assert!(matches!(to_router(&parameters), Err(ConfigError::Assignment(_))));
        Ok(())
    }
}
