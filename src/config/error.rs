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

use crate::{curve::CurveError, manifest::ManifestError, routing::Parameter};

/// Typed error for instrument config failures so callers can tell a file that
/// failed to parse from one that parsed but describes an invalid instrument.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Invalid response curve for {parameter}: {source}")]
    Curve {
        parameter: Parameter,
        source: CurveError,
    },

    #[error("Invalid controller assignment: {0}")]
    Assignment(#[from] crate::Error),

    #[error("{field} value {value} is not a 7-bit MIDI value")]
    NotSevenBit { field: &'static str, value: u8 },

    #[error("MIDI channel {0} must be between 1 and 16")]
    Channel(u8),

    #[error("Parameter {0} is configured more than once")]
    DuplicateParameter(Parameter),

    #[error("Transitions bank {0} is not one of the sampler banks")]
    UnknownTransitionsBank(String),
}
