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
use crate::routing::Parameter;

/// Errors surfaced to the UI layer by the instrument.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The patch is not in the manifest. Nothing was changed.
    #[error("unknown patch: {0}")]
    UnknownPatch(String),

    /// The controller cannot be assigned to a parameter. The assignment was ignored.
    #[error("cannot assign CC {cc} to {parameter}: {reason}")]
    InvalidCcAssignment {
        parameter: Parameter,
        cc: u8,
        reason: CcRejection,
    },

    /// The manifest has no patches to select.
    #[error("the manifest is empty")]
    EmptyManifest,
}

/// Why a controller assignment was rejected.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum CcRejection {
    #[error("controller numbers must be between 1 and 127")]
    OutOfRange,

    #[error("controller is reserved")]
    Reserved,
}
