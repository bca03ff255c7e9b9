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

//! YAML configuration of an instrument.
//!
//! The structs here mirror the YAML layout and are converted into the core
//! types once loaded. Conversion is where validation happens.

mod error;
mod instrument;
mod midi;
mod parameter;
mod patch;
mod processors;
mod samplers;

pub use self::error::ConfigError;
pub use self::instrument::Instrument;
pub use self::midi::Midi;
pub use self::patch::Patch;
pub use self::processors::Processors;
pub use self::samplers::Samplers;
