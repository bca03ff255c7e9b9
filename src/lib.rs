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

//! Patch switching and controller routing for a sampled wind instrument.
//!
//! An [`Instrument`] drives a sampler engine through the [`host::Host`] trait.
//! It reconfigures every sampler bank when a patch is selected and redirects
//! user controllers to the engine's expression parameters through response
//! curves.

pub mod config;
pub mod curve;
pub mod deferred;
pub mod driver;
mod error;
pub mod host;
pub mod instrument;
pub mod manifest;
pub mod midi;
pub mod patch;
pub mod processors;
pub mod release;
pub mod round_robin;
pub mod routing;

pub use error::{CcRejection, Error};
pub use instrument::{Instrument, MidiDisposition, UiRefresh};
