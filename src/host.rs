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

//! The interface to the sampler engine that hosts the instrument.
//!
//! Everything the instrument changes goes through [`Host`]: sampler bypass and
//! sample-map loading, numbered attribute slots on processors, modulator
//! intensities, keyboard colours and controller output. All calls are
//! synchronous and expected to return quickly.

use std::fmt;

use midly::num::u7;

mod midi;
mod recording;

pub use midi::MidiHost;
pub use recording::RecordingHost;

/// Errors returned by host calls.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HostError {
    #[error("sample map {0} does not exist")]
    MissingSampleMap(String),

    #[error("no module with id {0}")]
    UnknownModule(String),

    #[error("MIDI output failed: {0}")]
    Midi(String),
}

/// The colour feedback a key on the on-screen keyboard can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyColor {
    /// The key is inside the patch's playable range.
    Playable,
    /// The key is outside the playable range.
    Disabled,
}

/// A numbered attribute slot on a named processor or sampler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeTarget {
    processor: String,
    index: u32,
}

impl AttributeTarget {
    pub fn new(processor: &str, index: u32) -> AttributeTarget {
        AttributeTarget {
            processor: processor.to_string(),
            index,
        }
    }

    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.processor, self.index)
    }
}

/// The sampler engine the instrument drives.
pub trait Host {
    /// Names of every sample map the engine can load.
    fn sample_maps(&self) -> Vec<String>;

    /// Bypasses or enables a sampler.
    fn set_bypassed(&mut self, sampler: &str, bypassed: bool) -> Result<(), HostError>;

    /// Loads a sample map into a sampler.
    fn load_sample_map(&mut self, sampler: &str, map: &str) -> Result<(), HostError>;

    /// Sets a numbered attribute on a processor or sampler.
    fn set_attribute(&mut self, target: &AttributeTarget, value: f64) -> Result<(), HostError>;

    /// Sets the intensity of a modulator.
    fn set_intensity(&mut self, modulator: &str, intensity: f64) -> Result<(), HostError>;

    /// Colours a key on the on-screen keyboard.
    fn set_key_color(&mut self, note: u7, color: KeyColor);

    /// Sends a controller message into the engine.
    fn send_controller(&mut self, controller: u7, value: u7) -> Result<(), HostError>;
}

/// Converts decibels to a linear gain factor.
pub fn gain_factor_for_decibels(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

#[cfg(test)]
mod test {
    use super::{gain_factor_for_decibels, AttributeTarget};

    #[test]
    fn decibels_to_gain() {
        assert_eq!(1.0, gain_factor_for_decibels(0.0));
        assert!((gain_factor_for_decibels(-6.0) - 0.501_187_233_627_272_2).abs() < 1e-12);
        assert!((gain_factor_for_decibels(20.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn attribute_target_display() {
        assert_eq!("legatoHandler[4]", AttributeTarget::new("legatoHandler", 4).to_string());
    }
}
