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
use std::sync::Arc;

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};
use tracing::{debug, trace};

use super::{AttributeTarget, Host, HostError, KeyColor};
use crate::midi::Device;

/// A host that plays controllers into a MIDI device.
///
/// Only controller output reaches the device. Sampler and processor changes
/// have no MIDI form and are logged instead.
pub struct MidiHost {
    device: Arc<dyn Device>,
    channel: u4,
    sample_maps: Vec<String>,
}

impl MidiHost {
    pub fn new(device: Arc<dyn Device>, channel: u4, sample_maps: Vec<String>) -> MidiHost {
        MidiHost {
            device,
            channel,
            sample_maps,
        }
    }

    pub fn device(&self) -> Arc<dyn Device> {
        self.device.clone()
    }

    pub fn channel(&self) -> u4 {
        self.channel
    }
}

impl Host for MidiHost {
    fn sample_maps(&self) -> Vec<String> {
        self.sample_maps.clone()
    }

    fn set_bypassed(&mut self, sampler: &str, bypassed: bool) -> Result<(), HostError> {
        debug!(sampler, bypassed, "Sampler bypass.");
        Ok(())
    }

    fn load_sample_map(&mut self, sampler: &str, map: &str) -> Result<(), HostError> {
        if !self.sample_maps.iter().any(|known| known == map) {
            return Err(HostError::MissingSampleMap(map.to_string()));
        }
        debug!(sampler, map, "Sample map load.");
        Ok(())
    }

    fn set_attribute(&mut self, target: &AttributeTarget, value: f64) -> Result<(), HostError> {
        debug!(attribute = target.to_string(), value, "Attribute change.");
        Ok(())
    }

    fn set_intensity(&mut self, modulator: &str, intensity: f64) -> Result<(), HostError> {
        debug!(modulator, intensity, "Modulator intensity change.");
        Ok(())
    }

    fn set_key_color(&mut self, note: u7, color: KeyColor) {
        trace!(note = note.as_int(), color = ?color, "Key colour change.");
    }

    fn send_controller(&mut self, controller: u7, value: u7) -> Result<(), HostError> {
        let event = LiveEvent::Midi {
            channel: self.channel,
            message: MidiMessage::Controller { controller, value },
        };
        self.device
            .emit(&event)
            .map_err(|e| HostError::Midi(e.to_string()))
    }
}
