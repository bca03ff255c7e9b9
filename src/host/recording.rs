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
use std::collections::{HashMap, HashSet};

use midly::num::u7;
use tracing::debug;

use super::{AttributeTarget, Host, HostError, KeyColor};

/// A host that only records what it was told. Used for dry runs and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingHost {
    sample_maps: Vec<String>,
    broken_maps: HashSet<String>,
    broken_modules: HashSet<String>,
    bypassed: HashMap<String, bool>,
    loaded: HashMap<String, String>,
    attributes: HashMap<AttributeTarget, f64>,
    intensities: HashMap<String, f64>,
    key_colors: Vec<Option<KeyColor>>,
    controllers: Vec<(u7, u7)>,
}

impl RecordingHost {
    /// Creates a host advertising the given sample maps.
    pub fn new(sample_maps: Vec<String>) -> RecordingHost {
        RecordingHost {
            sample_maps,
            broken_maps: HashSet::new(),
            broken_modules: HashSet::new(),
            bypassed: HashMap::new(),
            loaded: HashMap::new(),
            attributes: HashMap::new(),
            intensities: HashMap::new(),
            key_colors: vec![None; 128],
            controllers: Vec::new(),
        }
    }

    /// Makes loading the given map fail even though it is listed.
    pub fn break_sample_map(&mut self, map: &str) {
        self.broken_maps.insert(map.to_string());
    }

    /// Makes bypass and attribute calls on the given module fail. Sample map
    /// loads still succeed.
    pub fn break_module(&mut self, id: &str) {
        self.broken_modules.insert(id.to_string());
    }

    fn check_module(&self, id: &str) -> Result<(), HostError> {
        if self.broken_modules.contains(id) {
            return Err(HostError::UnknownModule(id.to_string()));
        }
        Ok(())
    }

    pub fn is_bypassed(&self, sampler: &str) -> Option<bool> {
        self.bypassed.get(sampler).copied()
    }

    pub fn loaded_map(&self, sampler: &str) -> Option<&str> {
        self.loaded.get(sampler).map(String::as_str)
    }

    pub fn attribute(&self, target: &AttributeTarget) -> Option<f64> {
        self.attributes.get(target).copied()
    }

    pub fn intensity(&self, modulator: &str) -> Option<f64> {
        self.intensities.get(modulator).copied()
    }

    pub fn key_color(&self, note: u7) -> Option<KeyColor> {
        self.key_colors[usize::from(note.as_int())]
    }

    /// Every controller message sent, oldest first.
    pub fn controllers(&self) -> &[(u7, u7)] {
        &self.controllers
    }

    pub fn clear_controllers(&mut self) {
        self.controllers.clear();
    }
}

impl Host for RecordingHost {
    fn sample_maps(&self) -> Vec<String> {
        self.sample_maps.clone()
    }

    fn set_bypassed(&mut self, sampler: &str, bypassed: bool) -> Result<(), HostError> {
        self.check_module(sampler)?;
        self.bypassed.insert(sampler.to_string(), bypassed);
        Ok(())
    }

    fn load_sample_map(&mut self, sampler: &str, map: &str) -> Result<(), HostError> {
        if self.broken_maps.contains(map) {
            return Err(HostError::MissingSampleMap(map.to_string()));
        }
        debug!(sampler, map, "Loading sample map.");
        self.loaded.insert(sampler.to_string(), map.to_string());
        Ok(())
    }

    fn set_attribute(&mut self, target: &AttributeTarget, value: f64) -> Result<(), HostError> {
        self.check_module(target.processor())?;
        self.attributes.insert(target.clone(), value);
        Ok(())
    }

    fn set_intensity(&mut self, modulator: &str, intensity: f64) -> Result<(), HostError> {
        self.intensities.insert(modulator.to_string(), intensity);
        Ok(())
    }

    fn set_key_color(&mut self, note: u7, color: KeyColor) {
        self.key_colors[usize::from(note.as_int())] = Some(color);
    }

    fn send_controller(&mut self, controller: u7, value: u7) -> Result<(), HostError> {
        self.controllers.push((controller, value));
        Ok(())
    }
}
