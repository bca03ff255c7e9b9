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
use midly::num::u7;
use tracing::{error, info};

use crate::{
    host::{Host, HostError},
    manifest::NoteRange,
    processors::{RoundRobinMode, RoundRobinProcessor},
};

/// The controller that toggles round robin on and off.
pub const ROUND_ROBIN_CONTROLLER: u8 = 14;

/// Controller values above this enable round robin.
pub const ROUND_ROBIN_THRESHOLD: u8 = 64;

/// Keeps every round-robin processor in the same mode.
#[derive(Clone, Debug)]
pub struct RoundRobinController {
    enabled: bool,
    processors: Vec<RoundRobinProcessor>,
}

impl RoundRobinController {
    /// Creates a controller. Round robin starts disabled.
    pub fn new(processors: Vec<RoundRobinProcessor>) -> RoundRobinController {
        RoundRobinController {
            enabled: false,
            processors,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn processors(&self) -> &[RoundRobinProcessor] {
        &self.processors
    }

    /// Enables or disables round robin. Returns true if the state changed.
    pub fn set_enabled<H: Host>(&mut self, host: &mut H, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }

        self.enabled = enabled;
        self.apply(host);
        info!(enabled, "Round robin changed.");
        true
    }

    /// Handles a value on the round-robin controller. Returns true if the
    /// state changed.
    pub fn handle_cc<H: Host>(&mut self, host: &mut H, value: u7) -> bool {
        self.set_enabled(host, value.as_int() > ROUND_ROBIN_THRESHOLD)
    }

    /// Pushes the current state to every processor.
    pub fn apply<H: Host>(&self, host: &mut H) {
        for processor in self.processors.iter() {
            let mut result = processor.set_bypassed(host, !self.enabled);
            if result.is_ok() && self.enabled {
                result = processor.set_mode(host, RoundRobinMode::Random);
            }
            if let Err(e) = result {
                error!(
                    processor = processor.id(),
                    err = e.to_string(),
                    "Unable to update round robin processor."
                );
            }
        }
    }

    /// Sets the note range of every processor. Returns the processors that
    /// could not be updated.
    pub fn set_range<H: Host>(&self, host: &mut H, range: NoteRange) -> Vec<(String, HostError)> {
        self.processors
            .iter()
            .filter_map(|processor| {
                processor
                    .set_range(host, range)
                    .err()
                    .map(|error| (processor.id().to_string(), error))
            })
            .collect()
    }
}
