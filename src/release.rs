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
use tracing::{error, info};

use crate::host::{AttributeTarget, Host};

/// Loads or purges the release-trigger samplers.
#[derive(Clone, Debug)]
pub struct ReleaseSamples {
    enabled: bool,
    purge: Vec<AttributeTarget>,
}

impl ReleaseSamples {
    /// The sampler attribute that purges all samples when set to 1.
    pub const PURGE_ATTRIBUTE: u32 = 12;

    /// Release samples start loaded.
    pub fn new(samplers: &[String], purge_attribute: u32) -> ReleaseSamples {
        ReleaseSamples {
            enabled: true,
            purge: samplers
                .iter()
                .map(|sampler| AttributeTarget::new(sampler, purge_attribute))
                .collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Loads (enabled) or purges the release samples. Returns true if the
    /// state changed.
    pub fn set_enabled<H: Host>(&mut self, host: &mut H, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;

        let purged = if enabled { 0.0 } else { 1.0 };
        for target in self.purge.iter() {
            if let Err(e) = host.set_attribute(target, purged) {
                error!(
                    sampler = target.processor(),
                    err = e.to_string(),
                    "Unable to change release sampler."
                );
            }
        }
        info!(enabled, "Release samples changed.");
        true
    }
}
