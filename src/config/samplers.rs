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
use serde::Deserialize;

use super::error::ConfigError;
use crate::{patch::SamplerBanks, release::ReleaseSamples};

const DEFAULT_EMPTY_MAP: &str = "empty";

/// A YAML representation of the sampler banks.
#[derive(Deserialize, Clone, Debug)]
pub struct Samplers {
    /// Sampler bank ids, in the order they are reconfigured.
    banks: Vec<String>,

    /// The bank that always loads the staccato map for legato transitions.
    transitions: Option<String>,

    /// The sample map loaded into bypassed banks.
    empty_map: Option<String>,

    /// The sampler attribute holding linear gain.
    gain_attribute: Option<u32>,

    /// Release-trigger samplers.
    release: Option<Release>,
}

/// A YAML representation of the release samplers.
#[derive(Deserialize, Clone, Debug)]
pub struct Release {
    samplers: Vec<String>,
    purge_attribute: Option<u32>,
}

impl Samplers {
    pub fn banks(&self) -> &[String] {
        &self.banks
    }

    /// Converts into the banks the patch switcher drives.
    pub fn to_banks(&self) -> Result<SamplerBanks, ConfigError> {
        if let Some(transitions) = &self.transitions {
            if !self.banks.contains(transitions) {
                return Err(ConfigError::UnknownTransitionsBank(transitions.clone()));
            }
        }

        Ok(SamplerBanks::new(
            self.banks.clone(),
            self.transitions.clone(),
            self.empty_map.as_deref().unwrap_or(DEFAULT_EMPTY_MAP),
        )
        .with_gain_attribute(self.gain_attribute.unwrap_or(SamplerBanks::GAIN_ATTRIBUTE)))
    }

    /// The release toggle. Instruments without release samplers get one that
    /// drives nothing.
    pub fn to_release_samples(&self) -> ReleaseSamples {
        match &self.release {
            Some(release) => ReleaseSamples::new(
                &release.samplers,
                release
                    .purge_attribute
                    .unwrap_or(ReleaseSamples::PURGE_ATTRIBUTE),
            ),
            None => ReleaseSamples::new(&[], ReleaseSamples::PURGE_ATTRIBUTE),
        }
    }
}
