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
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;
use tracing::info;

use super::{
    error::ConfigError,
    midi::Midi,
    parameter::{self, Parameter},
    patch::Patch,
    processors::Processors,
    samplers::Samplers,
};
use crate::{host::Host, manifest::Manifest, patch::PatchSwitcher, routing::Router};

/// The configuration for an instrument.
#[derive(Deserialize, Clone, Debug)]
pub struct Instrument {
    /// The patches, in the order they are presented.
    patches: Vec<Patch>,

    /// The sampler banks.
    samplers: Samplers,

    /// The sample map catalogue advertised by hosts that cannot list their own.
    sample_maps: Option<Vec<String>>,

    /// The scripted processors.
    processors: Processors,

    /// Parameter destinations, curves and startup assignments.
    parameters: Option<Vec<Parameter>>,

    /// The MIDI configuration.
    midi: Option<Midi>,
}

impl Instrument {
    /// Parse an instrument from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Instrument, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Instrument>()?)
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn samplers(&self) -> &Samplers {
        &self.samplers
    }

    pub fn sample_maps(&self) -> &[String] {
        self.sample_maps.as_deref().unwrap_or_default()
    }

    pub fn processors(&self) -> &Processors {
        &self.processors
    }

    pub fn midi(&self) -> Option<&Midi> {
        self.midi.as_ref()
    }

    /// Validates the patches and builds the manifest.
    pub fn manifest(&self) -> Result<Manifest, ConfigError> {
        let patches = self
            .patches
            .iter()
            .map(Patch::to_patch)
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Manifest::new(patches)?)
    }

    /// Builds the routing table.
    pub fn router(&self) -> Result<Router, ConfigError> {
        parameter::to_router(self.parameters.as_deref().unwrap_or_default())
    }

    /// Builds a running instrument bound to the given host.
    pub fn build<H: Host>(&self, host: H) -> Result<crate::Instrument<H>, ConfigError> {
        let manifest = self.manifest()?;
        let router = self.router()?;
        let switcher = PatchSwitcher::new(
            self.samplers.to_banks()?,
            self.processors.legato(),
            self.processors.vibrato(),
        );

        info!(
            patches = manifest.len(),
            banks = self.samplers.banks().len(),
            "Instrument configured."
        );

        Ok(crate::Instrument::new(
            host,
            manifest,
            router,
            switcher,
            self.processors.round_robin(),
            self.samplers.to_release_samples(),
        ))
    }
}
