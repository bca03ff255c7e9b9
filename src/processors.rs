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

//! Typed views of the host processors the instrument configures.
//!
//! Each struct knows the processor id and which attribute slot holds which
//! setting, so callers set named fields instead of raw indices.

use midly::num::u7;

use crate::{
    host::{AttributeTarget, Host, HostError},
    manifest::{LegatoSettings, NoteRange, VibratoSettings},
};

/// The legato handler script.
#[derive(Clone, Debug, PartialEq)]
pub struct LegatoProcessor {
    id: String,
    bend_time: u32,
    min_bend: u32,
    max_bend: u32,
    fade_time: u32,
}

impl LegatoProcessor {
    pub const BEND_TIME: u32 = 4;
    pub const MIN_BEND: u32 = 5;
    pub const MAX_BEND: u32 = 6;
    pub const FADE_TIME: u32 = 7;

    /// A legato handler using the standard attribute layout.
    pub fn new(id: &str) -> LegatoProcessor {
        LegatoProcessor::with_layout(
            id,
            Self::BEND_TIME,
            Self::MIN_BEND,
            Self::MAX_BEND,
            Self::FADE_TIME,
        )
    }

    pub fn with_layout(
        id: &str,
        bend_time: u32,
        min_bend: u32,
        max_bend: u32,
        fade_time: u32,
    ) -> LegatoProcessor {
        LegatoProcessor {
            id: id.to_string(),
            bend_time,
            min_bend,
            max_bend,
            fade_time,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bend_time(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.bend_time)
    }

    pub fn min_bend(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.min_bend)
    }

    pub fn max_bend(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.max_bend)
    }

    pub fn fade_time(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.fade_time)
    }

    /// Pushes all legato settings to the handler.
    pub fn apply<H: Host>(&self, host: &mut H, settings: &LegatoSettings) -> Result<(), HostError> {
        host.set_attribute(&self.bend_time(), settings.bend_time)?;
        host.set_attribute(&self.min_bend(), settings.min_bend)?;
        host.set_attribute(&self.max_bend(), settings.max_bend)?;
        host.set_attribute(&self.fade_time(), settings.fade_time)
    }
}

/// The vibrato gain and pitch modulators.
#[derive(Clone, Debug, PartialEq)]
pub struct VibratoModulators {
    gain: String,
    pitch: String,
}

impl VibratoModulators {
    pub fn new(gain: &str, pitch: &str) -> VibratoModulators {
        VibratoModulators {
            gain: gain.to_string(),
            pitch: pitch.to_string(),
        }
    }

    pub fn gain(&self) -> &str {
        &self.gain
    }

    pub fn pitch(&self) -> &str {
        &self.pitch
    }

    pub fn apply<H: Host>(&self, host: &mut H, settings: &VibratoSettings) -> Result<(), HostError> {
        host.set_intensity(&self.gain, settings.gain)?;
        host.set_intensity(&self.pitch, settings.pitch)
    }
}

/// How a round-robin processor picks among recordings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundRobinMode {
    Sequential,
    Random,
}

impl RoundRobinMode {
    fn value(self) -> f64 {
        match self {
            RoundRobinMode::Sequential => 0.0,
            RoundRobinMode::Random => 1.0,
        }
    }
}

/// A round-robin selection script.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundRobinProcessor {
    id: String,
    bypass: u32,
    mode: u32,
    low_note: u32,
    high_note: u32,
}

impl RoundRobinProcessor {
    pub const BYPASS: u32 = 0;
    pub const MODE: u32 = 1;
    pub const LOW_NOTE: u32 = 2;
    pub const HIGH_NOTE: u32 = 3;

    /// A round-robin processor using the standard attribute layout.
    pub fn new(id: &str) -> RoundRobinProcessor {
        RoundRobinProcessor::with_layout(
            id,
            Self::BYPASS,
            Self::MODE,
            Self::LOW_NOTE,
            Self::HIGH_NOTE,
        )
    }

    pub fn with_layout(
        id: &str,
        bypass: u32,
        mode: u32,
        low_note: u32,
        high_note: u32,
    ) -> RoundRobinProcessor {
        RoundRobinProcessor {
            id: id.to_string(),
            bypass,
            mode,
            low_note,
            high_note,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bypass(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.bypass)
    }

    pub fn mode(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.mode)
    }

    pub fn low_note(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.low_note)
    }

    pub fn high_note(&self) -> AttributeTarget {
        AttributeTarget::new(&self.id, self.high_note)
    }

    pub fn set_bypassed<H: Host>(&self, host: &mut H, bypassed: bool) -> Result<(), HostError> {
        host.set_attribute(&self.bypass(), if bypassed { 1.0 } else { 0.0 })
    }

    pub fn set_mode<H: Host>(&self, host: &mut H, mode: RoundRobinMode) -> Result<(), HostError> {
        host.set_attribute(&self.mode(), mode.value())
    }

    pub fn set_range<H: Host>(&self, host: &mut H, range: NoteRange) -> Result<(), HostError> {
        host.set_attribute(&self.low_note(), note_value(range.low()))?;
        host.set_attribute(&self.high_note(), note_value(range.high()))
    }
}

fn note_value(note: u7) -> f64 {
    f64::from(note.as_int())
}
