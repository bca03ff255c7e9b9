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
use midly::num::u4;
use serde::Deserialize;

use super::error::ConfigError;

const DEFAULT_MIDI_CHANNEL: u8 = 1;

/// A YAML representation of the MIDI configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct Midi {
    /// The MIDI device.
    device: String,

    /// The channel, 1 to 16, that remapped controllers are sent on.
    channel: Option<u8>,
}

impl Midi {
    /// New will create a new MIDI configuration.
    pub fn new(device: &str, channel: Option<u8>) -> Midi {
        Midi {
            device: device.to_string(),
            channel,
        }
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the zero based channel.
    pub fn channel(&self) -> Result<u4, ConfigError> {
        let channel = self.channel.unwrap_or(DEFAULT_MIDI_CHANNEL);
        if channel == 0 {
            return Err(ConfigError::Channel(channel));
        }
        u4::try_from(channel - 1).ok_or(ConfigError::Channel(channel))
    }
}
