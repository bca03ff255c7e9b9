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

use crate::{
    processors::{LegatoProcessor, RoundRobinProcessor, VibratoModulators},
    round_robin::RoundRobinController,
};

/// A YAML representation of the scripted processors the instrument drives.
#[derive(Deserialize, Clone, Debug)]
pub struct Processors {
    legato: Legato,
    vibrato: Vibrato,
    round_robin: Option<Vec<RoundRobin>>,
}

/// The legato handler and its attribute layout.
#[derive(Deserialize, Clone, Debug)]
pub struct Legato {
    id: String,
    bend_time: Option<u32>,
    min_bend: Option<u32>,
    max_bend: Option<u32>,
    fade_time: Option<u32>,
}

/// The vibrato modulators.
#[derive(Deserialize, Clone, Debug)]
pub struct Vibrato {
    gain: String,
    pitch: String,
}

/// A round-robin handler and its attribute layout.
#[derive(Deserialize, Clone, Debug)]
pub struct RoundRobin {
    id: String,
    bypass: Option<u32>,
    mode: Option<u32>,
    low_note: Option<u32>,
    high_note: Option<u32>,
}

impl Processors {
    pub fn legato(&self) -> LegatoProcessor {
        let legato = &self.legato;
        LegatoProcessor::with_layout(
            &legato.id,
            legato.bend_time.unwrap_or(LegatoProcessor::BEND_TIME),
            legato.min_bend.unwrap_or(LegatoProcessor::MIN_BEND),
            legato.max_bend.unwrap_or(LegatoProcessor::MAX_BEND),
            legato.fade_time.unwrap_or(LegatoProcessor::FADE_TIME),
        )
    }

    pub fn vibrato(&self) -> VibratoModulators {
        VibratoModulators::new(&self.vibrato.gain, &self.vibrato.pitch)
    }

    pub fn round_robin(&self) -> RoundRobinController {
        RoundRobinController::new(
            self.round_robin
                .iter()
                .flatten()
                .map(|rr| {
                    RoundRobinProcessor::with_layout(
                        &rr.id,
                        rr.bypass.unwrap_or(RoundRobinProcessor::BYPASS),
                        rr.mode.unwrap_or(RoundRobinProcessor::MODE),
                        rr.low_note.unwrap_or(RoundRobinProcessor::LOW_NOTE),
                        rr.high_note.unwrap_or(RoundRobinProcessor::HIGH_NOTE),
                    )
                })
                .collect(),
        )
    }
}
