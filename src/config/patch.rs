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
use std::collections::HashMap;

use midly::num::u7;
use serde::Deserialize;

use super::error::ConfigError;
use crate::manifest::{self, LegatoSettings, NoteRange, VibratoSettings};

/// Converts a config value into a 7-bit MIDI value.
pub(super) fn seven_bit(field: &'static str, value: u8) -> Result<u7, ConfigError> {
    u7::try_from(value).ok_or(ConfigError::NotSevenBit { field, value })
}

/// A YAML representation of a note range.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Range {
    low: u8,
    high: u8,
}

impl Range {
    pub fn to_range(self) -> Result<NoteRange, ConfigError> {
        Ok(NoteRange::new(
            seven_bit("range low", self.low)?,
            seven_bit("range high", self.high)?,
        )?)
    }
}

/// A YAML representation of an articulation.
#[derive(Deserialize, Clone, Debug)]
pub struct Articulation {
    /// The articulation identifier. Also the name of the sampler bank that plays it.
    name: String,

    /// The name shown to the user. Defaults to the identifier.
    display_name: Option<String>,

    /// The playable range. Defaults to the patch range.
    range: Option<Range>,

    /// Gain in decibels.
    gain: Option<f64>,
}

impl Articulation {
    fn to_articulation(&self) -> Result<manifest::Articulation, ConfigError> {
        Ok(manifest::Articulation::new(
            &self.name,
            self.display_name.as_deref().unwrap_or(&self.name),
            self.range.map(Range::to_range).transpose()?,
            self.gain,
        ))
    }
}

/// A YAML representation of the legato handler settings.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Legato {
    bend_time: f64,
    min_bend: f64,
    max_bend: f64,
    fade_time: f64,
}

/// A YAML representation of the vibrato modulator settings.
#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Vibrato {
    gain: f64,
    pitch: f64,
}

/// A YAML representation of a patch.
#[derive(Deserialize, Clone, Debug)]
pub struct Patch {
    /// The user-visible patch name.
    name: String,

    /// The prefix of the patch's sample maps.
    sample_map_id: String,

    /// The playable range of the instrument.
    range: Range,

    /// Keyswitch notes.
    keyswitches: Option<Vec<u8>>,

    /// The playing techniques of the patch.
    articulations: Option<Vec<Articulation>>,

    /// Explicit gain in decibels per sampler bank.
    gain: Option<HashMap<String, f64>>,

    legato: Option<Legato>,

    vibrato: Option<Vibrato>,
}

impl Patch {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Converts the YAML patch into a manifest patch.
    pub fn to_patch(&self) -> Result<manifest::Patch, ConfigError> {
        let keyswitches = self
            .keyswitches
            .iter()
            .flatten()
            .map(|note| seven_bit("keyswitch", *note))
            .collect::<Result<Vec<u7>, ConfigError>>()?;

        let mut patch = manifest::Patch::new(&self.name, &self.sample_map_id, self.range.to_range()?)
            .with_keyswitches(keyswitches);

        for articulation in self.articulations.iter().flatten() {
            patch = patch.with_articulation(articulation.to_articulation()?);
        }

        // Sorted for a stable bank order regardless of map ordering.
        let mut gain: Vec<(&String, &f64)> = self.gain.iter().flatten().collect();
        gain.sort_by(|a, b| a.0.cmp(b.0));
        for (bank, gain_db) in gain {
            patch = patch.with_bank_gain(bank, *gain_db);
        }

        if let Some(legato) = self.legato {
            patch = patch.with_legato(LegatoSettings {
                bend_time: legato.bend_time,
                min_bend: legato.min_bend,
                max_bend: legato.max_bend,
                fade_time: legato.fade_time,
            });
        }
        if let Some(vibrato) = self.vibrato {
            patch = patch.with_vibrato(VibratoSettings {
                gain: vibrato.gain,
                pitch: vibrato.pitch,
            });
        }

        Ok(patch)
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use config::{Config, File, FileFormat};
    use midly::num::u7;

    use super::Patch;
    use crate::config::ConfigError;

    fn parse(yaml: &str) -> Result<Patch, Box<dyn Error>> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Patch>()?)
    }

    #[test]
    fn full_patch() -> Result<(), Box<dyn Error>> {
        let patch = parse(
            r#"
            name: Concert Flute I
            sample_map_id: flute1
            range:
              low: 60
              high: 96
            keyswitches: [26, 24, 25]
            articulations:
              - name: sustain
                display_name: Sustain
                range:
                  low: 60
                  high: 96
                gain: -6
              - name: glide
            gain:
              flutter: -3.5
            legato:
              bend_time: -15
              min_bend: 5
              max_bend: 30
              fade_time: 60
            vibrato:
              gain: 0.25
              pitch: -0.1
            "#,
        )?
        .to_patch()?;

        assert_eq!("Concert Flute I", patch.name());
        assert_eq!("flute1", patch.sample_map_id());
        assert_eq!(u7::from(60), patch.range().low());
        assert_eq!(
            &[u7::from(24), u7::from(25), u7::from(26)],
            patch.keyswitches()
        );
        assert_eq!(2, patch.articulations().len());
        assert_eq!(Some("glide"), patch.articulation("glide").map(|a| a.display_name()));
        assert_eq!(Some(patch.range()), patch.articulation_range("glide"));
        assert_eq!(-6.0, patch.bank_gain_db("sustain"));
        assert_eq!(-3.5, patch.bank_gain_db("flutter"));
        assert_eq!(0.0, patch.bank_gain_db("staccato"));
        assert_eq!(Some(-15.0), patch.legato().map(|l| l.bend_time));
        assert_eq!(Some(0.25), patch.vibrato().map(|v| v.gain));
        Ok(())
    }

    #[test]
    fn minimal_patch() -> Result<(), Box<dyn Error>> {
        let patch = parse(
            r#"
            name: Piccolo
            sample_map_id: piccolo
            range:
              low: 74
              high: 108
            "#,
        )?
        .to_patch()?;

        assert!(patch.keyswitches().is_empty());
        assert!(patch.articulations().is_empty());
        assert!(patch.legato().is_none());
        assert!(patch.vibrato().is_none());
        Ok(())
    }

    #[test]
    fn out_of_range_note() -> Result<(), Box<dyn Error>> {
        let patch = parse(
            r#"
            name: Broken
            sample_map_id: broken
            range:
              low: 60
              high: 200
            "#,
        )?;

        assert!(matches!(
            patch.to_patch(),
            Err(ConfigError::NotSevenBit { value: 200, .. })
        ));
        Ok(())
    }

    #[test]
    fn inverted_range() -> Result<(), Box<dyn Error>> {
        let patch = parse(
            r#"
            name: Broken
            sample_map_id: broken
            range:
              low: 90
              high: 60
            "#,
        )?;

        assert!(matches!(patch.to_patch(), Err(ConfigError::Manifest(_))));
        Ok(())
    }
}
