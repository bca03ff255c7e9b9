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

//! The static catalogue of patches an instrument can load.
//!
//! A [`Manifest`] is built once at startup and never mutated. Patches keep the
//! order they were declared in so that selection menus list them the same way.

use std::{collections::HashMap, fmt};

use midly::num::u7;

use crate::error::Error;

/// Errors raised while assembling a manifest.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("note range {low}-{high} is inverted")]
    InvertedRange { low: u8, high: u8 },

    #[error("patch {0} is defined more than once")]
    DuplicatePatch(String),

    #[error("articulation {articulation} of patch {patch} has range {range} outside {patch_range}")]
    ArticulationOutOfRange {
        patch: String,
        articulation: String,
        range: NoteRange,
        patch_range: NoteRange,
    },
}

/// An inclusive range of MIDI notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteRange {
    low: u7,
    high: u7,
}

impl NoteRange {
    /// Creates a new note range. The low note must not be above the high note.
    pub fn new(low: u7, high: u7) -> Result<NoteRange, ManifestError> {
        if low > high {
            return Err(ManifestError::InvertedRange {
                low: low.as_int(),
                high: high.as_int(),
            });
        }

        Ok(NoteRange { low, high })
    }

    /// The lowest playable note.
    pub fn low(&self) -> u7 {
        self.low
    }

    /// The highest playable note.
    pub fn high(&self) -> u7 {
        self.high
    }

    /// Returns true if the note lies within the range.
    pub fn contains(&self, note: u7) -> bool {
        self.low <= note && note <= self.high
    }

    /// Returns true if the other range lies entirely inside this one.
    pub fn encloses(&self, other: &NoteRange) -> bool {
        self.contains(other.low) && self.contains(other.high)
    }
}

impl fmt::Display for NoteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low.as_int(), self.high.as_int())
    }
}

/// Legato handler timings for a patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegatoSettings {
    pub bend_time: f64,
    pub min_bend: f64,
    pub max_bend: f64,
    pub fade_time: f64,
}

/// Vibrato modulator intensities for a patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VibratoSettings {
    pub gain: f64,
    pub pitch: f64,
}

/// A playing technique available to a patch.
#[derive(Clone, Debug, PartialEq)]
pub struct Articulation {
    name: String,
    display_name: String,
    range: Option<NoteRange>,
    gain_db: Option<f64>,
}

impl Articulation {
    /// Creates a new articulation. A missing range means the articulation
    /// spans the whole patch.
    pub fn new(
        name: &str,
        display_name: &str,
        range: Option<NoteRange>,
        gain_db: Option<f64>,
    ) -> Articulation {
        Articulation {
            name: name.to_string(),
            display_name: display_name.to_string(),
            range,
            gain_db,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The explicit range of the articulation, if one was given.
    pub fn range(&self) -> Option<NoteRange> {
        self.range
    }

    pub fn gain_db(&self) -> Option<f64> {
        self.gain_db
    }
}

/// A named instrument configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    name: String,
    sample_map_id: String,
    range: NoteRange,
    keyswitches: Vec<u7>,
    articulations: Vec<Articulation>,
    gain: HashMap<String, f64>,
    legato: Option<LegatoSettings>,
    vibrato: Option<VibratoSettings>,
}

impl Patch {
    /// Creates a patch with no articulations, gain overrides or settings.
    pub fn new(name: &str, sample_map_id: &str, range: NoteRange) -> Patch {
        Patch {
            name: name.to_string(),
            sample_map_id: sample_map_id.to_string(),
            range,
            keyswitches: Vec::new(),
            articulations: Vec::new(),
            gain: HashMap::new(),
            legato: None,
            vibrato: None,
        }
    }

    pub fn with_keyswitches(mut self, mut keyswitches: Vec<u7>) -> Patch {
        keyswitches.sort();
        keyswitches.dedup();
        self.keyswitches = keyswitches;
        self
    }

    pub fn with_articulation(mut self, articulation: Articulation) -> Patch {
        self.articulations.push(articulation);
        self
    }

    /// Sets an explicit gain in decibels for the given sampler bank.
    pub fn with_bank_gain(mut self, bank: &str, gain_db: f64) -> Patch {
        self.gain.insert(bank.to_string(), gain_db);
        self
    }

    pub fn with_legato(mut self, legato: LegatoSettings) -> Patch {
        self.legato = Some(legato);
        self
    }

    pub fn with_vibrato(mut self, vibrato: VibratoSettings) -> Patch {
        self.vibrato = Some(vibrato);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The prefix used to find this patch's sample maps.
    pub fn sample_map_id(&self) -> &str {
        &self.sample_map_id
    }

    pub fn range(&self) -> NoteRange {
        self.range
    }

    pub fn keyswitches(&self) -> &[u7] {
        &self.keyswitches
    }

    pub fn articulations(&self) -> &[Articulation] {
        &self.articulations
    }

    /// Gets an articulation by name.
    pub fn articulation(&self, name: &str) -> Option<&Articulation> {
        self.articulations
            .iter()
            .find(|articulation| articulation.name == name)
    }

    /// The range an articulation plays over, falling back to the patch range.
    pub fn articulation_range(&self, name: &str) -> Option<NoteRange> {
        self.articulation(name)
            .map(|articulation| articulation.range.unwrap_or(self.range))
    }

    /// The gain in decibels for a sampler bank. An explicit bank gain wins over
    /// the gain of the articulation with the same name. Unspecified banks are
    /// at 0 dB.
    pub fn bank_gain_db(&self, bank: &str) -> f64 {
        self.gain
            .get(bank)
            .copied()
            .or_else(|| self.articulation(bank).and_then(|a| a.gain_db))
            .unwrap_or(0.0)
    }

    pub fn legato(&self) -> Option<&LegatoSettings> {
        self.legato.as_ref()
    }

    pub fn vibrato(&self) -> Option<&VibratoSettings> {
        self.vibrato.as_ref()
    }

    fn validate(&self) -> Result<(), ManifestError> {
        for articulation in self.articulations.iter() {
            if let Some(range) = articulation.range {
                if !self.range.encloses(&range) {
                    return Err(ManifestError::ArticulationOutOfRange {
                        patch: self.name.clone(),
                        articulation: articulation.name.clone(),
                        range,
                        patch_range: self.range,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The read-only catalogue of patches.
#[derive(Clone, Debug)]
pub struct Manifest {
    patches: Vec<Patch>,
    index: HashMap<String, usize>,
}

impl Manifest {
    /// Creates a manifest, validating every patch and rejecting duplicate names.
    pub fn new(patches: Vec<Patch>) -> Result<Manifest, ManifestError> {
        let mut index = HashMap::with_capacity(patches.len());
        for (position, patch) in patches.iter().enumerate() {
            patch.validate()?;
            if index.insert(patch.name.clone(), position).is_some() {
                return Err(ManifestError::DuplicatePatch(patch.name.clone()));
            }
        }

        Ok(Manifest { patches, index })
    }

    /// Gets the patch with the given name.
    pub fn get(&self, name: &str) -> Result<&Patch, Error> {
        self.index
            .get(name)
            .map(|position| &self.patches[*position])
            .ok_or_else(|| Error::UnknownPatch(name.to_string()))
    }

    /// Patch names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.patches.iter().map(|patch| patch.name.as_str()).collect()
    }

    /// The first declared patch. Used when nothing has been selected yet.
    pub fn first(&self) -> Option<&Patch> {
        self.patches.first()
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::num::u7;

    use super::{Articulation, Manifest, ManifestError, NoteRange, Patch};

    fn range(low: u8, high: u8) -> NoteRange {
        NoteRange::new(u7::from(low), u7::from(high)).expect("valid range")
    }

    #[test]
    fn names_keep_declaration_order() -> Result<(), Box<dyn Error>> {
        let manifest = Manifest::new(vec![
            Patch::new("Piccolo", "piccolo", range(74, 108)),
            Patch::new("Alto Flute", "altoFlute", range(55, 91)),
            Patch::new("Bass Flute", "bassFlute", range(48, 84)),
        ])?;

        assert_eq!(vec!["Piccolo", "Alto Flute", "Bass Flute"], manifest.names());
        assert_eq!(Some("Piccolo"), manifest.first().map(|patch| patch.name()));
        assert_eq!("bassFlute", manifest.get("Bass Flute")?.sample_map_id());
        Ok(())
    }

    #[test]
    fn unknown_patch() -> Result<(), Box<dyn Error>> {
        let manifest = Manifest::new(vec![Patch::new("Alto Flute", "altoFlute", range(55, 91))])?;

        assert!(matches!(
            manifest.get("Tuba"),
            Err(crate::Error::UnknownPatch(name)) if name == "Tuba"
        ));
        Ok(())
    }

    #[test]
    fn inverted_range() {
        assert_eq!(
            Err(ManifestError::InvertedRange { low: 91, high: 55 }),
            NoteRange::new(u7::from(91), u7::from(55))
        );
    }

    #[test]
    fn duplicate_patch() {
        let result = Manifest::new(vec![
            Patch::new("Alto Flute", "altoFlute", range(55, 91)),
            Patch::new("Alto Flute", "altoFlute2", range(55, 91)),
        ]);

        assert!(matches!(result, Err(ManifestError::DuplicatePatch(name)) if name == "Alto Flute"));
    }

    #[test]
    fn articulation_outside_patch_range() {
        let result = Manifest::new(vec![Patch::new("Alto Flute", "altoFlute", range(55, 91))
            .with_articulation(Articulation::new(
                "harmonics",
                "Harmonics",
                Some(range(55, 100)),
                None,
            ))]);

        assert!(matches!(
            result,
            Err(ManifestError::ArticulationOutOfRange { articulation, .. }) if articulation == "harmonics"
        ));
    }

    #[test]
    fn bank_gain_precedence() {
        let patch = Patch::new("Concert Flute I", "flute1", range(60, 96))
            .with_articulation(Articulation::new("sustain", "Sustain", None, Some(-6.0)))
            .with_articulation(Articulation::new("staccato", "Staccato", None, Some(-2.0)))
            .with_bank_gain("staccato", -3.0);

        assert_eq!(-6.0, patch.bank_gain_db("sustain"));
        assert_eq!(-3.0, patch.bank_gain_db("staccato"));
        assert_eq!(0.0, patch.bank_gain_db("flutter"));
    }

    #[test]
    fn articulation_range_falls_back_to_patch() {
        let patch = Patch::new("Concert Flute I", "flute1", range(60, 96))
            .with_articulation(Articulation::new("glide", "Glide", None, None))
            .with_articulation(Articulation::new("flutter", "Flutter", Some(range(62, 90)), None));

        assert_eq!(Some(range(60, 96)), patch.articulation_range("glide"));
        assert_eq!(Some(range(62, 90)), patch.articulation_range("flutter"));
        assert_eq!(None, patch.articulation_range("sputato"));
    }

    #[test]
    fn keyswitches_sorted() {
        let patch = Patch::new("Alto Flute", "altoFlute", range(55, 91)).with_keyswitches(
            u7::slice_from_int(&[26, 24, 25, 24]).to_vec(),
        );

        assert_eq!(u7::slice_from_int(&[24, 25, 26]), patch.keyswitches());
    }
}
