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

//! Switching between patches.
//!
//! Selecting a patch reconfigures the whole instrument from its manifest entry:
//! key colours, sample maps and gain for every sampler bank, legato timings,
//! vibrato depth and the round-robin note range. A bank that cannot be loaded
//! is bypassed on its own and the switch carries on; only an unknown patch name
//! stops the switch, and it does so before anything is touched.

use std::{collections::HashSet, fmt};

use midly::num::u7;
use tracing::{debug, info, span, warn, Level};

use crate::{
    error::Error,
    host::{gain_factor_for_decibels, AttributeTarget, Host, HostError, KeyColor},
    manifest::{Manifest, NoteRange, Patch},
    processors::{LegatoProcessor, VibratoModulators},
    round_robin::RoundRobinController,
};

/// The sample map suffix loaded into the transitions bank.
pub const TRANSITIONS_MAP_SUFFIX: &str = "staccato";

/// The sampler banks of the instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerBanks {
    ids: Vec<String>,
    transitions: Option<String>,
    empty_map: String,
    gain_attribute: u32,
}

impl SamplerBanks {
    /// The sampler attribute holding the linear gain.
    pub const GAIN_ATTRIBUTE: u32 = 0;

    pub fn new(ids: Vec<String>, transitions: Option<String>, empty_map: &str) -> SamplerBanks {
        SamplerBanks {
            ids,
            transitions,
            empty_map: empty_map.to_string(),
            gain_attribute: Self::GAIN_ATTRIBUTE,
        }
    }

    pub fn with_gain_attribute(mut self, gain_attribute: u32) -> SamplerBanks {
        self.gain_attribute = gain_attribute;
        self
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn transitions(&self) -> Option<&str> {
        self.transitions.as_deref()
    }

    pub fn empty_map(&self) -> &str {
        &self.empty_map
    }

    fn is_transitions(&self, id: &str) -> bool {
        self.transitions.as_deref() == Some(id)
    }
}

/// What a sampler bank was left holding after the last switch.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerBinding {
    id: String,
    bypassed: bool,
    loaded_map: String,
    gain_db: f64,
}

impl SamplerBinding {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    pub fn loaded_map(&self) -> &str {
        &self.loaded_map
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }
}

/// Where the patch state machine is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchState {
    Unloaded,
    Loading,
    Active(String),
}

/// Settings a patch may leave out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionalSettings {
    Legato,
    Vibrato,
}

impl fmt::Display for OptionalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionalSettings::Legato => write!(f, "legato"),
            OptionalSettings::Vibrato => write!(f, "vibrato"),
        }
    }
}

/// A problem that was worked around during a switch.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SwitchWarning {
    /// The bank was bypassed and given the empty map.
    #[error("sample map {map} could not be loaded into {bank}")]
    MissingSampleMap { bank: String, map: String },

    /// The settings were not pushed and the processor keeps its previous values.
    #[error("patch has no {0} settings")]
    MissingOptionalSettings(OptionalSettings),

    #[error("unable to update {target}: {error}")]
    HostFailure { target: String, error: HostError },
}

impl SwitchWarning {
    /// True if the patch plays differently from its manifest entry. Left out
    /// optional settings are not problems.
    pub fn is_problem(&self) -> bool {
        !matches!(self, SwitchWarning::MissingOptionalSettings(_))
    }
}

/// The outcome of a successful switch.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchReport {
    patch: String,
    warnings: Vec<SwitchWarning>,
}

impl SwitchReport {
    pub fn patch(&self) -> &str {
        &self.patch
    }

    pub fn warnings(&self) -> &[SwitchWarning] {
        &self.warnings
    }

    /// True if every bank and setting was applied as described.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The patch state machine.
#[derive(Clone, Debug)]
pub struct PatchSwitcher {
    state: PatchState,
    banks: SamplerBanks,
    samplers: Vec<SamplerBinding>,
    legato: LegatoProcessor,
    vibrato: VibratoModulators,
}

impl PatchSwitcher {
    pub fn new(
        banks: SamplerBanks,
        legato: LegatoProcessor,
        vibrato: VibratoModulators,
    ) -> PatchSwitcher {
        PatchSwitcher {
            state: PatchState::Unloaded,
            banks,
            samplers: Vec::new(),
            legato,
            vibrato,
        }
    }

    pub fn state(&self) -> &PatchState {
        &self.state
    }

    /// The name of the active patch.
    pub fn current(&self) -> Option<&str> {
        match &self.state {
            PatchState::Active(name) => Some(name),
            _ => None,
        }
    }

    pub fn banks(&self) -> &SamplerBanks {
        &self.banks
    }

    /// Sampler banks as of the last switch. Empty until a patch is loaded.
    pub fn samplers(&self) -> &[SamplerBinding] {
        &self.samplers
    }

    /// Switches to the named patch.
    pub fn select<H: Host>(
        &mut self,
        host: &mut H,
        manifest: &Manifest,
        round_robin: &RoundRobinController,
        name: &str,
    ) -> Result<SwitchReport, Error> {
        let span = span!(Level::INFO, "select patch", patch = name);
        let _enter = span.enter();

        let patch = manifest.get(name)?;
        self.state = PatchState::Loading;

        let mut warnings = Vec::new();
        color_keys(host, patch.range());
        self.samplers = self.load_sample_maps(host, patch, &mut warnings);
        self.load_gain(host, patch, &mut warnings);

        match patch.legato() {
            Some(settings) => {
                if let Err(error) = self.legato.apply(host, settings) {
                    warnings.push(SwitchWarning::HostFailure {
                        target: self.legato.id().to_string(),
                        error,
                    });
                }
            }
            None => warnings.push(SwitchWarning::MissingOptionalSettings(
                OptionalSettings::Legato,
            )),
        }

        match patch.vibrato() {
            Some(settings) => {
                if let Err(error) = self.vibrato.apply(host, settings) {
                    warnings.push(SwitchWarning::HostFailure {
                        target: format!("{}/{}", self.vibrato.gain(), self.vibrato.pitch()),
                        error,
                    });
                }
            }
            None => warnings.push(SwitchWarning::MissingOptionalSettings(
                OptionalSettings::Vibrato,
            )),
        }

        for (processor, error) in round_robin.set_range(host, patch.range()) {
            warnings.push(SwitchWarning::HostFailure {
                target: processor,
                error,
            });
        }
        self.state = PatchState::Active(patch.name().to_string());

        for warning in warnings.iter() {
            warn!(warning = warning.to_string(), "Patch loaded with a problem.");
        }
        info!(
            range = patch.range().to_string(),
            active_banks = self.samplers.iter().filter(|s| !s.bypassed).count(),
            "Patch loaded."
        );

        Ok(SwitchReport {
            patch: patch.name().to_string(),
            warnings,
        })
    }

    fn load_sample_maps<H: Host>(
        &self,
        host: &mut H,
        patch: &Patch,
        warnings: &mut Vec<SwitchWarning>,
    ) -> Vec<SamplerBinding> {
        let catalogue: HashSet<String> = host.sample_maps().into_iter().collect();
        let mut samplers = Vec::with_capacity(self.banks.ids.len());

        for id in self.banks.ids.iter() {
            let map = if self.banks.is_transitions(id) {
                Some(format!("{}_{}", patch.sample_map_id(), TRANSITIONS_MAP_SUFFIX))
            } else {
                let map = format!("{}_{}", patch.sample_map_id(), id);
                catalogue.contains(&map).then_some(map)
            };

            let sampler = match map {
                Some(map) => match host.load_sample_map(id, &map) {
                    Ok(()) => {
                        if let Err(error) = host.set_bypassed(id, false) {
                            warnings.push(SwitchWarning::HostFailure {
                                target: id.clone(),
                                error,
                            });
                        }
                        SamplerBinding {
                            id: id.clone(),
                            bypassed: false,
                            loaded_map: map,
                            gain_db: 0.0,
                        }
                    }
                    Err(e) => {
                        debug!(bank = id, map, err = e.to_string(), "Sample map failed to load.");
                        warnings.push(SwitchWarning::MissingSampleMap {
                            bank: id.clone(),
                            map,
                        });
                        self.bypass_bank(host, id, warnings)
                    }
                },
                None => {
                    debug!(bank = id, "No sample map for bank, bypassing.");
                    self.bypass_bank(host, id, warnings)
                }
            };
            samplers.push(sampler);
        }

        samplers
    }

    fn bypass_bank<H: Host>(
        &self,
        host: &mut H,
        id: &str,
        warnings: &mut Vec<SwitchWarning>,
    ) -> SamplerBinding {
        // The empty map is loaded even if the bypass fails.
        let bypassed = host.set_bypassed(id, true);
        let emptied = host.load_sample_map(id, &self.banks.empty_map);
        for error in [bypassed, emptied].into_iter().filter_map(Result::err) {
            warnings.push(SwitchWarning::HostFailure {
                target: id.to_string(),
                error,
            });
        }

        SamplerBinding {
            id: id.to_string(),
            bypassed: true,
            loaded_map: self.banks.empty_map.clone(),
            gain_db: 0.0,
        }
    }

    fn load_gain<H: Host>(&mut self, host: &mut H, patch: &Patch, warnings: &mut Vec<SwitchWarning>) {
        for sampler in self.samplers.iter_mut() {
            sampler.gain_db = patch.bank_gain_db(&sampler.id);
            let target = AttributeTarget::new(&sampler.id, self.banks.gain_attribute);
            if let Err(error) = host.set_attribute(&target, gain_factor_for_decibels(sampler.gain_db)) {
                warnings.push(SwitchWarning::HostFailure {
                    target: target.to_string(),
                    error,
                });
            }
        }
    }
}

/// Marks keys inside the range playable and every other key disabled.
fn color_keys<H: Host>(host: &mut H, range: NoteRange) {
    for note in 0..=127u8 {
        let note = u7::from(note);
        let color = if range.contains(note) {
            KeyColor::Playable
        } else {
            KeyColor::Disabled
        };
        host.set_key_color(note, color);
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::num::u7;

    use super::{
        OptionalSettings, PatchState, PatchSwitcher, SamplerBanks, SwitchWarning,
    };
    use crate::{
        host::{gain_factor_for_decibels, AttributeTarget, HostError, KeyColor, RecordingHost},
        manifest::{Articulation, LegatoSettings, Manifest, NoteRange, Patch, VibratoSettings},
        processors::{LegatoProcessor, RoundRobinProcessor, VibratoModulators},
        round_robin::RoundRobinController,
    };

    const BANKS: [&str; 5] = ["sustain", "staccato", "sputato", "flutter", "transitions"];

    fn range(low: u8, high: u8) -> NoteRange {
        NoteRange::new(u7::from(low), u7::from(high)).expect("valid range")
    }

    fn legato() -> LegatoSettings {
        LegatoSettings {
            bend_time: -15.0,
            min_bend: 5.0,
            max_bend: 30.0,
            fade_time: 60.0,
        }
    }

    fn manifest() -> Manifest {
        Manifest::new(vec![
            Patch::new("Alto Flute", "altoFlute", range(55, 91))
                .with_articulation(Articulation::new("sustain", "Sustain", Some(range(55, 91)), Some(-5.0)))
                .with_articulation(Articulation::new("staccato", "Staccato", None, None))
                .with_legato(legato())
                .with_vibrato(VibratoSettings {
                    gain: 0.25,
                    pitch: -0.1,
                }),
            Patch::new("Concert Flute I", "flute1", range(60, 96))
                .with_articulation(Articulation::new("sustain", "Sustain", None, Some(-6.0)))
                .with_bank_gain("flutter", -2.0),
        ])
        .expect("valid manifest")
    }

    fn host() -> RecordingHost {
        RecordingHost::new(
            [
                "altoFlute_sustain",
                "altoFlute_staccato",
                "altoFlute_sputato",
                "flute1_sustain",
                "flute1_staccato",
                "flute1_flutter",
                "empty",
            ]
            .iter()
            .map(|map| map.to_string())
            .collect(),
        )
    }

    fn switcher() -> (PatchSwitcher, RoundRobinController) {
        (
            PatchSwitcher::new(
                SamplerBanks::new(
                    BANKS.iter().map(|bank| bank.to_string()).collect(),
                    Some("transitions".to_string()),
                    "empty",
                ),
                LegatoProcessor::new("legatoHandler"),
                VibratoModulators::new("vibratoGain", "vibratoPitch"),
            ),
            RoundRobinController::new(vec![
                RoundRobinProcessor::new("sustainRoundRobin"),
                RoundRobinProcessor::new("staccatoRoundRobin"),
            ]),
        )
    }

    #[test]
    fn alto_flute() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();

        let report = switcher.select(&mut host, &manifest(), &round_robin, "Alto Flute")?;
        assert!(report.is_clean(), "{:?}", report.warnings());
        assert_eq!(&PatchState::Active("Alto Flute".into()), switcher.state());

        assert_eq!(Some(-15.0), host.attribute(&AttributeTarget::new("legatoHandler", 4)));
        assert_eq!(Some(0.25), host.intensity("vibratoGain"));
        assert_eq!(Some(-0.1), host.intensity("vibratoPitch"));

        for processor in round_robin.processors() {
            assert_eq!(Some(55.0), host.attribute(&processor.low_note()));
            assert_eq!(Some(91.0), host.attribute(&processor.high_note()));
        }
        Ok(())
    }

    #[test]
    fn banks_are_loaded_or_bypassed_with_empty_map() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();

        for name in manifest.names() {
            switcher.select(&mut host, &manifest, &round_robin, name)?;
            for sampler in switcher.samplers() {
                let bypassed = host.is_bypassed(sampler.id()).expect("bank was touched");
                let map = host.loaded_map(sampler.id()).expect("bank has a map");
                assert_eq!(sampler.is_bypassed(), bypassed);
                assert_eq!(sampler.loaded_map(), map);
                assert_eq!(bypassed, map == "empty", "{} holds {}", sampler.id(), map);
            }
        }

        // Concert Flute I has no sputato maps, so the Alto Flute map must not linger.
        assert_eq!(Some(true), host.is_bypassed("sputato"));
        assert_eq!(Some("empty"), host.loaded_map("sputato"));
        assert_eq!(Some("flute1_flutter"), host.loaded_map("flutter"));
        Ok(())
    }

    #[test]
    fn keys_playable_only_in_range() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();

        for patch in manifest.patches() {
            switcher.select(&mut host, &manifest, &round_robin, patch.name())?;
            for note in 0..=127u8 {
                let note = u7::from(note);
                let expected = if patch.range().contains(note) {
                    KeyColor::Playable
                } else {
                    KeyColor::Disabled
                };
                assert_eq!(
                    Some(expected),
                    host.key_color(note),
                    "{} note {}",
                    patch.name(),
                    note.as_int()
                );
            }
        }
        Ok(())
    }

    #[test]
    fn transitions_bank_always_loads_staccato() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        // No staccato map is listed for Concert Flute I.
        let mut host = RecordingHost::new(
            ["flute1_sustain", "flute1_flutter", "empty"]
                .iter()
                .map(|map| map.to_string())
                .collect(),
        );

        switcher.select(&mut host, &manifest(), &round_robin, "Concert Flute I")?;

        assert_eq!(Some(false), host.is_bypassed("transitions"));
        assert_eq!(Some("flute1_staccato"), host.loaded_map("transitions"));
        assert_eq!(Some(true), host.is_bypassed("staccato"));
        assert_eq!(Some("empty"), host.loaded_map("staccato"));
        Ok(())
    }

    #[test]
    fn gain_defaults_to_unity() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();
        let gain = |host: &RecordingHost, bank: &str| host.attribute(&AttributeTarget::new(bank, 0));

        switcher.select(&mut host, &manifest, &round_robin, "Alto Flute")?;
        assert_eq!(Some(gain_factor_for_decibels(-5.0)), gain(&host, "sustain"));
        assert_eq!(Some(1.0), gain(&host, "flutter"));

        switcher.select(&mut host, &manifest, &round_robin, "Concert Flute I")?;
        assert_eq!(Some(gain_factor_for_decibels(-6.0)), gain(&host, "sustain"));
        assert_eq!(Some(gain_factor_for_decibels(-2.0)), gain(&host, "flutter"));
        assert_eq!(Some(1.0), gain(&host, "staccato"));
        Ok(())
    }

    #[test]
    fn missing_settings_keep_previous_values() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();

        switcher.select(&mut host, &manifest, &round_robin, "Alto Flute")?;
        let report = switcher.select(&mut host, &manifest, &round_robin, "Concert Flute I")?;

        assert_eq!(
            &[
                SwitchWarning::MissingOptionalSettings(OptionalSettings::Legato),
                SwitchWarning::MissingOptionalSettings(OptionalSettings::Vibrato),
            ],
            report.warnings()
        );
        assert!(!report.warnings().iter().any(SwitchWarning::is_problem));
        assert_eq!(Some(-15.0), host.attribute(&AttributeTarget::new("legatoHandler", 4)));
        assert_eq!(Some(60.0), host.attribute(&AttributeTarget::new("legatoHandler", 7)));
        assert_eq!(Some(0.25), host.intensity("vibratoGain"));
        Ok(())
    }

    #[test]
    fn failed_map_degrades_one_bank() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        host.break_sample_map("altoFlute_staccato");

        let report = switcher.select(&mut host, &manifest(), &round_robin, "Alto Flute")?;

        assert_eq!(
            &[
                SwitchWarning::MissingSampleMap {
                    bank: "staccato".into(),
                    map: "altoFlute_staccato".into(),
                },
                SwitchWarning::MissingSampleMap {
                    bank: "transitions".into(),
                    map: "altoFlute_staccato".into(),
                },
            ],
            report.warnings()
        );
        assert!(report.warnings().iter().all(SwitchWarning::is_problem));
        assert_eq!(Some(true), host.is_bypassed("staccato"));
        assert_eq!(Some("empty"), host.loaded_map("staccato"));
        assert_eq!(Some(true), host.is_bypassed("transitions"));
        assert_eq!(Some(false), host.is_bypassed("sustain"));
        assert_eq!(Some("altoFlute_sustain"), host.loaded_map("sustain"));
        assert_eq!(Some(-15.0), host.attribute(&AttributeTarget::new("legatoHandler", 4)));
        Ok(())
    }

    #[test]
    fn unknown_patch_changes_nothing() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();
        switcher.select(&mut host, &manifest, &round_robin, "Alto Flute")?;
        let before = host.clone();

        assert_eq!(
            Err(crate::Error::UnknownPatch("Bassoon".into())),
            switcher.select(&mut host, &manifest, &round_robin, "Bassoon")
        );
        assert_eq!(before, host);
        assert_eq!(Some("Alto Flute"), switcher.current());
        Ok(())
    }

    #[test]
    fn reselecting_is_idempotent() -> Result<(), Box<dyn Error>> {
        let manifest = manifest();

        for name in manifest.names() {
            let (mut switcher, round_robin) = switcher();
            let mut host = host();

            let first_report = switcher.select(&mut host, &manifest, &round_robin, name)?;
            let first_host = host.clone();
            let first_samplers = switcher.samplers().to_vec();

            let second_report = switcher.select(&mut host, &manifest, &round_robin, name)?;
            assert_eq!(first_report, second_report);
            assert_eq!(first_host, host);
            assert_eq!(first_samplers, switcher.samplers());
        }
        Ok(())
    }

    #[test]
    fn failed_bypass_still_loads_empty_map() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        let manifest = manifest();

        switcher.select(&mut host, &manifest, &round_robin, "Alto Flute")?;
        assert_eq!(Some("altoFlute_sputato"), host.loaded_map("sputato"));

        host.break_module("sputato");
        let report = switcher.select(&mut host, &manifest, &round_robin, "Concert Flute I")?;

        assert!(report.warnings().contains(&SwitchWarning::HostFailure {
            target: "sputato".into(),
            error: HostError::UnknownModule("sputato".into()),
        }));
        assert_eq!(Some("empty"), host.loaded_map("sputato"));
        Ok(())
    }

    #[test]
    fn failed_enable_is_not_a_missing_map() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        host.break_module("sustain");

        let report = switcher.select(&mut host, &manifest(), &round_robin, "Alto Flute")?;

        assert!(report.warnings().contains(&SwitchWarning::HostFailure {
            target: "sustain".into(),
            error: HostError::UnknownModule("sustain".into()),
        }));
        assert!(!report
            .warnings()
            .iter()
            .any(|warning| matches!(warning, SwitchWarning::MissingSampleMap { .. })));
        assert_eq!(Some("altoFlute_sustain"), host.loaded_map("sustain"));
        Ok(())
    }

    #[test]
    fn round_robin_range_failure_is_reported() -> Result<(), Box<dyn Error>> {
        let (mut switcher, round_robin) = switcher();
        let mut host = host();
        host.break_module("staccatoRoundRobin");

        let report = switcher.select(&mut host, &manifest(), &round_robin, "Alto Flute")?;

        assert_eq!(
            &[SwitchWarning::HostFailure {
                target: "staccatoRoundRobin".into(),
                error: HostError::UnknownModule("staccatoRoundRobin".into()),
            }],
            report.warnings()
        );
        Ok(())
    }
}
