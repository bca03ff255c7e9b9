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

//! The instrument session.
//!
//! [`Instrument`] owns all of the mutable state of a running instrument and is
//! the only thing the UI and MIDI callbacks talk to. It is not thread safe and
//! is meant to live on the host's control thread.

use midly::{live::LiveEvent, num::u7, MidiMessage};
use tracing::{debug, error, info};

use crate::{
    curve::ResponseCurve,
    deferred::DeferredUpdate,
    error::Error,
    host::Host,
    manifest::Manifest,
    patch::{PatchState, PatchSwitcher, SwitchReport},
    release::ReleaseSamples,
    round_robin::{RoundRobinController, ROUND_ROBIN_CONTROLLER},
    routing::{Forward, Parameter, Router},
};

/// Whether an incoming MIDI event should continue to its default routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiDisposition {
    PassThrough,
    Consumed,
}

/// Control updates the UI should apply on this idle tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiRefresh {
    /// The displayed parameter's value slider should show this raw value.
    pub parameter_value: Option<(Parameter, u7)>,
    /// The round-robin button should show this state.
    pub round_robin: Option<bool>,
}

impl UiRefresh {
    pub fn is_empty(&self) -> bool {
        self.parameter_value.is_none() && self.round_robin.is_none()
    }
}

/// A running instrument bound to a host.
pub struct Instrument<H: Host> {
    host: H,
    manifest: Manifest,
    router: Router,
    patches: PatchSwitcher,
    round_robin: RoundRobinController,
    releases: ReleaseSamples,
    displayed_parameter: Option<Parameter>,
    parameter_display: DeferredUpdate<(Parameter, u7)>,
    round_robin_display: DeferredUpdate<bool>,
}

impl<H: Host> Instrument<H> {
    /// Creates an instrument and pushes the initial round-robin state to the
    /// host. No patch is loaded yet.
    pub fn new(
        mut host: H,
        manifest: Manifest,
        router: Router,
        patches: PatchSwitcher,
        round_robin: RoundRobinController,
        releases: ReleaseSamples,
    ) -> Instrument<H> {
        round_robin.apply(&mut host);

        Instrument {
            host,
            manifest,
            router,
            patches,
            round_robin,
            releases,
            displayed_parameter: None,
            parameter_display: DeferredUpdate::new(),
            round_robin_display: DeferredUpdate::new(),
        }
    }

    /// Switches to the named patch.
    pub fn select_patch(&mut self, name: &str) -> Result<SwitchReport, Error> {
        self.patches
            .select(&mut self.host, &self.manifest, &self.round_robin, name)
    }

    /// Selects the first patch of the manifest, used when no preset supplied one.
    pub fn select_default_patch(&mut self) -> Result<SwitchReport, Error> {
        let name = self
            .manifest
            .first()
            .map(|patch| patch.name().to_string())
            .ok_or(Error::EmptyManifest)?;
        self.select_patch(&name)
    }

    /// Assigns a user controller to a parameter.
    pub fn assign_controller_to_parameter(
        &mut self,
        parameter: Parameter,
        cc: u8,
    ) -> Result<(), Error> {
        let displaced = self.router.assign(parameter, cc)?;
        match displaced {
            Some(displaced) => info!(
                parameter = parameter.label(),
                cc,
                displaced = displaced.label(),
                "Controller reassigned."
            ),
            None => info!(parameter = parameter.label(), cc, "Controller assigned."),
        }
        Ok(())
    }

    /// Removes the user controller from a parameter.
    pub fn unassign_parameter(&mut self, parameter: Parameter) {
        self.router.unassign(parameter);
    }

    pub fn set_response_curve(&mut self, parameter: Parameter, curve: ResponseCurve) {
        self.router.set_curve(parameter, curve);
    }

    /// Sets round robin from the UI toggle. Returns true if it changed.
    pub fn set_round_robin_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.round_robin.set_enabled(&mut self.host, enabled);
        if changed {
            // The toggle already shows the new state.
            self.round_robin_display.cancel();
        }
        changed
    }

    /// Loads or purges release samples from the UI toggle.
    pub fn set_release_samples_enabled(&mut self, enabled: bool) -> bool {
        self.releases.set_enabled(&mut self.host, enabled)
    }

    /// Chooses which parameter's controls the UI is showing.
    pub fn set_displayed_parameter(&mut self, parameter: Option<Parameter>) {
        if self.displayed_parameter != parameter {
            self.parameter_display.cancel();
        }
        self.displayed_parameter = parameter;
    }

    /// Applies a value from a parameter's value slider.
    pub fn set_parameter_value(&mut self, parameter: Parameter, value: u7) {
        let forward = self.router.apply_value(parameter, value);
        self.deliver(parameter, forward);
    }

    /// Handles a MIDI event delivered by the host.
    pub fn handle_midi(&mut self, event: &LiveEvent<'_>) -> MidiDisposition {
        let message = match event {
            LiveEvent::Midi { message, .. } => message,
            _ => return MidiDisposition::PassThrough,
        };

        match *message {
            MidiMessage::Controller { controller, value } => self.handle_controller(controller, value),
            MidiMessage::NoteOn { vel, .. } if vel.as_int() > 0 => {
                for forward in self.router.velocity_forwards(vel) {
                    self.deliver_forward(forward);
                }
                MidiDisposition::PassThrough
            }
            _ => MidiDisposition::PassThrough,
        }
    }

    fn handle_controller(&mut self, controller: u7, value: u7) -> MidiDisposition {
        if controller.as_int() == ROUND_ROBIN_CONTROLLER
            && self.round_robin.handle_cc(&mut self.host, value)
        {
            self.round_robin_display.schedule(self.round_robin.is_enabled());
        }

        let decision = self.router.handle_cc(controller, value);
        if let (Some(parameter), Some(forward)) = (decision.parameter, decision.forward) {
            debug!(
                parameter = parameter.label(),
                controller = controller.as_int(),
                value = value.as_int(),
                "Redirecting controller."
            );
            self.deliver(parameter, forward);
            if self.displayed_parameter == Some(parameter) {
                self.parameter_display.schedule((parameter, value));
            }
        }

        if decision.consumed {
            MidiDisposition::Consumed
        } else {
            MidiDisposition::PassThrough
        }
    }

    fn deliver(&mut self, parameter: Parameter, forward: Forward) {
        debug!(parameter = parameter.label(), forward = ?forward, "Forwarding parameter value.");
        self.deliver_forward(forward);
    }

    fn deliver_forward(&mut self, forward: Forward) {
        let result = match &forward {
            Forward::Controller { controller, value } => {
                self.host.send_controller(*controller, *value)
            }
            Forward::Attribute { target, value } => self.host.set_attribute(target, *value),
        };
        if let Err(e) = result {
            error!(forward = ?forward, err = e.to_string(), "Unable to forward parameter value.");
        }
    }

    /// Drains the deferred UI updates. Call once per idle tick.
    pub fn idle(&mut self) -> UiRefresh {
        let parameter_value = self
            .parameter_display
            .take()
            .filter(|(parameter, _)| self.displayed_parameter == Some(*parameter));

        UiRefresh {
            parameter_value,
            round_robin: self.round_robin_display.take(),
        }
    }

    /// The name of the active patch.
    pub fn current_patch(&self) -> Option<&str> {
        self.patches.current()
    }

    pub fn patch_state(&self) -> &PatchState {
        self.patches.state()
    }

    pub fn patches(&self) -> &PatchSwitcher {
        &self.patches
    }

    /// Every parameter and its user controller.
    pub fn assignments(&self) -> Vec<(Parameter, Option<u7>)> {
        self.router.assignments()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn round_robin_enabled(&self) -> bool {
        self.round_robin.is_enabled()
    }

    pub fn release_samples_enabled(&self) -> bool {
        self.releases.is_enabled()
    }

    pub fn displayed_parameter(&self) -> Option<Parameter> {
        self.displayed_parameter
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
