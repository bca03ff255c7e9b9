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

//! Runs an instrument against a MIDI device.
//!
//! A single task owns the instrument. MIDI input arrives from the device's
//! watcher over a channel and the idle tick drains deferred UI updates, so
//! every instrument call happens on that one task.

use std::{sync::Arc, time::Duration};

use midly::live::LiveEvent;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, span, Instrument as _, Level};

use crate::{
    host::Host,
    instrument::{Instrument, MidiDisposition},
    midi::Device,
};

/// How often deferred UI updates are drained.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(50);

const MIDI_EVENT_BUFFER: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("unable to watch MIDI events: {0}")]
    Watch(String),
}

/// Feeds MIDI from a device into an instrument and plays the results back out.
pub struct Driver<H: Host> {
    instrument: Instrument<H>,
    device: Arc<dyn Device>,
    idle_interval: Duration,
}

impl<H: Host> Driver<H> {
    pub fn new(instrument: Instrument<H>, device: Arc<dyn Device>) -> Driver<H> {
        Driver {
            instrument,
            device,
            idle_interval: DEFAULT_IDLE_INTERVAL,
        }
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Driver<H> {
        self.idle_interval = idle_interval;
        self
    }

    /// Runs until shutdown is signalled or the device stops sending events.
    /// Returns the instrument.
    pub async fn run(self, shutdown: oneshot::Receiver<()>) -> Result<Instrument<H>, DriverError> {
        let span = span!(Level::INFO, "MIDI driver", device = self.device.name());
        self.run_loop(shutdown).instrument(span).await
    }

    async fn run_loop(
        mut self,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<Instrument<H>, DriverError> {
        let (midi_events_tx, mut midi_events_rx) = mpsc::channel::<Vec<u8>>(MIDI_EVENT_BUFFER);
        self.device
            .watch_events(midi_events_tx)
            .map_err(|e| DriverError::Watch(e.to_string()))?;

        let mut idle = time::interval(self.idle_interval);
        idle.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("MIDI driver started.");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("MIDI driver shutting down.");
                    break;
                }
                raw_event = midi_events_rx.recv() => match raw_event {
                    Some(raw_event) => self.handle_raw_event(&raw_event),
                    None => {
                        info!("MIDI watcher closed.");
                        break;
                    }
                },
                _ = idle.tick() => self.idle(),
            }
        }

        self.device.stop_watch_events();
        Ok(self.instrument)
    }

    fn handle_raw_event(&mut self, raw_event: &[u8]) {
        let event = match LiveEvent::parse(raw_event) {
            Ok(event) => event,
            Err(e) => {
                error!(err = format!("{:?}", e), "Error parsing event.");
                return;
            }
        };

        if self.instrument.handle_midi(&event) == MidiDisposition::PassThrough {
            if let Err(e) = self.device.emit(&event) {
                error!(err = e.to_string(), "Unable to pass event through.");
            }
        }
    }

    fn idle(&mut self) {
        let refresh = self.instrument.idle();
        if let Some((parameter, value)) = refresh.parameter_value {
            debug!(
                parameter = parameter.label(),
                value = value.as_int(),
                "Parameter display refreshed."
            );
        }
        if let Some(enabled) = refresh.round_robin {
            info!(enabled, "Round robin display refreshed.");
        }
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, path::Path, time::Duration};

    use midly::num::u4;
    use tokio::sync::oneshot;

    use super::Driver;
    use crate::{config, host::MidiHost, midi, routing::Parameter};

    async fn eventually<F: Fn() -> bool>(condition: F, message: &str) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("{}", message);
    }

    #[tokio::test]
    async fn remaps_and_passes_through() -> Result<(), Box<dyn Error>> {
        let config = config::Instrument::deserialize(Path::new("assets/instrument.yaml"))?;
        let device = midi::get_device("mock-driver")?;
        let mock = device.to_mock()?;
        let host = MidiHost::new(device.clone(), u4::from(0), config.sample_maps().to_vec());

        let mut instrument = config.build(host)?;
        instrument.select_patch("Alto Flute")?;
        instrument.assign_controller_to_parameter(Parameter::Vibrato, 30)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let driver = Driver::new(instrument, device).with_idle_interval(Duration::from_millis(5));
        let handle = tokio::spawn(driver.run(shutdown_rx));

        // Wait for the watcher to be registered.
        eventually(|| mock.mock_event(&[0xB0, 30, 127]), "driver never watched events").await;
        // Not MIDI, dropped.
        assert!(mock.mock_event(&[1, 2, 3]));
        assert!(mock.mock_event(&[0xB0, 7, 100]));
        assert!(mock.mock_event(&[0xB0, 14, 127]));

        eventually(|| mock.emitted_events().len() == 3, "events never emitted").await;
        assert_eq!(
            vec![vec![0xB0, 20, 127], vec![0xB0, 7, 100], vec![0xB0, 14, 127]],
            mock.emitted_events()
        );

        shutdown_tx.send(()).map_err(|_| "driver already stopped")?;
        let instrument = handle.await??;
        assert!(instrument.round_robin_enabled());
        assert_eq!(Some("Alto Flute"), instrument.current_patch());
        Ok(())
    }
}
