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
use std::{
    error::Error,
    fmt,
    sync::{Arc, Mutex},
};

use midly::live::LiveEvent;
use tokio::sync::mpsc::Sender;
use tracing::{debug, span, Level};

/// A mock device. Records what is emitted and injects events on request.
#[derive(Clone)]
pub struct Device {
    name: String,
    sender: Arc<Mutex<Option<Sender<Vec<u8>>>>>,
    emitted: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            sender: Arc::new(Mutex::new(None)),
            emitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    /// Sends the mock event through to the watcher. Returns false if nothing
    /// is watching.
    pub fn mock_event(&self, event: &[u8]) -> bool {
        let sender = self.sender.lock().expect("unable to get sender lock");
        match sender.as_ref() {
            Some(sender) => sender.try_send(event.to_vec()).is_ok(),
            None => false,
        }
    }

    #[cfg(test)]
    /// Gets every event emitted so far.
    pub fn emitted_events(&self) -> Vec<Vec<u8>> {
        self.emitted
            .lock()
            .expect("unable to get emitted lock")
            .clone()
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    /// Watches MIDI input for events and sends them to the given sender.
    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let mut watcher = self.sender.lock().map_err(|_| "unable to get sender lock")?;
        if watcher.is_some() {
            return Err("Already watching events.".into());
        }
        *watcher = Some(sender);
        Ok(())
    }

    /// Stops watching events.
    fn stop_watch_events(&self) {
        if let Ok(mut watcher) = self.sender.lock() {
            watcher.take();
        }
    }

    /// Emits an event.
    fn emit(&self, event: &LiveEvent<'_>) -> Result<(), Box<dyn Error>> {
        let span = span!(Level::DEBUG, "emit (mock)");
        let _enter = span.enter();

        let mut buf: Vec<u8> = Vec::with_capacity(8);
        event.write(&mut buf)?;
        debug!(device = self.name, event = ?event, "Emitting event.");

        self.emitted
            .lock()
            .map_err(|_| "unable to get emitted lock")?
            .push(buf);
        Ok(())
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<Device>, Box<dyn Error>> {
        Ok(Arc::new(self.clone()))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::{
        live::LiveEvent,
        num::{u4, u7},
        MidiMessage,
    };
    use tokio::sync::mpsc;

    use crate::midi::Device as _;

    #[test]
    fn records_emitted_events() -> Result<(), Box<dyn Error>> {
        let device = super::Device::get("mock-device");
        device.emit(&LiveEvent::Midi {
            channel: u4::from(2),
            message: MidiMessage::Controller {
                controller: u7::from(20),
                value: u7::from(127),
            },
        })?;

        assert_eq!(vec![vec![0xB2, 20, 127]], device.emitted_events());
        Ok(())
    }

    #[test]
    fn injects_events_while_watching() -> Result<(), Box<dyn Error>> {
        let device = super::Device::get("mock-device");
        assert!(!device.mock_event(&[0xB0, 1, 2]));

        let (sender, mut receiver) = mpsc::channel(4);
        device.watch_events(sender.clone())?;
        assert!(device.watch_events(sender).is_err());

        assert!(device.mock_event(&[0xB0, 1, 2]));
        assert_eq!(Some(vec![0xB0, 1, 2]), receiver.try_recv().ok());

        device.stop_watch_events();
        assert!(!device.mock_event(&[0xB0, 1, 2]));
        Ok(())
    }
}
