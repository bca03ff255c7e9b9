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
use std::{collections::HashMap, error::Error, fmt, mem, sync::Mutex};

use midir::{
    MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection, MidiOutputPort,
};
use midly::live::LiveEvent;
use tokio::sync::mpsc::Sender;
use tracing::{error, info, span, trace, warn, Level};

pub struct Device {
    name: String,
    input_port: Option<MidiInputPort>,
    output_port: Option<MidiOutputPort>,
    event_connection: Mutex<Option<MidiInputConnection<()>>>,
    output_connection: Mutex<Option<MidiOutputConnection>>,
}

impl Device {
    fn new(name: String) -> Device {
        Device {
            name,
            input_port: None,
            output_port: None,
            event_connection: Mutex::new(None),
            output_connection: Mutex::new(None),
        }
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let span = span!(Level::INFO, "wait for event (midir)");
        let _enter = span.enter();

        let mut event_connection = self
            .event_connection
            .lock()
            .map_err(|_| "unable to get event connection lock")?;
        if event_connection.is_some() {
            return Err("Already watching events.".into());
        }

        let input_port = match self.input_port.as_ref() {
            Some(input_port) => input_port,
            None => {
                warn!("No MIDI input device configured, cannot listen for events.");
                return Ok(());
            }
        };

        info!(device = self.name, "Watching MIDI events.");

        let input = MidiInput::new("librewinds input")?;
        *event_connection = Some(input.connect(
            input_port,
            "librewinds input watcher",
            move |_, raw_event, _| {
                trace!(event = ?raw_event, "Received MIDI event.");
                if let Err(e) = sender.blocking_send(Vec::from(raw_event)) {
                    error!(
                        err = format!("{:?}", e),
                        "Error sending MIDI event to receiver."
                    );
                }
            },
            (),
        )?);

        Ok(())
    }

    fn stop_watch_events(&self) {
        // Explicitly drop the connection.
        if let Ok(mut event_connection) = self.event_connection.lock() {
            mem::drop(event_connection.take());
        }
    }

    fn emit(&self, event: &LiveEvent<'_>) -> Result<(), Box<dyn Error>> {
        let output_port = match &self.output_port {
            Some(output_port) => output_port,
            None => {
                warn!("No MIDI output device configured, cannot emit event.");
                return Ok(());
            }
        };

        let mut output_connection = self
            .output_connection
            .lock()
            .map_err(|_| "unable to get output connection lock")?;
        if output_connection.is_none() {
            let output = MidiOutput::new("librewinds output")?;
            *output_connection = Some(output.connect(output_port, "librewinds output")?);
            info!(device = self.name, "Connected MIDI output.");
        }

        trace!(device = self.name, event = ?event, "Emitting event.");

        let mut buf: Vec<u8> = Vec::with_capacity(8);
        event.write(&mut buf)?;
        if let Some(connection) = output_connection.as_mut() {
            connection.send(&buf)?;
        }

        Ok(())
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<std::sync::Arc<super::mock::Device>, Box<dyn Error>> {
        Err("not a mock".into())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities: Vec<String> = Vec::new();
        if self.input_port.is_some() {
            capabilities.push(String::from("Input"));
        }
        if self.output_port.is_some() {
            capabilities.push(String::from("Output"));
        }

        write!(f, "{} ({})", self.name, capabilities.join("/"))
    }
}

/// Lists midir devices and produces the Device trait.
pub fn list() -> Result<Vec<Box<dyn super::Device>>, Box<dyn Error>> {
    Ok(list_midir_devices()?
        .into_iter()
        .map(|device| {
            let device: Box<dyn super::Device> = Box::new(device);
            device
        })
        .collect())
}

/// Lists midir devices, merging input and output ports that share a name.
fn list_midir_devices() -> Result<Vec<Device>, Box<dyn Error>> {
    let input = MidiInput::new("librewinds input listing")?;
    let output = MidiOutput::new("librewinds output listing")?;

    let mut devices: HashMap<String, Device> = HashMap::new();

    for port in input.ports() {
        let name = input.port_name(&port)?;
        devices
            .entry(name.clone())
            .or_insert_with(|| Device::new(name))
            .input_port
            .get_or_insert(port);
    }

    for port in output.ports() {
        let name = output.port_name(&port)?;
        devices
            .entry(name.clone())
            .or_insert_with(|| Device::new(name))
            .output_port
            .get_or_insert(port);
    }

    let mut sorted_devices = devices
        .into_iter()
        .map(|entry| entry.1)
        .collect::<Vec<Device>>();
    sorted_devices.sort_by_key(|device| device.name.clone());
    Ok(sorted_devices)
}

/// Gets the given midir device.
pub fn get(name: &str) -> Result<Device, Box<dyn Error>> {
    let mut matches = list_midir_devices()?
        .into_iter()
        .filter(|device| device.name.contains(name))
        .collect::<Vec<Device>>();

    if matches.is_empty() {
        return Err(format!("no device found with name {}", name).into());
    }
    if matches.len() > 1 {
        return Err(format!(
            "found too many devices that match ({}), use a less ambiguous device name",
            matches
                .iter()
                .map(|device| device.name.clone())
                .collect::<Vec<String>>()
                .join(", ")
        )
        .into());
    }

    Ok(matches.swap_remove(0))
}
