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
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use librewinds::{config, driver::Driver, host::MidiHost, host::RecordingHost, midi};
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author,
    version = crate_version!(),
    about = "Patch switching and controller routing for a sampled wind instrument."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the patches in the given instrument config.
    Patches {
        /// The path to the instrument config.
        config_path: String,
    },
    /// Validates the instrument config and loads every patch against a dry-run host.
    Verify {
        /// The path to the instrument config.
        config_path: String,
    },
    /// Lists the available MIDI input/output devices.
    MidiDevices {},
    /// Start will run the instrument against its MIDI device.
    Start {
        /// The path to the instrument config.
        config_path: String,
        /// The patch to load. Defaults to the first patch.
        #[arg(short, long)]
        patch: Option<String>,
        /// Overrides the MIDI device from the config.
        #[arg(short, long)]
        midi_device: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Patches { config_path } => {
            let config = config::Instrument::deserialize(&PathBuf::from(&config_path))?;
            let manifest = config.manifest()?;

            if manifest.is_empty() {
                println!("No patches found in {}.", config_path);
                return Ok(());
            }

            println!("Patches (count: {}):", manifest.len());
            for patch in manifest.patches() {
                println!(
                    "- {} (range {}, {} articulations)",
                    patch.name(),
                    patch.range(),
                    patch.articulations().len()
                );
            }
        }
        Commands::Verify { config_path } => {
            let config = config::Instrument::deserialize(&PathBuf::from(&config_path))?;
            let mut instrument = config.build(RecordingHost::new(config.sample_maps().to_vec()))?;

            let names: Vec<String> = instrument
                .manifest()
                .names()
                .into_iter()
                .map(String::from)
                .collect();
            let mut problems = 0;
            for name in names.iter() {
                let report = instrument.select_patch(name)?;
                if report.is_clean() {
                    println!("- {}: ok", name);
                    continue;
                }
                println!("- {}:", name);
                for warning in report.warnings() {
                    if warning.is_problem() {
                        problems += 1;
                        println!("    {}", warning);
                    } else {
                        println!("    note: {}", warning);
                    }
                }
            }

            if problems > 0 {
                return Err(format!("{} problem(s) found in {}", problems, config_path).into());
            }
        }
        Commands::MidiDevices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Start {
            config_path,
            patch,
            midi_device,
        } => {
            let config = config::Instrument::deserialize(&PathBuf::from(&config_path))?;
            let device_name = match (midi_device, config.midi()) {
                (Some(device_name), _) => device_name,
                (None, Some(midi)) => midi.device().to_string(),
                (None, None) => return Err("no MIDI device configured".into()),
            };
            let channel = match config.midi() {
                Some(midi) => midi.channel()?,
                None => config::Midi::new(&device_name, None).channel()?,
            };

            let device = midi::get_device(&device_name)?;
            let host = MidiHost::new(device.clone(), channel, config.sample_maps().to_vec());
            let mut instrument = config.build(host)?;

            let report = match patch {
                Some(patch) => instrument.select_patch(&patch)?,
                None => instrument.select_default_patch()?,
            };
            info!(patch = report.patch(), "Instrument ready.");

            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Interrupted.");
                        let _ = shutdown_tx.send(());
                    }
                    Err(e) => {
                        error!(err = e.to_string(), "Unable to listen for interrupt.");
                        // Dropping the sender would stop the driver.
                        std::future::pending::<()>().await;
                    }
                }
            });

            Driver::new(instrument, device).run(shutdown_rx).await?;
        }
    }

    Ok(())
}
