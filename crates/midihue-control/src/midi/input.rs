//! MIDI input backed by the system MIDI driver

use super::{EventSource, MidiMessage};
use crate::{error::ControlError, Result};
use crossbeam_channel::{unbounded, Receiver};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use tracing::{info, trace};

const CLIENT_NAME: &str = "midihue";

/// Open MIDI input port that queues parsed messages for the tick loop.
///
/// The driver callback runs on its own thread; messages cross over a channel
/// and are drained by [`EventSource::poll_pending`].
pub struct MidiInputSource {
    port_name: String,
    receiver: Receiver<MidiMessage>,
    _connection: MidiInputConnection<()>,
}

impl MidiInputSource {
    /// Open the first input port whose name contains `port_name`, or the
    /// first available port when no name is given.
    pub fn open(port_name: Option<&str>) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        // Real-time clock messages are not ignored; filters decide what matters.
        midi_in.ignore(Ignore::Sysex);

        let port = find_input_port(&midi_in, port_name).ok_or_else(|| {
            ControlError::Midi(match port_name {
                Some(name) => format!("No MIDI input matching '{}'", name),
                None => "No MIDI inputs available".to_string(),
            })
        })?;
        let resolved_name = midi_in
            .port_name(&port)
            .map_err(|e| ControlError::Midi(e.to_string()))?;

        let (sender, receiver) = unbounded();
        let connection = midi_in
            .connect(
                &port,
                "midihue-input",
                move |_stamp, bytes, _| {
                    if let Some(message) = MidiMessage::from_bytes(bytes) {
                        trace!("MIDI in: {:?}", message);
                        // The receiver only disappears on shutdown.
                        let _ = sender.send(message);
                    }
                },
                (),
            )
            .map_err(|e| ControlError::Midi(e.to_string()))?;

        info!("Listening for MIDI on '{}'", resolved_name);

        Ok(Self {
            port_name: resolved_name,
            receiver,
            _connection: connection,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl EventSource for MidiInputSource {
    fn poll_pending(&mut self) -> Vec<MidiMessage> {
        self.receiver.try_iter().collect()
    }
}

fn find_input_port(midi_in: &MidiInput, port_name: Option<&str>) -> Option<MidiInputPort> {
    let ports = midi_in.ports();
    match port_name {
        Some(name) => ports.into_iter().find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n.contains(name))
                .unwrap_or(false)
        }),
        None => ports.into_iter().next(),
    }
}
