//! MIDI input events
//!
//! [`MidiMessage`] is the event type the effect engine consumes. Raw bytes
//! from a driver are parsed with [`MidiMessage::from_bytes`]; anything that
//! does not parse is dropped rather than reported.

#[cfg(feature = "midi")]
mod input;

#[cfg(feature = "midi")]
pub use input::*;

use serde::{Deserialize, Serialize};

/// Largest 7-bit MIDI data value
pub const MAX_DATA_VALUE: u8 = 127;

/// MIDI message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiMessage {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: u8,
        program: u8,
    },
    PitchBend {
        channel: u8,
        value: u16,
    },
    Clock,
    Start,
    Stop,
    Continue,
}

/// Message type without its payload, used by event filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NoteOn,
    NoteOff,
    ControlChange,
    ProgramChange,
    PitchBend,
    Clock,
    Start,
    Stop,
    Continue,
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;

        // Real-time messages (single byte)
        match status {
            0xF8 => return Some(MidiMessage::Clock),
            0xFA => return Some(MidiMessage::Start),
            0xFC => return Some(MidiMessage::Stop),
            0xFB => return Some(MidiMessage::Continue),
            _ => {}
        }

        let message_type = status & 0xF0;
        let channel = status & 0x0F;
        let data1 = *bytes.get(1)?;

        match message_type {
            0x90 => {
                let velocity = *bytes.get(2)?;
                if velocity == 0 {
                    // Note On with velocity 0 is treated as Note Off
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: data1,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: data1,
                        velocity,
                    })
                }
            }
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: data1,
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: *bytes.get(2)?,
            }),
            0xC0 => Some(MidiMessage::ProgramChange {
                channel,
                program: data1,
            }),
            0xE0 => {
                let value = ((*bytes.get(2)? as u16) << 7) | (data1 as u16);
                Some(MidiMessage::PitchBend { channel, value })
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            MidiMessage::NoteOn { .. } => EventKind::NoteOn,
            MidiMessage::NoteOff { .. } => EventKind::NoteOff,
            MidiMessage::ControlChange { .. } => EventKind::ControlChange,
            MidiMessage::ProgramChange { .. } => EventKind::ProgramChange,
            MidiMessage::PitchBend { .. } => EventKind::PitchBend,
            MidiMessage::Clock => EventKind::Clock,
            MidiMessage::Start => EventKind::Start,
            MidiMessage::Stop => EventKind::Stop,
            MidiMessage::Continue => EventKind::Continue,
        }
    }

    /// MIDI channel (0-15), absent for system real-time messages
    pub fn channel(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// Controller number for control changes, note number for notes
    pub fn number(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => Some(*note),
            MidiMessage::ControlChange { controller, .. } => Some(*controller),
            _ => None,
        }
    }

    /// Unit-interval value carried by the message.
    ///
    /// Control changes map 0-127 onto [0, 1], note on is 1.0 and note off is
    /// 0.0. Every other message has no value.
    pub fn normalized(&self) -> Option<f64> {
        match self {
            MidiMessage::ControlChange { value, .. } => {
                Some(*value as f64 / MAX_DATA_VALUE as f64)
            }
            MidiMessage::NoteOn { .. } => Some(1.0),
            MidiMessage::NoteOff { .. } => Some(0.0),
            _ => None,
        }
    }
}

/// Non-blocking supplier of input events, polled once per tick
pub trait EventSource {
    /// Drain everything received since the previous poll, in arrival order.
    /// Returns an empty vector when idle.
    fn poll_pending(&mut self) -> Vec<MidiMessage>;
}

impl EventSource for crossbeam_channel::Receiver<MidiMessage> {
    fn poll_pending(&mut self) -> Vec<MidiMessage> {
        self.try_iter().collect()
    }
}
