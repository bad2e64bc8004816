//! The note-to-CC translation decision.
//!
//! One pure function on the event-ingestion path: given a raw channel
//! voice message and the current configuration, decide whether to pass it
//! through or synthesize a Control-Change in its place. Bounded time, no
//! allocation, no shared-state mutation.

use midigate_core::midi::{status, MidiPacket};

use crate::params::TransformConfig;

/// Control-Change value emitted while the gated note is held.
const GATE_ON_VALUE: u8 = 127;

/// Control-Change value emitted when the gated note is released.
const GATE_OFF_VALUE: u8 = 0;

/// Translate one incoming MIDI event into the packet to enqueue.
///
/// A note-on or note-off for the configured note on the configured channel
/// becomes a Control-Change carrying the configured controller number and
/// an on/off value; a note-on with velocity zero counts as a release, per
/// the running-status convention. Everything else passes through
/// unchanged. The packet's timestamp always equals the input's.
///
/// The synthesized status byte keeps the incoming event's channel nibble
/// (which the match guarantees equals `config.channel - 1`).
pub fn translate(
    status_byte: u8,
    channel: u8,
    data1: u8,
    data2: u8,
    sample_offset: u32,
    config: &TransformConfig,
) -> MidiPacket {
    let is_note = status_byte == status::NOTE_ON || status_byte == status::NOTE_OFF;

    if u16::from(channel) + 1 == u16::from(config.channel) && is_note && data1 == config.note {
        let value = if status_byte == status::NOTE_OFF || data2 == 0 {
            GATE_OFF_VALUE
        } else {
            GATE_ON_VALUE
        };

        MidiPacket::channel_voice(
            sample_offset,
            status::CONTROL_CHANGE | channel,
            config.controller,
            value,
        )
    } else {
        MidiPacket::channel_voice(sample_offset, status_byte | channel, data1, data2)
    }
}
