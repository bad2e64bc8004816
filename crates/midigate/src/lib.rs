//! # midigate
//!
//! A real-time MIDI note-to-CC gate: one configured note on one configured
//! channel is turned into a Control-Change on/off signal (value 127 while
//! held, 0 on release); every other event passes through unchanged.
//!
//! Events arrive on an asynchronous ingestion thread and cross to the
//! periodic render thread through the wait-free SPSC queue in
//! [`midigate_core`]; once per render cycle the pending events are packed
//! into a byte-budgeted batch and handed to an optional output callback.
//! Neither side blocks, allocates, or takes a lock.
//!
//! ## Structure
//!
//! - [`MidiGate`] - The assembled processor; [`MidiGate::split`] yields the
//!   per-thread halves
//! - [`EventInput`] - Ingestion half: translate + enqueue
//! - [`RenderStage`] - Render half: drain + forward
//! - [`ControlHandle`] - Control plane: parameters, lifecycle, metrics
//! - [`translate`](translate::translate) - The pure note-to-CC decision
//!
//! ## Example
//!
//! ```
//! use midigate::prelude::*;
//!
//! let mut gate = MidiGate::new();
//! gate.initialize();
//! gate.set_output_callback(|time_stamp, list| {
//!     println!("cycle {time_stamp}: {} packets", list.len());
//! });
//!
//! // Ingestion path (its own thread in a real deployment):
//! gate.handle_midi_event(status::NOTE_ON, 0, 21, 100, 0).unwrap();
//!
//! // Render path, once per cycle:
//! gate.render(0);
//! ```

pub mod error;
pub mod params;
pub mod processor;
pub mod translate;

// Re-exports for convenience
pub use error::{GateError, GateResult};
pub use params::{
    GateParams, Parameter, ParameterId, ParameterInfo, TransformConfig, PARAMETER_INFOS,
};
pub use processor::{
    ControlHandle, EventInput, EventOutcome, MidiGate, MidiOutputCallback, RenderStage,
    DEFAULT_QUEUE_CAPACITY,
};

pub use midigate_core::midi::{status, MidiPacket, MAX_PACKET_DATA};
pub use midigate_core::packet_list::{PacketList, MAX_LIST_BYTES};

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::error::{GateError, GateResult};
    pub use crate::params::{Parameter, TransformConfig};
    pub use crate::processor::{
        ControlHandle, EventInput, EventOutcome, MidiGate, RenderStage,
    };
    pub use midigate_core::midi::{status, MidiPacket};
    pub use midigate_core::packet_list::PacketList;
}
