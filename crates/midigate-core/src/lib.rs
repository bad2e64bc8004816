//! # midigate-core
//!
//! Real-time MIDI transport primitives for the midigate processor.
//!
//! This crate provides the allocation-free building blocks that move MIDI
//! events from an asynchronous delivery thread to a deadline-bound render
//! thread. It has no external dependencies.
//!
//! ## Types
//!
//! - [`MidiPacket`] - Fixed-layout timestamped MIDI message
//! - [`Fifo`] / [`Producer`] / [`Consumer`] - Wait-free SPSC queue
//! - [`PacketList`] - Byte-budgeted outgoing batch
//!
//! ## Real-time contract
//!
//! Everything on the producer and consumer paths runs in bounded time:
//! storage is preallocated at construction, a full queue drops instead of
//! blocking or growing, and an exhausted batch defers instead of
//! truncating.

pub mod fifo;
pub mod midi;
pub mod packet_list;

// Re-exports for convenience
pub use fifo::{Consumer, Fifo, Producer, ReadSlot, WriteSlot};
pub use midi::{status, MidiPacket, MAX_PACKET_DATA};
pub use packet_list::{PacketList, MAX_LIST_BYTES};
