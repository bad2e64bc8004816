//! The note-to-CC gate processor.
//!
//! The processor is an explicit ownership split across the three execution
//! contexts that touch it:
//!
//! - **[`EventInput`]** (event-ingestion thread): translates each incoming
//!   event and enqueues it. Never blocks; a full queue drops the event and
//!   bumps a counter.
//! - **[`RenderStage`]** (render thread): once per render cycle, drains the
//!   queue into a reused [`PacketList`] and hands the batch to the output
//!   callback. The callback is owned by this half, so registration needs no
//!   synchronization.
//! - **[`ControlHandle`]** (control plane, cloneable): parameter accessors,
//!   the initialization gate, and the drop counter.
//!
//! [`MidiGate`] bundles the three for single-threaded hosts and tests;
//! [`MidiGate::split`] hands the halves to their threads. The FIFO between
//! input and render is the only shared mutable object, and it is only
//! reachable through its reserve/commit/read/release contract.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use midigate_core::fifo::{Consumer, Fifo, Producer};
use midigate_core::midi::MidiPacket;
use midigate_core::packet_list::PacketList;

use crate::error::{GateError, GateResult};
use crate::params::{GateParams, Parameter, ParameterId, ParameterInfo};
use crate::translate::translate;

/// Queue depth used by [`MidiGate::new`].
///
/// Generous relative to the expected peak event burst per render cycle;
/// sustained input beyond it causes bounded event loss, never corruption.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Output callback: receives the render-cycle timestamp and the non-empty
/// batch, synchronously on the render thread, at most once per cycle.
pub type MidiOutputCallback = Box<dyn FnMut(u64, &PacketList) + Send>;

/// What became of an event accepted on the ingestion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Translated and enqueued for the next render cycle.
    Queued,
    /// Queue was full; the event was discarded and counted.
    Dropped,
}

/// State shared by all three halves.
#[derive(Debug)]
struct ControlState {
    params: GateParams,
    initialized: AtomicBool,
    dropped_events: AtomicU64,
}

// =============================================================================
// Control plane
// =============================================================================

/// Cloneable control-plane handle: parameters, lifecycle, metrics.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    state: Arc<ControlState>,
}

impl ControlHandle {
    /// Mark the processor ready to accept events.
    ///
    /// Events delivered before this are rejected with
    /// [`GateError::Uninitialized`].
    pub fn initialize(&self) {
        self.state.initialized.store(true, Ordering::Release);
        log::debug!("midigate initialized");
    }

    /// Returns true once [`initialize`](Self::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized.load(Ordering::Acquire)
    }

    /// Set a parameter by id.
    ///
    /// Unknown ids and out-of-range values are rejected without mutating
    /// any state.
    pub fn set_parameter(&self, id: ParameterId, value: u8) -> GateResult<()> {
        let parameter = Parameter::from_id(id).ok_or(GateError::InvalidParameter(id))?;
        self.state.params.set(parameter, value)
    }

    /// Current value of a parameter.
    pub fn parameter(&self, id: ParameterId) -> GateResult<u8> {
        let parameter = Parameter::from_id(id).ok_or(GateError::InvalidParameter(id))?;
        Ok(self.state.params.get(parameter))
    }

    /// Metadata for a parameter, `None` for unknown ids.
    pub fn parameter_info(&self, id: ParameterId) -> Option<&'static ParameterInfo> {
        Parameter::from_id(id).map(Parameter::info)
    }

    /// Number of parameters.
    pub fn parameter_count(&self) -> usize {
        Parameter::COUNT
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.state.dropped_events.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Event ingestion
// =============================================================================

/// The ingestion half: owns the queue's producer side.
pub struct EventInput {
    producer: Producer<MidiPacket>,
    control: Arc<ControlState>,
}

impl EventInput {
    /// Translate one incoming event and enqueue the result.
    ///
    /// Returns [`EventOutcome::Dropped`] when the queue is full — an
    /// expected-under-load, non-fatal condition. Bounded time, no
    /// allocation, no blocking; safe to call concurrently with the render
    /// thread's drain.
    pub fn handle_midi_event(
        &mut self,
        status: u8,
        channel: u8,
        data1: u8,
        data2: u8,
        sample_offset: u32,
    ) -> GateResult<EventOutcome> {
        if !self.control.initialized.load(Ordering::Acquire) {
            return Err(GateError::Uninitialized);
        }

        let config = self.control.params.snapshot();
        let packet = translate(status, channel, data1, data2, sample_offset, &config);

        match self.producer.try_write() {
            Some(mut slot) => {
                *slot = packet;
                slot.commit();
                Ok(EventOutcome::Queued)
            }
            None => {
                self.control.dropped_events.fetch_add(1, Ordering::Relaxed);
                Ok(EventOutcome::Dropped)
            }
        }
    }
}

// =============================================================================
// Render stage
// =============================================================================

/// The render half: owns the queue's consumer side, the reused batch, and
/// the output callback.
pub struct RenderStage {
    consumer: Consumer<MidiPacket>,
    list: PacketList,
    callback: Option<MidiOutputCallback>,
}

impl RenderStage {
    /// Register the output callback. At most one; the last registration
    /// wins.
    pub fn set_output_callback(&mut self, callback: impl FnMut(u64, &PacketList) + Send + 'static) {
        self.callback = Some(Box::new(callback));
        log::debug!("MIDI output callback registered");
    }

    /// Remove the output callback.
    pub fn clear_output_callback(&mut self) {
        self.callback = None;
        log::debug!("MIDI output callback cleared");
    }

    /// Returns true if an output callback is registered.
    pub fn has_output_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Drain the queue and forward the batch. Call once per render cycle,
    /// on the render thread.
    ///
    /// Pulls queued packets in FIFO order until the queue is empty or the
    /// batch's byte budget is reached; a packet that does not fit stays
    /// queued for the next cycle. If the batch is non-empty and a callback
    /// is registered, the callback runs synchronously, exactly once,
    /// before this returns. No blocking, no allocation; cost is linear in
    /// the number of queued packets.
    pub fn render(&mut self, time_stamp: u64) -> &PacketList {
        self.list.clear();
        drain_into(&mut self.consumer, &mut self.list);

        if !self.list.is_empty() {
            if let Some(callback) = self.callback.as_mut() {
                callback(time_stamp, &self.list);
            }
        }

        &self.list
    }
}

/// Move queued packets into `list` until the queue is empty or the batch
/// budget refuses one; the refused packet is left unreleased at the head
/// of the queue for the next cycle.
fn drain_into(consumer: &mut Consumer<MidiPacket>, list: &mut PacketList) {
    while let Some(slot) = consumer.try_read() {
        if !list.try_push(&slot) {
            break;
        }
        slot.release();
    }
}

// =============================================================================
// Facade
// =============================================================================

/// The assembled processor.
///
/// Holds all three halves; use the delegating methods directly from a
/// single thread, or [`split`](Self::split) to deploy each half on its own
/// thread.
pub struct MidiGate {
    control: ControlHandle,
    input: EventInput,
    render: RenderStage,
}

impl MidiGate {
    /// Create a processor with the default queue depth.
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a processor with a specific queue depth (rounded up to a
    /// power of two).
    pub fn with_queue_capacity(capacity: usize) -> Self {
        let (producer, consumer) = Fifo::with_capacity(capacity);
        let state = Arc::new(ControlState {
            params: GateParams::new(),
            initialized: AtomicBool::new(false),
            dropped_events: AtomicU64::new(0),
        });

        Self {
            control: ControlHandle {
                state: Arc::clone(&state),
            },
            input: EventInput {
                producer,
                control: state,
            },
            render: RenderStage {
                consumer,
                list: PacketList::new(),
                callback: None,
            },
        }
    }

    /// Split into the three per-thread halves.
    pub fn split(self) -> (ControlHandle, EventInput, RenderStage) {
        (self.control, self.input, self.render)
    }

    /// The control-plane handle (cloneable).
    pub fn control(&self) -> &ControlHandle {
        &self.control
    }

    /// See [`ControlHandle::initialize`].
    pub fn initialize(&self) {
        self.control.initialize();
    }

    /// See [`ControlHandle::set_parameter`].
    pub fn set_parameter(&self, id: ParameterId, value: u8) -> GateResult<()> {
        self.control.set_parameter(id, value)
    }

    /// See [`ControlHandle::parameter`].
    pub fn parameter(&self, id: ParameterId) -> GateResult<u8> {
        self.control.parameter(id)
    }

    /// See [`ControlHandle::dropped_events`].
    pub fn dropped_events(&self) -> u64 {
        self.control.dropped_events()
    }

    /// See [`EventInput::handle_midi_event`].
    pub fn handle_midi_event(
        &mut self,
        status: u8,
        channel: u8,
        data1: u8,
        data2: u8,
        sample_offset: u32,
    ) -> GateResult<EventOutcome> {
        self.input
            .handle_midi_event(status, channel, data1, data2, sample_offset)
    }

    /// See [`RenderStage::set_output_callback`].
    pub fn set_output_callback(&mut self, callback: impl FnMut(u64, &PacketList) + Send + 'static) {
        self.render.set_output_callback(callback);
    }

    /// See [`RenderStage::clear_output_callback`].
    pub fn clear_output_callback(&mut self) {
        self.render.clear_output_callback();
    }

    /// See [`RenderStage::render`].
    pub fn render(&mut self, time_stamp: u64) -> &PacketList {
        self.render.render(time_stamp)
    }
}

impl Default for MidiGate {
    fn default() -> Self {
        Self::new()
    }
}
