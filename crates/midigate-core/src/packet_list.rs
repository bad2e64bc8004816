//! Outgoing MIDI packet batch with a wire-format byte budget.
//!
//! [`PacketList`] collects the packets drained from the FIFO during one
//! render cycle, in FIFO order, for a single hand-off to the output
//! callback. Storage is allocated once at construction and reused with an
//! O(1) [`clear`](PacketList::clear) every cycle.
//!
//! The list models a packed wire format with a hard size ceiling: a fixed
//! list header plus, per packet, a header and the payload rounded up to
//! 4-byte alignment. [`try_push`](PacketList::try_push) refuses a packet
//! that would exceed the budget — the caller defers it to the next cycle
//! rather than truncating it.

use crate::midi::MidiPacket;

/// Default byte budget for one batch.
pub const MAX_LIST_BYTES: usize = 2048;

/// Packed size of the list header (packet count word).
const LIST_HEADER_BYTES: usize = 4;

/// Packed size of a per-packet header (timestamp + length).
const PACKET_HEADER_BYTES: usize = 10;

/// Packed wire size of one packet: header plus payload, 4-byte aligned.
#[inline]
fn packed_size(data_len: usize) -> usize {
    (PACKET_HEADER_BYTES + data_len + 3) & !3
}

/// A reusable, byte-budgeted batch of MIDI packets.
#[derive(Debug)]
pub struct PacketList {
    packets: Box<[MidiPacket]>,
    len: usize,
    bytes_used: usize,
    byte_limit: usize,
    /// Set to true when a push fails due to the budget or slot exhaustion.
    overflowed: bool,
}

impl PacketList {
    /// Create a list with the default [`MAX_LIST_BYTES`] budget.
    pub fn new() -> Self {
        Self::with_byte_limit(MAX_LIST_BYTES)
    }

    /// Create a list with a specific byte budget.
    ///
    /// Preallocates enough slots for the worst case (all-empty payloads)
    /// so a push can only fail on the byte budget, never on slot count.
    pub fn with_byte_limit(byte_limit: usize) -> Self {
        let max_packets = byte_limit
            .saturating_sub(LIST_HEADER_BYTES)
            .checked_div(packed_size(0))
            .unwrap_or(0)
            .max(1);

        Self {
            packets: vec![MidiPacket::default(); max_packets].into_boxed_slice(),
            len: 0,
            bytes_used: LIST_HEADER_BYTES,
            byte_limit,
            overflowed: false,
        }
    }

    /// Clear the list for reuse. O(1), no deallocation.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
        self.bytes_used = LIST_HEADER_BYTES;
        self.overflowed = false;
    }

    /// Append a packet to the batch.
    ///
    /// Returns `false` (and sets the overflow flag) if the packet's packed
    /// size would exceed the byte budget or all slots are in use. The list
    /// is unchanged on failure.
    pub fn try_push(&mut self, packet: &MidiPacket) -> bool {
        let packed = packed_size(packet.len());
        if self.len == self.packets.len() || self.bytes_used + packed > self.byte_limit {
            self.overflowed = true;
            return false;
        }

        self.packets[self.len] = *packet;
        self.len += 1;
        self.bytes_used += packed;
        true
    }

    /// Number of packets in the batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the batch holds no packets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if any push failed since the last clear.
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Packed wire size of the batch so far, including the list header.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// The byte budget this list was built with.
    #[inline]
    pub fn byte_limit(&self) -> usize {
        self.byte_limit
    }

    /// Iterate over the packets in FIFO order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &MidiPacket> {
        self.packets[..self.len].iter()
    }

    /// The packets as a slice, in FIFO order.
    #[inline]
    pub fn as_slice(&self) -> &[MidiPacket] {
        &self.packets[..self.len]
    }
}

impl Default for PacketList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_byte_packet(sample_offset: u32) -> MidiPacket {
        MidiPacket::channel_voice(sample_offset, 0x90, 60, 100)
    }

    #[test]
    fn test_new_list_is_empty() {
        let list = PacketList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(!list.has_overflowed());
        assert_eq!(list.bytes_used(), 4);
    }

    #[test]
    fn test_push_preserves_order() {
        let mut list = PacketList::new();
        for offset in 0..5 {
            assert!(list.try_push(&three_byte_packet(offset)));
        }

        assert_eq!(list.len(), 5);
        for (index, packet) in list.iter().enumerate() {
            assert_eq!(packet.sample_offset, index as u32);
        }
    }

    #[test]
    fn test_byte_budget_refusal() {
        // Header 4 bytes; each 3-byte message packs to 16 bytes, so a
        // 64-byte list takes exactly three packets.
        let mut list = PacketList::with_byte_limit(64);

        assert!(list.try_push(&three_byte_packet(0)));
        assert!(list.try_push(&three_byte_packet(1)));
        assert!(list.try_push(&three_byte_packet(2)));
        assert!(!list.has_overflowed());

        assert!(!list.try_push(&three_byte_packet(3)));
        assert!(list.has_overflowed());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_refused_packet_leaves_list_unchanged() {
        let mut list = PacketList::with_byte_limit(32);
        assert!(list.try_push(&three_byte_packet(0)));
        let bytes_before = list.bytes_used();

        let big = MidiPacket::from_bytes(1, &[0u8; 200]).unwrap();
        assert!(!list.try_push(&big));
        assert_eq!(list.len(), 1);
        assert_eq!(list.bytes_used(), bytes_before);
    }

    #[test]
    fn test_clear_resets_budget_and_flag() {
        let mut list = PacketList::with_byte_limit(32);
        assert!(list.try_push(&three_byte_packet(0)));
        assert!(!list.try_push(&three_byte_packet(1)));
        assert!(list.has_overflowed());

        list.clear();
        assert!(list.is_empty());
        assert!(!list.has_overflowed());
        assert_eq!(list.bytes_used(), 4);
        assert!(list.try_push(&three_byte_packet(2)));
    }
}
