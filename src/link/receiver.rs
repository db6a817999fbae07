use std::collections::HashMap;

use super::packet::Packet;

/// In-order reassembly cursor plus the buffer of packets that arrived
/// ahead of `rx_expected`.
#[derive(Debug, Default)]
pub struct ReceiverState {
    pub rx_expected: u8,
    pub rx_buffer: HashMap<u8, Packet>,
}

impl ReceiverState {
    pub fn new() -> Self {
        ReceiverState { rx_expected: 0, rx_buffer: HashMap::new() }
    }

    /// Accepts one data packet and returns the packets now ready for
    /// delivery to the reassembler, in order. A packet can unblock any
    /// number of previously buffered packets, including itself.
    pub fn accept(&mut self, packet: Packet, window_size: u16) -> Vec<Packet> {
        let diff = packet.seq.wrapping_sub(self.rx_expected);
        let mut delivered = Vec::new();

        if diff == 0 {
            delivered.push(packet);
            self.rx_expected = self.rx_expected.wrapping_add(1);

            while let Some(next) = self.rx_buffer.remove(&self.rx_expected) {
                delivered.push(next);
                self.rx_expected = self.rx_expected.wrapping_add(1);
            }
        } else if (diff as u16) < window_size {
            self.rx_buffer.entry(packet.seq).or_insert(packet);
        }
        // diff >= window_size: behind the window or a stale duplicate; drop.

        delivered
    }
}
