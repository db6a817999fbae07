use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, trace};

use super::lbt;
use super::packet::Packet;
use super::state::LinkState;
use crate::config::NodeConfig;
use crate::log::{Event, EventLog};
use crate::radio::Radio;

/// Sliding-window ARQ state: the queue of unacknowledged packets plus the
/// bookkeeping needed to decide, on each tick, which of them are eligible
/// for (re)transmission.
#[derive(Debug, Default)]
pub struct SenderState {
    pub tx_queue: HashMap<u8, Packet>,
    pub acked: HashMap<u8, bool>,
    pub timestamps: HashMap<u8, Instant>,
    pub retry_counts: HashMap<u8, u32>,
    pub window_base: u8,
    pub next_seq: u8,
}

impl SenderState {
    pub fn new() -> Self {
        SenderState::default()
    }

    /// Appends freshly fragmented packets. Sequence numbers are assigned by
    /// the fragmenter before this call; this only registers the ACK
    /// bookkeeping. The timestamp map is left untouched: absence marks
    /// "never sent".
    pub fn enqueue(&mut self, packets: Vec<Packet>) {
        for packet in packets {
            self.acked.insert(packet.seq, false);
            self.next_seq = packet.seq.wrapping_add(1);
            self.tx_queue.insert(packet.seq, packet);
        }
    }

    pub fn on_ack(&mut self, seq: u8) {
        if self.acked.contains_key(&seq) {
            self.acked.insert(seq, true);
        }
        // ACKs for sequence numbers outside our window are tolerated and
        // otherwise ignored.
    }

    pub fn is_idle(&self) -> bool {
        self.tx_queue.is_empty()
    }
}

/// Runs one sender tick: scans the window for eligible packets, hands each
/// to the LBT gate, then advances the window base over any now-contiguous
/// run of acknowledged packets. The state lock is held only for the window
/// scan and the post-transmit bookkeeping, never across the LBT sleeps or
/// the radio `send` call itself.
pub fn tick(state: &Mutex<LinkState>, tx_radio: &dyn Radio, tx_lock: &Mutex<()>, cfg: &NodeConfig, log: &EventLog) {
    let eligible = {
        let guard = state.lock().unwrap();
        let sender = &guard.sender;
        let mut out = Vec::new();

        for i in 0..cfg.window_size {
            let seq = sender.window_base.wrapping_add(i as u8);

            let Some(packet) = sender.tx_queue.get(&seq) else { continue };
            if sender.acked.get(&seq).copied().unwrap_or(false) {
                continue;
            }

            let never_sent = !sender.timestamps.contains_key(&seq);
            let timed_out = sender
                .timestamps
                .get(&seq)
                .is_some_and(|t| t.elapsed().as_millis() as u64 > cfg.timeout_ms);

            if never_sent || timed_out {
                if let Ok(bytes) = packet.encode(cfg.payload_max) {
                    out.push((seq, bytes));
                }
            }
        }

        out
    };

    for (seq, bytes) in eligible {
        trace!(seq, "attempting LBT transmit");
        if lbt::transmit_with_lbt(tx_radio, &bytes, tx_lock, cfg) {
            let mut guard = state.lock().unwrap();
            guard.sender.timestamps.insert(seq, Instant::now());

            let count = guard.sender.retry_counts.entry(seq).or_insert(0);
            *count += 1;
            if *count == cfg.stall_threshold {
                debug!(seq, retries = *count, "packet stalled past threshold");
                log.push(Event::Stalled { seq });
            }
        }
    }

    let mut guard = state.lock().unwrap();
    loop {
        let sender = &mut guard.sender;
        let base = sender.window_base;
        if sender.acked.get(&base).copied().unwrap_or(false) {
            sender.tx_queue.remove(&base);
            sender.acked.remove(&base);
            sender.timestamps.remove(&base);
            sender.retry_counts.remove(&base);
            sender.window_base = base.wrapping_add(1);
        } else {
            break;
        }
    }
}
