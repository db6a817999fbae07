//! End-to-end scenarios driving two full `NodeController`s connected by
//! `LoopbackRadio` pairs. Out-of-order delivery (scenario S3) is exercised
//! directly against `ReceiverState` in `src/link/receiver.rs`, since a plain
//! FIFO loopback channel cannot reorder frames in flight; everything else
//! here runs the real sender/LBT/receiver/reassembler pipeline.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use lora_link::config::Profile;
use lora_link::radio::{ChannelState, Radio};
use lora_link::{Event, NodeConfig, NodeController};

mod sim {
    pub use lora_link::radio::sim::LoopbackRadio;
}

const SETTLE: Duration = Duration::from_millis(300);

fn short_range_pair(window_size: u16) -> (NodeConfig, NodeConfig) {
    let a = NodeConfig::new(1, 2, 866_000_000, 868_000_000, window_size, Profile::ShortRange).unwrap();
    let b = NodeConfig::new(2, 1, 868_000_000, 866_000_000, window_size, Profile::ShortRange).unwrap();
    (a, b)
}

/// Wraps a radio and can drop or corrupt the next send matching a predicate
/// exactly once, to model a lost ACK or a corrupted frame in flight.
struct FlakyRadio<R> {
    inner: R,
    drop_next_matching: Mutex<Option<Box<dyn FnMut(&[u8]) -> bool + Send>>>,
    corrupt_next_matching: Mutex<Option<Box<dyn FnMut(&[u8]) -> bool + Send>>>,
}

impl<R: Radio> FlakyRadio<R> {
    fn new(inner: R) -> Self {
        FlakyRadio {
            inner,
            drop_next_matching: Mutex::new(None),
            corrupt_next_matching: Mutex::new(None),
        }
    }

    fn drop_next_ack_for_seq(&self, seq: u8) {
        *self.drop_next_matching.lock().unwrap() = Some(Box::new(move |bytes| {
            bytes.len() >= 4 && bytes[3] == 0x01 && bytes[2] == seq
        }));
    }

    fn corrupt_next_data_for_seq(&self, seq: u8) {
        *self.corrupt_next_matching.lock().unwrap() = Some(Box::new(move |bytes| {
            bytes.len() >= 4 && bytes[3] != 0x01 && bytes[2] == seq
        }));
    }
}

impl<R: Radio> Radio for FlakyRadio<R> {
    fn send(&self, bytes: &[u8]) {
        {
            let mut guard = self.drop_next_matching.lock().unwrap();
            if let Some(pred) = guard.as_mut() {
                if pred(bytes) {
                    *guard = None;
                    return;
                }
            }
        }

        let mut guard = self.corrupt_next_matching.lock().unwrap();
        if let Some(pred) = guard.as_mut() {
            if pred(bytes) {
                *guard = None;
                let mut corrupted = bytes.to_vec();
                let flip_at = corrupted.len() - 3;
                corrupted[flip_at] ^= 0xFF;
                self.inner.send(&corrupted);
                return;
            }
        }
        drop(guard);

        self.inner.send(bytes);
    }

    fn recv(&self, timeout: Duration) -> Vec<u8> {
        self.inner.recv(timeout)
    }

    fn scan_channel(&self) -> ChannelState {
        self.inner.scan_channel()
    }
}

/// S1 — lossless single-chunk message.
#[test]
fn s1_lossless_single_chunk_message() {
    let (cfg_a, cfg_b) = short_range_pair(4);

    let (radio_a_tx, radio_b_rx) = sim::LoopbackRadio::pair();
    let (radio_b_tx, radio_a_rx) = sim::LoopbackRadio::pair();

    let node_a = NodeController::new(cfg_a, Arc::new(radio_a_tx), Arc::new(radio_a_rx), std::env::temp_dir());
    let node_b = NodeController::new(cfg_b, Arc::new(radio_b_tx), Arc::new(radio_b_rx), std::env::temp_dir());

    node_a.enqueue_message("hi");
    thread::sleep(SETTLE);

    assert!(node_b.events().contains(&Event::MessageReceived { text: "hi".into() }));
    assert!(node_a.is_idle());

    node_a.shutdown();
    node_b.shutdown();
}

/// S2 — two-chunk message with the ACK for the first chunk dropped once;
/// the sender must retransmit and the message must still arrive exactly
/// once, undamaged.
#[test]
fn s2_dropped_ack_triggers_retransmit_without_duplication() {
    let (mut cfg_a, cfg_b) = short_range_pair(4);
    cfg_a.msg_chunk_max = 2; // forces "abcd" into two chunks: MSG_CHUNK "ab", MSG_END "cd"

    let (radio_a_tx, radio_b_rx) = sim::LoopbackRadio::pair();
    let (radio_b_tx, radio_a_rx) = sim::LoopbackRadio::pair();
    let radio_b_tx = FlakyRadio::new(radio_b_tx);
    radio_b_tx.drop_next_ack_for_seq(0);

    let node_a = NodeController::new(cfg_a, Arc::new(radio_a_tx), Arc::new(radio_a_rx), std::env::temp_dir());
    let node_b = NodeController::new(cfg_b, Arc::new(radio_b_tx), Arc::new(radio_b_rx), std::env::temp_dir());

    node_a.enqueue_message("abcd");
    thread::sleep(Duration::from_millis(2000));

    let received: Vec<_> = node_b
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::MessageReceived { .. }))
        .collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], Event::MessageReceived { text: "abcd".into() });
    assert!(node_a.is_idle());

    node_a.shutdown();
    node_b.shutdown();
}

/// S4 — a corrupted data frame is rejected by CRC and the sender's
/// retransmission delivers the message once the timeout elapses.
#[test]
fn s4_corrupted_frame_is_recovered_by_retransmit() {
    let (cfg_a, cfg_b) = short_range_pair(4);

    let (radio_a_tx, radio_b_rx) = sim::LoopbackRadio::pair();
    let (radio_b_tx, radio_a_rx) = sim::LoopbackRadio::pair();
    let radio_a_tx = FlakyRadio::new(radio_a_tx);
    radio_a_tx.corrupt_next_data_for_seq(0);

    let node_a = NodeController::new(cfg_a, Arc::new(radio_a_tx), Arc::new(radio_a_rx), std::env::temp_dir());
    let node_b = NodeController::new(cfg_b, Arc::new(radio_b_tx), Arc::new(radio_b_rx), std::env::temp_dir());

    node_a.enqueue_message("ping");
    thread::sleep(Duration::from_millis(2500));

    assert!(node_b.events().contains(&Event::MessageReceived { text: "ping".into() }));

    node_a.shutdown();
    node_b.shutdown();
}

/// S5 — file transfer of 500 bytes with a 180-byte chunk limit.
#[test]
fn s5_file_transfer_round_trips() {
    let (cfg_a, cfg_b) = short_range_pair(4);

    let (radio_a_tx, radio_b_rx) = sim::LoopbackRadio::pair();
    let (radio_b_tx, radio_a_rx) = sim::LoopbackRadio::pair();

    let save_dir = tempfile::tempdir().unwrap();

    let node_a = NodeController::new(cfg_a, Arc::new(radio_a_tx), Arc::new(radio_a_rx), std::env::temp_dir());
    let node_b = NodeController::new(cfg_b, Arc::new(radio_b_tx), Arc::new(radio_b_rx), save_dir.path().to_path_buf());

    let payload: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();
    node_a.enqueue_file("x.bin", &payload);
    thread::sleep(Duration::from_millis(1500));

    let saved = std::fs::read(save_dir.path().join("x.bin")).unwrap();
    assert_eq!(saved, payload);
    assert!(node_b.events().contains(&Event::FileSaved { name: "x.bin".into() }));

    node_a.shutdown();
    node_b.shutdown();
}

/// S6 — sequence numbers allocated across the 256 wraparound boundary
/// still round-trip correctly. Both nodes start with their sender/receiver
/// cursors seeded at 254 so the 6 single-packet messages enqueued below
/// allocate seqs 254, 255, 0, 1, 2, 3 and actually cross the boundary,
/// rather than starting fresh at 0.
#[test]
fn s6_sequence_wraparound() {
    let (cfg_a, cfg_b) = short_range_pair(4);

    let (radio_a_tx, radio_b_rx) = sim::LoopbackRadio::pair();
    let (radio_b_tx, radio_a_rx) = sim::LoopbackRadio::pair();

    let node_a = NodeController::new_with_initial_seq(cfg_a, Arc::new(radio_a_tx), Arc::new(radio_a_rx), std::env::temp_dir(), 254);
    let node_b = NodeController::new_with_initial_seq(cfg_b, Arc::new(radio_b_tx), Arc::new(radio_b_rx), std::env::temp_dir(), 254);

    for i in 0..6 {
        node_a.enqueue_message(&format!("m{i}"));
    }
    thread::sleep(Duration::from_millis(1500));

    for i in 0..6 {
        assert!(node_b.events().contains(&Event::MessageReceived { text: format!("m{i}") }));
    }
    assert!(node_a.is_idle());

    node_a.shutdown();
    node_b.shutdown();
}
