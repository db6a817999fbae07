use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::config::NodeConfig;
use crate::link::fragment::{fragment_file, fragment_message};
use crate::link::lbt;
use crate::link::packet::{Packet, PacketType};
use crate::link::sender;
use crate::link::state::LinkState;
use crate::log::{Event, EventLog};
use crate::radio::Radio;

const SENDER_TICK: Duration = Duration::from_millis(10);

/// Owns every piece of shared state for one LoRa node and drives the
/// sender and receiver tasks on their own threads. Application code only
/// ever touches this type: `enqueue_message`/`enqueue_file` to send,
/// `events()` to observe what happened.
pub struct NodeController {
    config: NodeConfig,
    link_state: Arc<Mutex<LinkState>>,
    log: Arc<EventLog>,
    running: Arc<AtomicBool>,
    sender_thread: Option<thread::JoinHandle<()>>,
    receiver_thread: Option<thread::JoinHandle<()>>,
}

impl NodeController {
    pub fn new(
        config: NodeConfig,
        tx_radio: Arc<dyn Radio>,
        rx_radio: Arc<dyn Radio>,
        save_dir: PathBuf,
    ) -> Self {
        Self::new_with_initial_seq(config, tx_radio, rx_radio, save_dir, 0)
    }

    /// Like `new`, but seeds the sender's and receiver's sequence cursors
    /// to `initial_seq` instead of 0. Exists for tests that need to drive
    /// the full send/receive pipeline across the 256-wraparound boundary
    /// without allocating 256 real packets first.
    pub fn new_with_initial_seq(
        config: NodeConfig,
        tx_radio: Arc<dyn Radio>,
        rx_radio: Arc<dyn Radio>,
        save_dir: PathBuf,
        initial_seq: u8,
    ) -> Self {
        let link_state = Arc::new(Mutex::new(LinkState::with_initial_seq(save_dir, initial_seq)));
        let log = Arc::new(EventLog::new());
        let running = Arc::new(AtomicBool::new(true));
        let tx_lock = Arc::new(Mutex::new(()));

        let sender_thread = {
            let state = link_state.clone();
            let tx_radio = tx_radio.clone();
            let tx_lock = tx_lock.clone();
            let config = config.clone();
            let log = log.clone();
            let running = running.clone();

            thread::spawn(move || {
                while running.load(Ordering::Acquire) {
                    sender::tick(&state, tx_radio.as_ref(), &tx_lock, &config, &log);
                    thread::sleep(SENDER_TICK);
                }
            })
        };

        let receiver_thread = {
            let link_state = link_state.clone();
            let config = config.clone();
            let log = log.clone();
            let running = running.clone();

            thread::spawn(move || {
                receiver_loop(running, rx_radio, tx_radio, tx_lock, link_state, config, log)
            })
        };

        NodeController {
            config,
            link_state,
            log,
            running,
            sender_thread: Some(sender_thread),
            receiver_thread: Some(receiver_thread),
        }
    }

    pub fn enqueue_message(&self, text: &str) {
        let mut guard = self.link_state.lock().unwrap();
        let mut next_seq = guard.sender.next_seq;
        let packets = fragment_message(text, self.config.my_addr, self.config.peer_addr, self.config.msg_chunk_max, &mut next_seq);
        guard.sender.enqueue(packets);
        drop(guard);

        self.log.push(Event::MessageSent { len: text.len() });
        debug!(len = text.len(), "message enqueued");
    }

    pub fn enqueue_file(&self, name: &str, bytes: &[u8]) {
        let mut guard = self.link_state.lock().unwrap();
        let mut next_seq = guard.sender.next_seq;
        let packets = fragment_file(name, bytes, self.config.my_addr, self.config.peer_addr, self.config.file_chunk_max, &mut next_seq);
        guard.sender.enqueue(packets);
        drop(guard);

        self.log.push(Event::FileQueued { name: name.to_string(), len: bytes.len() });
        debug!(name, len = bytes.len(), "file enqueued");
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.snapshot()
    }

    pub fn is_idle(&self) -> bool {
        self.link_state.lock().unwrap().sender.is_idle()
    }

    /// Stops both tasks and joins them. The radio's own `recv` timeout is
    /// what unblocks the receiver loop; there is no separate cancellation
    /// signal for an in-flight blocking call.
    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(handle) = self.sender_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.receiver_thread.take() {
            let _ = handle.join();
        }
    }
}

fn receiver_loop(
    running: Arc<AtomicBool>,
    rx_radio: Arc<dyn Radio>,
    tx_radio: Arc<dyn Radio>,
    tx_lock: Arc<Mutex<()>>,
    link_state: Arc<Mutex<LinkState>>,
    config: NodeConfig,
    log: Arc<EventLog>,
) {
    while running.load(Ordering::Acquire) {
        let bytes = rx_radio.recv(Duration::from_millis(config.recv_timeout_ms));
        if bytes.is_empty() {
            continue;
        }

        let Some(pkt) = Packet::decode(&bytes) else { continue };
        if !pkt.is_for(config.my_addr) {
            continue;
        }

        match pkt.pkt_type {
            PacketType::Ack => {
                link_state.lock().unwrap().sender.on_ack(pkt.seq);
            }
            _ => {
                let ack = Packet::ack(pkt.from_addr, config.my_addr, pkt.seq);
                if let Ok(ack_bytes) = ack.encode(config.payload_max) {
                    lbt::transmit_short_ack(tx_radio.as_ref(), &ack_bytes, &tx_lock);
                }

                let mut guard = link_state.lock().unwrap();
                let delivered = guard.receiver.accept(pkt, config.window_size);
                let mut reassembler = guard.reassembler.take();
                drop(guard);

                for packet in delivered {
                    reassembler.accept(&packet, &log);
                }

                link_state.lock().unwrap().reassembler = reassembler;
            }
        }
    }
}
