use std::time::Duration;

/// Result of a channel-activity-detection scan, as reported by the radio
/// hardware ahead of a transmit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Free,
    Busy,
}

/// Hardware collaborator this stack is built against. Production firmware
/// wires this to SPI-attached transceivers; that wiring is out of scope
/// here, so only the trait and a loopback test double are provided.
pub trait Radio: Send + Sync {
    fn send(&self, bytes: &[u8]);

    /// Blocks up to `timeout`. Returns an empty vector on timeout.
    fn recv(&self, timeout: Duration) -> Vec<u8>;

    fn scan_channel(&self) -> ChannelState;
}

pub mod sim {
    use super::{ChannelState, Radio};
    use std::sync::mpsc::{Receiver, Sender};
    use std::sync::Mutex;
    use std::time::Duration;

    /// One half of an in-memory, always-free radio pair. Used by the demo
    /// binaries and the integration tests in place of real SX126x hardware.
    pub struct LoopbackRadio {
        // `mpsc::Sender` is `Send` but not `Sync`; wrapping it makes the
        // whole radio `Sync` so it can sit behind an `Arc<dyn Radio>` shared
        // by the sender and receiver threads.
        tx: Mutex<Sender<Vec<u8>>>,
        rx: Mutex<Receiver<Vec<u8>>>,
    }

    impl LoopbackRadio {
        /// Builds a connected pair: bytes sent on `a` arrive on `b`'s `recv`,
        /// and vice versa.
        pub fn pair() -> (Self, Self) {
            let (tx_a, rx_b) = std::sync::mpsc::channel();
            let (tx_b, rx_a) = std::sync::mpsc::channel();

            (
                LoopbackRadio { tx: Mutex::new(tx_a), rx: Mutex::new(rx_a) },
                LoopbackRadio { tx: Mutex::new(tx_b), rx: Mutex::new(rx_b) },
            )
        }
    }

    impl Radio for LoopbackRadio {
        fn send(&self, bytes: &[u8]) {
            let _ = self.tx.lock().unwrap().send(bytes.to_vec());
        }

        fn recv(&self, timeout: Duration) -> Vec<u8> {
            let rx = self.rx.lock().unwrap();
            match rx.recv_timeout(timeout) {
                Ok(bytes) => bytes,
                Err(_) => Vec::new(),
            }
        }

        fn scan_channel(&self) -> ChannelState {
            // The loopback pair models a private, collision-free medium: it
            // stands in for hardware CAD, which this crate does not drive.
            ChannelState::Free
        }
    }
}
