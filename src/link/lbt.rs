use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::config::NodeConfig;
use crate::radio::{ChannelState, Radio};

/// Long Listen-Before-Talk path used for data packets: an initial
/// desynchronizing delay, then up to `max_lbt_retries` channel scans with
/// randomized backoff between attempts. Returns whether the frame made it
/// onto the radio.
pub fn transmit_with_lbt(radio: &dyn Radio, bytes: &[u8], tx_lock: &Mutex<()>, cfg: &NodeConfig) -> bool {
    let mut rng = rand::thread_rng();
    thread::sleep(Duration::from_millis(rng.gen_range(10..=40)));

    for _ in 0..cfg.max_lbt_retries {
        if radio.scan_channel() == ChannelState::Free {
            let _guard = tx_lock.lock().unwrap();
            radio.send(bytes);
            return true;
        }
        thread::sleep(Duration::from_millis(rng.gen_range(20..=50)));
    }

    false
}

/// Compressed gate used to reply with an ACK: a short randomized delay and
/// no channel scan. ACKs are latency-sensitive enough to accept the
/// collision risk of skipping CAD.
pub fn transmit_short_ack(radio: &dyn Radio, bytes: &[u8], tx_lock: &Mutex<()>) {
    let mut rng = rand::thread_rng();
    thread::sleep(Duration::from_millis(rng.gen_range(5..=15)));

    let _guard = tx_lock.lock().unwrap();
    radio.send(bytes);
}
