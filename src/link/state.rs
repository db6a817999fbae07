use std::path::PathBuf;

use super::reassembler::Reassembler;
use super::receiver::ReceiverState;
use super::sender::SenderState;

/// All mutable ARQ and reassembly state for one node, behind a single
/// lock: the sender's window/ack bookkeeping, the receiver's reorder
/// buffer, and the reassembler's in-flight message/file state.
#[derive(Debug)]
pub struct LinkState {
    pub sender: SenderState,
    pub receiver: ReceiverState,
    pub reassembler: Reassembler,
}

impl LinkState {
    pub fn new(save_dir: PathBuf) -> Self {
        LinkState {
            sender: SenderState::new(),
            receiver: ReceiverState::new(),
            reassembler: Reassembler::new(save_dir),
        }
    }

    /// Seeds the sender's and receiver's sequence cursors to `seq` instead
    /// of 0, for driving the full send/receive pipeline across the
    /// 256-wraparound boundary in tests.
    pub fn with_initial_seq(save_dir: PathBuf, seq: u8) -> Self {
        let mut state = LinkState::new(save_dir);
        state.sender.window_base = seq;
        state.sender.next_seq = seq;
        state.receiver.rx_expected = seq;
        state
    }
}
