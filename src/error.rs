use std::io;

/// Errors raised while validating a [`crate::config::NodeConfig`] before a node starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("window_size {0} is too large: 2 * window_size must not exceed the 256-entry sequence space")]
    WindowTooLarge(u16),

    #[error("window_size must be at least 1")]
    WindowTooSmall,

    #[error("{profile:?} payload_max {payload_max} exceeds the 255-byte wire limit")]
    PayloadTooLarge { profile: &'static str, payload_max: usize },

    #[error("msg_chunk_max ({msg_chunk_max}) and file_chunk_max ({file_chunk_max}) must each be <= payload_max ({payload_max})")]
    ChunkLargerThanPayload {
        msg_chunk_max: usize,
        file_chunk_max: usize,
        payload_max: usize,
    },

    #[error("my_addr and peer_addr must differ")]
    AddrCollision,

    #[error("0xFF is reserved for broadcast and cannot be used as my_addr or peer_addr")]
    BroadcastAddr,
}

/// Errors surfaced internally by the node. None of these cross the
/// enqueue/subscribe API; reassembly failures are converted into
/// [`crate::log::Event::FileFailed`] instead of propagated.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("file I/O failed during reassembly: {0}")]
    FileIo(#[from] io::Error),

    #[error("attempted to enqueue a payload of {len} bytes, which exceeds the {max} byte chunk limit")]
    OversizedChunk { len: usize, max: usize },
}
