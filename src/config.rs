use crate::error::ConfigError;

/// Chunk-size / timing profile, mirroring the two presets used by the
/// original firmware: a short-range profile tuned for a fast spreading
/// factor, and a long-range profile that trades throughput for link budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    ShortRange,
    LongRange,
}

impl Profile {
    fn defaults(self) -> (usize, usize, usize, u64, u64) {
        // (msg_chunk_max, file_chunk_max, payload_max, timeout_ms, recv_timeout_ms)
        match self {
            Profile::ShortRange => (200, 180, 200, 1500, 1000),
            Profile::LongRange => (50, 50, 50, 10000, 5000),
        }
    }
}

pub const BROADCAST_ADDR: u8 = 0xFF;

/// Validated, immutable node configuration. The only point in this crate
/// where misconfiguration is rejected synchronously rather than logged.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub my_addr: u8,
    pub peer_addr: u8,
    pub freq_tx: u32,
    pub freq_rx: u32,
    pub window_size: u16,
    pub timeout_ms: u64,
    pub recv_timeout_ms: u64,
    pub max_lbt_retries: u32,
    pub msg_chunk_max: usize,
    pub file_chunk_max: usize,
    pub payload_max: usize,
    pub stall_threshold: u32,
}

impl NodeConfig {
    /// Builds a config from a profile preset plus the addressing/frequency
    /// values a caller must always supply, then validates it.
    pub fn new(
        my_addr: u8,
        peer_addr: u8,
        freq_tx: u32,
        freq_rx: u32,
        window_size: u16,
        profile: Profile,
    ) -> Result<Self, ConfigError> {
        let (msg_chunk_max, file_chunk_max, payload_max, timeout_ms, recv_timeout_ms) =
            profile.defaults();

        let config = NodeConfig {
            my_addr,
            peer_addr,
            freq_tx,
            freq_rx,
            window_size,
            timeout_ms,
            recv_timeout_ms,
            max_lbt_retries: 5,
            msg_chunk_max,
            file_chunk_max,
            payload_max,
            stall_threshold: 20,
        };

        config.validate(profile)?;
        Ok(config)
    }

    fn validate(&self, profile: Profile) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::WindowTooSmall);
        }
        if 2 * self.window_size as u32 > 256 {
            return Err(ConfigError::WindowTooLarge(self.window_size));
        }
        if self.payload_max > 255 {
            return Err(ConfigError::PayloadTooLarge {
                profile: match profile {
                    Profile::ShortRange => "ShortRange",
                    Profile::LongRange => "LongRange",
                },
                payload_max: self.payload_max,
            });
        }
        if self.msg_chunk_max > self.payload_max || self.file_chunk_max > self.payload_max {
            return Err(ConfigError::ChunkLargerThanPayload {
                msg_chunk_max: self.msg_chunk_max,
                file_chunk_max: self.file_chunk_max,
                payload_max: self.payload_max,
            });
        }
        if self.my_addr == self.peer_addr {
            return Err(ConfigError::AddrCollision);
        }
        if self.my_addr == BROADCAST_ADDR || self.peer_addr == BROADCAST_ADDR {
            return Err(ConfigError::BroadcastAddr);
        }

        Ok(())
    }
}
