use crate::config::BROADCAST_ADDR;
use crate::error::NodeError;

pub const HEADER_SIZE: usize = 4;
pub const FOOTER_SIZE: usize = 2;

/// Closed set of packet type tags carried in the wire header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Ack = 0x01,
    MsgChunk = 0x02,
    FileStart = 0x03,
    FileChunk = 0x04,
    FileEnd = 0x05,
    MsgEnd = 0x06,
}

impl PacketType {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(PacketType::Ack),
            0x02 => Some(PacketType::MsgChunk),
            0x03 => Some(PacketType::FileStart),
            0x04 => Some(PacketType::FileChunk),
            0x05 => Some(PacketType::FileEnd),
            0x06 => Some(PacketType::MsgEnd),
            _ => None,
        }
    }
}

/// A single link-layer frame: header, opaque payload, trailing CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub to_addr: u8,
    pub from_addr: u8,
    pub seq: u8,
    pub pkt_type: PacketType,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(to_addr: u8, from_addr: u8, seq: u8, pkt_type: PacketType, payload: Vec<u8>) -> Self {
        Packet { to_addr, from_addr, seq, pkt_type, payload }
    }

    pub fn ack(to_addr: u8, from_addr: u8, seq: u8) -> Self {
        Packet::new(to_addr, from_addr, seq, PacketType::Ack, Vec::new())
    }

    pub fn is_for(&self, addr: u8) -> bool {
        self.to_addr == addr || self.to_addr == BROADCAST_ADDR
    }

    /// Encodes this packet onto the wire. Rejects payloads over the
    /// configured chunk profile; callers must fragment first.
    pub fn encode(&self, payload_max: usize) -> Result<Vec<u8>, NodeError> {
        if self.payload.len() > payload_max {
            return Err(NodeError::OversizedChunk { len: self.payload.len(), max: payload_max });
        }

        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len() + FOOTER_SIZE);
        buf.push(self.to_addr);
        buf.push(self.from_addr);
        buf.push(self.seq);
        buf.push(self.pkt_type as u8);
        buf.extend_from_slice(&self.payload);

        let crc = crc16_ccitt(&buf);
        buf.extend_from_slice(&crc.to_be_bytes());

        Ok(buf)
    }

    /// Decodes a received frame. Any corruption (CRC mismatch, short frame,
    /// unknown type tag) yields `None` rather than an error: corruption is
    /// not an error in this protocol, only a reason to wait for a retransmit.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_SIZE + FOOTER_SIZE {
            return None;
        }

        let body = &data[..data.len() - FOOTER_SIZE];
        let received_crc = u16::from_be_bytes([data[data.len() - 2], data[data.len() - 1]]);
        if crc16_ccitt(body) != received_crc {
            return None;
        }

        let pkt_type = PacketType::from_u8(body[3])?;
        let payload = body[HEADER_SIZE..].to_vec();

        Some(Packet {
            to_addr: body[0],
            from_addr: body[1],
            seq: body[2],
            pkt_type,
            payload,
        })
    }
}

/// CRC-16/CCITT: polynomial 0x1021, initial value 0xFFFF, no reflection,
/// no final XOR.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
