use super::packet::{Packet, PacketType};

/// Splits a text message into `MSG_CHUNK` packets terminated by one
/// `MSG_END`. `next_seq` is advanced modulo 256 once per packet produced.
pub fn fragment_message(text: &str, my_addr: u8, peer_addr: u8, chunk_max: usize, next_seq: &mut u8) -> Vec<Packet> {
    let bytes = text.as_bytes();
    let mut chunks: Vec<&[u8]> = bytes.chunks(chunk_max.max(1)).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    let last = chunks.len() - 1;
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let pkt_type = if i == last { PacketType::MsgEnd } else { PacketType::MsgChunk };
            let seq = *next_seq;
            *next_seq = next_seq.wrapping_add(1);
            Packet::new(peer_addr, my_addr, seq, pkt_type, chunk.to_vec())
        })
        .collect()
}

/// Splits a file into a `FILE_START` header packet, a run of `FILE_CHUNK`
/// packets, and a trailing `FILE_END`.
pub fn fragment_file(name: &str, bytes: &[u8], my_addr: u8, peer_addr: u8, chunk_max: usize, next_seq: &mut u8) -> Vec<Packet> {
    let mut packets = Vec::new();

    let header = format!("{}|{}", name, bytes.len());
    let seq = *next_seq;
    *next_seq = next_seq.wrapping_add(1);
    packets.push(Packet::new(peer_addr, my_addr, seq, PacketType::FileStart, header.into_bytes()));

    for chunk in bytes.chunks(chunk_max.max(1)) {
        let seq = *next_seq;
        *next_seq = next_seq.wrapping_add(1);
        packets.push(Packet::new(peer_addr, my_addr, seq, PacketType::FileChunk, chunk.to_vec()));
    }

    let seq = *next_seq;
    *next_seq = next_seq.wrapping_add(1);
    packets.push(Packet::new(peer_addr, my_addr, seq, PacketType::FileEnd, Vec::new()));

    packets
}
