use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use super::packet::{Packet, PacketType};
use crate::log::{Event, EventLog};

#[derive(Debug)]
struct FileTransfer {
    name: String,
    file: File,
    expected_size: usize,
    written: usize,
}

/// Rebuilds text messages and file transfers from the in-order stream of
/// data packets the receiver delivers. At most one in-flight message and
/// one in-flight file are held at a time; they are independent of each
/// other.
#[derive(Debug)]
pub struct Reassembler {
    save_dir: PathBuf,
    text: Vec<u8>,
    file: Option<FileTransfer>,
}

impl Reassembler {
    pub fn new(save_dir: PathBuf) -> Self {
        Reassembler { save_dir, text: Vec::new(), file: None }
    }

    /// Swaps out the in-flight state, leaving an empty `Reassembler` with
    /// the same `save_dir` in its place. Lets a caller do reassembly's file
    /// I/O after releasing a shared lock, then put the result back.
    pub fn take(&mut self) -> Reassembler {
        std::mem::replace(self, Reassembler::new(self.save_dir.clone()))
    }

    /// Dispatches one in-order data packet. Never called with `Ack`.
    pub fn accept(&mut self, packet: &Packet, log: &EventLog) {
        match packet.pkt_type {
            PacketType::Ack => {}
            PacketType::MsgChunk => {
                self.text.extend_from_slice(&packet.payload);
            }
            PacketType::MsgEnd => {
                self.text.extend_from_slice(&packet.payload);
                let accumulated = std::mem::take(&mut self.text);
                match String::from_utf8(accumulated) {
                    Ok(text) => log.push(Event::MessageReceived { text }),
                    Err(_) => {
                        warn!("message did not decode as UTF-8, surfacing decode-error marker");
                        log.push(Event::MessageReceived { text: "<binary or decode error>".to_string() });
                    }
                }
            }
            PacketType::FileStart => {
                // A FILE_START always starts fresh: any prior in-flight
                // transfer is abandoned without a FileSaved/FileFailed event.
                self.file = None;

                if let Some((name, expected_size)) = parse_file_header(&packet.payload) {
                    match File::create(self.save_dir.join(&name)) {
                        Ok(file) => {
                            self.file = Some(FileTransfer { name, file, expected_size, written: 0 });
                        }
                        Err(err) => {
                            warn!(%name, %err, "failed to open file for incoming transfer");
                            log.push(Event::FileFailed { name });
                        }
                    }
                }
                // malformed FILE_START (missing '|' or non-numeric size) is
                // dropped silently; no file is in-flight afterward.
            }
            PacketType::FileChunk => {
                if let Some(transfer) = self.file.as_mut() {
                    match transfer.file.write_all(&packet.payload) {
                        Ok(()) => transfer.written += packet.payload.len(),
                        Err(err) => {
                            let name = transfer.name.clone();
                            warn!(%name, %err, "file write failed during reassembly");
                            self.file = None;
                            log.push(Event::FileFailed { name });
                        }
                    }
                }
                // no file in-flight: drop the chunk
            }
            PacketType::FileEnd => {
                if let Some(transfer) = self.file.take() {
                    if transfer.written == transfer.expected_size {
                        log.push(Event::FileSaved { name: transfer.name });
                    } else {
                        warn!(
                            name = %transfer.name,
                            expected = transfer.expected_size,
                            written = transfer.written,
                            "file transfer ended short of its advertised size"
                        );
                        log.push(Event::FileFailed { name: transfer.name });
                    }
                }
            }
        }
    }
}

fn parse_file_header(payload: &[u8]) -> Option<(String, usize)> {
    let text = std::str::from_utf8(payload).ok()?;
    let (name, size) = text.split_once('|')?;
    let size: usize = size.parse().ok()?;
    Some((name.to_string(), size))
}
