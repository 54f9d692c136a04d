//! UDP header layout and access

use bytes::{Buf, BufMut};

/// UDP header size in bytes
pub const HEADER_LEN: usize = 8;

/// Byte offset of the source port within the UDP header
pub const SRC_PORT_OFFSET: usize = 0;

/// Byte offset of the destination port within the UDP header
pub const DST_PORT_OFFSET: usize = 2;

/// Byte offset of the checksum within the UDP header
pub const CHECKSUM_OFFSET: usize = 6;

/// Decoded UDP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Length (header + data)
    pub length: u16,
    /// Checksum
    pub checksum: u16,
}

impl UdpHeader {
    /// Create a header for a datagram carrying `payload_len` bytes
    pub fn new(payload_len: usize) -> Self {
        UdpHeader {
            source_port: 0,
            destination_port: 0,
            length: (HEADER_LEN + payload_len) as u16,
            checksum: 0,
        }
    }

    /// Serialize the header into the first [`HEADER_LEN`] bytes of `buf`
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u16(self.source_port);
        buf.put_u16(self.destination_port);
        buf.put_u16(self.length);
        buf.put_u16(self.checksum);
    }

    /// Parse a header from the start of `data`
    ///
    /// Note: This does not validate the checksum.
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        Some(UdpHeader {
            source_port: data.get_u16(),
            destination_port: data.get_u16(),
            length: data.get_u16(),
            checksum: data.get_u16(),
        })
    }

    /// Get payload length as advertised by the length field
    pub fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(HEADER_LEN)
    }
}
