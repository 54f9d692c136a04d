//! TCP header layout and access
//!
//! Initialized TCP headers carry no options, so the data offset is always 5.

use bytes::{Buf, BufMut};

/// TCP header size without options
pub const HEADER_LEN: usize = 20;

/// Byte offset of the source port within the TCP header
pub const SRC_PORT_OFFSET: usize = 0;

/// Byte offset of the destination port within the TCP header
pub const DST_PORT_OFFSET: usize = 2;

/// Byte offset of the checksum within the TCP header
pub const CHECKSUM_OFFSET: usize = 16;

/// TCP flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags {
    /// FIN - No more data from sender
    pub fin: bool,
    /// SYN - Synchronize sequence numbers
    pub syn: bool,
    /// RST - Reset the connection
    pub rst: bool,
    /// PSH - Push function
    pub psh: bool,
    /// ACK - Acknowledgment field is significant
    pub ack: bool,
    /// URG - Urgent pointer field is significant
    pub urg: bool,
    /// ECE - ECN-Echo
    pub ece: bool,
    /// CWR - Congestion Window Reduced
    pub cwr: bool,
}

impl TcpFlags {
    /// No flags set
    pub const NONE: TcpFlags = TcpFlags {
        fin: false,
        syn: false,
        rst: false,
        psh: false,
        ack: false,
        urg: false,
        ece: false,
        cwr: false,
    };

    /// Convert flags to u8 value
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.fin {
            flags |= 0b00000001;
        }
        if self.syn {
            flags |= 0b00000010;
        }
        if self.rst {
            flags |= 0b00000100;
        }
        if self.psh {
            flags |= 0b00001000;
        }
        if self.ack {
            flags |= 0b00010000;
        }
        if self.urg {
            flags |= 0b00100000;
        }
        if self.ece {
            flags |= 0b01000000;
        }
        if self.cwr {
            flags |= 0b10000000;
        }
        flags
    }

    /// Parse flags from u8 value
    pub fn from_u8(value: u8) -> Self {
        TcpFlags {
            fin: (value & 0b00000001) != 0,
            syn: (value & 0b00000010) != 0,
            rst: (value & 0b00000100) != 0,
            psh: (value & 0b00001000) != 0,
            ack: (value & 0b00010000) != 0,
            urg: (value & 0b00100000) != 0,
            ece: (value & 0b01000000) != 0,
            cwr: (value & 0b10000000) != 0,
        }
    }
}

/// Decoded TCP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Sequence number
    pub sequence_number: u32,
    /// Acknowledgment number
    pub acknowledgment_number: u32,
    /// Data offset in 32-bit words
    pub data_offset: u8,
    /// TCP flags
    pub flags: TcpFlags,
    /// Window size
    pub window_size: u16,
    /// Checksum
    pub checksum: u16,
    /// Urgent pointer
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Create an empty header: zero ports, sequence numbers and flags
    pub fn new() -> Self {
        TcpHeader {
            source_port: 0,
            destination_port: 0,
            sequence_number: 0,
            acknowledgment_number: 0,
            data_offset: (HEADER_LEN / 4) as u8,
            flags: TcpFlags::NONE,
            window_size: 0,
            checksum: 0,
            urgent_pointer: 0,
        }
    }

    /// Serialize the header into the first [`HEADER_LEN`] bytes of `buf`
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u16(self.source_port);
        buf.put_u16(self.destination_port);
        buf.put_u32(self.sequence_number);
        buf.put_u32(self.acknowledgment_number);
        buf.put_u8(self.data_offset << 4);
        buf.put_u8(self.flags.to_u8());
        buf.put_u16(self.window_size);
        buf.put_u16(self.checksum);
        buf.put_u16(self.urgent_pointer);
    }

    /// Parse a header from the start of `data`
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        Some(TcpHeader {
            source_port: data.get_u16(),
            destination_port: data.get_u16(),
            sequence_number: data.get_u32(),
            acknowledgment_number: data.get_u32(),
            data_offset: data.get_u8() >> 4,
            flags: TcpFlags::from_u8(data.get_u8()),
            window_size: data.get_u16(),
            checksum: data.get_u16(),
            urgent_pointer: data.get_u16(),
        })
    }

    /// Get the header size in bytes
    pub fn header_len(&self) -> usize {
        (self.data_offset as usize) * 4
    }
}

impl Default for TcpHeader {
    fn default() -> Self {
        Self::new()
    }
}
