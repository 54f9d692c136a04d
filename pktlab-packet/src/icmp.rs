//! ICMP and ICMPv6 header layout
//!
//! Both versions share the same 8-byte echo header shape; only the type
//! numbers and the checksum coverage differ.

use bytes::{Buf, BufMut};

/// ICMP echo header size
pub const HEADER_LEN: usize = 8;

/// Byte offset of the checksum within the ICMP header
pub const CHECKSUM_OFFSET: usize = 2;

/// ICMPv4 Echo Request type
pub const ICMPV4_ECHO_REQUEST: u8 = 8;

/// ICMPv6 Echo Request type
pub const ICMPV6_ECHO_REQUEST: u8 = 128;

/// Decoded ICMP echo header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    pub fn echo_request(icmp_type: u8) -> Self {
        IcmpHeader {
            icmp_type,
            code: 0,
            checksum: 0,
            identifier: 0,
            sequence: 0,
        }
    }

    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u8(self.icmp_type);
        buf.put_u8(self.code);
        buf.put_u16(self.checksum);
        buf.put_u16(self.identifier);
        buf.put_u16(self.sequence);
    }

    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        Some(IcmpHeader {
            icmp_type: data.get_u8(),
            code: data.get_u8(),
            checksum: data.get_u16(),
            identifier: data.get_u16(),
            sequence: data.get_u16(),
        })
    }
}
