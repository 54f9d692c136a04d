//! IPv6 fixed header layout and access

use crate::ipv4::IpProtocol;
use bytes::{Buf, BufMut};
use std::net::Ipv6Addr;

/// IPv6 fixed header size
pub const HEADER_LEN: usize = 40;

/// Default hop limit for initialized packets
pub const DEFAULT_HOP_LIMIT: u8 = 64;

const SRC_OFFSET: usize = 8;
const DST_OFFSET: usize = 24;

/// Decoded IPv6 fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Header {
    /// Version (4 bits), traffic class (8 bits) and flow label (20 bits)
    pub vtc_flow: u32,
    /// Length of everything after the fixed header
    pub payload_length: u16,
    /// Next header (upper-layer protocol)
    pub next_header: IpProtocol,
    /// Hop limit
    pub hop_limit: u8,
    /// Source address
    pub source: Ipv6Addr,
    /// Destination address
    pub destination: Ipv6Addr,
}

impl Ipv6Header {
    /// Create a header for `payload_len` bytes following it, with unspecified
    /// addresses
    pub fn new(next_header: IpProtocol, payload_len: usize) -> Self {
        Ipv6Header {
            vtc_flow: 6 << 28,
            payload_length: payload_len as u16,
            next_header,
            hop_limit: DEFAULT_HOP_LIMIT,
            source: Ipv6Addr::UNSPECIFIED,
            destination: Ipv6Addr::UNSPECIFIED,
        }
    }

    pub fn version(&self) -> u8 {
        (self.vtc_flow >> 28) as u8
    }

    /// Serialize the header into the first [`HEADER_LEN`] bytes of `buf`
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u32(self.vtc_flow);
        buf.put_u16(self.payload_length);
        buf.put_u8(self.next_header.to_u8());
        buf.put_u8(self.hop_limit);
        buf.put_slice(&self.source.octets());
        buf.put_slice(&self.destination.octets());
    }

    /// Parse a header from the start of `data`
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        let vtc_flow = data.get_u32();
        if vtc_flow >> 28 != 6 {
            return None;
        }

        let payload_length = data.get_u16();
        let next_header = IpProtocol::from_u8(data.get_u8());
        let hop_limit = data.get_u8();
        let source = Ipv6Addr::from(data.get_u128());
        let destination = Ipv6Addr::from(data.get_u128());

        Some(Ipv6Header {
            vtc_flow,
            payload_length,
            next_header,
            hop_limit,
            source,
            destination,
        })
    }
}

/// Mutable in-place view over an IPv6 header
pub struct Ipv6HeaderMut<'a> {
    buf: &'a mut [u8],
}

impl<'a> Ipv6HeaderMut<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        debug_assert!(buf.len() >= HEADER_LEN);
        Ipv6HeaderMut { buf }
    }

    pub fn set_source(&mut self, addr: Ipv6Addr) {
        self.buf[SRC_OFFSET..SRC_OFFSET + 16].copy_from_slice(&addr.octets());
    }

    pub fn set_destination(&mut self, addr: Ipv6Addr) {
        self.buf[DST_OFFSET..DST_OFFSET + 16].copy_from_slice(&addr.octets());
    }
}
