//! IPv4 header layout and access
//!
//! Only the fixed 20-byte header is produced; options are never emitted.

use bytes::{Buf, BufMut};
use std::net::Ipv4Addr;

/// IPv4 header size without options
pub const HEADER_LEN: usize = 20;

/// Default Time to Live for initialized packets
pub const DEFAULT_TTL: u8 = 64;

const CHECKSUM_OFFSET: usize = 10;
const SRC_OFFSET: usize = 12;
const DST_OFFSET: usize = 16;

/// IP Protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// ICMP (1)
    ICMP,
    /// TCP (6)
    TCP,
    /// UDP (17)
    UDP,
    /// ICMPv6 (58)
    ICMPv6,
    /// Custom protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        use pktlab_core::ip_protocols;

        match self {
            IpProtocol::ICMP => ip_protocols::ICMP,
            IpProtocol::TCP => ip_protocols::TCP,
            IpProtocol::UDP => ip_protocols::UDP,
            IpProtocol::ICMPv6 => ip_protocols::ICMPV6,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        use pktlab_core::ip_protocols;

        match value {
            ip_protocols::ICMP => IpProtocol::ICMP,
            ip_protocols::TCP => IpProtocol::TCP,
            ip_protocols::UDP => IpProtocol::UDP,
            ip_protocols::ICMPV6 => IpProtocol::ICMPv6,
            val => IpProtocol::Custom(val),
        }
    }
}

/// Decoded IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Version (always 4 for IPv4)
    pub version: u8,
    /// Internet Header Length in 32-bit words (5 without options)
    pub ihl: u8,
    /// Type of Service / DSCP
    pub tos: u8,
    /// Total length (header + data) in bytes
    pub total_length: u16,
    /// Identification
    pub identification: u16,
    /// Flags (3 bits) and fragment offset (13 bits), as on the wire
    pub flags_fragment: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum
    pub checksum: u16,
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// Create a header for `payload_len` bytes following it, with unspecified
    /// addresses and a zero checksum
    pub fn new(protocol: IpProtocol, payload_len: usize) -> Self {
        Ipv4Header {
            version: 4,
            ihl: 5,
            tos: 0,
            total_length: (HEADER_LEN + payload_len) as u16,
            identification: 0,
            flags_fragment: 0,
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            source: Ipv4Addr::UNSPECIFIED,
            destination: Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Serialize the header into the first [`HEADER_LEN`] bytes of `buf`
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u8((self.version << 4) | (self.ihl & 0x0F));
        buf.put_u8(self.tos);
        buf.put_u16(self.total_length);
        buf.put_u16(self.identification);
        buf.put_u16(self.flags_fragment);
        buf.put_u8(self.ttl);
        buf.put_u8(self.protocol.to_u8());
        buf.put_u16(self.checksum);
        buf.put_slice(&self.source.octets());
        buf.put_slice(&self.destination.octets());
    }

    /// Parse a header from the start of `data`
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        let version_ihl = data.get_u8();
        let version = version_ihl >> 4;
        if version != 4 {
            return None;
        }

        let tos = data.get_u8();
        let total_length = data.get_u16();
        let identification = data.get_u16();
        let flags_fragment = data.get_u16();
        let ttl = data.get_u8();
        let protocol = IpProtocol::from_u8(data.get_u8());
        let checksum = data.get_u16();
        let source = Ipv4Addr::from(data.get_u32());
        let destination = Ipv4Addr::from(data.get_u32());

        Some(Ipv4Header {
            version,
            ihl: version_ihl & 0x0F,
            tos,
            total_length,
            identification,
            flags_fragment,
            ttl,
            protocol,
            checksum,
            source,
            destination,
        })
    }

    /// Get the header size in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }
}

/// Mutable in-place view over an IPv4 header
pub struct Ipv4HeaderMut<'a> {
    buf: &'a mut [u8],
}

impl<'a> Ipv4HeaderMut<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        debug_assert!(buf.len() >= HEADER_LEN);
        Ipv4HeaderMut { buf }
    }

    pub fn set_source(&mut self, addr: Ipv4Addr) {
        self.buf[SRC_OFFSET..SRC_OFFSET + 4].copy_from_slice(&addr.octets());
    }

    pub fn set_destination(&mut self, addr: Ipv4Addr) {
        self.buf[DST_OFFSET..DST_OFFSET + 4].copy_from_slice(&addr.octets());
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        self.buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
    }

    /// Recompute the header checksum over the fixed header
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = crate::checksum::internet_checksum(&self.buf[..HEADER_LEN]);
        self.set_checksum(checksum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::validate_checksum;

    #[test]
    fn test_ip_protocol_conversion() {
        assert_eq!(IpProtocol::TCP.to_u8(), 6);
        assert_eq!(IpProtocol::UDP.to_u8(), 17);
        assert_eq!(IpProtocol::ICMPv6.to_u8(), 58);
        assert_eq!(IpProtocol::from_u8(1), IpProtocol::ICMP);
        assert_eq!(IpProtocol::from_u8(200), IpProtocol::Custom(200));
    }

    #[test]
    fn test_header_new() {
        let header = Ipv4Header::new(IpProtocol::UDP, 108);

        assert_eq!(header.version, 4);
        assert_eq!(header.ihl, 5);
        assert_eq!(header.header_len(), HEADER_LEN);
        assert_eq!(header.total_length, 128);
        assert_eq!(header.ttl, DEFAULT_TTL);
        assert_eq!(header.checksum, 0);
    }

    #[test]
    fn test_header_write() {
        let mut header = Ipv4Header::new(IpProtocol::TCP, 4);
        header.source = Ipv4Addr::new(192, 168, 1, 1);
        header.destination = Ipv4Addr::new(192, 168, 1, 2);

        let mut buf = [0u8; HEADER_LEN];
        header.write(&mut buf);

        assert_eq!(buf[0], 0x45);
        assert_eq!(&buf[2..4], &[0x00, 24]);
        assert_eq!(buf[8], 64);
        assert_eq!(buf[9], 6);
        assert_eq!(&buf[12..16], &[192, 168, 1, 1]);
        assert_eq!(&buf[16..20], &[192, 168, 1, 2]);
    }

    #[test]
    fn test_header_parse_rejects_ipv6() {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = 0x60;
        assert!(Ipv4Header::parse(&buf).is_none());
        assert!(Ipv4Header::parse(&buf[..10]).is_none());
    }

    #[test]
    fn test_mutable_view_checksum() {
        let mut buf = [0u8; HEADER_LEN];
        Ipv4Header::new(IpProtocol::ICMP, 108).write(&mut buf);

        let mut view = Ipv4HeaderMut::new(&mut buf);
        view.set_source(Ipv4Addr::new(127, 0, 0, 1));
        view.set_destination(Ipv4Addr::new(128, 9, 9, 5));
        view.fill_checksum();

        assert!(validate_checksum(&buf));
        let header = Ipv4Header::parse(&buf).unwrap();
        assert_eq!(header.source, Ipv4Addr::LOCALHOST);
        assert_eq!(header.destination, Ipv4Addr::new(128, 9, 9, 5));
        assert_ne!(header.checksum, 0);
    }
}
