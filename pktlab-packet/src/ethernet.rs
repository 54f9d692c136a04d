//! Ethernet II header layout and access
//!
//! Packets in this crate always start with an Ethernet II header; the header
//! is never padded to the 60-byte minimum frame size.

use bytes::{Buf, BufMut};
use pktlab_core::MacAddr;
use std::fmt;

/// Ethernet header size (dst + src + type)
pub const HEADER_LEN: usize = 14;

const DST_OFFSET: usize = 0;
const SRC_OFFSET: usize = 6;
const ETHERTYPE_OFFSET: usize = 12;

/// Common EtherType values used in Ethernet II frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// IPv6 (0x86DD)
    IPv6,
    /// Custom EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        use pktlab_core::ethertypes;

        match self {
            EtherType::IPv4 => ethertypes::IPV4,
            EtherType::ARP => ethertypes::ARP,
            EtherType::IPv6 => ethertypes::IPV6,
            EtherType::Custom(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        use pktlab_core::ethertypes;

        match value {
            ethertypes::IPV4 => EtherType::IPv4,
            ethertypes::ARP => EtherType::ARP,
            ethertypes::IPV6 => EtherType::IPv6,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::Custom(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Decoded Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType
    pub ethertype: EtherType,
}

impl EthernetHeader {
    pub fn new(destination: MacAddr, source: MacAddr, ethertype: EtherType) -> Self {
        EthernetHeader {
            destination,
            source,
            ethertype,
        }
    }

    /// Serialize the header into the first [`HEADER_LEN`] bytes of `buf`.
    ///
    /// Panics if `buf` is shorter than [`HEADER_LEN`].
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_slice(self.destination.as_bytes());
        buf.put_slice(self.source.as_bytes());
        buf.put_u16(self.ethertype.to_u16());
    }

    /// Parse a header from the start of `data`
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        let destination = MacAddr::from_slice(&data[..6])?;
        data.advance(6);
        let source = MacAddr::from_slice(&data[..6])?;
        data.advance(6);
        let ethertype = EtherType::from_u16(data.get_u16());

        Some(EthernetHeader {
            destination,
            source,
            ethertype,
        })
    }
}

/// Mutable in-place view over an Ethernet header
pub struct EthernetHeaderMut<'a> {
    buf: &'a mut [u8],
}

impl<'a> EthernetHeaderMut<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        debug_assert!(buf.len() >= HEADER_LEN);
        EthernetHeaderMut { buf }
    }

    pub fn set_source(&mut self, mac: MacAddr) {
        self.buf[SRC_OFFSET..SRC_OFFSET + 6].copy_from_slice(mac.as_bytes());
    }

    pub fn set_destination(&mut self, mac: MacAddr) {
        self.buf[DST_OFFSET..DST_OFFSET + 6].copy_from_slice(mac.as_bytes());
    }

    pub fn set_ethertype(&mut self, ethertype: EtherType) {
        self.buf[ETHERTYPE_OFFSET..ETHERTYPE_OFFSET + 2]
            .copy_from_slice(&ethertype.to_u16().to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethertype_conversion() {
        assert_eq!(EtherType::IPv4.to_u16(), 0x0800);
        assert_eq!(EtherType::ARP.to_u16(), 0x0806);
        assert_eq!(EtherType::IPv6.to_u16(), 0x86DD);
        assert_eq!(EtherType::from_u16(0x86DD), EtherType::IPv6);
        assert_eq!(EtherType::from_u16(0x1234), EtherType::Custom(0x1234));
        assert_eq!(EtherType::from_u16(0x8100), EtherType::Custom(0x8100));
    }

    #[test]
    fn test_header_write() {
        let src = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let dst = MacAddr([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        let mut buf = [0u8; HEADER_LEN];

        EthernetHeader::new(dst, src, EtherType::IPv4).write(&mut buf);

        assert_eq!(&buf[0..6], dst.as_bytes());
        assert_eq!(&buf[6..12], src.as_bytes());
        assert_eq!(&buf[12..14], &[0x08, 0x00]);
    }

    #[test]
    fn test_header_parse() {
        let data = [
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x06, // ARP
            0x00, 0x01, // start of payload
        ];

        let header = EthernetHeader::parse(&data).unwrap();
        assert_eq!(header.destination.0, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(header.source.0, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(header.ethertype, EtherType::ARP);

        assert!(EthernetHeader::parse(&data[..10]).is_none());
    }

    #[test]
    fn test_mutable_view() {
        let mut buf = [0u8; HEADER_LEN];
        let mut view = EthernetHeaderMut::new(&mut buf);
        view.set_source(MacAddr([1, 2, 3, 4, 5, 6]));
        view.set_destination(MacAddr::broadcast());
        view.set_ethertype(EtherType::IPv6);

        let header = EthernetHeader::parse(&buf).unwrap();
        assert_eq!(header.source, MacAddr([1, 2, 3, 4, 5, 6]));
        assert!(header.destination.is_broadcast());
        assert_eq!(header.ethertype, EtherType::IPv6);
    }
}
