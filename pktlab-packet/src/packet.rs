//! Packet buffer and layered header access
//!
//! A [`Packet`] is a fixed-capacity frame buffer plus a record of which
//! header regions the last initializer laid out. Header accessors only hand
//! out regions that exist, so an ICMP packet has no port region and an ARP
//! packet has no IP header.

use crate::arp::{self, ArpHeader};
use crate::checksum::{internet_checksum, transport_checksum, transport_checksum_v6};
use crate::ethernet::{self, EthernetHeader, EthernetHeaderMut};
use crate::icmp::{self, IcmpHeader};
use crate::ipv4::{self, IpProtocol, Ipv4Header, Ipv4HeaderMut};
use crate::ipv6::{self, Ipv6Header, Ipv6HeaderMut};
use crate::mempool::PoolLease;
use crate::ports::{self, L4PortsMut};
use crate::tcp::{self, TcpHeader};
use crate::udp::{self, UdpHeader};
use bytes::BytesMut;
use pktlab_core::{Error, Result};

/// Usable bytes in every packet buffer
pub const DATA_ROOM_SIZE: usize = 2048;

/// Network-layer region of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L3Proto {
    Ipv4,
    Ipv6,
    Arp,
}

impl L3Proto {
    pub fn header_len(self) -> usize {
        match self {
            L3Proto::Ipv4 => ipv4::HEADER_LEN,
            L3Proto::Ipv6 => ipv6::HEADER_LEN,
            L3Proto::Arp => arp::HEADER_LEN,
        }
    }
}

/// Transport-layer region of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L4Proto {
    Tcp,
    Udp,
    /// ICMP over IPv4, ICMPv6 over IPv6
    Icmp,
}

impl L4Proto {
    pub fn header_len(self) -> usize {
        match self {
            L4Proto::Tcp => tcp::HEADER_LEN,
            L4Proto::Udp => udp::HEADER_LEN,
            L4Proto::Icmp => icmp::HEADER_LEN,
        }
    }

    /// Protocol number announced by an enclosing IP header of `l3`
    pub fn ip_protocol(self, l3: L3Proto) -> IpProtocol {
        match (self, l3) {
            (L4Proto::Tcp, _) => IpProtocol::TCP,
            (L4Proto::Udp, _) => IpProtocol::UDP,
            (L4Proto::Icmp, L3Proto::Ipv6) => IpProtocol::ICMPv6,
            (L4Proto::Icmp, _) => IpProtocol::ICMP,
        }
    }

    fn checksum_offset(self) -> usize {
        match self {
            L4Proto::Tcp => tcp::CHECKSUM_OFFSET,
            L4Proto::Udp => udp::CHECKSUM_OFFSET,
            L4Proto::Icmp => icmp::CHECKSUM_OFFSET,
        }
    }
}

/// A frame buffer with layered header access
#[derive(Debug)]
pub struct Packet {
    buf: BytesMut,
    len: usize,
    l3: Option<L3Proto>,
    l4: Option<L4Proto>,
    _lease: Option<PoolLease>,
}

impl Packet {
    /// Create a standalone packet that does not belong to any pool
    pub fn new() -> Self {
        Self::build(None)
    }

    pub(crate) fn with_lease(lease: PoolLease) -> Self {
        Self::build(Some(lease))
    }

    fn build(lease: Option<PoolLease>) -> Self {
        Packet {
            buf: BytesMut::zeroed(DATA_ROOM_SIZE),
            len: 0,
            l3: None,
            l4: None,
            _lease: lease,
        }
    }

    /// Zero the buffer and lay out a new frame of `frame_len` bytes.
    ///
    /// Fails without touching the packet if the frame does not fit.
    pub(crate) fn reset(
        &mut self,
        frame_len: usize,
        l3: Option<L3Proto>,
        l4: Option<L4Proto>,
    ) -> Result<()> {
        if frame_len > self.capacity() {
            return Err(Error::construction(format!(
                "frame of {} bytes exceeds buffer capacity {}",
                frame_len,
                self.capacity()
            )));
        }

        let dirty = self.len.max(frame_len);
        self.buf[..dirty].fill(0);
        self.len = frame_len;
        self.l3 = l3;
        self.l4 = l4;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The frame as it would go on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    pub fn l3_proto(&self) -> Option<L3Proto> {
        self.l3
    }

    pub fn l4_proto(&self) -> Option<L4Proto> {
        self.l4
    }

    /// Offset of the network-layer header; always right after Ethernet
    pub fn l3_offset(&self) -> usize {
        ethernet::HEADER_LEN
    }

    /// Offset of the transport-layer header, if the packet has one
    pub fn l4_offset(&self) -> Option<usize> {
        match (self.l3, self.l4) {
            (Some(l3), Some(_)) => Some(self.l3_offset() + l3.header_len()),
            _ => None,
        }
    }

    /// Offset of the first byte after all headers
    pub fn payload_offset(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        match (self.l3, self.l4) {
            (Some(_), Some(l4)) => self.l4_offset().unwrap_or(0) + l4.header_len(),
            (Some(l3), None) => self.l3_offset() + l3.header_len(),
            _ => ethernet::HEADER_LEN,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf[self.payload_offset()..self.len]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        let start = self.payload_offset();
        &mut self.buf[start..self.len]
    }

    pub fn ether(&self) -> Option<EthernetHeader> {
        EthernetHeader::parse(self.as_bytes())
    }

    pub fn ether_mut(&mut self) -> Result<EthernetHeaderMut<'_>> {
        if self.len < ethernet::HEADER_LEN {
            return Err(Error::MissingHeader("Ethernet"));
        }
        Ok(EthernetHeaderMut::new(&mut self.buf[..ethernet::HEADER_LEN]))
    }

    pub fn ipv4(&self) -> Option<Ipv4Header> {
        self.l3_region(L3Proto::Ipv4).and_then(Ipv4Header::parse)
    }

    pub fn ipv4_mut(&mut self) -> Result<Ipv4HeaderMut<'_>> {
        let buf = self
            .l3_region_mut(L3Proto::Ipv4)
            .ok_or(Error::MissingHeader("IPv4"))?;
        Ok(Ipv4HeaderMut::new(buf))
    }

    pub fn ipv6(&self) -> Option<Ipv6Header> {
        self.l3_region(L3Proto::Ipv6).and_then(Ipv6Header::parse)
    }

    pub fn ipv6_mut(&mut self) -> Result<Ipv6HeaderMut<'_>> {
        let buf = self
            .l3_region_mut(L3Proto::Ipv6)
            .ok_or(Error::MissingHeader("IPv6"))?;
        Ok(Ipv6HeaderMut::new(buf))
    }

    pub fn arp(&self) -> Option<ArpHeader> {
        self.l3_region(L3Proto::Arp).and_then(ArpHeader::parse)
    }

    pub fn tcp(&self) -> Option<TcpHeader> {
        self.l4_region(L4Proto::Tcp).and_then(TcpHeader::parse)
    }

    pub fn udp(&self) -> Option<UdpHeader> {
        self.l4_region(L4Proto::Udp).and_then(UdpHeader::parse)
    }

    pub fn icmp(&self) -> Option<IcmpHeader> {
        self.l4_region(L4Proto::Icmp).and_then(IcmpHeader::parse)
    }

    /// Raw transport header and everything after it
    pub fn l4_bytes(&self) -> Option<&[u8]> {
        let offset = self.l4_offset()?;
        Some(&self.buf[offset..self.len])
    }

    /// `(source, destination)` ports of a TCP or UDP packet
    pub fn ports(&self) -> Option<(u16, u16)> {
        match self.l4 {
            Some(L4Proto::Tcp | L4Proto::Udp) => ports::read_ports(self.l4_bytes()?),
            _ => None,
        }
    }

    /// Port accessor shared by TCP and UDP (see [`crate::ports`])
    pub fn l4_ports_mut(&mut self) -> Result<L4PortsMut<'_>> {
        let offset = match self.l4 {
            Some(L4Proto::Tcp | L4Proto::Udp) => self.l4_offset(),
            _ => None,
        }
        .ok_or(Error::MissingHeader("TCP/UDP"))?;

        Ok(L4PortsMut::new(
            &mut self.buf[offset..offset + ports::L4_PORTS_LEN],
        ))
    }

    /// Fill the IPv4 header checksum and the transport checksum.
    ///
    /// UDP checksums that compute to zero are sent as 0xFFFF.
    pub fn fill_checksums(&mut self) {
        if let (Some(l3), Some(l4)) = (self.l3, self.l4) {
            let Some(offset) = self.l4_offset() else {
                return;
            };
            let field = offset + l4.checksum_offset();
            self.buf[field..field + 2].fill(0);

            let mut checksum = self.compute_l4_checksum(l3, l4);
            if l4 == L4Proto::Udp && checksum == 0 {
                checksum = 0xFFFF;
            }
            self.buf[field..field + 2].copy_from_slice(&checksum.to_be_bytes());
        }

        if let Ok(mut header) = self.ipv4_mut() {
            header.fill_checksum();
        }
    }

    /// Check the IPv4 header checksum and the transport checksum.
    ///
    /// A zero UDP checksum over IPv4 means "not computed" and is accepted.
    pub fn checksums_valid(&self) -> bool {
        if let Some(header) = self.l3_region(L3Proto::Ipv4) {
            if !crate::checksum::validate_checksum(&header[..ipv4::HEADER_LEN]) {
                return false;
            }
        }

        match (self.l3, self.l4) {
            (Some(L3Proto::Ipv4), Some(L4Proto::Udp))
                if self.udp().map(|udp| udp.checksum) == Some(0) =>
            {
                true
            }
            (Some(l3), Some(l4)) => {
                let result = self.compute_l4_checksum(l3, l4);
                result == 0 || result == 0xFFFF
            }
            _ => true,
        }
    }

    fn compute_l4_checksum(&self, l3: L3Proto, l4: L4Proto) -> u16 {
        let Some(segment) = self.l4_bytes() else {
            return 0;
        };
        let protocol = l4.ip_protocol(l3).to_u8();

        match (l3, self.ipv4(), self.ipv6()) {
            (L3Proto::Ipv4, Some(_), _) if l4 == L4Proto::Icmp => internet_checksum(segment),
            (L3Proto::Ipv4, Some(ip), _) => transport_checksum(
                &ip.source.octets(),
                &ip.destination.octets(),
                protocol,
                segment,
            ),
            (L3Proto::Ipv6, _, Some(ip)) => transport_checksum_v6(
                &ip.source.octets(),
                &ip.destination.octets(),
                protocol,
                segment,
            ),
            _ => 0,
        }
    }

    fn l3_region(&self, proto: L3Proto) -> Option<&[u8]> {
        let end = self.l3_offset() + proto.header_len();
        if self.l3 != Some(proto) || self.len < end {
            return None;
        }
        Some(&self.buf[self.l3_offset()..end])
    }

    fn l3_region_mut(&mut self, proto: L3Proto) -> Option<&mut [u8]> {
        let start = self.l3_offset();
        let end = start + proto.header_len();
        if self.l3 != Some(proto) || self.len < end {
            return None;
        }
        Some(&mut self.buf[start..end])
    }

    fn l4_region(&self, proto: L4Proto) -> Option<&[u8]> {
        if self.l4 != Some(proto) {
            return None;
        }
        let start = self.l4_offset()?;
        let end = start + proto.header_len();
        if self.len < end {
            return None;
        }
        Some(&self.buf[start..end])
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
