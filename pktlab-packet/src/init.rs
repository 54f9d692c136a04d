//! Empty-packet initializers
//!
//! Each initializer lays out a complete frame in an existing [`Packet`]:
//! header lengths, EtherType, protocol numbers and length fields are set,
//! while addresses, ports and checksums are left zero for the caller to fill.
//! The payload is zero-filled and never padded to the Ethernet minimum.

use crate::arp::ArpHeader;
use crate::ethernet::{self, EtherType, EthernetHeader};
use crate::icmp::{IcmpHeader, ICMPV4_ECHO_REQUEST, ICMPV6_ECHO_REQUEST};
use crate::ipv4::Ipv4Header;
use crate::ipv6::Ipv6Header;
use crate::packet::{L3Proto, L4Proto, Packet};
use crate::tcp::TcpHeader;
use crate::udp::UdpHeader;
use pktlab_core::{Error, MacAddr, Result};
use std::net::Ipv4Addr;
use tracing::trace;

pub fn init_empty_ipv4_tcp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv4, L4Proto::Tcp, payload_size)
}

pub fn init_empty_ipv4_udp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv4, L4Proto::Udp, payload_size)
}

pub fn init_empty_ipv4_icmp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv4, L4Proto::Icmp, payload_size)
}

pub fn init_empty_ipv6_tcp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv6, L4Proto::Tcp, payload_size)
}

pub fn init_empty_ipv6_udp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv6, L4Proto::Udp, payload_size)
}

pub fn init_empty_ipv6_icmp_packet(pkt: &mut Packet, payload_size: usize) -> Result<()> {
    init_ip_packet(pkt, L3Proto::Ipv6, L4Proto::Icmp, payload_size)
}

/// Lay out a broadcast ARP request from `sha`/`spa` asking for `tpa`
pub fn init_arp_request_packet(
    pkt: &mut Packet,
    sha: MacAddr,
    spa: Ipv4Addr,
    tpa: Ipv4Addr,
) -> Result<()> {
    let arp = ArpHeader::new_request(sha, spa, tpa);
    init_arp_packet(pkt, MacAddr::broadcast(), arp)
}

/// Lay out a unicast ARP reply from `sha`/`spa` to `tha`/`tpa`
pub fn init_arp_reply_packet(
    pkt: &mut Packet,
    sha: MacAddr,
    tha: MacAddr,
    spa: Ipv4Addr,
    tpa: Ipv4Addr,
) -> Result<()> {
    let arp = ArpHeader::new_reply(sha, spa, tha, tpa);
    init_arp_packet(pkt, tha, arp)
}

fn init_ip_packet(pkt: &mut Packet, l3: L3Proto, l4: L4Proto, payload_size: usize) -> Result<()> {
    let l4_len = l4
        .header_len()
        .checked_add(payload_size)
        .ok_or_else(|| payload_overflow(payload_size))?;
    let frame_len = (ethernet::HEADER_LEN + l3.header_len())
        .checked_add(l4_len)
        .ok_or_else(|| payload_overflow(payload_size))?;
    pkt.reset(frame_len, Some(l3), Some(l4))?;

    let l3_offset = pkt.l3_offset();
    let l4_offset = l3_offset + l3.header_len();
    let frame = pkt.as_bytes_mut();

    let (ethertype, icmp_type) = match l3 {
        L3Proto::Ipv6 => (EtherType::IPv6, ICMPV6_ECHO_REQUEST),
        _ => (EtherType::IPv4, ICMPV4_ECHO_REQUEST),
    };
    EthernetHeader::new(MacAddr::zero(), MacAddr::zero(), ethertype).write(frame);

    let protocol = l4.ip_protocol(l3);
    match l3 {
        L3Proto::Ipv6 => Ipv6Header::new(protocol, l4_len).write(&mut frame[l3_offset..]),
        _ => Ipv4Header::new(protocol, l4_len).write(&mut frame[l3_offset..]),
    }

    let l4_buf = &mut frame[l4_offset..];
    match l4 {
        L4Proto::Tcp => TcpHeader::new().write(l4_buf),
        L4Proto::Udp => UdpHeader::new(payload_size).write(l4_buf),
        L4Proto::Icmp => IcmpHeader::echo_request(icmp_type).write(l4_buf),
    }

    trace!(?l3, ?l4, frame_len, "Initialized empty packet");
    Ok(())
}

fn payload_overflow(payload_size: usize) -> Error {
    Error::construction(format!("payload of {} bytes overflows the frame length", payload_size))
}

fn init_arp_packet(pkt: &mut Packet, destination: MacAddr, arp: ArpHeader) -> Result<()> {
    let frame_len = ethernet::HEADER_LEN + L3Proto::Arp.header_len();
    pkt.reset(frame_len, Some(L3Proto::Arp), None)?;

    let l3_offset = pkt.l3_offset();
    let frame = pkt.as_bytes_mut();
    EthernetHeader::new(destination, arp.sender_hw_addr, EtherType::ARP).write(frame);
    arp.write(&mut frame[l3_offset..]);

    trace!(operation = ?arp.operation, "Initialized ARP packet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipv4::IpProtocol;
    use crate::packet::DATA_ROOM_SIZE;

    const PAYLOAD: usize = 100;

    #[test]
    fn test_ipv4_tcp_layout() {
        let mut pkt = Packet::new();
        init_empty_ipv4_tcp_packet(&mut pkt, PAYLOAD).unwrap();

        assert_eq!(pkt.len(), 14 + 20 + 20 + PAYLOAD);
        assert_eq!(pkt.ether().unwrap().ethertype, EtherType::IPv4);

        let ip = pkt.ipv4().unwrap();
        assert_eq!(ip.total_length as usize, 20 + 20 + PAYLOAD);
        assert_eq!(ip.protocol, IpProtocol::TCP);
        assert_eq!(ip.source, Ipv4Addr::UNSPECIFIED);

        let tcp = pkt.tcp().unwrap();
        assert_eq!(tcp.header_len(), 20);
        assert_eq!((tcp.source_port, tcp.destination_port), (0, 0));
        assert!(pkt.udp().is_none());
        assert!(pkt.ipv6().is_none());
    }

    #[test]
    fn test_ipv4_udp_layout() {
        let mut pkt = Packet::new();
        init_empty_ipv4_udp_packet(&mut pkt, PAYLOAD).unwrap();

        assert_eq!(pkt.len(), 142);
        assert_eq!(pkt.ipv4().unwrap().total_length, 128);
        assert_eq!(pkt.ipv4().unwrap().protocol, IpProtocol::UDP);
        assert_eq!(pkt.udp().unwrap().length, 108);
        assert_eq!(pkt.payload().len(), PAYLOAD);
    }

    #[test]
    fn test_ipv4_icmp_layout() {
        let mut pkt = Packet::new();
        init_empty_ipv4_icmp_packet(&mut pkt, PAYLOAD).unwrap();

        assert_eq!(pkt.ipv4().unwrap().protocol, IpProtocol::ICMP);
        assert_eq!(pkt.icmp().unwrap().icmp_type, ICMPV4_ECHO_REQUEST);
        assert_eq!(pkt.ports(), None);
        assert!(pkt.l4_ports_mut().is_err());
    }

    #[test]
    fn test_ipv6_layouts() {
        let mut pkt = Packet::new();

        init_empty_ipv6_tcp_packet(&mut pkt, PAYLOAD).unwrap();
        assert_eq!(pkt.len(), 14 + 40 + 20 + PAYLOAD);
        assert_eq!(pkt.ether().unwrap().ethertype, EtherType::IPv6);
        let ip = pkt.ipv6().unwrap();
        assert_eq!(ip.payload_length as usize, 20 + PAYLOAD);
        assert_eq!(ip.next_header, IpProtocol::TCP);
        assert!(pkt.ipv4().is_none());

        init_empty_ipv6_udp_packet(&mut pkt, PAYLOAD).unwrap();
        assert_eq!(pkt.ipv6().unwrap().next_header, IpProtocol::UDP);
        assert_eq!(pkt.udp().unwrap().length as usize, 8 + PAYLOAD);
        assert!(pkt.tcp().is_none());

        init_empty_ipv6_icmp_packet(&mut pkt, PAYLOAD).unwrap();
        assert_eq!(pkt.ipv6().unwrap().next_header, IpProtocol::ICMPv6);
        assert_eq!(pkt.icmp().unwrap().icmp_type, ICMPV6_ECHO_REQUEST);
        assert_eq!(pkt.len(), 14 + 40 + 8 + PAYLOAD);
    }

    #[test]
    fn test_arp_request_layout() {
        let sha = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
        let spa = Ipv4Addr::new(10, 0, 0, 1);
        let tpa = Ipv4Addr::new(10, 0, 0, 2);

        let mut pkt = Packet::new();
        init_arp_request_packet(&mut pkt, sha, spa, tpa).unwrap();

        assert_eq!(pkt.len(), 42);
        let ether = pkt.ether().unwrap();
        assert!(ether.destination.is_broadcast());
        assert_eq!(ether.source, sha);
        assert_eq!(ether.ethertype, EtherType::ARP);

        let arp = pkt.arp().unwrap();
        assert!(arp.is_request());
        assert_eq!(arp.sender_hw_addr, sha);
        assert_eq!(arp.sender_proto_addr, spa);
        assert_eq!(arp.target_proto_addr, tpa);
        assert!(pkt.ipv4().is_none());
        assert_eq!(pkt.l4_offset(), None);
    }

    #[test]
    fn test_arp_reply_layout() {
        let sha = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
        let tha = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

        let mut pkt = Packet::new();
        init_arp_reply_packet(
            &mut pkt,
            sha,
            tha,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .unwrap();

        assert_eq!(pkt.ether().unwrap().destination, tha);
        let arp = pkt.arp().unwrap();
        assert!(arp.is_reply());
        assert_eq!(arp.target_hw_addr, tha);
    }

    #[test]
    fn test_reinit_switches_layout() {
        let mut pkt = Packet::new();
        init_empty_ipv4_tcp_packet(&mut pkt, PAYLOAD).unwrap();
        init_arp_request_packet(
            &mut pkt,
            MacAddr::zero(),
            Ipv4Addr::UNSPECIFIED,
            Ipv4Addr::UNSPECIFIED,
        )
        .unwrap();

        assert!(pkt.tcp().is_none());
        assert!(pkt.ipv4().is_none());
        assert!(pkt.arp().is_some());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut pkt = Packet::new();
        assert!(init_empty_ipv4_udp_packet(&mut pkt, DATA_ROOM_SIZE).is_err());
        assert!(pkt.is_empty());
    }

    #[test]
    fn test_overflowing_payload_rejected() {
        let mut pkt = Packet::new();
        init_empty_ipv6_tcp_packet(&mut pkt, PAYLOAD).unwrap();
        let before = pkt.as_bytes().to_vec();

        for payload in [usize::MAX, usize::MAX - 7, usize::MAX - 40] {
            assert!(matches!(
                init_empty_ipv4_udp_packet(&mut pkt, payload),
                Err(Error::PacketConstruction(_))
            ));
            assert!(matches!(
                init_empty_ipv6_tcp_packet(&mut pkt, payload),
                Err(Error::PacketConstruction(_))
            ));
        }
        assert_eq!(pkt.as_bytes(), before.as_slice());
    }
}
