//! ARP packet structure (Ethernet / IPv4 only)

use bytes::{Buf, BufMut};
use pktlab_core::MacAddr;
use std::net::Ipv4Addr;

/// ARP body size for Ethernet/IPv4
pub const HEADER_LEN: usize = 28;

/// Hardware types
pub const HTYPE_ETHERNET: u16 = 1;

/// Protocol types
pub const PTYPE_IPV4: u16 = 0x0800;

/// ARP Operation Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOpcode {
    /// ARP Request
    Request = 1,
    /// ARP Reply
    Reply = 2,
}

impl ArpOpcode {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            _ => None,
        }
    }
}

/// ARP Packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpHeader {
    /// Hardware type (1 for Ethernet)
    pub htype: u16,
    /// Protocol type (0x0800 for IPv4)
    pub ptype: u16,
    /// Hardware address length (6 for MAC)
    pub hlen: u8,
    /// Protocol address length (4 for IPv4)
    pub plen: u8,
    /// Operation
    pub operation: ArpOpcode,
    /// Sender hardware address
    pub sender_hw_addr: MacAddr,
    /// Sender protocol address
    pub sender_proto_addr: Ipv4Addr,
    /// Target hardware address
    pub target_hw_addr: MacAddr,
    /// Target protocol address
    pub target_proto_addr: Ipv4Addr,
}

impl ArpHeader {
    /// Create new ARP request; the target hardware address is unknown
    pub fn new_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Request,
            sender_hw_addr: sender_mac,
            sender_proto_addr: sender_ip,
            target_hw_addr: MacAddr::zero(),
            target_proto_addr: target_ip,
        }
    }

    /// Create new ARP reply
    pub fn new_reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self {
            operation: ArpOpcode::Reply,
            target_hw_addr: target_mac,
            ..Self::new_request(sender_mac, sender_ip, target_ip)
        }
    }

    /// Parse ARP packet from bytes; `None` on short input or unknown opcode
    pub fn parse(mut data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN {
            return None;
        }

        let htype = data.get_u16();
        let ptype = data.get_u16();
        let hlen = data.get_u8();
        let plen = data.get_u8();
        let operation = ArpOpcode::from_u16(data.get_u16())?;

        let sender_hw_addr = MacAddr::from_slice(&data[..6])?;
        data.advance(6);
        let sender_proto_addr = Ipv4Addr::from(data.get_u32());
        let target_hw_addr = MacAddr::from_slice(&data[..6])?;
        data.advance(6);
        let target_proto_addr = Ipv4Addr::from(data.get_u32());

        Some(Self {
            htype,
            ptype,
            hlen,
            plen,
            operation,
            sender_hw_addr,
            sender_proto_addr,
            target_hw_addr,
            target_proto_addr,
        })
    }

    /// Serialize the ARP body into the first [`HEADER_LEN`] bytes of `buf`
    pub fn write(&self, mut buf: &mut [u8]) {
        buf.put_u16(self.htype);
        buf.put_u16(self.ptype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.plen);
        buf.put_u16(self.operation as u16);
        buf.put_slice(self.sender_hw_addr.as_bytes());
        buf.put_slice(&self.sender_proto_addr.octets());
        buf.put_slice(self.target_hw_addr.as_bytes());
        buf.put_slice(&self.target_proto_addr.octets());
    }

    /// Check if this is a request
    pub fn is_request(&self) -> bool {
        self.operation == ArpOpcode::Request
    }

    /// Check if this is a reply
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOpcode::Reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arp_request_creation() {
        let sender_mac = MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        let sender_ip = Ipv4Addr::new(192, 168, 1, 1);
        let target_ip = Ipv4Addr::new(192, 168, 1, 2);

        let packet = ArpHeader::new_request(sender_mac, sender_ip, target_ip);

        assert!(packet.is_request());
        assert_eq!(packet.sender_hw_addr, sender_mac);
        assert_eq!(packet.target_hw_addr, MacAddr::zero());
        assert_eq!(packet.target_proto_addr, target_ip);
    }

    #[test]
    fn test_arp_reply_keeps_target_mac() {
        let target_mac = MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        let packet = ArpHeader::new_reply(
            MacAddr([1, 2, 3, 4, 5, 6]),
            Ipv4Addr::new(10, 0, 0, 1),
            target_mac,
            Ipv4Addr::new(10, 0, 0, 2),
        );

        assert!(packet.is_reply());
        assert_eq!(packet.target_hw_addr, target_mac);
        assert_eq!(packet.htype, HTYPE_ETHERNET);
    }

    #[test]
    fn test_arp_write_parse() {
        let packet = ArpHeader::new_request(
            MacAddr([0x01, 0x11, 0x21, 0x31, 0x41, 0x51]),
            Ipv4Addr::new(127, 0, 0, 1),
            Ipv4Addr::new(128, 9, 9, 5),
        );

        let mut buf = [0u8; HEADER_LEN];
        packet.write(&mut buf);

        assert_eq!(&buf[0..8], &[0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01]);
        assert_eq!(ArpHeader::parse(&buf), Some(packet));
    }

    #[test]
    fn test_arp_parse_invalid_opcode() {
        let mut buf = [0u8; HEADER_LEN];
        buf[7] = 9;
        assert!(ArpHeader::parse(&buf).is_none());
        assert!(ArpHeader::parse(&buf[..20]).is_none());
    }
}
