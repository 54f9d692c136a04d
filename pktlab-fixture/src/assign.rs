//! Fixed test addresses written into already-initialized packets
//!
//! These functions only overwrite fields in header regions the packet
//! already has; they never allocate or change the layout.

use pktlab_core::{MacAddr, Result};
use pktlab_packet::Packet;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const TEST_SRC_MAC: MacAddr = MacAddr::new([0x01, 0x11, 0x21, 0x31, 0x41, 0x51]);
pub const TEST_DST_MAC: MacAddr = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

pub const TEST_SRC_IPV4: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);
pub const TEST_DST_IPV4: Ipv4Addr = Ipv4Addr::new(128, 9, 9, 5);

/// `dead::beaf`, used as both IPv6 source and destination
pub const TEST_IPV6: Ipv6Addr = Ipv6Addr::new(0xdead, 0, 0, 0, 0, 0, 0, 0xbeaf);

pub const TEST_SRC_PORT: u16 = 1234;
pub const TEST_DST_PORT: u16 = 5678;

pub fn assign_ether_addresses(pkt: &mut Packet) -> Result<()> {
    let mut ether = pkt.ether_mut()?;
    ether.set_source(TEST_SRC_MAC);
    ether.set_destination(TEST_DST_MAC);
    Ok(())
}

pub fn assign_ipv4_addresses(pkt: &mut Packet) -> Result<()> {
    let mut ip = pkt.ipv4_mut()?;
    ip.set_source(TEST_SRC_IPV4);
    ip.set_destination(TEST_DST_IPV4);
    Ok(())
}

pub fn assign_ipv6_addresses(pkt: &mut Packet) -> Result<()> {
    let mut ip = pkt.ipv6_mut()?;
    ip.set_source(TEST_IPV6);
    ip.set_destination(TEST_IPV6);
    Ok(())
}

/// Write the test ports through the accessor shared by TCP and UDP
pub fn assign_ports(pkt: &mut Packet) -> Result<()> {
    let mut ports = pkt.l4_ports_mut()?;
    ports.set_source_port(TEST_SRC_PORT);
    ports.set_destination_port(TEST_DST_PORT);
    Ok(())
}
