//! Shared TCP/UDP port access
//!
//! TCP and UDP both place the source port at byte 0 and the destination port
//! at byte 2 of their headers. [`L4PortsMut`] writes ports through that common
//! layout for either protocol. The offsets are checked against both header
//! definitions at compile time.

use crate::{tcp, udp};

/// Byte offset of the source port from the start of a TCP or UDP header
pub const L4_SRC_PORT_OFFSET: usize = 0;

/// Byte offset of the destination port from the start of a TCP or UDP header
pub const L4_DST_PORT_OFFSET: usize = 2;

/// Smallest L4 header the shared accessor may be laid over
pub const L4_PORTS_LEN: usize = 4;

const _: () = assert!(
    tcp::SRC_PORT_OFFSET == L4_SRC_PORT_OFFSET
        && udp::SRC_PORT_OFFSET == L4_SRC_PORT_OFFSET
        && tcp::DST_PORT_OFFSET == L4_DST_PORT_OFFSET
        && udp::DST_PORT_OFFSET == L4_DST_PORT_OFFSET
);

/// Convert a 16-bit value between host and network byte order.
///
/// This is a byte swap on little-endian hosts and the identity on big-endian
/// hosts. The result's native-endian bytes are the network-order bytes.
#[inline]
pub const fn swap_bytes_u16(value: u16) -> u16 {
    value.to_be()
}

/// Mutable view over the port pair of a TCP or UDP header
pub struct L4PortsMut<'a> {
    buf: &'a mut [u8],
}

impl<'a> L4PortsMut<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        debug_assert!(buf.len() >= L4_PORTS_LEN);
        L4PortsMut { buf }
    }

    pub fn set_source_port(&mut self, port: u16) {
        self.write_port(L4_SRC_PORT_OFFSET, port);
    }

    pub fn set_destination_port(&mut self, port: u16) {
        self.write_port(L4_DST_PORT_OFFSET, port);
    }

    fn write_port(&mut self, offset: usize, port: u16) {
        let wire = swap_bytes_u16(port);
        self.buf[offset..offset + 2].copy_from_slice(&wire.to_ne_bytes());
    }
}

/// Read `(source, destination)` ports from the start of a TCP or UDP header
pub fn read_ports(l4: &[u8]) -> Option<(u16, u16)> {
    if l4.len() < L4_PORTS_LEN {
        return None;
    }

    let src = u16::from_be_bytes([l4[L4_SRC_PORT_OFFSET], l4[L4_SRC_PORT_OFFSET + 1]]);
    let dst = u16::from_be_bytes([l4[L4_DST_PORT_OFFSET], l4[L4_DST_PORT_OFFSET + 1]]);
    Some((src, dst))
}
