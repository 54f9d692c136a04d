//! Checksum calculations for network packets
//!
//! This module provides the Internet Checksum (RFC 1071) used in IPv4, TCP,
//! UDP and ICMP headers, plus the pseudo-header variants for transport
//! checksums over IPv4 (RFC 793/768) and IPv6 (RFC 8200 §8.1).

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// The data is treated as a sequence of big-endian 16-bit words; an odd
/// trailing byte is padded with zero. The folded sum is complemented.
///
/// # Examples
///
/// ```
/// use pktlab_packet::checksum::internet_checksum;
///
/// let data = vec![0x45, 0x00, 0x00, 0x3c];
/// let checksum = internet_checksum(&data);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold(accumulate(0, data)) as u16
}

/// Calculates the checksum for a TCP or UDP segment carried over IPv4.
///
/// The pseudo-header is source address, destination address, a zero byte,
/// the protocol number and the 16-bit segment length.
///
/// # Examples
///
/// ```
/// use pktlab_packet::checksum::transport_checksum;
///
/// let src_ip = [192, 168, 1, 1];
/// let dst_ip = [192, 168, 1, 2];
/// let data = vec![0x00, 0x35, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00];
/// let checksum = transport_checksum(&src_ip, &dst_ip, 17, &data);
/// ```
pub fn transport_checksum(src_ip: &[u8; 4], dst_ip: &[u8; 4], protocol: u8, data: &[u8]) -> u16 {
    let mut sum = accumulate(0, src_ip);
    sum = accumulate(sum, dst_ip);
    sum += protocol as u32;
    sum += data.len() as u32;
    sum = accumulate(sum, data);

    !fold(sum) as u16
}

/// Calculates the checksum for an upper-layer packet carried over IPv6.
///
/// The pseudo-header is source address, destination address, the 32-bit
/// upper-layer length, three zero bytes and the next-header value.
pub fn transport_checksum_v6(
    src_ip: &[u8; 16],
    dst_ip: &[u8; 16],
    next_header: u8,
    data: &[u8],
) -> u16 {
    let mut sum = accumulate(0, src_ip);
    sum = accumulate(sum, dst_ip);
    sum = accumulate(sum, &(data.len() as u32).to_be_bytes());
    sum += next_header as u32;
    sum = accumulate(sum, data);

    !fold(sum) as u16
}

/// Validates an Internet checksum.
///
/// Summing data that includes its own checksum field yields 0 (or 0xFFFF,
/// its one's complement twin) when the checksum is correct.
pub fn validate_checksum(data: &[u8]) -> bool {
    let result = internet_checksum(data);
    result == 0 || result == 0xFFFF
}

fn accumulate(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    // Keep headroom for the next accumulate call
    fold(sum)
}

fn fold(mut sum: u32) -> u32 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum
}
