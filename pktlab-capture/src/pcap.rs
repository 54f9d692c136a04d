//! Classic libpcap file serialization
//!
//! Files are written little-endian with microsecond timestamps: one 24-byte
//! global header followed by a 16-byte record header per packet and the
//! captured bytes.

use bytes::{BufMut, BytesMut};
use pktlab_core::Result;
use pktlab_packet::Packet;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

/// Magic number for microsecond-resolution captures
pub const PCAP_MAGIC: u32 = 0xa1b2_c3d4;

pub const PCAP_VERSION_MAJOR: u16 = 2;
pub const PCAP_VERSION_MINOR: u16 = 4;

/// Default snapshot length (maximum bytes stored per packet)
pub const DEFAULT_SNAPLEN: u32 = 65535;

/// LINKTYPE_ETHERNET
pub const LINKTYPE_ETHERNET: u32 = 1;

/// Size of the file header
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Size of each per-packet record header
pub const RECORD_HEADER_LEN: usize = 16;

/// File-level header describing format version and link type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapGlobalHeader {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction, always 0
    pub thiszone: i32,
    /// Timestamp accuracy, always 0
    pub sigfigs: u32,
    pub snaplen: u32,
    pub network: u32,
}

impl Default for PcapGlobalHeader {
    fn default() -> Self {
        Self {
            magic: PCAP_MAGIC,
            version_major: PCAP_VERSION_MAJOR,
            version_minor: PCAP_VERSION_MINOR,
            thiszone: 0,
            sigfigs: 0,
            snaplen: DEFAULT_SNAPLEN,
            network: LINKTYPE_ETHERNET,
        }
    }
}

impl PcapGlobalHeader {
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(GLOBAL_HEADER_LEN);
        buf.put_u32_le(self.magic);
        buf.put_u16_le(self.version_major);
        buf.put_u16_le(self.version_minor);
        buf.put_i32_le(self.thiszone);
        buf.put_u32_le(self.sigfigs);
        buf.put_u32_le(self.snaplen);
        buf.put_u32_le(self.network);
        buf
    }
}

/// Per-packet record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapRecordHeader {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Bytes stored in the file
    pub incl_len: u32,
    /// Bytes on the wire
    pub orig_len: u32,
}

impl PcapRecordHeader {
    /// Header for a `frame_len`-byte frame seen at `timestamp`, truncated to
    /// `snaplen` stored bytes
    pub fn new(timestamp: SystemTime, frame_len: usize, snaplen: u32) -> Self {
        // Pre-epoch clocks are recorded as the epoch
        let since_epoch = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
        let orig_len = frame_len as u32;

        Self {
            ts_sec: since_epoch.as_secs() as u32,
            ts_usec: since_epoch.subsec_micros(),
            incl_len: orig_len.min(snaplen),
            orig_len,
        }
    }

    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(RECORD_HEADER_LEN);
        buf.put_u32_le(self.ts_sec);
        buf.put_u32_le(self.ts_usec);
        buf.put_u32_le(self.incl_len);
        buf.put_u32_le(self.orig_len);
        buf
    }
}

/// Write the default global header (Ethernet, snaplen 65535)
pub fn write_pcap_global_hdr<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(&PcapGlobalHeader::default().to_bytes())?;
    Ok(())
}

/// Write one record for `data` captured at `timestamp`
pub fn write_pcap_record<W: Write>(
    writer: &mut W,
    data: &[u8],
    timestamp: SystemTime,
    snaplen: u32,
) -> Result<()> {
    let header = PcapRecordHeader::new(timestamp, data.len(), snaplen);
    writer.write_all(&header.to_bytes())?;
    writer.write_all(&data[..header.incl_len as usize])?;
    Ok(())
}

/// Serialization of a packet as one capture record
pub trait WritePcap {
    /// Write a record stamped with the current time
    fn write_pcap_one_packet<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl WritePcap for Packet {
    fn write_pcap_one_packet<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_pcap_record(writer, self.as_bytes(), SystemTime::now(), DEFAULT_SNAPLEN)
    }
}

/// Streaming capture writer: global header on creation, then records
pub struct PcapWriter<W: Write> {
    inner: W,
    snaplen: u32,
    packets_written: u64,
}

impl<W: Write> PcapWriter<W> {
    /// Wrap `inner` and write the global header with the default snaplen
    pub fn new(inner: W) -> Result<Self> {
        Self::with_snaplen(inner, DEFAULT_SNAPLEN)
    }

    pub fn with_snaplen(mut inner: W, snaplen: u32) -> Result<Self> {
        let header = PcapGlobalHeader {
            snaplen,
            ..PcapGlobalHeader::default()
        };
        inner.write_all(&header.to_bytes())?;

        Ok(Self {
            inner,
            snaplen,
            packets_written: 0,
        })
    }

    /// Write `packet` stamped with the current time
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.write_packet_at(packet, SystemTime::now())
    }

    pub fn write_packet_at(&mut self, packet: &Packet, timestamp: SystemTime) -> Result<()> {
        write_pcap_record(&mut self.inner, packet.as_bytes(), timestamp, self.snaplen)?;
        self.packets_written += 1;
        Ok(())
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
