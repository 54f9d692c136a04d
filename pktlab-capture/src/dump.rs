//! Development-mode capture dumps
//!
//! [`CaptureWriter`] writes fixture packets to `<name>.pcap` so they can be
//! inspected in a packet analyzer. Dumps are off unless development mode is
//! enabled, so ordinary test runs leave no files behind.
//!
//! A dump runs four steps: create the file, write the global header, write
//! the records, close the file. A failed step is logged and recorded in the
//! returned [`DumpReport`], and the remaining steps are still attempted.

use crate::pcap::{write_pcap_global_hdr, WritePcap};
use pktlab_core::{Error, Result};
use pktlab_packet::Packet;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Build-time default for whether dumps are written
pub const DEVELOPMENT_MODE: bool = false;

/// File extension appended to dump names
pub const CAPTURE_EXTENSION: &str = "pcap";

/// One step of a capture dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStep {
    Create,
    GlobalHeader,
    /// Record for the packet at this index
    Record(usize),
    Close,
}

impl fmt::Display for DumpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::GlobalHeader => write!(f, "global header"),
            Self::Record(index) => write!(f, "record {}", index),
            Self::Close => write!(f, "close"),
        }
    }
}

/// A step that failed, with its error
#[derive(Debug)]
pub struct DumpFailure {
    pub step: DumpStep,
    pub error: Error,
}

/// Outcome of a dump
#[derive(Debug, Default)]
pub struct DumpReport {
    path: Option<PathBuf>,
    records_written: usize,
    failures: Vec<DumpFailure>,
}

impl DumpReport {
    /// Report for a dump skipped because development mode is off
    fn skipped() -> Self {
        Self::default()
    }

    /// Target file, or `None` when the dump was skipped
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn was_skipped(&self) -> bool {
        self.path.is_none()
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn failures(&self) -> &[DumpFailure] {
        &self.failures
    }

    /// Errors from every failed step, in step order
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.failures.iter().map(|failure| &failure.error)
    }

    /// True when no step failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: DumpStep, result: Result<()>) {
        match result {
            Ok(()) => {
                if let DumpStep::Record(_) = step {
                    self.records_written += 1;
                }
                debug!(%step, "Capture step completed");
            }
            Err(err) => {
                match &self.path {
                    Some(path) => {
                        error!(%step, path = %path.display(), "Capture step failed: {}", err)
                    }
                    None => error!(%step, "Capture step failed: {}", err),
                }
                self.failures.push(DumpFailure { step, error: err });
            }
        }
    }
}

/// Writes packets to `<output_dir>/<name>.pcap` when development mode is on
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    development_mode: bool,
    output_dir: PathBuf,
}

impl Default for CaptureWriter {
    fn default() -> Self {
        Self::new(DEVELOPMENT_MODE)
    }
}

impl CaptureWriter {
    /// Create a writer targeting the current directory
    pub fn new(development_mode: bool) -> Self {
        Self {
            development_mode,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.development_mode
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a dump named `name` would be written to
    pub fn capture_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", name, CAPTURE_EXTENSION))
    }

    /// Dump a single packet to `<name>.pcap`
    pub fn dump_packet(&self, name: &str, packet: &Packet) -> DumpReport {
        self.dump_packets(name, [packet])
    }

    /// Dump several packets, in order, to one `<name>.pcap`
    pub fn dump_packets<'a, I>(&self, name: &str, packets: I) -> DumpReport
    where
        I: IntoIterator<Item = &'a Packet>,
    {
        if !self.development_mode {
            debug!(name, "Development mode off, capture dump skipped");
            return DumpReport::skipped();
        }

        let path = self.capture_path(name);
        let mut report = DumpReport {
            path: Some(path.clone()),
            ..DumpReport::default()
        };

        run_steps(|| File::create(&path), packets, &mut report);
        report
    }
}

/// Destination of a dump that can report errors when it is closed
trait CaptureSink: Write {
    fn close(self) -> io::Result<()>;
}

impl CaptureSink for File {
    fn close(mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

/// Run every dump step against the sink produced by `open`
///
/// Steps write straight to the sink, so a failure is reported at the step
/// that caused it. The sink is owned by this frame and closed or dropped
/// before returning, whichever steps failed.
fn run_steps<'a, W, F, I>(open: F, packets: I, report: &mut DumpReport)
where
    W: CaptureSink,
    F: FnOnce() -> io::Result<W>,
    I: IntoIterator<Item = &'a Packet>,
{
    let mut sink = match open() {
        Ok(sink) => Some(sink),
        Err(err) => {
            report.record(DumpStep::Create, Err(err.into()));
            None
        }
    };

    report.record(
        DumpStep::GlobalHeader,
        with_sink(&mut sink, |w| write_pcap_global_hdr(w)),
    );

    for (index, packet) in packets.into_iter().enumerate() {
        report.record(
            DumpStep::Record(index),
            with_sink(&mut sink, |w| packet.write_pcap_one_packet(w)),
        );
    }

    let closed = match sink.take() {
        Some(sink) => sink.close().map_err(Error::from),
        None => Err(not_open()),
    };
    report.record(DumpStep::Close, closed);
}

fn not_open() -> Error {
    Error::Capture("capture file is not open".to_string())
}

fn with_sink<W, F>(sink: &mut Option<W>, op: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut W) -> Result<()>,
{
    match sink {
        Some(w) => op(w),
        None => Err(not_open()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcap::{GLOBAL_HEADER_LEN, RECORD_HEADER_LEN};
    use pktlab_packet::init::init_empty_ipv4_tcp_packet;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Sink that fails every write after `fail_after` bytes and records
    /// whether it was dropped
    struct FaultySink {
        written: Rc<RefCell<Vec<u8>>>,
        fail_after: usize,
        write_calls: Rc<Cell<usize>>,
        dropped: Rc<Cell<bool>>,
    }

    impl Write for FaultySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_calls.set(self.write_calls.get() + 1);
            let mut written = self.written.borrow_mut();
            if written.len() + buf.len() > self.fail_after {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CaptureSink for FaultySink {
        fn close(mut self) -> io::Result<()> {
            self.flush()
        }
    }

    impl CaptureSink for Vec<u8> {
        fn close(self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for FaultySink {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    fn test_packet() -> Packet {
        let mut pkt = Packet::new();
        init_empty_ipv4_tcp_packet(&mut pkt, 16).unwrap();
        pkt
    }

    #[test]
    fn test_disabled_writer_skips() {
        let writer = CaptureWriter::new(false).with_output_dir("/nonexistent/dir");
        let report = writer.dump_packet("skipped", &test_packet());

        assert!(report.was_skipped());
        assert!(report.is_clean());
        assert_eq!(report.records_written(), 0);
    }

    #[test]
    fn test_default_follows_build_constant() {
        assert_eq!(CaptureWriter::default().is_enabled(), DEVELOPMENT_MODE);
        assert!(!DEVELOPMENT_MODE);
    }

    #[test]
    fn test_capture_path() {
        let writer = CaptureWriter::new(true).with_output_dir("/tmp/out");
        assert_eq!(
            writer.capture_path("ipv4_udp"),
            PathBuf::from("/tmp/out/ipv4_udp.pcap")
        );
    }

    #[test]
    fn test_steps_continue_after_write_failure() {
        let written = Rc::new(RefCell::new(Vec::new()));
        let write_calls = Rc::new(Cell::new(0));
        let dropped = Rc::new(Cell::new(false));

        let sink = FaultySink {
            written: Rc::clone(&written),
            fail_after: GLOBAL_HEADER_LEN,
            write_calls: Rc::clone(&write_calls),
            dropped: Rc::clone(&dropped),
        };

        let pkt = test_packet();
        let mut report = DumpReport {
            path: Some(PathBuf::from("faulty.pcap")),
            ..DumpReport::default()
        };
        run_steps(|| Ok(sink), [&pkt, &pkt], &mut report);

        // Header succeeded, both records failed, close still ran
        assert_eq!(written.borrow().len(), GLOBAL_HEADER_LEN);
        assert_eq!(write_calls.get(), 3);
        assert_eq!(report.records_written(), 0);

        let steps: Vec<_> = report.failures().iter().map(|f| f.step).collect();
        assert_eq!(steps, vec![DumpStep::Record(0), DumpStep::Record(1)]);
        assert!(dropped.get());
    }

    #[test]
    fn test_open_failure_reports_every_step() {
        let pkt = test_packet();
        let mut report = DumpReport {
            path: Some(PathBuf::from("unopened.pcap")),
            ..DumpReport::default()
        };
        run_steps(
            || -> io::Result<Vec<u8>> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            },
            [&pkt],
            &mut report,
        );

        let steps: Vec<_> = report.failures().iter().map(|f| f.step).collect();
        assert_eq!(
            steps,
            vec![
                DumpStep::Create,
                DumpStep::GlobalHeader,
                DumpStep::Record(0),
                DumpStep::Close
            ]
        );
        assert!(matches!(report.failures()[0].error, Error::Io(_)));
        assert_eq!(report.errors().count(), 4);
    }

    #[test]
    fn test_successful_steps_into_memory() {
        let pkt = test_packet();
        let mut report = DumpReport {
            path: Some(PathBuf::from("memory.pcap")),
            ..DumpReport::default()
        };
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let sink = FaultySink {
            written: Rc::clone(&buffer),
            fail_after: usize::MAX,
            write_calls: Rc::new(Cell::new(0)),
            dropped: Rc::new(Cell::new(false)),
        };
        run_steps(|| Ok(sink), [&pkt], &mut report);

        assert!(report.is_clean());
        assert_eq!(report.records_written(), 1);
        assert_eq!(
            buffer.borrow().len(),
            GLOBAL_HEADER_LEN + RECORD_HEADER_LEN + pkt.len()
        );
    }
}
