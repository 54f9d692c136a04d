//! Packet-memory environment and buffer pools
//!
//! [`Environment::init`] validates the allocator tuning parameters and the
//! EAL-style argument list once; [`Environment::create_mempool`] then hands out
//! named pools whose buffers are [`Packet`]s. A packet returns its slot to the
//! pool when dropped.

use crate::packet::Packet;
use parking_lot::Mutex;
use pktlab_core::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Largest per-core cache a pool accepts
pub const MAX_CACHE_SIZE: u32 = 512;

/// Allocator tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvConfig {
    /// Packets moved per burst
    pub burst_size: u32,
    /// Buffers per pool
    pub mbuf_number: u32,
    /// Per-core buffer cache
    pub mbuf_cache_size: u32,
    /// Extra environment flags; none are defined, so this must be 0
    pub flags: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            burst_size: 32,
            mbuf_number: 8191,
            mbuf_cache_size: 250,
            flags: 0,
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<()> {
        if self.burst_size == 0 {
            return Err(Error::invalid_parameter("burst_size", "must be non-zero"));
        }
        if self.mbuf_number == 0 {
            return Err(Error::invalid_parameter("mbuf_number", "must be non-zero"));
        }
        if self.burst_size > self.mbuf_number {
            return Err(Error::invalid_parameter(
                "burst_size",
                "must not exceed mbuf_number",
            ));
        }
        if self.mbuf_cache_size > MAX_CACHE_SIZE {
            return Err(Error::invalid_parameter(
                "mbuf_cache_size",
                "must not exceed 512",
            ));
        }
        if self.mbuf_cache_size > self.mbuf_number {
            return Err(Error::invalid_parameter(
                "mbuf_cache_size",
                "must not exceed mbuf_number",
            ));
        }
        if self.flags != 0 {
            return Err(Error::InvalidParameter {
                name: "flags".into(),
                reason: format!("unknown bits 0x{:x}", self.flags),
            });
        }
        Ok(())
    }
}

/// Parsed EAL-style environment arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvArgs {
    /// Run without hugepages (`--no-huge`)
    pub no_huge: bool,
    /// Cores to run on (`-l 0-3` or `-l 0,2`); empty means all
    pub cores: Vec<u32>,
    /// Memory to preallocate in MB (`--socket-mem`)
    pub socket_mem_mb: Option<u32>,
}

impl EnvArgs {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut parsed = EnvArgs::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            match arg {
                "--no-huge" => parsed.no_huge = true,
                "-l" => {
                    let list = iter
                        .next()
                        .ok_or_else(|| Error::invalid_parameter("-l", "missing core list"))?;
                    parsed.cores = parse_core_list(list)?;
                }
                "--socket-mem" => {
                    let mb = iter.next().ok_or_else(|| {
                        Error::invalid_parameter("--socket-mem", "missing size")
                    })?;
                    let mb = mb.parse::<u32>().map_err(|_| {
                        Error::invalid_parameter("--socket-mem", "expected megabytes")
                    })?;
                    parsed.socket_mem_mb = Some(mb);
                }
                other => {
                    return Err(Error::InvalidParameter {
                        name: other.to_string(),
                        reason: "unknown environment argument".into(),
                    })
                }
            }
        }

        Ok(parsed)
    }
}

fn parse_core_list(list: &str) -> Result<Vec<u32>> {
    let invalid = || Error::InvalidParameter {
        name: "-l".into(),
        reason: format!("invalid core list '{}'", list),
    };

    let mut cores = Vec::new();
    for part in list.split(',') {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: u32 = lo.trim().parse().map_err(|_| invalid())?;
                let hi: u32 = hi.trim().parse().map_err(|_| invalid())?;
                if lo > hi {
                    return Err(invalid());
                }
                cores.extend(lo..=hi);
            }
            None => cores.push(part.trim().parse().map_err(|_| invalid())?),
        }
    }

    cores.sort_unstable();
    cores.dedup();
    Ok(cores)
}

/// Initialized packet-memory environment
#[derive(Debug)]
pub struct Environment {
    config: EnvConfig,
    args: EnvArgs,
}

impl Environment {
    /// Validate `config`, parse `args` and bring the environment up
    pub fn init<S: AsRef<str>>(args: &[S], config: EnvConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::environment(format!("invalid configuration: {}", e)))?;
        let args = EnvArgs::parse(args)
            .map_err(|e| Error::environment(format!("invalid arguments: {}", e)))?;

        info!(
            burst_size = config.burst_size,
            mbuf_number = config.mbuf_number,
            mbuf_cache_size = config.mbuf_cache_size,
            "Packet environment initialized"
        );

        Ok(Self { config, args })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn args(&self) -> &EnvArgs {
        &self.args
    }

    /// Create a named buffer pool sized from the environment configuration
    pub fn create_mempool(&self, name: &str) -> Result<Mempool> {
        if name.is_empty() {
            return Err(Error::invalid_parameter("name", "mempool name is empty"));
        }

        info!(
            "Created mempool '{}' with {} buffers",
            name, self.config.mbuf_number
        );

        Ok(Mempool {
            shared: Arc::new(PoolShared {
                name: name.to_string(),
                capacity: self.config.mbuf_number as usize,
                cache_size: self.config.mbuf_cache_size as usize,
                in_use: Mutex::new(0),
            }),
        })
    }
}

#[derive(Debug)]
struct PoolShared {
    name: String,
    capacity: usize,
    cache_size: usize,
    in_use: Mutex<usize>,
}

/// Named pool of packet buffers
///
/// Cloning a `Mempool` yields another handle to the same pool.
#[derive(Debug, Clone)]
pub struct Mempool {
    shared: Arc<PoolShared>,
}

impl Mempool {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn cache_size(&self) -> usize {
        self.shared.cache_size
    }

    /// Packets currently handed out
    pub fn in_use(&self) -> usize {
        *self.shared.in_use.lock()
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.in_use()
    }

    /// Take an empty packet from the pool
    pub fn alloc(&self) -> Result<Packet> {
        {
            let mut in_use = self.shared.in_use.lock();
            if *in_use >= self.shared.capacity {
                return Err(Error::PoolExhausted {
                    pool: self.shared.name.clone(),
                    capacity: self.shared.capacity,
                });
            }
            *in_use += 1;
        }

        debug!("Allocated packet from mempool '{}'", self.shared.name);
        Ok(Packet::with_lease(PoolLease {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Slot held by a live packet; released on drop
#[derive(Debug)]
pub(crate) struct PoolLease {
    shared: Arc<PoolShared>,
}

impl Drop for PoolLease {
    fn drop(&mut self) {
        let mut in_use = self.shared.in_use.lock();
        *in_use = in_use.saturating_sub(1);
    }
}
