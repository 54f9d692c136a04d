//! One-time packet environment setup for fixtures

use pktlab_core::Result;
use pktlab_packet::mempool::{EnvConfig, Environment};
use pktlab_packet::Mempool;
use tracing::{debug, info};

/// Name of the pool fixture packets are allocated from
pub const TEST_POOL_NAME: &str = "Test";

struct Initialized {
    env: Environment,
    pool: Mempool,
}

/// Lazily initialized environment and test pool
///
/// Setup runs on the first successful [`ensure_initialized`] call and is
/// skipped on every later one. Each context is independent, so tests that
/// need isolation can create their own.
///
/// [`ensure_initialized`]: InitContext::ensure_initialized
pub struct InitContext {
    config: EnvConfig,
    args: Vec<String>,
    state: Option<Initialized>,
    setup_count: usize,
}

impl Default for InitContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InitContext {
    /// Context using the default tuning (burst 32, 8191 buffers, cache 250)
    /// and no environment arguments
    pub fn new() -> Self {
        Self::with_config(EnvConfig::default())
    }

    pub fn with_config(config: EnvConfig) -> Self {
        Self {
            config,
            args: Vec::new(),
            state: None,
            setup_count: 0,
        }
    }

    /// Set the EAL-style arguments passed to the environment
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Initialize the environment and test pool if not done yet.
    ///
    /// On failure the context stays uninitialized and a later call retries.
    pub fn ensure_initialized(&mut self) -> Result<&Mempool> {
        let state = match self.state.take() {
            Some(state) => {
                debug!("Packet environment already initialized");
                state
            }
            None => self.setup()?,
        };
        Ok(&self.state.insert(state).pool)
    }

    fn setup(&mut self) -> Result<Initialized> {
        let env = Environment::init(&self.args, self.config)?;
        let pool = env.create_mempool(TEST_POOL_NAME)?;
        self.setup_count += 1;

        info!(pool = TEST_POOL_NAME, "Fixture environment ready");
        Ok(Initialized { env, pool })
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of times setup has completed
    pub fn setup_count(&self) -> usize {
        self.setup_count
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.state.as_ref().map(|state| &state.env)
    }

    pub fn pool(&self) -> Option<&Mempool> {
        self.state.as_ref().map(|state| &state.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktlab_core::Error;

    #[test]
    fn test_setup_runs_once() {
        let mut ctx = InitContext::new();
        assert!(!ctx.is_initialized());

        let first = ctx.ensure_initialized().unwrap().clone();
        let second = ctx.ensure_initialized().unwrap();

        assert_eq!(second.name(), TEST_POOL_NAME);
        assert_eq!(second.capacity(), 8191);
        assert_eq!(second.cache_size(), 250);
        assert_eq!(ctx.setup_count(), 1);

        // Both calls hand out the same pool
        let _pkt = first.alloc().unwrap();
        assert_eq!(ctx.pool().unwrap().in_use(), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut a = InitContext::new();
        let mut b = InitContext::new();
        a.ensure_initialized().unwrap();

        assert!(!b.is_initialized());
        b.ensure_initialized().unwrap();
        assert_eq!((a.setup_count(), b.setup_count()), (1, 1));
    }

    #[test]
    fn test_failed_setup_stays_uninitialized() {
        let config = EnvConfig {
            mbuf_number: 0,
            ..EnvConfig::default()
        };
        let mut ctx = InitContext::with_config(config);

        let err = ctx.ensure_initialized().unwrap_err();
        assert!(matches!(err, Error::Environment(_)));
        assert!(!ctx.is_initialized());
        assert_eq!(ctx.setup_count(), 0);
        assert!(ctx.environment().is_none());
    }

    #[test]
    fn test_environment_arguments() {
        let mut ctx = InitContext::new().with_args(["--no-huge", "-l", "0-1"]);
        ctx.ensure_initialized().unwrap();

        let args = ctx.environment().unwrap().args();
        assert!(args.no_huge);
        assert_eq!(args.cores, vec![0, 1]);

        let mut bad = InitContext::new().with_args(["--bogus"]);
        assert!(bad.ensure_initialized().is_err());
    }
}
