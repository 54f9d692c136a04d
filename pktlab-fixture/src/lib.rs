//! Deterministic protocol test packets
//!
//! - [`bootstrap`] - [`InitContext`], one-time environment and pool setup
//! - [`factory`] - [`PacketFactory`], one builder per protocol combination
//! - [`assign`] - The fixed MAC/IP/port values and the functions writing them
//! - [`scenario`] - [`Scenario`] names for the supported combinations
//!
//! ## Example
//!
//! ```rust
//! use pktlab_fixture::{InitContext, PacketFactory};
//!
//! let mut ctx = InitContext::new();
//! let pool = ctx.ensure_initialized().unwrap();
//!
//! let pkt = PacketFactory::new(pool).ipv4_udp().unwrap();
//! assert_eq!(pkt.ports(), Some((1234, 5678)));
//! assert_eq!(pkt.len(), 142);
//! ```

pub mod assign;
pub mod bootstrap;
pub mod factory;
pub mod scenario;

pub use assign::{
    TEST_DST_IPV4, TEST_DST_MAC, TEST_DST_PORT, TEST_IPV6, TEST_SRC_IPV4, TEST_SRC_MAC,
    TEST_SRC_PORT,
};
pub use bootstrap::{InitContext, TEST_POOL_NAME};
pub use factory::{PacketFactory, PAYLOAD_SIZE};
pub use scenario::{ArpAddrs, Scenario};
