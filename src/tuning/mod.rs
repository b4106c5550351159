//! TCP buffer tuning derived from the bandwidth-delay product.
//!
//! The kernel exposes two kinds of knobs:
//! - `net.core.{r,w}mem_max`: hard per-socket ceiling for `SO_RCVBUF`/`SO_SNDBUF`
//! - `net.ipv4.tcp_{r,w}mem`: `(min, default, max)` autotuning bounds
//!
//! Both ceilings are set to the BDP, floored at 64 KiB. The middle value of
//! each triple comes from a fixed table of kernel conventions and does not
//! follow the BDP; see [`DefaultPolicy`] for what happens when the
//! convention exceeds the computed ceiling.

mod calculator;

pub use calculator::{bdp_bytes, calculate, calculate_with};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest per-socket buffer the kernel is told to shrink to.
pub const MIN_BUFFER: u64 = 4096;

/// Floor for the computed maximum, so tiny BDPs don't starve sockets.
pub const MAX_BUFFER_FLOOR: u64 = 65536;

/// Transfer direction of a socket buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Receive,
    Send,
}

impl Direction {
    /// Kernel-convention default buffer size for this direction.
    pub const fn conventional_default(self) -> u64 {
        match self {
            Direction::Receive => 87380,
            Direction::Send => 65536,
        }
    }

    /// `net.ipv4.tcp_rmem` / `net.ipv4.tcp_wmem`.
    pub const fn range_key(self) -> &'static str {
        match self {
            Direction::Receive => "net.ipv4.tcp_rmem",
            Direction::Send => "net.ipv4.tcp_wmem",
        }
    }

    /// `net.core.rmem_max` / `net.core.wmem_max`.
    pub const fn max_key(self) -> &'static str {
        match self {
            Direction::Receive => "net.core.rmem_max",
            Direction::Send => "net.core.wmem_max",
        }
    }
}

/// How the middle value of a buffer triple is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Always the kernel-convention constant (87380 receive, 65536 send).
    ///
    /// When the BDP is below 87380 the receive triple comes out as
    /// `(4096, 87380, 65536)`, i.e. default above max. This is the
    /// established output of the tool and stays the default.
    #[default]
    Conventional,
    /// The convention, capped at the computed maximum. Always ordered.
    Clamped,
}

impl DefaultPolicy {
    pub(crate) fn middle(self, direction: Direction, max_buffer: u64) -> u64 {
        let conventional = direction.conventional_default();
        match self {
            DefaultPolicy::Conventional => conventional,
            DefaultPolicy::Clamped => conventional.min(max_buffer),
        }
    }
}

impl fmt::Display for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::Conventional => write!(f, "conventional"),
            DefaultPolicy::Clamped => write!(f, "clamped"),
        }
    }
}

/// A `(min, default, max)` buffer range in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferRange {
    pub min: u64,
    pub default: u64,
    pub max: u64,
}

impl BufferRange {
    pub const fn new(min: u64, default: u64, max: u64) -> Self {
        Self { min, default, max }
    }

    /// `min <= default <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.default && self.default <= self.max
    }

    pub fn as_array(&self) -> [u64; 3] {
        [self.min, self.default, self.max]
    }
}

impl fmt::Display for BufferRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.min, self.default, self.max)
    }
}

/// Recommended kernel buffer settings for one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpParams {
    /// Bytes in flight at full rate over one RTT.
    pub bdp_bytes: u64,
    pub rmem_max: u64,
    pub wmem_max: u64,
    pub tcp_rmem: BufferRange,
    pub tcp_wmem: BufferRange,
}

impl TcpParams {
    /// Buffer range for a direction.
    pub fn range(&self, direction: Direction) -> &BufferRange {
        match direction {
            Direction::Receive => &self.tcp_rmem,
            Direction::Send => &self.tcp_wmem,
        }
    }

    /// Socket buffer ceiling for a direction.
    pub fn max(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Receive => self.rmem_max,
            Direction::Send => self.wmem_max,
        }
    }

    /// Half the computed maximum, capped at the direction's convention.
    ///
    /// Informational only: the triples never use it.
    pub fn half_max_default(&self, direction: Direction) -> u64 {
        (self.max(direction) / 2).min(direction.conventional_default())
    }

    /// Whether both triples satisfy `min <= default <= max`.
    pub fn is_ordered(&self) -> bool {
        self.tcp_rmem.is_ordered() && self.tcp_wmem.is_ordered()
    }

    /// Directions whose triple is out of order.
    pub fn unordered_directions(&self) -> Vec<Direction> {
        [Direction::Receive, Direction::Send]
            .into_iter()
            .filter(|d| !self.range(*d).is_ordered())
            .collect()
    }
}
