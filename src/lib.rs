//! # tcptune
//!
//! Linux TCP buffer tuning from the bandwidth-delay product.
//!
//! Given a link's bandwidth and round-trip time, tcptune computes how many
//! bytes can be in flight at once and sizes the kernel's socket buffer
//! limits to match, rendering the result as `sysctl` directives.
//!
//! ## Architecture
//!
//! ┌──────────────────────────────────────────────────────┐
//! │              CLI (clap) / library callers            │
//! ├──────────────────────────────────────────────────────┤
//! │   NetworkInput ──► tuning::calculate ──► TcpParams   │
//! ├───────────────────────────┬──────────────────────────┤
//! │  render: bytes, sysctl    │  advisor: best-effort    │
//! │  directives, reports      │  hosted-model commentary │
//! └───────────────────────────┴──────────────────────────┘
//!
//! The calculator and renderer are pure. The advisor is the only fallible,
//! asynchronous part and always degrades to a fixed message.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow stylistic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]              // ASCII diagrams in docs
#![allow(clippy::unreadable_literal)]        // Kernel constants are written as the kernel prints them
#![allow(clippy::cast_possible_truncation)]  // Saturating float-to-int casts
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]       // Byte counts rendered as f64
#![allow(clippy::option_if_let_else)]
#![allow(clippy::use_self)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::future_not_send)]

pub mod advisor;
pub mod config;
pub mod error;
pub mod render;
pub mod tuning;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::Config;
pub use error::{Error, Result};
pub use tuning::{calculate, calculate_with, TcpParams};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::advisor::{Advisor, AdvisorConfig, InsightProvider, InsightSession};
    pub use crate::config::Config;
    pub use crate::error::{AdvisorError, Error, Result};
    pub use crate::render::{format_bytes, human_bytes, render_directives, DirectiveStyle, Report};
    pub use crate::tuning::{calculate, calculate_with, BufferRange, DefaultPolicy, Direction, TcpParams};
    pub use crate::types::*;
}
