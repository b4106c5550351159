//! Core input types used throughout tcptune.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bandwidth used when none is given, in Mbps.
pub const DEFAULT_BANDWIDTH_MBPS: f64 = 1000.0;

/// Round-trip time used when none is given, in ms.
pub const DEFAULT_RTT_MS: f64 = 50.0;

/// Link characteristics a tuning is computed from.
///
/// The calculator is total over any pair of `f64`s; [`NetworkInput::new`]
/// is where out-of-domain values are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkInput {
    /// Link bandwidth in megabits per second.
    pub bandwidth_mbps: f64,
    /// Round-trip time in milliseconds.
    pub rtt_ms: f64,
}

impl NetworkInput {
    /// Create a validated input. NaN, infinite and negative values are rejected.
    pub fn new(bandwidth_mbps: f64, rtt_ms: f64) -> Result<Self> {
        validate_quantity("bandwidth", bandwidth_mbps)?;
        validate_quantity("rtt", rtt_ms)?;
        Ok(Self {
            bandwidth_mbps,
            rtt_ms,
        })
    }

    /// Create an input without validation.
    pub const fn unchecked(bandwidth_mbps: f64, rtt_ms: f64) -> Self {
        Self {
            bandwidth_mbps,
            rtt_ms,
        }
    }

    /// Apply presentation-layer clamping (slider bounds and step).
    pub fn snapped(self) -> Self {
        Self {
            bandwidth_mbps: BANDWIDTH_RANGE.snap(self.bandwidth_mbps),
            rtt_ms: RTT_RANGE.snap(self.rtt_ms),
        }
    }
}

impl Default for NetworkInput {
    fn default() -> Self {
        Self::unchecked(DEFAULT_BANDWIDTH_MBPS, DEFAULT_RTT_MS)
    }
}

impl fmt::Display for NetworkInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} ms", format_bandwidth(self.bandwidth_mbps), self.rtt_ms)
    }
}

fn validate_quantity(field: &'static str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(Error::invalid_input(field, "not a number"));
    }
    if value.is_infinite() {
        return Err(Error::invalid_input(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(Error::invalid_input(
            field,
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(())
}

/// Bounded, stepped range used to clamp interactive input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Recommended bandwidth range (Mbps).
pub const BANDWIDTH_RANGE: InputRange = InputRange {
    min: 10.0,
    max: 10_000.0,
    step: 10.0,
};

/// Recommended RTT range (ms).
pub const RTT_RANGE: InputRange = InputRange {
    min: 1.0,
    max: 500.0,
    step: 1.0,
};

impl InputRange {
    /// Bound `value` to `[min, max]`. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Clamp, then round to the nearest step counted from `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Position of `value` within the range, in `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Named link profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Local network: gigabit, sub-millisecond to 1 ms.
    Lan,
    /// Typical internet path.
    Wan,
    /// Long fat pipe: 10 Gbps across a continent.
    HighSpeed,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Lan, Preset::Wan, Preset::HighSpeed];

    pub fn input(self) -> NetworkInput {
        match self {
            Preset::Lan => NetworkInput::unchecked(1000.0, 1.0),
            Preset::Wan => NetworkInput::unchecked(100.0, 50.0),
            Preset::HighSpeed => NetworkInput::unchecked(10_000.0, 100.0),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Lan => write!(f, "LAN"),
            Preset::Wan => write!(f, "WAN"),
            Preset::HighSpeed => write!(f, "HIGH_SPEED"),
        }
    }
}

/// Human-readable link rate: Gbps with one decimal from 1000 Mbps up.
pub fn format_bandwidth(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.1} Gbps", mbps / 1000.0)
    } else {
        format!("{mbps} Mbps")
    }
}
