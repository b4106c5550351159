//! Rendering of tuning results: byte sizes, sysctl directives, reports.

mod bytes;
mod sysctl;

pub use bytes::{format_bytes, human_bytes, UNITS};
pub use sysctl::{
    directives, persisted_path_note, render_directives, Directive, DirectiveStyle,
    PERSISTED_CONFIG_PATH,
};

use serde::Serialize;

use crate::tuning::{DefaultPolicy, Direction, TcpParams};
use crate::types::{format_bandwidth, NetworkInput};

/// Serializable summary of one calculation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: NetworkInput,
    pub policy: DefaultPolicy,
    pub params: TcpParams,
    pub bdp_human: String,
    pub link_rate: String,
    pub warnings: Vec<String>,
    #[serde(skip)]
    decimals: usize,
}

impl Report {
    pub fn new(input: NetworkInput, policy: DefaultPolicy, params: TcpParams) -> Self {
        Self::with_decimals(input, policy, params, 2)
    }

    /// Like [`Report::new`], rounding human-readable sizes to `decimals`.
    pub fn with_decimals(
        input: NetworkInput,
        policy: DefaultPolicy,
        params: TcpParams,
        decimals: usize,
    ) -> Self {
        let warnings = params
            .unordered_directions()
            .into_iter()
            .map(|direction| {
                let range = params.range(direction);
                format!(
                    "{} default {} exceeds max {}",
                    direction.range_key(),
                    range.default,
                    range.max
                )
            })
            .collect();

        Self {
            input,
            policy,
            params,
            bdp_human: format_bytes(params.bdp_bytes, decimals),
            decimals,
            link_rate: format_bandwidth(input.bandwidth_mbps),
            warnings,
        }
    }

    /// Whether any triple is out of order.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Rows of `(parameter, value, human size)` for tabular output.
    pub fn rows(&self) -> Vec<[String; 3]> {
        let mut rows = vec![[
            "bdp".to_string(),
            self.params.bdp_bytes.to_string(),
            self.bdp_human.clone(),
        ]];
        for direction in [Direction::Receive, Direction::Send] {
            let max = self.params.max(direction);
            rows.push([
                direction.max_key().to_string(),
                max.to_string(),
                format_bytes(max, self.decimals),
            ]);
        }
        for direction in [Direction::Receive, Direction::Send] {
            let range = self.params.range(direction);
            rows.push([
                direction.range_key().to_string(),
                range.to_string(),
                format!("max {}", format_bytes(range.max, self.decimals)),
            ]);
        }
        rows
    }
}
