//! sysctl directive rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tuning::{Direction, TcpParams};

/// Conventional drop-in location for the file-style output on Debian-family
/// systems. Documentation only; nothing is written there.
pub const PERSISTED_CONFIG_PATH: &str = "/etc/sysctl.d/99-tcp-tuning.conf";

/// A single `key = value` kernel parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub key: &'static str,
    pub value: String,
}

impl Directive {
    /// Values with spaces (the triples) need quoting on a shell command line.
    fn needs_quotes(&self) -> bool {
        self.value.contains(' ')
    }
}

/// How directives are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveStyle {
    /// `sudo sysctl -w key=value`, applied immediately, lost on reboot.
    #[default]
    Command,
    /// `key = value`, for a file under `/etc/sysctl.d/`.
    File,
}

impl fmt::Display for DirectiveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveStyle::Command => write!(f, "command"),
            DirectiveStyle::File => write!(f, "file"),
        }
    }
}

/// The four directives for `params`, in kernel order.
pub fn directives(params: &TcpParams) -> [Directive; 4] {
    [
        Directive {
            key: Direction::Receive.max_key(),
            value: params.rmem_max.to_string(),
        },
        Directive {
            key: Direction::Send.max_key(),
            value: params.wmem_max.to_string(),
        },
        Directive {
            key: Direction::Receive.range_key(),
            value: params.tcp_rmem.to_string(),
        },
        Directive {
            key: Direction::Send.range_key(),
            value: params.tcp_wmem.to_string(),
        },
    ]
}

/// Render all directives in `style`, one per line, no trailing newline.
pub fn render_directives(params: &TcpParams, style: DirectiveStyle) -> String {
    directives(params)
        .iter()
        .map(|d| match style {
            DirectiveStyle::Command if d.needs_quotes() => {
                format!("sudo sysctl -w {}=\"{}\"", d.key, d.value)
            }
            DirectiveStyle::Command => format!("sudo sysctl -w {}={}", d.key, d.value),
            DirectiveStyle::File => format!("{} = {}", d.key, d.value),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instructions accompanying the file-style output.
pub fn persisted_path_note() -> String {
    format!(
        "For Debian-family systems: create {PERSISTED_CONFIG_PATH} with the lines below, \
         then run `sudo sysctl --system`."
    )
}
