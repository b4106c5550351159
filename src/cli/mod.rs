//! Command-line interface for tcptune.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// tcptune - Linux TCP buffer tuning from the bandwidth-delay product
#[derive(Parser, Debug)]
#[command(
    name = "tcptune",
    author,
    version,
    about = "Compute Linux TCP buffer sysctls from link bandwidth and round-trip time",
    long_about = r#"
tcptune sizes the kernel's TCP socket buffers to a link's bandwidth-delay
product (BDP) and prints the matching sysctl settings:

  - net.core.rmem_max / net.core.wmem_max
  - net.ipv4.tcp_rmem / net.ipv4.tcp_wmem

Nothing is applied to the running system; the output is for you to review.

QUICK START:
  tcptune calc --bandwidth 1000 --rtt 50
  tcptune sysctl --preset high-speed --style file
  tcptune insights --bandwidth 10000 --rtt 120
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate and show the full tuning summary
    Calc(CalcArgs),

    /// Print sysctl directives only
    Sysctl(SysctlArgs),

    /// Ask the advisory service to comment on a tuning
    Insights(InsightsArgs),

    /// Recalculate for each "<bandwidth> <rtt>" line read from stdin
    Interactive(InteractiveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show example configuration
    Config(ConfigArgs),
}

/// Link characteristics shared by the calculating commands
#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// Link bandwidth in Mbps
    #[arg(short, long)]
    pub bandwidth: Option<f64>,

    /// Round-trip time in ms
    #[arg(short, long)]
    pub rtt: Option<f64>,

    /// Start from a named link profile
    #[arg(short, long)]
    pub preset: Option<Preset>,

    /// Clamp input to the recommended ranges (10-10000 Mbps, 1-500 ms)
    #[arg(long)]
    pub clamp: bool,

    /// Cap buffer defaults at the computed maximum
    #[arg(long)]
    pub clamped_defaults: bool,
}

/// Calc command arguments
#[derive(Args, Debug)]
pub struct CalcArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Also fetch advisory commentary
    #[arg(long)]
    pub insights: bool,
}

/// Sysctl command arguments
#[derive(Args, Debug)]
pub struct SysctlArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Directive style
    #[arg(short, long, default_value = "command")]
    pub style: Style,
}

/// Insights command arguments
#[derive(Args, Debug)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Request timeout (e.g. "10s"), overrides the configuration
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<std::time::Duration>,
}

/// Interactive command arguments
#[derive(Args, Debug)]
pub struct InteractiveArgs {
    /// Clamp input to the recommended ranges
    #[arg(long)]
    pub clamp: bool,

    /// Cap buffer defaults at the computed maximum
    #[arg(long)]
    pub clamped_defaults: bool,

    /// Fetch advisory commentary; a new line cancels the pending request
    #[arg(long)]
    pub insights: bool,
}

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

/// Named link profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// 1 Gbps, 1 ms
    Lan,
    /// 100 Mbps, 50 ms
    Wan,
    /// 10 Gbps, 100 ms
    HighSpeed,
}

impl From<Preset> for crate::types::Preset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Lan => Self::Lan,
            Preset::Wan => Self::Wan,
            Preset::HighSpeed => Self::HighSpeed,
        }
    }
}

/// Directive style
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    /// sudo sysctl -w key=value
    Command,
    /// key = value (for /etc/sysctl.d)
    File,
}

impl From<Style> for crate::render::DirectiveStyle {
    fn from(s: Style) -> Self {
        match s {
            Style::Command => Self::Command,
            Style::File => Self::File,
        }
    }
}

/// Shell for completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl LinkArgs {
    /// Resolve the input: explicit flags override the preset, which
    /// overrides `fallback`.
    pub fn resolve(
        &self,
        fallback: crate::types::NetworkInput,
    ) -> crate::Result<crate::types::NetworkInput> {
        let base = self
            .preset
            .map_or(fallback, |p| crate::types::Preset::from(p).input());

        let input = crate::types::NetworkInput::new(
            self.bandwidth.unwrap_or(base.bandwidth_mbps),
            self.rtt.unwrap_or(base.rtt_ms),
        )?;

        Ok(if self.clamp { input.snapped() } else { input })
    }
}

/// Parse one interactive line: `<bandwidth> <rtt>`, separated by
/// whitespace or a comma.
pub fn parse_link_line(line: &str) -> crate::Result<crate::types::NetworkInput> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());

    let mut next = |field: &'static str| -> crate::Result<f64> {
        let raw = fields
            .next()
            .ok_or_else(|| crate::Error::invalid_input(field, "missing value"))?;
        raw.parse::<f64>()
            .map_err(|_| crate::Error::invalid_input(field, format!("not a number: {raw}")))
    };

    let bandwidth = next("bandwidth")?;
    let rtt = next("rtt")?;
    if fields.next().is_some() {
        return Err(crate::Error::invalid_input("line", "expected two values"));
    }

    crate::types::NetworkInput::new(bandwidth, rtt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkInput;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::parse_from(["tcptune", "calc", "-b", "1000", "-r", "50"]);
        match cli.command {
            Commands::Calc(args) => {
                assert_eq!(args.link.bandwidth, Some(1000.0));
                assert_eq!(args.link.rtt, Some(50.0));
                assert!(!args.insights);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sysctl_style_flag() {
        let cli = Cli::parse_from(["tcptune", "sysctl", "--style", "file", "--preset", "high-speed"]);
        match cli.command {
            Commands::Sysctl(args) => {
                assert_eq!(args.style, Style::File);
                assert_eq!(args.link.preset, Some(Preset::HighSpeed));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_link_args_precedence() {
        let args = LinkArgs {
            rtt: Some(20.0),
            preset: Some(Preset::Wan),
            ..Default::default()
        };
        let input = args.resolve(NetworkInput::default()).unwrap();
        assert_eq!(input, NetworkInput::unchecked(100.0, 20.0));

        let input = LinkArgs::default().resolve(NetworkInput::default()).unwrap();
        assert_eq!(input, NetworkInput::default());
    }

    #[test]
    fn test_link_args_clamp_and_reject() {
        let args = LinkArgs {
            bandwidth: Some(25_000.0),
            rtt: Some(0.0),
            clamp: true,
            ..Default::default()
        };
        let input = args.resolve(NetworkInput::default()).unwrap();
        assert_eq!(input, NetworkInput::unchecked(10_000.0, 1.0));

        let args = LinkArgs {
            bandwidth: Some(-1.0),
            clamp: true,
            ..Default::default()
        };
        assert!(args.resolve(NetworkInput::default()).is_err());
    }

    #[test]
    fn test_parse_link_line() {
        assert_eq!(
            parse_link_line("1000 50").unwrap(),
            NetworkInput::unchecked(1000.0, 50.0)
        );
        assert_eq!(
            parse_link_line(" 10, 1.5 ").unwrap(),
            NetworkInput::unchecked(10.0, 1.5)
        );
        assert!(parse_link_line("1000").is_err());
        assert!(parse_link_line("fast 50").is_err());
        assert!(parse_link_line("1 2 3").is_err());
        assert!(parse_link_line("-1 2").is_err());
    }
}
