//! tcptune CLI - Linux TCP buffer tuning from the bandwidth-delay product.

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use tcptune::advisor::{
    Advisor, AdvisorConfig, InsightSession, DISABLED_NOTICE, ERROR_FALLBACK,
};
use tcptune::cli::*;
use tcptune::config::{init_logging, Config, LoggingConfig};
use tcptune::error::{AdvisorError, Error, Result};
use tcptune::render::{
    persisted_path_note, render_directives, DirectiveStyle, Report, PERSISTED_CONFIG_PATH,
};
use tcptune::tuning::{calculate_with, DefaultPolicy, TcpParams};
use tcptune::types::{NetworkInput, BANDWIDTH_RANGE, RTT_RANGE};
use tcptune::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config if specified
    let config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else if Config::default_path().exists() {
        Config::load(Config::default_path())?
    } else {
        Config::default()
    };

    // Initialize logging
    let log_config = LoggingConfig {
        level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone()),
        color: config.logging.color && !cli.no_color,
        ..config.logging.clone()
    };
    init_logging(&log_config)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!(version = VERSION, "tcptune starting");

    // Dispatch command
    match cli.command {
        Commands::Calc(args) => run_calc(args, cli.format, &config).await,
        Commands::Sysctl(args) => run_sysctl(args, cli.format, &config),
        Commands::Insights(args) => run_insights(args, cli.format, &config).await,
        Commands::Interactive(args) => run_interactive(args, &config).await,
        Commands::Completions(args) => run_completions(args),
        Commands::Config(args) => run_config(args),
    }
}

fn policy_for(clamped_defaults: bool, config: &Config) -> DefaultPolicy {
    if clamped_defaults {
        DefaultPolicy::Clamped
    } else {
        config.tuning.default_policy
    }
}

fn build_report(link: &LinkArgs, config: &Config) -> Result<Report> {
    let input = link.resolve(config.profile.input())?;
    let policy = policy_for(link.clamped_defaults, config);
    let params = calculate_with(&input, policy);
    info!(%input, bdp = params.bdp_bytes, %policy, "calculated tuning");
    Ok(Report::with_decimals(input, policy, params, config.tuning.decimals))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Full tuning summary
async fn run_calc(args: CalcArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let report = build_report(&args.link, config)?;

    let insights = if args.insights {
        Some(fetch_insights(&report.input, &report.params, &config.advisor, format).await)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let mut value =
                serde_json::to_value(&report).map_err(|e| Error::Serialization(e.to_string()))?;
            value["sysctl"] = serde_json::json!({
                "command": render_directives(&report.params, DirectiveStyle::Command),
                "file": render_directives(&report.params, DirectiveStyle::File),
                "file_path": PERSISTED_CONFIG_PATH,
            });
            if let Some(text) = insights {
                value["insights"] = serde_json::Value::String(text);
            }
            println!("{}", to_json(&value)?);
        }
        OutputFormat::Table => {
            print_table(&report);
            println!();
            println!("{}", render_directives(&report.params, DirectiveStyle::Command));
            if let Some(text) = insights {
                println!();
                println!("{text}");
            }
        }
        OutputFormat::Text => {
            print_banner();
            print_summary(&report);

            println!();
            println!("{}", "Temporary modification:".bright_white().bold());
            println!("  {}", "Applies immediately, lost on reboot.".dimmed());
            println!("{}", "─".repeat(60));
            println!("{}", render_directives(&report.params, DirectiveStyle::Command).bright_green());
            println!("{}", "─".repeat(60));

            println!();
            println!("{}", "Permanent modification:".bright_white().bold());
            println!("  {}", persisted_path_note().dimmed());
            println!("{}", "─".repeat(60));
            println!("{}", render_directives(&report.params, DirectiveStyle::File).bright_green());
            println!("{}", "─".repeat(60));

            if let Some(text) = insights {
                println!();
                println!("{}", "Advisor:".bright_white().bold());
                println!("{text}");
            }

            println!();
            println!(
                "{}",
                "Test before applying to production systems.".dimmed()
            );
        }
    }

    Ok(())
}

/// sysctl directives only
fn run_sysctl(args: SysctlArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let report = build_report(&args.link, config)?;
    let style = DirectiveStyle::from(args.style);

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "style": style,
            "file_path": (style == DirectiveStyle::File).then_some(PERSISTED_CONFIG_PATH),
            "directives": tcptune::render::directives(&report.params),
        });
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    // The path note goes to stderr so stdout can be redirected into the file
    if style == DirectiveStyle::File {
        eprintln!("{} {}", "#".dimmed(), persisted_path_note().dimmed());
    }
    for warning in &report.warnings {
        eprintln!("{} {}", "⚠".yellow(), warning);
    }
    println!("{}", render_directives(&report.params, style));

    Ok(())
}

/// Advisory commentary
async fn run_insights(args: InsightsArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let report = build_report(&args.link, config)?;

    let mut advisor_config = config.advisor.clone();
    if let Some(timeout) = args.timeout {
        advisor_config.timeout = timeout;
    }

    let text = fetch_insights(&report.input, &report.params, &advisor_config, format).await;

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "input": report.input,
            "params": report.params,
            "insights": text,
        });
        println!("{}", to_json(&value)?);
    } else {
        println!(
            "{} {} → BDP {}",
            "●".cyan(),
            report.input,
            report.bdp_human.bright_white()
        );
        println!();
        println!("{text}");
    }

    Ok(())
}

/// Fetch commentary, degrading every failure to a fallback message.
async fn fetch_insights(
    input: &NetworkInput,
    params: &TcpParams,
    config: &AdvisorConfig,
    format: OutputFormat,
) -> String {
    let advisor = match Advisor::from_config(config) {
        Ok(advisor) => advisor,
        Err(Error::Advisor(AdvisorError::Disabled)) => {
            info!("advisor disabled in configuration");
            return DISABLED_NOTICE.to_string();
        }
        Err(e) => {
            error!(error = %e, "advisor unavailable");
            return ERROR_FALLBACK.to_string();
        }
    };

    // Ctrl+C abandons the request instead of killing the process
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let spinner = (format == OutputFormat::Text).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Consulting advisor (up to {})...",
            humantime_serde::re::humantime::format_duration(advisor.timeout())
        ));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = advisor.try_insights(input, params, &cancel).await;
    ctrl_c.abort();

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    result.unwrap_or_else(|| {
        warn!("advisor request cancelled");
        ERROR_FALLBACK.to_string()
    })
}

/// Recalculate for each line on stdin
async fn run_interactive(args: InteractiveArgs, config: &Config) -> Result<()> {
    let policy = policy_for(args.clamped_defaults, config);

    let mut session = if args.insights {
        match Advisor::from_config(&config.advisor) {
            Ok(advisor) => Some(InsightSession::new(advisor)),
            Err(Error::Advisor(AdvisorError::Disabled)) => {
                eprintln!("{} {}", "⚠".yellow(), DISABLED_NOTICE);
                None
            }
            Err(e) => {
                eprintln!("{} Advisor unavailable: {}", "⚠".yellow(), e);
                None
            }
        }
    } else {
        None
    };

    println!(
        "{} Enter \"<bandwidth Mbps> <rtt ms>\" per line ({}-{} Mbps, {}-{} ms). Ctrl+D to exit.",
        "→".cyan(),
        BANDWIDTH_RANGE.min,
        BANDWIDTH_RANGE.max,
        RTT_RANGE.min,
        RTT_RANGE.max
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printer: Option<JoinHandle<()>> = None;
    let mut interrupted = false;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                interrupted = true;
                None
            }
        };
        let Some(line) = line else { break };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "q" | "quit" | "exit") {
            break;
        }

        let input = match parse_link_line(line) {
            Ok(input) if args.clamp => input.snapped(),
            Ok(input) => {
                if !BANDWIDTH_RANGE.contains(input.bandwidth_mbps)
                    || !RTT_RANGE.contains(input.rtt_ms)
                {
                    println!(
                        "  {} outside the recommended range (use --clamp to snap)",
                        "⚠".yellow()
                    );
                }
                input
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), e);
                continue;
            }
        };

        let params = calculate_with(&input, policy);
        let report = Report::with_decimals(input, policy, params, config.tuning.decimals);

        println!();
        print_summary(&report);
        println!("{}", render_directives(&params, DirectiveStyle::Command).bright_green());

        if let Some(session) = session.as_mut() {
            let pending = session.request(input, params);
            printer = Some(tokio::spawn(async move {
                if let Ok(Some(text)) = pending.await {
                    println!();
                    println!("{} {}", "Advisor:".bright_white().bold(), input);
                    println!("{text}");
                }
            }));
        }
    }

    // On Ctrl+D the last request may finish; Ctrl+C abandons it
    if interrupted {
        if let Some(session) = session.as_mut() {
            session.cancel();
        }
    }
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        "╔══════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "║     TCPTUNE                              ║".bright_cyan()
    );
    println!(
        "{}",
        format!("║     Version {:<29}║", VERSION).bright_cyan()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════╝".bright_cyan()
    );
    println!();
}

fn print_summary(report: &Report) {
    let params = &report.params;

    println!("{}", "Network profile:".bright_white().bold());
    println!("  {} Bandwidth: {}", "→".cyan(), report.link_rate);
    println!("  {} RTT:       {} ms", "→".cyan(), report.input.rtt_ms);
    println!(
        "  {} BDP:       {} ({} bytes)",
        "→".cyan(),
        report.bdp_human.bright_white().bold(),
        params.bdp_bytes
    );
    println!("  {} Policy:    {}", "→".cyan(), report.policy);

    for warning in &report.warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }
}

fn print_table(report: &Report) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Parameter", "Value", "Size"]);

    for [name, value, size] in report.rows() {
        table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new(size)]);
    }

    println!("{table}");
}

/// Generate shell completions
fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
    };

    generate(shell, &mut cmd, name, &mut std::io::stdout());

    Ok(())
}

/// Show example configuration
fn run_config(args: ConfigArgs) -> Result<()> {
    let output = Config::example().to_toml()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        println!(
            "{} Configuration written to {}",
            "✓".green(),
            path.display()
        );
    } else {
        println!("{output}");
    }

    Ok(())
}
