//! Rendering tests: byte sizes, sysctl directives and reports.

use tcptune::render::{
    directives, format_bytes, human_bytes, render_directives, DirectiveStyle, Report,
    PERSISTED_CONFIG_PATH,
};
use tcptune::tuning::{calculate, calculate_with, DefaultPolicy};
use tcptune::types::NetworkInput;

// ============================================================================
// Byte Sizes
// ============================================================================

#[test]
fn test_format_bytes_reference_values() {
    assert_eq!(format_bytes(0, 2), "0 Bytes");
    assert_eq!(format_bytes(1024, 2), "1 KB");
    assert_eq!(format_bytes(1536, 2), "1.5 KB");
}

#[test]
fn test_format_bytes_for_computed_buffers() {
    assert_eq!(human_bytes(calculate(1000.0, 50.0).bdp_bytes), "5.96 MB");
    assert_eq!(human_bytes(calculate(10.0, 1.0).bdp_bytes), "1.22 KB");
    assert_eq!(human_bytes(calculate(10.0, 1.0).rmem_max), "64 KB");
    assert_eq!(human_bytes(calculate(10_000.0, 100.0).bdp_bytes), "119.21 MB");
}

#[test]
fn test_format_bytes_rounds_exact_ties_up() {
    // 5120 Mbps over 128 ms is exactly 78.125 MB in flight
    assert_eq!(calculate(5120.0, 128.0).bdp_bytes, 81_920_000);
    assert_eq!(human_bytes(81_920_000), "78.13 MB");
    assert_eq!(human_bytes(1152), "1.13 KB");
}

#[test]
fn test_format_bytes_decimals() {
    assert_eq!(format_bytes(1_500_000, 0), "1 MB");
    assert_eq!(format_bytes(1_500_000, 1), "1.4 MB");
    assert_eq!(format_bytes(1_500_000, 3), "1.431 MB");
}

// ============================================================================
// Directives
// ============================================================================

#[test]
fn test_low_bdp_directives_reproduce_unordered_range() {
    let params = calculate(10.0, 1.0);
    let file = render_directives(&params, DirectiveStyle::File);

    assert_eq!(
        file.lines().collect::<Vec<_>>(),
        [
            "net.core.rmem_max = 65536",
            "net.core.wmem_max = 65536",
            "net.ipv4.tcp_rmem = 4096 87380 65536",
            "net.ipv4.tcp_wmem = 4096 65536 65536",
        ]
    );
}

#[test]
fn test_clamped_directives() {
    let params = calculate_with(&NetworkInput::unchecked(10.0, 1.0), DefaultPolicy::Clamped);
    let command = render_directives(&params, DirectiveStyle::Command);

    assert!(command.contains("sudo sysctl -w net.ipv4.tcp_rmem=\"4096 65536 65536\""));
}

#[test]
fn test_styles_share_values() {
    let params = calculate(2500.0, 35.0);
    let command = render_directives(&params, DirectiveStyle::Command);
    let file = render_directives(&params, DirectiveStyle::File);

    assert_eq!(command.lines().count(), 4);
    assert_eq!(file.lines().count(), 4);
    assert!(!command.ends_with('\n'));
    assert!(!file.ends_with('\n'));

    for (directive, (cmd, line)) in directives(&params)
        .iter()
        .zip(command.lines().zip(file.lines()))
    {
        assert!(cmd.starts_with("sudo sysctl -w "));
        assert!(cmd.contains(directive.key));
        assert!(cmd.contains(&directive.value));
        assert_eq!(line, format!("{} = {}", directive.key, directive.value));
    }
}

#[test]
fn test_file_output_never_names_path() {
    // The path is for the caller to present alongside the block.
    let file = render_directives(&calculate(1000.0, 50.0), DirectiveStyle::File);
    assert!(!file.contains(PERSISTED_CONFIG_PATH));
    assert_eq!(PERSISTED_CONFIG_PATH, "/etc/sysctl.d/99-tcp-tuning.conf");
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_report_json_shape() {
    let input = NetworkInput::unchecked(10.0, 1.0);
    let report = Report::new(input, DefaultPolicy::Conventional, calculate(10.0, 1.0));
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["input"]["bandwidth_mbps"], 10.0);
    assert_eq!(json["params"]["tcp_rmem"]["min"], 4096);
    assert_eq!(json["params"]["tcp_rmem"]["default"], 87380);
    assert_eq!(json["params"]["tcp_rmem"]["max"], 65536);
    assert_eq!(json["link_rate"], "10 Mbps");
    assert_eq!(json["warnings"].as_array().map(Vec::len), Some(1));
    assert!(json.get("decimals").is_none());
}
