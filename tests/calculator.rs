//! Calculator behavior tests.
//!
//! Covers:
//! - Reference scenarios
//! - BDP formula and ceiling properties over a grid of inputs
//! - Buffer ordering at low BDP, under both default policies
//! - Determinism

use tcptune::tuning::{
    bdp_bytes, calculate, calculate_with, BufferRange, DefaultPolicy, Direction,
    MAX_BUFFER_FLOOR, MIN_BUFFER,
};
use tcptune::types::{NetworkInput, Preset};

const BANDWIDTHS: [f64; 9] = [0.0, 1.0, 10.0, 55.5, 100.0, 1000.0, 2500.0, 10_000.0, 100_000.0];
const RTTS: [f64; 9] = [0.0, 0.5, 1.0, 7.0, 20.0, 50.0, 120.0, 500.0, 2000.0];

fn grid() -> impl Iterator<Item = (f64, f64)> {
    BANDWIDTHS
        .iter()
        .flat_map(|&bw| RTTS.iter().map(move |&rtt| (bw, rtt)))
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_gigabit_fifty_ms() {
    let params = calculate(1000.0, 50.0);

    assert_eq!(params.bdp_bytes, 6_250_000);
    assert_eq!(params.rmem_max, 6_250_000);
    assert_eq!(params.wmem_max, 6_250_000);
    assert_eq!(params.tcp_rmem, BufferRange::new(4096, 87380, 6_250_000));
    assert_eq!(params.tcp_wmem, BufferRange::new(4096, 65536, 6_250_000));
}

#[test]
fn test_ten_megabit_one_ms() {
    let params = calculate(10.0, 1.0);

    assert_eq!(params.bdp_bytes, 1250);
    assert_eq!(params.rmem_max, 65536);
    assert_eq!(params.wmem_max, 65536);
    assert_eq!(params.tcp_rmem, BufferRange::new(4096, 87380, 65536));
    assert_eq!(params.tcp_wmem, BufferRange::new(4096, 65536, 65536));
}

#[test]
fn test_one_megabit_one_ms() {
    let params = calculate(1.0, 1.0);

    assert_eq!(params.bdp_bytes, 125);
    assert_eq!(params.rmem_max, MAX_BUFFER_FLOOR);
    assert_eq!(params.tcp_rmem, BufferRange::new(4096, 87380, 65536));
}

#[test]
fn test_presets() {
    let lan = calculate_with(&Preset::Lan.input(), DefaultPolicy::Conventional);
    assert_eq!(lan.bdp_bytes, 125_000);

    let wan = calculate_with(&Preset::Wan.input(), DefaultPolicy::Conventional);
    assert_eq!(wan.bdp_bytes, 625_000);

    let fat = calculate_with(&Preset::HighSpeed.input(), DefaultPolicy::Conventional);
    assert_eq!(fat.bdp_bytes, 125_000_000);
    assert_eq!(fat.tcp_rmem.max, 125_000_000);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_bdp_formula_holds() {
    for (bw, rtt) in grid() {
        let expected = (bw * 1_000_000.0 * (rtt / 1000.0) / 8.0).floor();
        let params = calculate(bw, rtt);
        assert_eq!(params.bdp_bytes as f64, expected, "bw={bw} rtt={rtt}");
        assert_eq!(params.bdp_bytes, bdp_bytes(bw, rtt));
    }
}

#[test]
fn test_ceilings_equal_floored_bdp() {
    for (bw, rtt) in grid() {
        let params = calculate(bw, rtt);
        let expected = params.bdp_bytes.max(MAX_BUFFER_FLOOR);
        assert_eq!(params.rmem_max, expected, "bw={bw} rtt={rtt}");
        assert_eq!(params.wmem_max, expected, "bw={bw} rtt={rtt}");
        assert_eq!(params.tcp_rmem.max, expected);
        assert_eq!(params.tcp_wmem.max, expected);
        assert_eq!(params.tcp_rmem.min, MIN_BUFFER);
        assert_eq!(params.tcp_wmem.min, MIN_BUFFER);
    }
}

#[test]
fn test_conventional_middle_values_are_fixed() {
    for (bw, rtt) in grid() {
        let params = calculate(bw, rtt);
        assert_eq!(params.tcp_rmem.default, 87380);
        assert_eq!(params.tcp_wmem.default, 65536);
    }
}

#[test]
fn test_deterministic() {
    for (bw, rtt) in grid() {
        assert_eq!(calculate(bw, rtt), calculate(bw, rtt));
    }
}

// ============================================================================
// Ordering at Low BDP
// ============================================================================

#[test]
fn test_conventional_receive_range_unordered_below_default() {
    // Receive default 87380 sits above the 64 KiB floor whenever BDP < 87380.
    let params = calculate(10.0, 1.0);
    assert!(!params.tcp_rmem.is_ordered());
    assert!(params.tcp_wmem.is_ordered());
    assert_eq!(params.unordered_directions(), vec![Direction::Receive]);

    // Just below and just above the receive default.
    let params = calculate(69.0, 10.0);
    assert_eq!(params.bdp_bytes, 86250);
    assert!(!params.is_ordered());

    let params = calculate(70.0, 10.0);
    assert_eq!(params.bdp_bytes, 87500);
    assert!(params.is_ordered());
}

#[test]
fn test_conventional_ordered_for_large_bdp() {
    for (bw, rtt) in grid() {
        let params = calculate(bw, rtt);
        if params.bdp_bytes >= 87380 {
            assert!(params.is_ordered(), "bw={bw} rtt={rtt}");
        } else {
            assert!(!params.tcp_rmem.is_ordered(), "bw={bw} rtt={rtt}");
        }
    }
}

#[test]
fn test_clamped_policy_always_ordered() {
    for (bw, rtt) in grid() {
        let input = NetworkInput::unchecked(bw, rtt);
        let clamped = calculate_with(&input, DefaultPolicy::Clamped);
        let conventional = calculate_with(&input, DefaultPolicy::Conventional);

        assert!(clamped.is_ordered(), "bw={bw} rtt={rtt}");
        assert_eq!(clamped.bdp_bytes, conventional.bdp_bytes);
        assert_eq!(clamped.rmem_max, conventional.rmem_max);
        assert_eq!(
            clamped.tcp_rmem.default,
            87380u64.min(conventional.tcp_rmem.max)
        );
    }
}

// ============================================================================
// Out-of-domain Input
// ============================================================================

#[test]
fn test_negative_and_nan_inputs_floor() {
    for (bw, rtt) in [(-10.0, 50.0), (100.0, -1.0), (f64::NAN, 1.0), (1.0, f64::NAN)] {
        let params = calculate(bw, rtt);
        assert_eq!(params.bdp_bytes, 0);
        assert_eq!(params.rmem_max, MAX_BUFFER_FLOOR);
    }
}

#[test]
fn test_validated_input_rejects_out_of_domain() {
    assert!(NetworkInput::new(-10.0, 50.0).is_err());
    assert!(NetworkInput::new(10.0, f64::NAN).is_err());
    assert!(NetworkInput::new(f64::INFINITY, 50.0).is_err());
    assert!(NetworkInput::new(0.0, 0.0).is_ok());
}
