//! Bandwidth-delay product calculation.

use tracing::{debug, trace};

use super::{BufferRange, DefaultPolicy, Direction, TcpParams, MAX_BUFFER_FLOOR, MIN_BUFFER};
use crate::types::NetworkInput;

/// BDP in whole bytes: `floor(bandwidth_bps * rtt_s / 8)`.
///
/// Total over `f64`: negative or NaN products become 0, overflow saturates
/// at `u64::MAX`.
pub fn bdp_bytes(bandwidth_mbps: f64, rtt_ms: f64) -> u64 {
    let bandwidth_bits_per_sec = bandwidth_mbps * 1_000_000.0;
    let rtt_seconds = rtt_ms / 1000.0;
    // `as` saturates and maps NaN to zero
    ((bandwidth_bits_per_sec * rtt_seconds) / 8.0).floor() as u64
}

/// Compute tuning parameters with the conventional default policy.
pub fn calculate(bandwidth_mbps: f64, rtt_ms: f64) -> TcpParams {
    calculate_with(
        &NetworkInput::unchecked(bandwidth_mbps, rtt_ms),
        DefaultPolicy::Conventional,
    )
}

/// Compute tuning parameters for `input` under `policy`.
pub fn calculate_with(input: &NetworkInput, policy: DefaultPolicy) -> TcpParams {
    let bdp = bdp_bytes(input.bandwidth_mbps, input.rtt_ms);
    let max_buffer = bdp.max(MAX_BUFFER_FLOOR);

    trace!(
        bandwidth_mbps = input.bandwidth_mbps,
        rtt_ms = input.rtt_ms,
        bdp,
        max_buffer,
        "computed bandwidth-delay product"
    );

    let range = |direction: Direction| {
        BufferRange::new(MIN_BUFFER, policy.middle(direction, max_buffer), max_buffer)
    };

    let params = TcpParams {
        bdp_bytes: bdp,
        rmem_max: max_buffer,
        wmem_max: max_buffer,
        tcp_rmem: range(Direction::Receive),
        tcp_wmem: range(Direction::Send),
    };

    if !params.is_ordered() {
        debug!(
            %policy,
            max_buffer,
            "buffer default exceeds computed maximum at this BDP"
        );
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gigabit_wan() {
        let params = calculate(1000.0, 50.0);
        assert_eq!(params.bdp_bytes, 6_250_000);
        assert_eq!(params.rmem_max, 6_250_000);
        assert_eq!(params.wmem_max, 6_250_000);
        assert_eq!(params.tcp_rmem, BufferRange::new(4096, 87380, 6_250_000));
        assert_eq!(params.tcp_wmem, BufferRange::new(4096, 65536, 6_250_000));
        assert!(params.is_ordered());
    }

    #[test]
    fn test_low_bdp_floor() {
        let params = calculate(10.0, 1.0);
        assert_eq!(params.bdp_bytes, 1250);
        assert_eq!(params.rmem_max, 65536);
        assert_eq!(params.wmem_max, 65536);
        assert_eq!(params.tcp_rmem, BufferRange::new(4096, 87380, 65536));
        assert_eq!(params.tcp_wmem, BufferRange::new(4096, 65536, 65536));
    }

    #[test]
    fn test_zero_bdp() {
        let params = calculate(1.0, 0.0);
        assert_eq!(params.bdp_bytes, 0);
        assert_eq!(params.rmem_max, MAX_BUFFER_FLOOR);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 1 Mbps * 1 ms = 1000 bits = 125 bytes exactly; 0.9 ms = 112.5 bytes
        assert_eq!(bdp_bytes(1.0, 1.0), 125);
        assert_eq!(bdp_bytes(1.0, 0.9), 112);
        assert_eq!(bdp_bytes(0.001, 1.0), 0);
    }

    #[test]
    fn test_out_of_domain_inputs() {
        assert_eq!(bdp_bytes(-100.0, 50.0), 0);
        assert_eq!(bdp_bytes(f64::NAN, 50.0), 0);
        assert_eq!(bdp_bytes(f64::INFINITY, 50.0), u64::MAX);

        let params = calculate(-100.0, 50.0);
        assert_eq!(params.rmem_max, MAX_BUFFER_FLOOR);
    }

    #[test]
    fn test_clamped_policy() {
        let input = NetworkInput::unchecked(10.0, 1.0);
        let params = calculate_with(&input, DefaultPolicy::Clamped);
        assert_eq!(params.tcp_rmem, BufferRange::new(4096, 65536, 65536));
        assert!(params.is_ordered());

        let input = NetworkInput::unchecked(1000.0, 50.0);
        assert_eq!(
            calculate_with(&input, DefaultPolicy::Clamped),
            calculate_with(&input, DefaultPolicy::Conventional)
        );
    }
}
