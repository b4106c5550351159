//! Human-readable byte sizes.

/// Base-1024 unit labels.
pub const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

const K: u64 = 1024;

/// Format bytes in base-1024 units, rounded to `decimals` places.
///
/// Trailing zeros are dropped, so `1024` is `"1 KB"` and `1536` is
/// `"1.5 KB"`. Sizes of 1024 TB and above stay in TB.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut index = 0;
    let mut divisor = 1u64;
    while index < UNITS.len() - 1 && bytes / divisor >= K {
        divisor *= K;
        index += 1;
    }

    let value = round_half_up(bytes as f64 / divisor as f64, decimals);
    format!("{} {}", trim_fraction(format!("{value:.decimals$}")), UNITS[index])
}

/// [`format_bytes`] with two decimals.
pub fn human_bytes(bytes: u64) -> String {
    format_bytes(bytes, 2)
}

/// Round to `decimals` places with ties away from zero.
///
/// The formatter alone rounds exact binary ties to even (`78.125` would
/// print as `78.12`).
fn round_half_up(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(15) as i32);
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}

fn trim_fraction(mut s: String) -> String {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}
