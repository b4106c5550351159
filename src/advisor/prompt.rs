//! Prompt construction for the advisory service.

use std::fmt::Write;

use crate::render::{directives, human_bytes};
use crate::tuning::TcpParams;
use crate::types::NetworkInput;

/// Build the commentary request for one calculation.
pub fn build_prompt(input: &NetworkInput, params: &TcpParams, max_words: usize) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are a senior Linux kernel performance engineer. \
         Review the following TCP buffer tuning derived from the bandwidth-delay product.\n\n",
    );

    prompt.push_str("Link profile:\n");
    let _ = writeln!(prompt, "- Bandwidth: {} Mbps", input.bandwidth_mbps);
    let _ = writeln!(prompt, "- Round-trip time: {} ms", input.rtt_ms);
    let _ = writeln!(
        prompt,
        "- Bandwidth-delay product: {} bytes ({})",
        params.bdp_bytes,
        human_bytes(params.bdp_bytes)
    );

    prompt.push_str("\nProposed sysctl settings:\n");
    for directive in directives(params) {
        let _ = writeln!(prompt, "{}={}", directive.key, directive.value);
    }

    let _ = write!(
        prompt,
        "\nWrite a concise technical explanation in Markdown, at most {max_words} words, covering:\n\
         1. Why these values follow from the bandwidth-delay product.\n\
         2. Risks of these values, such as memory consumption with many concurrent connections.\n\
         3. One or two additional sysctl parameters worth adjusting for this bandwidth and latency \
         (for example congestion control or backlog limits).\n"
    );

    prompt
}
