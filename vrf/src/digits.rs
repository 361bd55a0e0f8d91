//! Digit extraction from a raw VRF output.

/// Collect the first `length` ASCII decimal digits of `raw`, in order.
///
/// The result is shorter than `length` when `raw` holds fewer digits; it is
/// never padded. The transformation is deterministic so anyone holding the
/// block's VRF output can recompute the oracle value.
pub fn extract(raw: &str, length: usize) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(length)
        .collect()
}
