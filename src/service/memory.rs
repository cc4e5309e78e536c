//! Memory budget for the workload. All values are MB.

/// Memory kept back for the operating system and this agent.
pub const RESERVED_OVERHEAD_MB: i64 = 1024;

/// Memory the game server may use on a plan of `plan_memory_mb`.
pub fn available_memory(plan_memory_mb: i64) -> i64 {
    plan_memory_mb - RESERVED_OVERHEAD_MB
}

pub fn meets_minimum(available_mb: i64, required_mb: i64) -> bool {
    required_mb <= available_mb
}

/// Whether a catalog memory label such as `3G` or `3072M` names `available_mb`.
///
/// Labels without a unit, or with `G`, are read as whole GiB.
pub fn label_matches(label: &str, available_mb: i64) -> bool {
    let label = label.trim();
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    let Ok(amount) = digits.parse::<i64>() else {
        return false;
    };

    match label[digits.len()..].trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('M') => amount == available_mb,
        None | Some('G') => amount.checked_mul(1024) == Some(available_mb),
        _ => false,
    }
}
