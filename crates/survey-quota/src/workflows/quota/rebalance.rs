//! Keeps per-option targets summing to the quota total.
//!
//! Only one entry is ever adjusted. When the operator has just edited an option, the adjustment
//! lands on the last option other than that one so their own input is never overwritten while
//! typing. Adjusted values clamp at zero, which means a large overshoot can leave the sum above
//! the total; the validator reports that case.

use std::borrow::Cow;

use super::domain::QuotaOptionTarget;

/// Rebalance `option_targets` against `total_target`.
///
/// Returns the input borrowed when it already sums to the total or is empty.
pub fn rebalance<'a>(
    option_targets: &'a [QuotaOptionTarget],
    total_target: u32,
    changed_option_id: Option<&str>,
) -> Cow<'a, [QuotaOptionTarget]> {
    if shortfall(option_targets, total_target) == 0 || option_targets.is_empty() {
        return Cow::Borrowed(option_targets);
    }

    let mut adjusted = option_targets.to_vec();
    rebalance_in_place(&mut adjusted, total_target, changed_option_id);
    Cow::Owned(adjusted)
}

/// In-place variant used by the quota editor. Returns the index that was adjusted, if any.
pub fn rebalance_in_place(
    option_targets: &mut [QuotaOptionTarget],
    total_target: u32,
    changed_option_id: Option<&str>,
) -> Option<usize> {
    let diff = shortfall(option_targets, total_target);
    if diff == 0 {
        return None;
    }

    let index = adjustment_index(option_targets, changed_option_id)?;
    let entry = &mut option_targets[index];
    let next = (i64::from(entry.target) + diff).clamp(0, i64::from(u32::MAX));
    entry.target = next as u32;
    Some(index)
}

fn shortfall(option_targets: &[QuotaOptionTarget], total_target: u32) -> i64 {
    let sum: i64 = option_targets
        .iter()
        .map(|option| i64::from(option.target))
        .sum();
    i64::from(total_target) - sum
}

fn adjustment_index(
    option_targets: &[QuotaOptionTarget],
    changed_option_id: Option<&str>,
) -> Option<usize> {
    let last = option_targets.len().checked_sub(1)?;
    let edited = changed_option_id
        .and_then(|id| option_targets.iter().position(|option| option.option_id == id));

    match edited {
        Some(index) if index == last => Some(last.saturating_sub(1)),
        _ => Some(last),
    }
}
