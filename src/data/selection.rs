use std::collections::BTreeSet;
use std::num::IntErrorKind;

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Group selection from the free-text indices field
// ---------------------------------------------------------------------------

/// Resolve the indices field into the set of groups to load.
///
/// * Empty or whitespace-only text → every group `0..total_groups`.
/// * Otherwise comma-separated integers; one bad token rejects the whole input.
/// * Values outside `[0, total_groups)` are dropped without error, so indices
///   typed for a larger dataset still load whatever exists.
pub fn resolve_selection(
    total_groups: usize,
    indices_text: &str,
) -> Result<BTreeSet<usize>, LoadError> {
    let text = indices_text.trim();
    if text.is_empty() {
        return Ok((0..total_groups).collect());
    }

    let mut selected = BTreeSet::new();
    for token in text.split(',') {
        let token = token.trim();
        let value = match token.parse::<i64>() {
            Ok(v) => v,
            // Still an integer, just far out of range.
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                log::debug!("Dropping out-of-range index {token}");
                continue;
            }
            Err(_) => {
                return Err(LoadError::InvalidIndicesFormat {
                    token: token.to_string(),
                })
            }
        };
        match usize::try_from(value) {
            Ok(i) if i < total_groups => {
                selected.insert(i);
            }
            _ => log::debug!("Dropping out-of-range index {value} (have {total_groups} groups)"),
        }
    }
    Ok(selected)
}

/// Keep only the first `limit` groups of a selection (group-count dialog).
pub fn limit_selection(selected: &BTreeSet<usize>, limit: Option<usize>) -> BTreeSet<usize> {
    match limit {
        Some(n) => selected.iter().copied().take(n).collect(),
        None => selected.clone(),
    }
}
