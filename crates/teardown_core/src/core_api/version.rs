//! Registry version checks. Saves older than 2.0.0 use a different layout.

use std::cmp::Ordering;

pub const MIN_SUPPORTED_VERSION: &str = "2.0.0";

fn components(version: &str) -> Option<Vec<u32>> {
    version
        .split('.')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect()
}

/// Compares dotted numeric versions, treating missing components as zero.
/// Returns `None` when either side is not numeric.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    let a = components(a)?;
    let b = components(b)?;
    let len = a.len().max(b.len());
    let ordering = (0..len)
        .map(|i| {
            let lhs = a.get(i).copied().unwrap_or(0);
            let rhs = b.get(i).copied().unwrap_or(0);
            lhs.cmp(&rhs)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal);
    Some(ordering)
}

pub fn is_supported(version: &str) -> bool {
    matches!(
        compare(version, MIN_SUPPORTED_VERSION),
        Some(Ordering::Greater | Ordering::Equal)
    )
}
