//! ---
//! osr_section: "01-core-functionality"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Shared primitives and utilities for the regression toolkit."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Release version strings as they appear in file names and the compatibility table.

use std::cmp::Ordering;

/// Orders dotted version strings numerically. Anything that is not a valid
/// semantic version sorts before every valid one, and by string among itself.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// `X.Y.Z` with numeric components.
pub fn is_version_triplet(candidate: &str) -> bool {
    let parts: Vec<&str> = candidate.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_order_with_invalid_first() {
        assert_eq!(compare_versions("develop", "2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("2.10.0", "2.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("abc", "abd"), Ordering::Less);
    }

    #[test]
    fn triplets_need_three_numeric_parts() {
        assert!(is_version_triplet("24.2.0"));
        assert!(!is_version_triplet("24.2"));
        assert!(!is_version_triplet("24.x.0"));
        assert!(!is_version_triplet("1..0"));
        assert!(!is_version_triplet("+1.0.0"));
    }
}
