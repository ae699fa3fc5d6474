use std::cmp::Ordering;
use std::num::IntErrorKind;
use std::sync::OnceLock;

use regex::Regex;

/// Compare two dotted-numeric versions component by component.
///
/// Missing trailing components count as zero, so "3.0" equals "3.0.0".
/// Components that fail to parse also count as zero; numeric components too
/// large for `u64` saturate.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(component)
        .collect()
}

fn component(part: &str) -> u64 {
    match part.parse::<u64>() {
        Ok(n) => n,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => 0,
    }
}

/// Pull the first dotted-numeric token (e.g. "3.1.0") out of tool output.
pub fn extract_version(output: &str) -> Option<&str> {
    static VERSION_TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = VERSION_TOKEN.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+)+").expect("version pattern is valid")
    });
    re.find(output).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_versions() {
        assert_eq!(compare_versions("3.0.0", "3.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("3.0", "3.0.0"), Ordering::Equal);
    }

    #[test]
    fn older_and_newer() {
        assert_eq!(compare_versions("2.9.9", "3.0.0"), Ordering::Less);
        assert_eq!(compare_versions("3.0.0", "2.9"), Ordering::Greater);
        assert_eq!(compare_versions("3.10.0", "3.9.5"), Ordering::Greater);
    }

    #[test]
    fn oversized_component_is_not_too_old() {
        assert_eq!(
            compare_versions("99999999999999999999.0.0", "3.0.0"),
            Ordering::Greater
        );
        assert_eq!(compare_versions("3.x.0", "3.0.0"), Ordering::Equal);
    }

    #[test]
    fn comparison_is_antisymmetric_and_transitive() {
        let versions = ["1", "2.9.9", "3", "3.0.1", "3.1", "10.0.0"];
        for a in versions {
            for b in versions {
                assert_eq!(compare_versions(a, b), compare_versions(b, a).reverse());
                for c in versions {
                    if compare_versions(a, b) == Ordering::Less
                        && compare_versions(b, c) == Ordering::Less
                    {
                        assert_eq!(compare_versions(a, c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn extracts_first_dotted_token() {
        assert_eq!(extract_version("matugen 3.1.0\n"), Some("3.1.0"));
        assert_eq!(extract_version("v2.4 (build 7.1)"), Some("2.4"));
        assert_eq!(extract_version("matugen dev build 42"), None);
    }
}
