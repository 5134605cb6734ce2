//! Version triplet parsing and ordering.
//!
//! Dependency bounds compare versions as `major.minor.patch` integer
//! triplets. Missing components are padded with zeros, a leading `v` and
//! any non-numeric suffix on a component (pre-release or build tags) are
//! ignored for ordering. Strings that do not start with a number are not
//! triplets at all; callers treat such bounds as non-restrictive.

/// A `major.minor.patch` version, ordered lexicographically by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Triplet {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Triplet {
    /// Parses a version string into a triplet, or `None` when the string
    /// is not triplet-shaped.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let input = input
            .strip_prefix(['v', 'V'])
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(input);

        let mut parts = input.split('.');
        let major = leading_number(parts.next()?)?;
        let minor = match parts.next() {
            Some(part) => leading_number(part)?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(part) => leading_number(part)?,
            None => 0,
        };

        Some(Triplet {
            major,
            minor,
            patch,
        })
    }
}

/// The numeric prefix of one version component: "3" from "3-beta".
fn leading_number(part: &str) -> Option<u64> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}
