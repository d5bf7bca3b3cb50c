//! Membership identifiers and member field patches.

pub mod allocator;
pub mod patch;

pub use allocator::next_membership_id;
pub use patch::MemberPatch;

use crate::config::MembershipConfig;

/// Shape of a human-readable identifier: `prefix` followed by a number
/// zero-padded to `width` digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    pub prefix: String,
    pub width: usize,
    pub floor: u64,
}

impl IdFormat {
    #[must_use]
    pub fn members(config: &MembershipConfig) -> Self {
        Self {
            prefix: config.id_prefix.clone(),
            width: config.id_width,
            floor: config.id_floor,
        }
    }

    #[must_use]
    pub fn non_members(config: &MembershipConfig) -> Self {
        Self {
            prefix: config.non_member_prefix.clone(),
            width: config.non_member_width,
            floor: 1,
        }
    }

    /// Numbers wider than `width` are kept unpadded rather than truncated.
    #[must_use]
    pub fn format(&self, number: u64) -> String {
        format!("{}{:0width$}", self.prefix, number, width = self.width)
    }

    /// Numeric suffix of `id`, or `None` when it does not carry this prefix
    /// or the remainder is not all digits.
    #[must_use]
    pub fn parse_suffix(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(self.prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// `"NA"` and blank values are placeholders for "no identifier yet".
#[must_use]
pub fn is_unassigned(membership_id: Option<&str>) -> bool {
    match membership_id.map(str::trim) {
        None | Some("") => true,
        Some(id) => id.eq_ignore_ascii_case("NA"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> IdFormat {
        IdFormat::members(&MembershipConfig::default())
    }

    #[test]
    fn test_format_pads_to_width() {
        assert_eq!(format().format(5000), "KWSKW05000");
        assert_eq!(format().format(7), "KWSKW00007");
        assert_eq!(format().format(123_456), "KWSKW123456");
    }

    #[test]
    fn test_parse_suffix() {
        let format = format();
        assert_eq!(format.parse_suffix("KWSKW05001"), Some(5001));
        assert_eq!(format.parse_suffix("KWSKW123456"), Some(123_456));
        assert_eq!(format.parse_suffix("KWSKW"), None);
        assert_eq!(format.parse_suffix("KWSKW12a45"), None);
        assert_eq!(format.parse_suffix("KWSKWN0001"), None);
        assert_eq!(format.parse_suffix("ABC05001"), None);
    }

    #[test]
    fn test_non_member_format() {
        let format = IdFormat::non_members(&MembershipConfig::default());
        assert_eq!(format.format(12), "KWSKWN0012");
    }

    #[test]
    fn test_is_unassigned() {
        assert!(is_unassigned(None));
        assert!(is_unassigned(Some("")));
        assert!(is_unassigned(Some("  ")));
        assert!(is_unassigned(Some("NA")));
        assert!(is_unassigned(Some("na")));
        assert!(!is_unassigned(Some("KWSKW05000")));
    }
}
