use super::ApiError;
use crate::services::ids;

/// Parse a path identifier. Identifiers travel as decimal strings.
pub fn parse_id(resource: &str, raw: &str) -> Result<i64, ApiError> {
    ids::parse(raw).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid {resource} ID: {raw}. ID must be a positive integer"
        ))
    })
}

pub fn validate_membership_id(raw: &str) -> Result<&str, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Membership ID cannot be empty"));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::validation(
            "Membership ID can only contain letters and digits",
        ));
    }
    Ok(trimmed)
}

/// Empty query strings count as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("member", "42").unwrap(), 42);
        assert!(parse_id("member", "0").is_err());
        assert!(parse_id("member", "-3").is_err());
        assert!(parse_id("member", "abc").is_err());
    }

    #[test]
    fn test_validate_membership_id() {
        assert_eq!(validate_membership_id(" KWSKW05001 ").unwrap(), "KWSKW05001");
        assert!(validate_membership_id("").is_err());
        assert!(validate_membership_id("KW-1").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" north ".into())), Some("north".into()));
        assert_eq!(non_blank(None), None);
    }
}
