//! Sequential membership identifier allocation.
//!
//! The next identifier is one past the greatest numeric suffix currently
//! assigned, or the configured floor when none is. The result is then probed
//! against storage until a free value is found. The unique index on
//! `members.membership_id` remains the final guarantee under concurrency.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use super::IdFormat;
use crate::entities::{accounts, members};
use crate::services::ServiceError;

/// Greatest suffix among `ids`, skipping values this format cannot parse.
#[must_use]
pub fn highest_suffix<'a>(format: &IdFormat, ids: impl IntoIterator<Item = &'a str>) -> Option<u64> {
    ids.into_iter().filter_map(|id| format.parse_suffix(id)).max()
}

/// First candidate before probing.
#[must_use]
pub fn first_candidate(format: &IdFormat, highest: Option<u64>) -> u64 {
    match highest {
        Some(n) => n.saturating_add(1),
        None => format.floor,
    }
}

pub async fn next_membership_id<C: ConnectionTrait>(
    conn: &C,
    format: &IdFormat,
) -> Result<String, ServiceError> {
    let assigned: Vec<String> = members::Entity::find()
        .select_only()
        .column(members::Column::MembershipId)
        .filter(members::Column::MembershipId.is_not_null())
        .filter(members::Column::MembershipId.starts_with(format.prefix.as_str()))
        .into_tuple::<Option<String>>()
        .all(conn)
        .await?
        .into_iter()
        .flatten()
        .collect();

    let highest = highest_suffix(format, assigned.iter().map(String::as_str));
    let mut candidate = first_candidate(format, highest);

    loop {
        let id = format.format(candidate);
        let held = members::Entity::find()
            .filter(members::Column::MembershipId.eq(id.as_str()))
            .count(conn)
            .await?;
        // approval renames the account to the identifier, so the username must be free too
        let claimed = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(id.as_str()))
            .count(conn)
            .await?;

        if held == 0 && claimed == 0 {
            return Ok(id);
        }

        tracing::debug!(candidate = %id, "Membership ID already taken, probing next");
        candidate = candidate
            .checked_add(1)
            .ok_or_else(|| ServiceError::conflict("Membership ID space exhausted"))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MembershipConfig;

    fn format() -> IdFormat {
        IdFormat::members(&MembershipConfig::default())
    }

    #[test]
    fn test_floor_when_nothing_assigned() {
        let format = format();
        let highest = highest_suffix(&format, []);
        assert_eq!(highest, None);
        assert_eq!(first_candidate(&format, highest), 5000);
    }

    #[test]
    fn test_next_after_highest() {
        let format = format();
        let highest = highest_suffix(&format, ["KWSKW05003", "KWSKW05010", "KWSKW05001"]);
        assert_eq!(first_candidate(&format, highest), 5011);
    }

    #[test]
    fn test_malformed_ids_are_skipped() {
        let format = format();
        let highest = highest_suffix(&format, ["KWSKW05002", "KWSKWX9999", "NA", "KWSKW"]);
        assert_eq!(highest, Some(5002));
    }

    #[test]
    fn test_numeric_not_lexicographic_max() {
        let format = format();
        // "KWSKW123456" sorts before "KWSKW99999" as text
        let highest = highest_suffix(&format, ["KWSKW99999", "KWSKW123456"]);
        assert_eq!(highest, Some(123_456));
    }

    #[test]
    fn test_floor_only_applies_to_empty_table() {
        let format = format();
        let highest = highest_suffix(&format, ["KWSKW00012"]);
        assert_eq!(first_candidate(&format, highest), 13);
    }
}
