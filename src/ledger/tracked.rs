use sea_orm::Set;

use super::{AuditView, Stamp, Tracked, parse_snapshot, snapshot_of};
use crate::entities::{
    box_collection_audits, box_collections, cash_box_audits, cash_boxes, member_audits,
    member_transaction_audits, member_transactions, members, non_member_audits, non_members,
};

impl Tracked for members::Entity {
    type Audit = member_audits::Entity;
    const KIND: &'static str = "member";

    fn id_column() -> Self::Column {
        members::Column::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }

    fn audit_parent() -> member_audits::Column {
        member_audits::Column::MemberId
    }

    fn audit_created_at() -> member_audits::Column {
        member_audits::Column::CreatedAt
    }

    fn audit_id() -> member_audits::Column {
        member_audits::Column::Id
    }

    fn audit_record(model: &members::Model, stamp: &Stamp) -> member_audits::ActiveModel {
        member_audits::ActiveModel {
            member_id: Set(model.id),
            action: Set(stamp.action.as_str().to_string()),
            status: Set(model.status.as_str().to_string()),
            membership_id: Set(model.membership_id.clone()),
            snapshot: Set(snapshot_of(model)),
            committed_by: Set(stamp.actor),
            created_at: Set(stamp.at.clone()),
            ..Default::default()
        }
    }

    fn audit_view(record: &member_audits::Model) -> AuditView {
        AuditView {
            id: record.id,
            action: record.action.clone(),
            committed_by: record.committed_by,
            created_at: record.created_at.clone(),
            snapshot: parse_snapshot(&record.snapshot),
        }
    }
}

impl Tracked for non_members::Entity {
    type Audit = non_member_audits::Entity;
    const KIND: &'static str = "non-member";

    fn id_column() -> Self::Column {
        non_members::Column::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }

    fn audit_parent() -> non_member_audits::Column {
        non_member_audits::Column::NonMemberId
    }

    fn audit_created_at() -> non_member_audits::Column {
        non_member_audits::Column::CreatedAt
    }

    fn audit_id() -> non_member_audits::Column {
        non_member_audits::Column::Id
    }

    fn audit_record(model: &non_members::Model, stamp: &Stamp) -> non_member_audits::ActiveModel {
        non_member_audits::ActiveModel {
            non_member_id: Set(model.id),
            action: Set(stamp.action.as_str().to_string()),
            snapshot: Set(snapshot_of(model)),
            committed_by: Set(stamp.actor),
            created_at: Set(stamp.at.clone()),
            ..Default::default()
        }
    }

    fn audit_view(record: &non_member_audits::Model) -> AuditView {
        AuditView {
            id: record.id,
            action: record.action.clone(),
            committed_by: record.committed_by,
            created_at: record.created_at.clone(),
            snapshot: parse_snapshot(&record.snapshot),
        }
    }
}

impl Tracked for cash_boxes::Entity {
    type Audit = cash_box_audits::Entity;
    const KIND: &'static str = "cash box";

    fn id_column() -> Self::Column {
        cash_boxes::Column::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }

    fn audit_parent() -> cash_box_audits::Column {
        cash_box_audits::Column::BoxId
    }

    fn audit_created_at() -> cash_box_audits::Column {
        cash_box_audits::Column::CreatedAt
    }

    fn audit_id() -> cash_box_audits::Column {
        cash_box_audits::Column::Id
    }

    fn audit_record(model: &cash_boxes::Model, stamp: &Stamp) -> cash_box_audits::ActiveModel {
        cash_box_audits::ActiveModel {
            box_id: Set(model.id),
            action: Set(stamp.action.as_str().to_string()),
            number: Set(model.number.clone()),
            in_use: Set(model.in_use),
            snapshot: Set(snapshot_of(model)),
            committed_by: Set(stamp.actor),
            created_at: Set(stamp.at.clone()),
            ..Default::default()
        }
    }

    fn audit_view(record: &cash_box_audits::Model) -> AuditView {
        AuditView {
            id: record.id,
            action: record.action.clone(),
            committed_by: record.committed_by,
            created_at: record.created_at.clone(),
            snapshot: parse_snapshot(&record.snapshot),
        }
    }
}

impl Tracked for box_collections::Entity {
    type Audit = box_collection_audits::Entity;
    const KIND: &'static str = "box collection";

    fn id_column() -> Self::Column {
        box_collections::Column::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }

    fn audit_parent() -> box_collection_audits::Column {
        box_collection_audits::Column::CollectionId
    }

    fn audit_created_at() -> box_collection_audits::Column {
        box_collection_audits::Column::CreatedAt
    }

    fn audit_id() -> box_collection_audits::Column {
        box_collection_audits::Column::Id
    }

    fn audit_record(
        model: &box_collections::Model,
        stamp: &Stamp,
    ) -> box_collection_audits::ActiveModel {
        box_collection_audits::ActiveModel {
            collection_id: Set(model.id),
            action: Set(stamp.action.as_str().to_string()),
            date: Set(model.date.clone()),
            note_20: Set(model.note_20),
            note_10: Set(model.note_10),
            note_5: Set(model.note_5),
            note_1: Set(model.note_1),
            note_0_5: Set(model.note_0_5),
            note_0_25: Set(model.note_0_25),
            coin_100: Set(model.coin_100),
            coin_50: Set(model.coin_50),
            coin_20: Set(model.coin_20),
            coin_10: Set(model.coin_10),
            coin_5: Set(model.coin_5),
            total_fils: Set(model.total_fils),
            snapshot: Set(snapshot_of(model)),
            committed_by: Set(stamp.actor),
            created_at: Set(stamp.at.clone()),
            ..Default::default()
        }
    }

    fn audit_view(record: &box_collection_audits::Model) -> AuditView {
        AuditView {
            id: record.id,
            action: record.action.clone(),
            committed_by: record.committed_by,
            created_at: record.created_at.clone(),
            snapshot: parse_snapshot(&record.snapshot),
        }
    }
}

impl Tracked for member_transactions::Entity {
    type Audit = member_transaction_audits::Entity;
    const KIND: &'static str = "transaction";

    fn id_column() -> Self::Column {
        member_transactions::Column::Id
    }

    fn id_of(model: &Self::Model) -> i64 {
        model.id
    }

    fn audit_parent() -> member_transaction_audits::Column {
        member_transaction_audits::Column::TransactionId
    }

    fn audit_created_at() -> member_transaction_audits::Column {
        member_transaction_audits::Column::CreatedAt
    }

    fn audit_id() -> member_transaction_audits::Column {
        member_transaction_audits::Column::Id
    }

    fn audit_record(
        model: &member_transactions::Model,
        stamp: &Stamp,
    ) -> member_transaction_audits::ActiveModel {
        member_transaction_audits::ActiveModel {
            transaction_id: Set(model.id),
            action: Set(stamp.action.as_str().to_string()),
            category: Set(model.category.clone()),
            amount_fils: Set(model.amount_fils),
            date: Set(model.date.clone()),
            snapshot: Set(snapshot_of(model)),
            committed_by: Set(stamp.actor),
            created_at: Set(stamp.at.clone()),
            ..Default::default()
        }
    }

    fn audit_view(record: &member_transaction_audits::Model) -> AuditView {
        AuditView {
            id: record.id,
            action: record.action.clone(),
            committed_by: record.committed_by,
            created_at: record.created_at.clone(),
            snapshot: parse_snapshot(&record.snapshot),
        }
    }
}
