mod common;

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

use memberdesk::entities::{cash_box_audits, non_member_audits, non_members};
use memberdesk::ledger::{self, AuditAction, Cascade};
use memberdesk::services::{BoxInput, CollectionInput, NonMemberInput, ServiceError};

use common::{admin_id, shared_state, test_config};

fn non_member(name: &str) -> NonMemberInput {
    serde_json::from_value(serde_json::json!({ "full_name": name })).unwrap()
}

fn cash_box(number: &str) -> BoxInput {
    serde_json::from_value(serde_json::json!({ "number": number, "in_use": true })).unwrap()
}

#[tokio::test]
async fn test_every_write_leaves_one_audit_row() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let created = shared
        .non_member_service
        .create(actor, non_member("Abdullah Traders"))
        .await
        .unwrap();
    let updated = shared
        .non_member_service
        .update(actor, created.id, non_member("Abdullah Trading Co"))
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Abdullah Trading Co");

    let history = shared.non_member_service.history(created.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, "MODIFIED");
    assert_eq!(history[1].action, "CREATED");
    assert!(history.iter().all(|e| e.committed_by == actor));

    // Snapshots carry the state after each write
    assert_eq!(history[0].snapshot["full_name"], "Abdullah Trading Co");
    assert_eq!(history[1].snapshot["full_name"], "Abdullah Traders");
}

#[tokio::test]
async fn test_failed_audit_rolls_back_the_mutation() {
    let (shared, _) = shared_state(test_config()).await;
    let conn = &shared.store.conn;

    // No account 424242, so the audit row violates its foreign key
    let result = ledger::commit::<non_members::Entity, _>(&shared.store, AuditAction::Created, 424_242, |txn| {
        Box::pin(async move {
            let row = non_members::ActiveModel {
                full_name: Set("Ghost".to_string()),
                is_company: Set(false),
                created_at: Set(chrono::Utc::now().to_rfc3339()),
                updated_at: Set(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            };
            Ok(row.insert(txn).await?)
        })
    })
    .await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(non_members::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(non_member_audits::Entity::find().count(conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_without_cascade_conflicts_while_audits_exist() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;
    let conn = &shared.store.conn;

    let created = shared
        .non_member_service
        .create(actor, non_member("Kept By Audits"))
        .await
        .unwrap();

    let err = ledger::delete::<non_members::Entity>(&shared.store, created.id, Cascade::None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert!(shared.non_member_service.get(created.id).await.is_ok());

    ledger::delete::<non_members::Entity>(&shared.store, created.id, Cascade::AuditsFirst)
        .await
        .unwrap();
    assert!(matches!(
        shared.non_member_service.get(created.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert_eq!(non_member_audits::Entity::find().count(conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_missing_entity_is_not_found() {
    let (shared, _) = shared_state(test_config()).await;
    let err = ledger::delete::<non_members::Entity>(&shared.store, 77, Cascade::AuditsFirst)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_collection_total_is_exact() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let cash_box = shared.cash_service.create_box(actor, cash_box("B-100")).await.unwrap();

    let input: CollectionInput = serde_json::from_value(serde_json::json!({
        "box_id": cash_box.id.to_string(),
        "date": "2024-03-01",
        "note_20": 1,
        "note_10": 1,
        "coin_100": 3,
    }))
    .unwrap();

    let collection = shared.cash_service.create_collection(actor, input).await.unwrap();
    assert_eq!(collection.total_fils, 30_300);
    assert_eq!(collection.collected_by, actor);

    let history = shared.cash_service.collection_history(collection.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "CREATED");
}

#[tokio::test]
async fn test_box_with_collections_cannot_be_deleted() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let cash_box = shared.cash_service.create_box(actor, cash_box("B-200")).await.unwrap();
    let input: CollectionInput = serde_json::from_value(serde_json::json!({
        "box_id": cash_box.id,
        "date": "2024-03-02",
        "note_1": 4,
    }))
    .unwrap();
    let collection = shared.cash_service.create_collection(actor, input).await.unwrap();

    let err = shared.cash_service.delete_box(cash_box.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    shared.cash_service.delete_collection(collection.id).await.unwrap();
    shared.cash_service.delete_box(cash_box.id).await.unwrap();

    let conn = &shared.store.conn;
    assert_eq!(cash_box_audits::Entity::find().count(conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_box_number_is_conflict() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    shared.cash_service.create_box(actor, cash_box("B-300")).await.unwrap();
    let err = shared
        .cash_service
        .create_box(actor, cash_box("B-300"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}
