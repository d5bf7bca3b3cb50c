mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use memberdesk::entities::members::MemberStatus;
use memberdesk::membership::MemberPatch;
use memberdesk::services::{ApprovalRequest, ServiceError};

use common::{FailingMailer, admin_id, registration, shared_state, shared_state_with_mailer, test_config};

fn approve() -> ApprovalRequest {
    ApprovalRequest {
        status: MemberStatus::Approved,
        changes: MemberPatch::default(),
    }
}

#[tokio::test]
async fn test_approval_assigns_identifier_and_activates_account() {
    let (shared, mailer) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("12345", Some("member@example.com")))
        .await
        .unwrap();
    assert_eq!(member.status, MemberStatus::Pending);
    assert_eq!(member.membership_id, None);

    let account = shared.store.accounts().get_by_id(member.account_id).await.unwrap().unwrap();
    assert_eq!(account.username, "12345");
    assert!(!account.is_active);

    let outcome = shared
        .membership_service
        .approve(actor, member.id, approve())
        .await
        .unwrap();

    let id = outcome.allocated.clone().expect("identifier allocated");
    assert_eq!(id, "KWSKW05000");
    assert_eq!(outcome.member.membership_id.as_deref(), Some(id.as_str()));
    assert_eq!(outcome.member.status, MemberStatus::Approved);
    assert!(outcome.member.approved_at.is_some());
    assert!(outcome.notified);

    let account = shared.store.accounts().get_by_id(member.account_id).await.unwrap().unwrap();
    assert_eq!(account.username, id);
    assert!(account.is_active);

    let history = shared.membership_service.history(member.id).await.unwrap();
    let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["APPROVED", "CREATED"]);
    assert_eq!(history[0].committed_by, actor);
    assert_eq!(history[0].actor_username.as_deref(), Some("admin"));

    // Mail goes out on a spawned task
    tokio::time::sleep(Duration::from_millis(100)).await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "member@example.com");
    assert!(sent[0].body.contains(&id));
}

#[tokio::test]
async fn test_reapproval_keeps_identifier() {
    let (shared, mailer) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("20001", Some("again@example.com")))
        .await
        .unwrap();

    let first = shared.membership_service.approve(actor, member.id, approve()).await.unwrap();
    let second = shared.membership_service.approve(actor, member.id, approve()).await.unwrap();

    assert!(second.allocated.is_none());
    assert!(!second.notified);
    assert_eq!(first.member.membership_id, second.member.membership_id);
    assert_eq!(first.member.approved_at, second.member.approved_at);

    let history = shared.membership_service.history(member.id).await.unwrap();
    assert_eq!(history[0].action, "MODIFIED");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_inactive_then_approved_keeps_identifier() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("20002", None))
        .await
        .unwrap();
    let approved = shared.membership_service.approve(actor, member.id, approve()).await.unwrap();
    let assigned = approved.member.membership_id.clone();

    let inactive = shared
        .membership_service
        .approve(
            actor,
            member.id,
            ApprovalRequest {
                status: MemberStatus::Inactive,
                changes: MemberPatch::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(inactive.member.membership_id, assigned);
    let account = shared.store.accounts().get_by_id(member.account_id).await.unwrap().unwrap();
    assert!(!account.is_active);

    let back = shared.membership_service.approve(actor, member.id, approve()).await.unwrap();
    assert!(back.allocated.is_none());
    assert_eq!(back.member.membership_id, assigned);
    assert!(!back.notified, "no email address on file");
}

#[tokio::test]
async fn test_rejection_leaves_member_unassigned() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("20003", None))
        .await
        .unwrap();

    let outcome = shared
        .membership_service
        .approve(
            actor,
            member.id,
            ApprovalRequest {
                status: MemberStatus::Rejected,
                changes: MemberPatch::default(),
            },
        )
        .await
        .unwrap();

    assert!(outcome.allocated.is_none());
    assert_eq!(outcome.member.membership_id, None);
    assert_eq!(outcome.member.status, MemberStatus::Rejected);
}

#[tokio::test]
async fn test_next_identifier_follows_highest_assigned() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let seeded = shared
        .membership_service
        .register(registration("30001", None))
        .await
        .unwrap();

    // An imported member already holding a high identifier
    shared
        .membership_service
        .approve(
            actor,
            seeded.id,
            ApprovalRequest {
                status: MemberStatus::Approved,
                changes: MemberPatch::default(),
            },
        )
        .await
        .unwrap();
    {
        use memberdesk::entities::members;
        use sea_orm::{ActiveModelTrait, Set};
        let row = members::ActiveModel {
            id: Set(seeded.id),
            membership_id: Set(Some("KWSKW00012".to_string())),
            ..Default::default()
        };
        row.update(&shared.store.conn).await.unwrap();
    }

    assert_eq!(shared.membership_service.preview_next_id().await.unwrap(), "KWSKW00013");

    let next = shared
        .membership_service
        .register(registration("30002", None))
        .await
        .unwrap();
    let outcome = shared.membership_service.approve(actor, next.id, approve()).await.unwrap();
    assert_eq!(outcome.allocated.as_deref(), Some("KWSKW00013"));
}

#[tokio::test]
async fn test_concurrent_approvals_get_distinct_contiguous_identifiers() {
    const N: usize = 8;

    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let mut member_ids = Vec::new();
    for i in 0..N {
        let member = shared
            .membership_service
            .register(registration(&format!("4000{i}"), None))
            .await
            .unwrap();
        member_ids.push(member.id);
    }

    let handles: Vec<_> = member_ids
        .into_iter()
        .map(|member_id| {
            let service = shared.membership_service.clone();
            tokio::spawn(async move { service.approve(actor, member_id, approve()).await })
        })
        .collect();

    let mut assigned = HashSet::new();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(assigned.insert(outcome.allocated.unwrap()));
    }

    let expected: HashSet<String> = (5000..5000 + N as u64)
        .map(|n| format!("KWSKW{n:05}"))
        .collect();
    assert_eq!(assigned, expected);
}

#[tokio::test]
async fn test_approval_survives_mail_failure() {
    let shared = shared_state_with_mailer(test_config(), Arc::new(FailingMailer)).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("45001", Some("unreachable@example.com")))
        .await
        .unwrap();

    let outcome = shared
        .membership_service
        .approve(actor, member.id, approve())
        .await
        .unwrap();
    assert_eq!(outcome.allocated.as_deref(), Some("KWSKW05000"));
    assert!(outcome.notified);

    // Let the spawned send fail before checking nothing was undone
    tokio::time::sleep(Duration::from_millis(100)).await;
    let stored = shared.membership_service.get(member.id).await.unwrap();
    assert_eq!(stored.status, MemberStatus::Approved);
    assert_eq!(stored.membership_id.as_deref(), Some("KWSKW05000"));
}

#[tokio::test]
async fn test_approval_of_missing_member_is_not_found() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let err = shared
        .membership_service
        .approve(actor, 9999, approve())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_civil_id_is_conflict() {
    let (shared, _) = shared_state(test_config()).await;

    shared
        .membership_service
        .register(registration("50001", None))
        .await
        .unwrap();

    let err = shared
        .membership_service
        .register(registration("50001", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_patch_fails_before_any_write() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let member = shared
        .membership_service
        .register(registration("50002", None))
        .await
        .unwrap();

    let changes: MemberPatch =
        serde_json::from_value(serde_json::json!({ "percentage_1": 80, "percentage_2": 40 })).unwrap();

    let err = shared
        .membership_service
        .approve(
            actor,
            member.id,
            ApprovalRequest {
                status: MemberStatus::Approved,
                changes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let unchanged = shared.membership_service.get(member.id).await.unwrap();
    assert_eq!(unchanged.status, MemberStatus::Pending);
    assert_eq!(unchanged.membership_id, None);
}
