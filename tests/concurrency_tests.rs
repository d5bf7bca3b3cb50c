mod common;

use std::collections::HashSet;

use memberdesk::entities::members::MemberStatus;
use memberdesk::membership::MemberPatch;
use memberdesk::services::{ApprovalRequest, BoxInput};

use common::{admin_id, registration, shared_state, test_config};

fn approve() -> ApprovalRequest {
    ApprovalRequest {
        status: MemberStatus::Approved,
        changes: MemberPatch::default(),
    }
}

fn cash_box(number: &str, remarks: &str) -> BoxInput {
    serde_json::from_value(serde_json::json!({
        "number": number,
        "in_use": true,
        "remarks": remarks,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_concurrent_box_updates_all_commit() {
    const N: usize = 8;

    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;

    let mut box_ids = Vec::new();
    for i in 0..N {
        let created = shared
            .cash_service
            .create_box(actor, cash_box(&format!("B-{i}"), "new"))
            .await
            .unwrap();
        box_ids.push(created.id);
    }

    let handles: Vec<_> = box_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let service = shared.cash_service.clone();
            tokio::spawn(async move {
                service
                    .update_box(actor, id, cash_box(&format!("B-{i}"), "counted"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let updated = handle.await.unwrap().unwrap();
        assert_eq!(updated.remarks.as_deref(), Some("counted"));
    }

    for id in box_ids {
        let history = shared.cash_service.box_history(id).await.unwrap();
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["MODIFIED", "CREATED"]);
    }
}

#[tokio::test]
async fn test_approvals_from_two_instances_share_one_sequence() {
    const N: usize = 8;

    let config = test_config();
    let (first, _) = shared_state(config.clone()).await;
    let (second, _) = shared_state(config).await;
    let actor = admin_id(&first).await;

    let mut member_ids = Vec::new();
    for i in 0..N {
        let member = first
            .membership_service
            .register(registration(&format!("7100{i}"), None))
            .await
            .unwrap();
        member_ids.push(member.id);
    }

    let handles: Vec<_> = member_ids
        .into_iter()
        .enumerate()
        .map(|(i, member_id)| {
            let service = if i % 2 == 0 {
                first.membership_service.clone()
            } else {
                second.membership_service.clone()
            };
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

    let pending = second.membership_service.list_pending().await.unwrap();
    assert!(pending.is_empty());
}
