mod common;

use memberdesk::entities::lucky_draws::DrawStatus;
use memberdesk::entities::members::{self, MemberStatus};
use memberdesk::membership::MemberPatch;
use memberdesk::services::{
    ApprovalRequest, AttendanceInput, DrawInput, EventInput, ServiceError, TicketInput,
    TransactionInput,
};
use memberdesk::state::SharedState;

use common::{admin_id, registration, shared_state, test_config};

async fn approved_member(shared: &SharedState, actor: i64, civil_id: &str) -> members::Model {
    let member = shared
        .membership_service
        .register(registration(civil_id, None))
        .await
        .unwrap();
    shared
        .membership_service
        .approve(
            actor,
            member.id,
            ApprovalRequest {
                status: MemberStatus::Approved,
                changes: MemberPatch::default(),
            },
        )
        .await
        .unwrap()
        .member
}

fn event(name: &str) -> EventInput {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "venue": "Salmiya Hall",
        "start_date": "2026-03-01",
        "end_date": "2026-03-02",
    }))
    .unwrap()
}

fn ticket(ticket_no: &str, name: &str) -> TicketInput {
    serde_json::from_value(serde_json::json!({ "ticket_no": ticket_no, "name": name, "amount": "2.5" }))
        .unwrap()
}

fn arrival_by_ticket(ticket_no: &str) -> AttendanceInput {
    serde_json::from_value(serde_json::json!({ "ticket_no": ticket_no })).unwrap()
}

fn draw(prize: &str) -> DrawInput {
    serde_json::from_value(serde_json::json!({ "prize": prize })).unwrap()
}

#[tokio::test]
async fn test_transaction_copies_card_dates_onto_member() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;
    let member = approved_member(&shared, actor, "81001").await;

    let input: TransactionInput = serde_json::from_value(serde_json::json!({
        "member_id": member.id,
        "category": "ID Card",
        "amount": "1.500",
        "date": "2026-02-10",
        "card_printed_date": "2026-02-10",
        "card_expiry_date": "2028-02-09",
    }))
    .unwrap();
    let recorded = shared.transaction_service.create(actor, input).await.unwrap();
    assert_eq!(recorded.amount_fils, 1_500);

    let updated = shared.membership_service.get(member.id).await.unwrap();
    assert_eq!(updated.card_printed_date.as_deref(), Some("2026-02-10"));
    assert_eq!(updated.card_expiry_date.as_deref(), Some("2028-02-09"));

    let history = shared.membership_service.history(member.id).await.unwrap();
    let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["MODIFIED", "APPROVED", "CREATED"]);
    assert_eq!(history[0].snapshot["card_expiry_date"], "2028-02-09");

    let trail = shared.transaction_service.history(recorded.id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, "CREATED");
}

#[tokio::test]
async fn test_transaction_without_card_dates_leaves_member_alone() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;
    let member = approved_member(&shared, actor, "81002").await;

    let input: TransactionInput = serde_json::from_value(serde_json::json!({
        "member_id": member.id,
        "category": "Membership Fee",
        "amount": "10",
        "date": "2026-02-10",
    }))
    .unwrap();
    shared.transaction_service.create(actor, input).await.unwrap();

    let history = shared.membership_service.history(member.id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_profile_request_approval_applies_changes_once() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;
    let member = approved_member(&shared, actor, "82001").await;

    let changes = MemberPatch {
        profession: Some("Engineer".to_string()),
        ..MemberPatch::default()
    };
    let request = shared
        .profile_service
        .submit(member.account_id, changes.clone())
        .await
        .unwrap();

    let again = shared
        .profile_service
        .submit(member.account_id, changes)
        .await
        .unwrap_err();
    assert!(matches!(again, ServiceError::Conflict(_)));

    let request_id: i64 = request.id.parse().unwrap();
    let updated = shared.profile_service.approve(actor, request_id).await.unwrap();
    assert_eq!(updated.profession.as_deref(), Some("Engineer"));
    assert!(!shared.profile_service.has_pending(member.account_id).await.unwrap());

    let history = shared.membership_service.history(member.id).await.unwrap();
    assert_eq!(history[0].action, "MODIFIED");
    assert_eq!(history[0].committed_by, actor);

    let err = shared.profile_service.approve(actor, request_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_attendance_is_recorded_once_per_event() {
    let (shared, _) = shared_state(test_config()).await;
    let actor = admin_id(&shared).await;
    let member = approved_member(&shared, actor, "83001").await;
    let membership_id = member.membership_id.clone().unwrap();

    let created = shared.event_service.create_event(event("Annual Picnic")).await.unwrap();
    shared.event_service.create_ticket(created.id, ticket("T-1", "Guest One")).await.unwrap();

    let by_member: AttendanceInput =
        serde_json::from_value(serde_json::json!({ "membership_id": membership_id, "extra_guests": 2 }))
            .unwrap();
    shared.event_service.mark_attended(created.id, by_member.clone()).await.unwrap();
    shared.event_service.mark_attended(created.id, arrival_by_ticket("T-1")).await.unwrap();

    let err = shared.event_service.mark_attended(created.id, by_member).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    let err = shared
        .event_service
        .mark_attended(created.id, arrival_by_ticket("T-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let summary = shared.event_service.attendance_summary(created.id).await.unwrap();
    assert_eq!(summary.attendees, 2);
    assert_eq!(summary.people, 4);
}

#[tokio::test]
async fn test_raffle_skips_previous_winners_and_resets() {
    let (shared, _) = shared_state(test_config()).await;

    let created = shared.event_service.create_event(event("Gala Night")).await.unwrap();
    for (no, name) in [("T-1", "Guest One"), ("T-2", "Guest Two")] {
        shared.event_service.create_ticket(created.id, ticket(no, name)).await.unwrap();
        shared.event_service.mark_attended(created.id, arrival_by_ticket(no)).await.unwrap();
    }

    let first = shared.raffle_service.create_draw(created.id, draw("Television")).await.unwrap();
    let second = shared.raffle_service.create_draw(created.id, draw("Gold coin")).await.unwrap();

    let first_spin = shared.raffle_service.spin(first.id).await.unwrap();
    assert_eq!(first_spin.participants, 2);
    assert_eq!(first_spin.draw.status, DrawStatus::Completed);

    let second_spin = shared.raffle_service.spin(second.id).await.unwrap();
    assert_eq!(second_spin.participants, 1);
    assert_ne!(second_spin.winner.id, first_spin.winner.id);

    let err = shared.raffle_service.spin(first.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let third = shared.raffle_service.create_draw(created.id, draw("Voucher")).await.unwrap();
    let err = shared.raffle_service.spin(third.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let reset = shared.raffle_service.reset(first.id).await.unwrap();
    assert_eq!(reset.status, DrawStatus::Pending);
    assert_eq!(shared.raffle_service.winners(created.id).await.unwrap().len(), 1);

    let respin = shared.raffle_service.spin(first.id).await.unwrap();
    assert_eq!(respin.participants, 1);
    assert_eq!(respin.winner.id, first_spin.winner.id);
}

#[tokio::test]
async fn test_event_delete_removes_everything_under_it() {
    let (shared, _) = shared_state(test_config()).await;

    let doomed = shared.event_service.create_event(event("Cancelled Dinner")).await.unwrap();
    let kept = shared.event_service.create_event(event("Eid Gathering")).await.unwrap();
    for id in [doomed.id, kept.id] {
        shared.event_service.create_ticket(id, ticket("T-1", "Guest One")).await.unwrap();
        shared.event_service.mark_attended(id, arrival_by_ticket("T-1")).await.unwrap();
        let prize = shared.raffle_service.create_draw(id, draw("Hamper")).await.unwrap();
        shared.raffle_service.spin(prize.id).await.unwrap();
    }

    shared.event_service.delete_event(doomed.id).await.unwrap();

    let err = shared.event_service.get_event(doomed.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(shared.store.events().list_tickets(doomed.id).await.unwrap().is_empty());
    assert!(shared.store.events().list_attendees(doomed.id).await.unwrap().is_empty());
    assert!(shared.store.raffle().list_draws(doomed.id).await.unwrap().is_empty());
    assert!(shared.store.raffle().winners_for_event(doomed.id).await.unwrap().is_empty());

    assert_eq!(shared.store.events().list_tickets(kept.id).await.unwrap().len(), 1);
    assert_eq!(shared.raffle_service.winners(kept.id).await.unwrap().len(), 1);

    let err = shared.event_service.delete_event(doomed.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
