use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::WinnerRecord;
use crate::entities::{
    box_collections, cash_boxes, event_attendees, event_tickets, events, lucky_draws,
    member_transactions, members, non_members,
};
use crate::ledger::AuditEntry;
use crate::ledger::money::{DenominationCounts, from_fils, present};
use crate::membership::IdFormat;
use crate::services::{ApprovalOutcome, SpinResult};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn money(fils: i64) -> Decimal {
    present(from_fils(fils))
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub id: String,
    pub account_id: String,
    pub membership_id: Option<String>,
    pub status: members::MemberStatus,
    pub civil_id: String,
    pub full_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub blood_group: Option<String>,
    pub profession: Option<String>,
    pub kuwait_contact: Option<String>,
    pub whatsapp: Option<String>,
    pub zone: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub type_of_member: Option<String>,
    pub nominee_name: Option<String>,
    pub nominee_relation: Option<String>,
    pub percentages: [Option<i32>; 4],
    pub profile_picture: Option<String>,
    pub form_scanned: Option<String>,
    pub transaction_slip: Option<String>,
    pub card_printed_date: Option<String>,
    pub card_expiry_date: Option<String>,
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<members::Model> for MemberDto {
    fn from(m: members::Model) -> Self {
        Self {
            id: m.id.to_string(),
            account_id: m.account_id.to_string(),
            full_name: m.full_name(),
            membership_id: m.membership_id,
            status: m.status,
            civil_id: m.civil_id,
            first_name: m.first_name,
            middle_name: m.middle_name,
            last_name: m.last_name,
            email: m.email,
            gender: m.gender,
            dob: m.dob,
            blood_group: m.blood_group,
            profession: m.profession,
            kuwait_contact: m.kuwait_contact,
            whatsapp: m.whatsapp,
            zone: m.zone,
            area: m.area,
            address: m.address,
            type_of_member: m.type_of_member,
            nominee_name: m.nominee_name,
            nominee_relation: m.nominee_relation,
            percentages: [m.percentage_1, m.percentage_2, m.percentage_3, m.percentage_4],
            profile_picture: m.profile_picture,
            form_scanned: m.form_scanned,
            transaction_slip: m.transaction_slip,
            card_printed_date: m.card_printed_date,
            card_expiry_date: m.card_expiry_date,
            approved_at: m.approved_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalDto {
    pub member: MemberDto,
    pub allocated: Option<String>,
    pub notified: bool,
}

impl From<ApprovalOutcome> for ApprovalDto {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            member: outcome.member.into(),
            allocated: outcome.allocated,
            notified: outcome.notified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditEntryDto {
    pub id: String,
    pub action: String,
    pub committed_by: String,
    pub actor_username: Option<String>,
    pub actor_name: Option<String>,
    pub created_at: String,
    pub snapshot: serde_json::Value,
}

impl From<AuditEntry> for AuditEntryDto {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            action: entry.action,
            committed_by: entry.committed_by.to_string(),
            actor_username: entry.actor_username,
            actor_name: entry.actor_name,
            created_at: entry.created_at,
            snapshot: entry.snapshot,
        }
    }
}

pub fn audit_trail(entries: Vec<AuditEntry>) -> Vec<AuditEntryDto> {
    entries.into_iter().map(AuditEntryDto::from).collect()
}

#[derive(Debug, Serialize)]
pub struct NonMemberDto {
    pub id: String,
    pub display_id: String,
    pub full_name: String,
    pub is_company: bool,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl NonMemberDto {
    pub fn new(model: non_members::Model, format: &IdFormat) -> Self {
        Self {
            id: model.id.to_string(),
            display_id: format.format(model.id.unsigned_abs()),
            full_name: model.full_name,
            is_company: model.is_company,
            company_name: model.company_name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            remarks: model.remarks,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CashBoxDto {
    pub id: String,
    pub number: String,
    pub member_id: Option<String>,
    pub non_member_id: Option<String>,
    pub referred_by: Option<String>,
    pub in_use: bool,
    pub date_issued: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<cash_boxes::Model> for CashBoxDto {
    fn from(b: cash_boxes::Model) -> Self {
        Self {
            id: b.id.to_string(),
            number: b.number,
            member_id: b.member_id.map(|id| id.to_string()),
            non_member_id: b.non_member_id.map(|id| id.to_string()),
            referred_by: b.referred_by.map(|id| id.to_string()),
            in_use: b.in_use,
            date_issued: b.date_issued,
            remarks: b.remarks,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionDto {
    pub id: String,
    pub box_id: String,
    pub collected_by: String,
    pub date: String,
    #[serde(flatten)]
    pub counts: DenominationCounts,
    pub total: Decimal,
    pub remarks: Option<String>,
    pub slip_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<box_collections::Model> for CollectionDto {
    fn from(c: box_collections::Model) -> Self {
        Self {
            id: c.id.to_string(),
            box_id: c.box_id.to_string(),
            collected_by: c.collected_by.to_string(),
            counts: DenominationCounts {
                note_20: c.note_20,
                note_10: c.note_10,
                note_5: c.note_5,
                note_1: c.note_1,
                note_0_5: c.note_0_5,
                note_0_25: c.note_0_25,
                coin_100: c.coin_100,
                coin_50: c.coin_50,
                coin_20: c.coin_20,
                coin_10: c.coin_10,
                coin_5: c.coin_5,
            },
            total: money(c.total_fils),
            date: c.date,
            remarks: c.remarks,
            slip_path: c.slip_path,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionDto {
    pub id: String,
    pub member_id: String,
    pub category: String,
    pub amount: Decimal,
    pub date: String,
    pub remarks: Option<String>,
    pub slip_path: Option<String>,
    pub card_printed_date: Option<String>,
    pub card_expiry_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<member_transactions::Model> for TransactionDto {
    fn from(t: member_transactions::Model) -> Self {
        Self {
            id: t.id.to_string(),
            member_id: t.member_id.to_string(),
            category: t.category,
            amount: money(t.amount_fils),
            date: t.date,
            remarks: t.remarks,
            slip_path: t.slip_path,
            card_printed_date: t.card_printed_date,
            card_expiry_date: t.card_expiry_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDto {
    pub id: String,
    pub name: String,
    pub venue: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<events::Model> for EventDto {
    fn from(e: events::Model) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name,
            venue: e.venue,
            start_date: e.start_date,
            end_date: e.end_date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketDto {
    pub id: String,
    pub event_id: String,
    pub ticket_no: String,
    pub name: String,
    pub phone: Option<String>,
    pub civil_id: Option<String>,
    pub amount: Decimal,
    pub created_at: String,
}

impl From<event_tickets::Model> for TicketDto {
    fn from(t: event_tickets::Model) -> Self {
        Self {
            id: t.id.to_string(),
            event_id: t.event_id.to_string(),
            ticket_no: t.ticket_no,
            name: t.name,
            phone: t.phone,
            civil_id: t.civil_id,
            amount: money(t.amount_fils),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendeeDto {
    pub id: String,
    pub event_id: String,
    pub attendee_key: String,
    pub ticket_no: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub civil_id: Option<String>,
    pub num_people: i32,
    pub attended_at: String,
}

impl From<event_attendees::Model> for AttendeeDto {
    fn from(a: event_attendees::Model) -> Self {
        Self {
            id: a.id.to_string(),
            event_id: a.event_id.to_string(),
            attendee_key: a.attendee_key,
            ticket_no: a.ticket_no,
            name: a.name,
            phone: a.phone,
            civil_id: a.civil_id,
            num_people: a.num_people,
            attended_at: a.attended_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrawDto {
    pub id: String,
    pub event_id: String,
    pub prize: String,
    pub sponsor: Option<String>,
    pub start_time: Option<String>,
    pub status: lucky_draws::DrawStatus,
    pub created_at: String,
}

impl From<lucky_draws::Model> for DrawDto {
    fn from(d: lucky_draws::Model) -> Self {
        Self {
            id: d.id.to_string(),
            event_id: d.event_id.to_string(),
            prize: d.prize,
            sponsor: d.sponsor,
            start_time: d.start_time,
            status: d.status,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpinDto {
    pub draw: DrawDto,
    pub winner: AttendeeDto,
    pub participants: i32,
}

impl From<SpinResult> for SpinDto {
    fn from(spin: SpinResult) -> Self {
        Self {
            draw: spin.draw.into(),
            winner: spin.winner.into(),
            participants: spin.participants,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WinnerDto {
    pub id: String,
    pub draw: DrawDto,
    pub attendee: Option<AttendeeDto>,
    pub participants: i32,
    pub won_at: String,
}

impl From<WinnerRecord> for WinnerDto {
    fn from(record: WinnerRecord) -> Self {
        Self {
            id: record.winner.id.to_string(),
            draw: record.draw.into(),
            attendee: record.attendee.map(AttendeeDto::from),
            participants: record.winner.participants,
            won_at: record.winner.won_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_renders_three_places() {
        let json = serde_json::to_value(money(30_300)).unwrap();
        assert_eq!(json, serde_json::json!("30.300"));
    }

    #[test]
    fn test_non_member_display_id() {
        let format = IdFormat {
            prefix: "KWSKWN".into(),
            width: 4,
            floor: 1,
        };
        let model = non_members::Model {
            id: 7,
            full_name: "Acme Trading".into(),
            is_company: true,
            company_name: Some("Acme".into()),
            email: None,
            phone: None,
            address: None,
            remarks: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        };
        let dto = NonMemberDto::new(model, &format);
        assert_eq!(dto.display_id, "KWSKWN0007");
        assert_eq!(dto.id, "7");
    }
}
