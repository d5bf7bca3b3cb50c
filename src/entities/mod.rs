pub mod prelude;

pub mod accounts;
pub mod box_collection_audits;
pub mod box_collections;
pub mod cash_box_audits;
pub mod cash_boxes;
pub mod event_attendees;
pub mod event_tickets;
pub mod events;
pub mod lucky_draws;
pub mod member_audits;
pub mod member_transaction_audits;
pub mod member_transactions;
pub mod members;
pub mod non_member_audits;
pub mod non_members;
pub mod password_reset_tokens;
pub mod profile_update_requests;
pub mod raffle_winners;
