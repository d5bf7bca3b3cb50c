pub use super::accounts::Entity as Accounts;
pub use super::box_collection_audits::Entity as BoxCollectionAudits;
pub use super::box_collections::Entity as BoxCollections;
pub use super::cash_box_audits::Entity as CashBoxAudits;
pub use super::cash_boxes::Entity as CashBoxes;
pub use super::event_attendees::Entity as EventAttendees;
pub use super::event_tickets::Entity as EventTickets;
pub use super::events::Entity as Events;
pub use super::lucky_draws::Entity as LuckyDraws;
pub use super::member_audits::Entity as MemberAudits;
pub use super::member_transaction_audits::Entity as MemberTransactionAudits;
pub use super::member_transactions::Entity as MemberTransactions;
pub use super::members::Entity as Members;
pub use super::non_member_audits::Entity as NonMemberAudits;
pub use super::non_members::Entity as NonMembers;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::profile_update_requests::Entity as ProfileUpdateRequests;
pub use super::raffle_winners::Entity as RaffleWinners;
