pub mod error;
pub use error::{ServiceError, with_deadline};

pub mod ids;
pub mod mailer;
pub use mailer::{HttpMailer, LogMailer, Mail, Mailer};

pub mod password_reset;
pub use password_reset::PasswordResetService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod membership_service;
pub mod membership_service_impl;
pub use membership_service::{
    ApprovalOutcome, ApprovalRequest, MembershipService, RegistrationRequest,
};
pub use membership_service_impl::SeaOrmMembershipService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileService, UpdateRequestView};
pub use profile_service_impl::SeaOrmProfileService;

pub mod non_member_service;
pub mod non_member_service_impl;
pub use non_member_service::{NonMemberInput, NonMemberService};
pub use non_member_service_impl::SeaOrmNonMemberService;

pub mod cash_service;
pub mod cash_service_impl;
pub use cash_service::{
    BoxInput, CashService, CollectionInput, ImportFailure, ImportReport, ImportRow,
};
pub use cash_service_impl::SeaOrmCashService;

pub mod transaction_service;
pub mod transaction_service_impl;
pub use transaction_service::{TransactionInput, TransactionService};
pub use transaction_service_impl::SeaOrmTransactionService;

pub mod event_service;
pub mod event_service_impl;
pub use event_service::{AttendanceInput, AttendanceSummary, EventInput, EventService, TicketInput};
pub use event_service_impl::SeaOrmEventService;

pub mod raffle_service;
pub mod raffle_service_impl;
pub use raffle_service::{DrawInput, RaffleService, SpinResult};
pub use raffle_service_impl::SeaOrmRaffleService;
