pub mod account;
pub mod cash;
pub mod event;
pub mod member;
pub mod non_member;
pub mod raffle;
pub mod reset_token;
pub mod transaction;
pub mod update_request;
