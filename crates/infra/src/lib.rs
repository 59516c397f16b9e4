//! Infrastructure layer: reference ledger adapters, persistence, outbound mail.

pub mod ledger;
pub mod mailer;
pub mod store;
