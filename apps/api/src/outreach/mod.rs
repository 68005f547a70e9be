//! Application email drafts.

pub mod email;
pub mod handlers;

pub use email::{generate_email, EmailDraft};
