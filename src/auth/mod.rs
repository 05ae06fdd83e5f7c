//! Request authentication.
//!
//! Two separate credentials guard the API. Interactive reads carry a session
//! header naming the user, whose default membership picks the organization
//! every query is scoped to. CI uploads instead carry the organization's
//! public upload token and never touch user identity.

pub mod extractor;

pub use extractor::{SessionUser, UploadOrg};
