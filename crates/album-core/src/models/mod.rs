//! Data models for the application
//!
//! Photo records are the only entity the thumbnail tools read and write.
//! User records are modelled because they belong to the same hosted backend
//! contract, but only the auth subsystem creates or mutates them.

mod photo;
mod user;

// Re-export all models for convenient imports
pub use photo::*;
pub use user::*;
