//! Album Database Layer
//!
//! Access to the photo table of the hosted backend. The generator only talks
//! to the [`PhotoRepository`] trait so tests can swap in an in-memory table.

pub mod db;
pub mod repository;

pub use db::HostedPhotoRepository;
pub use repository::PhotoRepository;
