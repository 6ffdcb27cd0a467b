//! Hosted table clients

mod photos;

pub use photos::HostedPhotoRepository;
