//! Artworks API client: a blocking page source for the table engine.
//!
//! No UI concepts. Retries transient failures with basic backoff.

mod artwork;
mod client;

pub use artwork::Artwork;
pub use client::{ArticClient, ClientOptions};
