pub mod export;
pub mod repo;
pub mod schema;

pub use repo::{ArtworkStore, ArtworkSummary, CandidateQuery};
