pub mod fields;
pub mod normalize;
pub mod record;

pub use normalize::normalize;
pub use record::{ArtworkRecord, FieldValue, Row};
