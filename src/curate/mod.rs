pub mod coverage;
pub mod dimensions;
pub mod filter;
pub mod manifest;
pub mod quality;
