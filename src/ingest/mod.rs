pub mod pipeline;
pub mod scanner;

pub use pipeline::ingest_directory;
