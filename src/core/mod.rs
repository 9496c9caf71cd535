pub mod classify;
pub mod delta;
pub mod error;
pub mod fixture;
pub mod ingest;
pub mod mapping;
pub mod state;
pub mod types;
