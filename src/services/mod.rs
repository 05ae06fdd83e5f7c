//! Business logic: parsing, ingestion and aggregation.

pub mod aggregation;
pub mod ingest;
pub mod parser;
