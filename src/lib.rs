//! SegForge: A Rust CLI application for customer segmentation using RFM quintile scoring
//!
//! This library aggregates raw purchase transactions into per-customer
//! RFM (Recency, Frequency, Monetary) metrics, scores each metric by
//! population quintile, assigns one of six fixed behavioral segments, and
//! summarizes the result per segment.

pub mod cli;
pub mod ingest;
pub mod report;
pub mod rfm;
pub mod sample;
pub mod segment;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use ingest::{load_transactions, read_transactions, TransactionRecord};
pub use report::{analyze, AverageMetrics, RfmReport, SegmentStat};
pub use rfm::{aggregate_customers, score_customers, CustomerMetrics, ScoredCustomer};
pub use segment::{classify, Segment};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
