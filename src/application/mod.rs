// Input discovery and parsing
pub mod discovery;
pub mod loader;
pub mod response_times;

// Aggregation across sources
pub mod aggregator;

// Run orchestration and console output
pub mod pipeline;
pub mod reporting;
