// Load-test aggregation domain
pub mod efficiency;
pub mod errors;
pub mod load_group;
pub mod ports;
pub mod run_report;
pub mod sample;
pub mod trend;
