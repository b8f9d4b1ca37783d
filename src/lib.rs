pub mod config;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod plots;
pub mod report;
pub mod stats;
pub mod table;
