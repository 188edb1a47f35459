pub mod aggregator;
pub mod transcoder;
