pub(crate) mod class_stats;
pub(crate) mod progress;
pub(crate) mod rate_limit;
pub(crate) mod sample_data;
pub(crate) mod scoring;
