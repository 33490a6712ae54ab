pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shutdown;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;
