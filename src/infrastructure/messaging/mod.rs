pub mod http_provider;
pub mod in_memory;
pub mod jetstream;
pub mod log_bus;
