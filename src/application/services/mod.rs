pub mod clock;
pub mod event_bus;
pub mod provider;
pub mod queue;
pub mod retry;
