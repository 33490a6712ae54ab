pub mod command_router;
pub mod queue_listener;
