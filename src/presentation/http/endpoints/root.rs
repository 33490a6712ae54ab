use tokio::sync::watch;

use poem_openapi::Tags;

use crate::application::handlers::queue_listener::ListenerState;

#[derive(Clone)]
pub struct ApiState {
    pub listener_state: watch::Receiver<ListenerState>,
    pub queue_name: String,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
}
