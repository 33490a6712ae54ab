use std::sync::Arc;

use poem_openapi::{
    OpenApi,
    payload::{Json, PlainText},
};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags},
    mappers::map_listener_state,
    responses::ServiceStatusDto,
};

#[derive(Clone)]
pub struct HealthEndpoints {
    state: Arc<ApiState>,
}

impl HealthEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl HealthEndpoints {
    #[oai(path = "/health", method = "get", tag = EndpointsTags::Health)]
    pub async fn health(&self) -> PlainText<&'static str> {
        PlainText("OK")
    }

    /// Current state of the queue listener.
    #[oai(path = "/status", method = "get", tag = EndpointsTags::Health)]
    pub async fn status(&self) -> Json<ServiceStatusDto> {
        let listener = *self.state.listener_state.borrow();
        Json(ServiceStatusDto {
            listener: map_listener_state(listener),
            queue: self.state.queue_name.clone(),
        })
    }
}
