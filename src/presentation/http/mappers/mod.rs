use crate::application::handlers::queue_listener::ListenerState;
use crate::presentation::http::responses::ListenerStateDto;

pub fn map_listener_state(state: ListenerState) -> ListenerStateDto {
    match state {
        ListenerState::Starting => ListenerStateDto::Starting,
        ListenerState::Subscribed => ListenerStateDto::Subscribed,
        ListenerState::SubscriptionFailed => ListenerStateDto::SubscriptionFailed,
        ListenerState::Stopped => ListenerStateDto::Stopped,
    }
}
