use poem_openapi::{Enum, Object};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[oai(rename_all = "snake_case")]
pub enum ListenerStateDto {
    Starting,
    Subscribed,
    SubscriptionFailed,
    Stopped,
}

#[derive(Object)]
pub struct ServiceStatusDto {
    pub listener: ListenerStateDto,
    pub queue: String,
}
