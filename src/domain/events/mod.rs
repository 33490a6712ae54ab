use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::OutboundSms;

pub const SMS_SENT_EVENT: &str = "SmsSent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsSentEvent {
    pub phone_number: String,
    pub sms_text: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

impl SmsSentEvent {
    pub fn new(message: &OutboundSms, timestamp: DateTime<Utc>) -> Self {
        Self {
            phone_number: message.phone_number.clone(),
            sms_text: message.sms_text.clone(),
            event: SMS_SENT_EVENT.to_string(),
            timestamp,
        }
    }
}
