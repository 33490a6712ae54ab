use std::fmt;

use crate::domain::models::OutboundSms;

/// Identifies a message body for duplicate suppression: the exact
/// `phoneNumber-smsText` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn for_message(message: &OutboundSms) -> Self {
        DedupKey(format!("{}-{}", message.phone_number, message.sms_text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
