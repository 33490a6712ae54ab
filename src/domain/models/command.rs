use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SendSms,
    Undetermined,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::SendSms => "SendSms",
            CommandKind::Undetermined => "Undetermined",
        }
    }

    /// Exact, case-sensitive match on the wire tag. Anything else, including a
    /// missing tag, is `Undetermined`.
    pub fn classify(tag: Option<&str>) -> Self {
        match tag {
            Some("SendSms") => CommandKind::SendSms,
            _ => CommandKind::Undetermined,
        }
    }
}

/// Command as it arrives on the inbound queue. Every field is optional on the
/// wire; validation happens when mapping to [`OutboundSms`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCommand {
    pub command: Option<String>,
    pub phone_number: Option<String>,
    pub sms_text: Option<String>,
}

impl ReceivedCommand {
    pub fn send_sms(phone_number: impl Into<String>, sms_text: impl Into<String>) -> Self {
        Self {
            command: Some(CommandKind::SendSms.as_str().to_string()),
            phone_number: Some(phone_number.into()),
            sms_text: Some(sms_text.into()),
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self, DomainError> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn kind(&self) -> CommandKind {
        CommandKind::classify(self.command.as_deref())
    }
}

/// The part of a command that is forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundSms {
    pub phone_number: String,
    pub sms_text: String,
}

impl TryFrom<&ReceivedCommand> for OutboundSms {
    type Error = DomainError;

    fn try_from(command: &ReceivedCommand) -> Result<Self, Self::Error> {
        let phone_number = non_empty(command.phone_number.as_deref())
            .ok_or_else(|| DomainError::Validation("phoneNumber is required".to_string()))?;
        let sms_text = non_empty(command.sms_text.as_deref())
            .ok_or_else(|| DomainError::Validation("smsText is required".to_string()))?;

        Ok(Self {
            phone_number: phone_number.to_string(),
            sms_text: sms_text.to_string(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
