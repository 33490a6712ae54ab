use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::{
    application::usecases::send_sms::{SendSmsOutcome, SendSmsUseCase},
    domain::models::{CommandKind, ReceivedCommand},
};

#[derive(Debug)]
pub enum RouteOutcome {
    /// The command was handed to its handler on a detached task.
    Dispatched(JoinHandle<SendSmsOutcome>),
    Malformed,
    Undetermined,
}

/// Turns raw queue payloads into handler calls. Never fails: every decode or
/// dispatch problem is logged and the payload is dropped.
pub struct CommandRouter {
    send_sms: Arc<SendSmsUseCase>,
}

impl CommandRouter {
    pub fn new(send_sms: Arc<SendSmsUseCase>) -> Self {
        Self { send_sms }
    }

    /// Must be called from within a Tokio runtime.
    pub fn route(&self, payload: &[u8]) -> RouteOutcome {
        info!(bytes = payload.len(), "command received");

        let command = match ReceivedCommand::decode(payload) {
            Ok(command) => command,
            Err(err) => {
                error!(
                    error = %err,
                    payload = %String::from_utf8_lossy(payload),
                    "failed to decode command"
                );
                return RouteOutcome::Malformed;
            }
        };

        match command.kind() {
            CommandKind::SendSms => {
                info!("SendSms command detected");
                let usecase = self.send_sms.clone();
                let span = info_span!("sms_command", command_id = %Uuid::new_v4());
                let task =
                    tokio::spawn(async move { usecase.execute(command).await }.instrument(span));
                RouteOutcome::Dispatched(task)
            }
            CommandKind::Undetermined => {
                info!(
                    command = command.command.as_deref().unwrap_or("<missing>"),
                    "could not determine the command type, dropping"
                );
                RouteOutcome::Undetermined
            }
        }
    }
}
