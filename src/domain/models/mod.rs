pub mod command;

pub use command::{CommandKind, OutboundSms, ReceivedCommand};
