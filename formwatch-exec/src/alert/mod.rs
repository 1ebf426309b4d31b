//! Alert Dispatcher: turns a run's attempts into at most one notification.

mod decision;
mod dispatcher;
mod fingerprint;
mod message;

pub use decision::{AlertDecision, Assessment, SuppressedReason};
pub use dispatcher::{AlertContext, AlertDispatcher, DispatchConfig, DispatchError};
pub use fingerprint::fingerprint;
pub use message::{
    render_alert, render_pass_notice, truncate_chars, MessageParts, MAX_MESSAGE_CHARS, MAX_VALUE_CHARS,
};
