//! Asynchronous request/response core between the control thread and the
//! compute engine.
//!
//! * [`Messenger`] – id-correlated send/dispatch with per-request deadlines.
//! * [`PendingReply`] – future that completes exactly once per request.
//! * [`LifecycleHooks`] – component-wide observer for UI progress indication.
//! * [`MessengerError`] – the caller-visible failure taxonomy.
//!
//! `send` never blocks: it returns a future immediately and all real work
//! happens on envelope delivery from the channel. Responses may arrive in any
//! order relative to send order; correlation is purely by id.

mod error;
mod hooks;
mod messenger;
mod pending;
mod reply;
mod timer;


pub use error::{MessengerError, MessengerResult};
pub use hooks::{LifecycleHooks, NoopHooks};
pub use messenger::{Messenger, MessengerConfig};
pub use pending::ProgressFn;
pub use reply::PendingReply;
