//! Future returned by [`crate::Messenger::send`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde_json::Value;

use crate::{MessengerError, MessengerResult};

/// Completes exactly once: with the terminal success payload, or with an
/// error (timeout, engine-reported failure, or channel teardown).
pub struct PendingReply {
    state: State,
}

enum State {
    /// Failed before a table entry was created.
    Failed(Option<MessengerError>),
    Waiting(oneshot::Receiver<MessengerResult<Value>>),
}

impl PendingReply {
    pub(crate) fn failed(error: MessengerError) -> Self {
        Self {
            state: State::Failed(Some(error)),
        }
    }

    pub(crate) fn waiting(receiver: oneshot::Receiver<MessengerResult<Value>>) -> Self {
        Self {
            state: State::Waiting(receiver),
        }
    }

    /// Blocks the calling thread until the reply terminates.
    pub fn wait(self) -> MessengerResult<Value> {
        futures::executor::block_on(self)
    }
}

impl Future for PendingReply {
    type Output = MessengerResult<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Failed(error) => {
                Poll::Ready(Err(error.take().expect("reply polled after completion")))
            }
            State::Waiting(receiver) => Pin::new(receiver).poll(cx).map(|outcome| match outcome {
                Ok(outcome) => outcome,
                // Sender dropped without a terminal: the messenger itself
                // went away underneath the caller.
                Err(oneshot::Canceled) => {
                    Err(MessengerError::Terminated("messenger dropped".into()))
                }
            }),
        }
    }
}
