//! Typed future returned by the driver's capability calls.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use channel::RequestKind;
use futures::ready;
use messenger::PendingReply;
use serde_json::Value;

use crate::DriverError;

pub(crate) type Validator<T> = Box<dyn FnOnce(Value) -> Result<T, String> + Send>;

/// Completes exactly once with the capability's typed result, or with a
/// [`DriverError`] covering transport, timeout, engine, and validation
/// failures uniformly.
pub struct TypedReply<T> {
    state: State<T>,
}

enum State<T> {
    /// Rejected before the channel was touched.
    Failed(Option<DriverError>),
    Waiting {
        reply: PendingReply,
        kind: RequestKind,
        validate: Option<Validator<T>>,
    },
}

impl<T> TypedReply<T> {
    pub(crate) fn failed(error: DriverError) -> Self {
        Self {
            state: State::Failed(Some(error)),
        }
    }

    pub(crate) fn waiting(reply: PendingReply, kind: RequestKind, validate: Validator<T>) -> Self {
        Self {
            state: State::Waiting {
                reply,
                kind,
                validate: Some(validate),
            },
        }
    }

    /// Blocks the calling thread until the call terminates.
    pub fn wait(self) -> Result<T, DriverError> {
        futures::executor::block_on(self)
    }
}

impl<T> Future for TypedReply<T> {
    type Output = Result<T, DriverError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Failed(error) => {
                Poll::Ready(Err(error.take().expect("reply polled after completion")))
            }
            State::Waiting {
                reply,
                kind,
                validate,
            } => {
                let outcome = ready!(Pin::new(reply).poll(cx));
                Poll::Ready(match outcome {
                    Ok(value) => {
                        let validate = validate.take().expect("reply polled after completion");
                        validate(value).map_err(|reason| {
                            DriverError::invalid_response(*kind, reason)
                        })
                    }
                    Err(err) => Err(DriverError::Messenger(err)),
                })
            }
        }
    }
}
