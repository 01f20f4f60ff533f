//! Pending-request bookkeeping owned by the messenger.

use channel::RequestKind;
use futures::channel::oneshot;
use serde_json::Value;

use crate::MessengerResult;

/// Callback invoked once per progress envelope for a single request, always
/// before that request's terminal outcome.
pub type ProgressFn = Box<dyn FnMut(f32, Option<&str>) + Send>;

/// One in-flight request, keyed by its correlation id in the request table.
///
/// Created at `send` time; destroyed the moment a terminal envelope for its
/// id arrives, its deadline lapses, or the channel is torn down. The oneshot
/// sender guarantees the caller is resolved or rejected at most once.
pub(crate) struct Pending {
    pub kind: RequestKind,
    pub complete: oneshot::Sender<MessengerResult<Value>>,
    pub on_progress: Option<ProgressFn>,
}
