//! Submission inbox between the admission endpoint and the controller.
//!
//! Uses an `embassy-sync` bounded MPMC channel to bridge the async HTTP
//! handlers with the controller tick.  Handlers only enqueue; the
//! controller drains in FIFO order inside its own tick, so no controller
//! state is ever touched from the handler's context.
//!
//! ```text
//! ┌──────────────┐  CodeSubmission  ┌────────────────┐
//! │ HTTP handler │─────────────────▶│ AlarmController│
//! │  (async)     │   try_send       │  (tick)        │
//! └──────────────┘                  └────────────────┘
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::CodeSubmission;

/// Channel depth for pending submissions.
pub const INBOX_DEPTH: usize = 16;

type InboxChannel = Channel<CriticalSectionRawMutex, CodeSubmission, INBOX_DEPTH>;

/// Cloneable handle to the submission queue.
#[derive(Clone)]
pub struct SubmissionInbox {
    channel: Arc<InboxChannel>,
}

impl SubmissionInbox {
    pub fn new() -> Self {
        Self {
            channel: Arc::new(Channel::new()),
        }
    }

    /// Enqueue without blocking.  Returns `false` (and logs) when the
    /// inbox is full and the submission was dropped.
    pub fn submit(&self, submission: CodeSubmission) -> bool {
        match self.channel.try_send(submission) {
            Ok(()) => true,
            Err(_) => {
                warn!("inbox: full ({INBOX_DEPTH}), submission dropped");
                false
            }
        }
    }

    /// Move everything currently queued into `out`, oldest first.
    pub fn drain_into(&self, out: &mut impl Extend<CodeSubmission>) {
        while let Ok(submission) = self.channel.try_receive() {
            out.extend(core::iter::once(submission));
        }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.channel.len()
    }
}

impl Default for SubmissionInbox {
    fn default() -> Self {
        Self::new()
    }
}
