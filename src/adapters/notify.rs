//! Store-and-forward notification backends.
//!
//! ```text
//!  EventLog ──dispatch()──▶ mpsc (bounded) ──▶ NotifyWorker ─┬▶ lane ──▶ Datastore (PUT)
//!   (sync, never blocks)                        (tokio task)  └▶ lane ──▶ SMS gateway (GET)
//! ```
//!
//! Each payload goes to every configured backend independently.  A failed
//! delivery is logged with `warn!` and dropped; nothing is retried and
//! nothing flows back to the controller.

use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::{DatastoreConfig, SmsConfig, SystemConfig};
use crate::error::NotifyError;

/// Queue depth between the event log and the worker.
pub const DISPATCH_DEPTH: usize = 64;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body sent to the datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    pub value: String,
}

// ───────────────────────────────────────────────────────────────
// Backends
// ───────────────────────────────────────────────────────────────

/// A notification destination.
#[derive(Debug, Clone)]
pub enum Backend {
    /// `PUT <url>` with `X-Auth-Token` and a JSON `{ "value": line }` body.
    Datastore(DatastoreConfig),
    /// `GET <url>?user=&pass=&msg=<line>` on an HTTP SMS gateway.
    Sms(SmsConfig),
}

impl Backend {
    /// Every backend whose credentials are present in `config`.
    pub fn from_config(config: &SystemConfig) -> Vec<Self> {
        let mut backends = Vec::new();
        if let Some(store) = config.datastore() {
            backends.push(Self::Datastore(store));
        }
        if let Some(sms) = config.sms() {
            backends.push(Self::Sms(sms));
        }
        backends
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Datastore(_) => "datastore",
            Self::Sms(_) => "sms",
        }
    }

    /// One delivery attempt.
    pub async fn deliver(
        &self,
        client: &reqwest::Client,
        payload: &EventPayload,
    ) -> Result<(), NotifyError> {
        let request = match self {
            Self::Datastore(store) => client
                .put(&store.url)
                .header("X-Auth-Token", &store.token)
                .json(payload),
            Self::Sms(gateway) => client.get(&gateway.url).query(&[
                ("user", gateway.user.as_str()),
                ("pass", gateway.pass.as_str()),
                ("msg", payload.value.as_str()),
            ]),
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(status.as_u16()))
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher (producer side)
// ───────────────────────────────────────────────────────────────

/// Cheap, cloneable handle used by the event log.
#[derive(Clone)]
pub struct NotifyDispatcher {
    tx: mpsc::Sender<EventPayload>,
}

impl NotifyDispatcher {
    /// Queue `line` for delivery without blocking.  Dropped with a warning
    /// when the queue is full or the worker has stopped.
    pub fn dispatch(&self, line: String) {
        match self.tx.try_send(EventPayload { value: line }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(p)) => {
                warn!("notify: queue full, dropping '{}'", p.value);
            }
            Err(mpsc::error::TrySendError::Closed(p)) => {
                warn!("notify: worker gone, dropping '{}'", p.value);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Worker (consumer side)
// ───────────────────────────────────────────────────────────────

pub struct NotifyWorker {
    client: reqwest::Client,
    backends: Vec<Backend>,
    rx: mpsc::Receiver<EventPayload>,
}

/// Create a connected dispatcher / worker pair.
pub fn channel(backends: Vec<Backend>) -> Result<(NotifyDispatcher, NotifyWorker), NotifyError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let (tx, rx) = mpsc::channel(DISPATCH_DEPTH);
    Ok((
        NotifyDispatcher { tx },
        NotifyWorker {
            client,
            backends,
            rx,
        },
    ))
}

impl NotifyWorker {
    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Deliver payloads until every dispatcher has been dropped.
    ///
    /// Each backend drains its own lane, so a slow destination only
    /// delays itself.  Returns once every lane has finished.
    pub async fn run(mut self) {
        let names: Vec<_> = self.backends.iter().map(Backend::name).collect();
        info!("notify: worker started, backends {names:?}");

        let mut lanes = JoinSet::new();
        let mut senders = Vec::with_capacity(self.backends.len());
        for backend in self.backends.drain(..) {
            let (tx, rx) = mpsc::channel(DISPATCH_DEPTH);
            senders.push((backend.name(), tx));
            lanes.spawn(drain_lane(backend, self.client.clone(), rx));
        }

        while let Some(payload) = self.rx.recv().await {
            for (name, lane) in &senders {
                if let Err(e) = lane.try_send(payload.clone()) {
                    let dropped = e.into_inner();
                    warn!("notify: {name} lane backed up, dropping '{}'", dropped.value);
                }
            }
        }

        drop(senders);
        while lanes.join_next().await.is_some() {}
        debug!("notify: all dispatchers dropped, worker exiting");
    }
}

async fn drain_lane(
    backend: Backend,
    client: reqwest::Client,
    mut rx: mpsc::Receiver<EventPayload>,
) {
    while let Some(payload) = rx.recv().await {
        match backend.deliver(&client, &payload).await {
            Ok(()) => debug!("notify: {} accepted '{}'", backend.name(), payload.value),
            Err(e) => warn!("notify: {} failed: {e}", backend.name()),
        }
    }
}
