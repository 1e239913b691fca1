use crate::domain::outcome::FlowId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, oneshot};
use tracing::{debug, warn};
use url::Url;

/// Query parameter carrying the flow id on the return URL.
pub const FLOW_ID_PARAM: &str = "payflowId";

static GLOBAL_REGISTRY: LazyLock<Arc<RedirectRegistry>> =
    LazyLock::new(|| Arc::new(RedirectRegistry::default()));

/// Entry point for the host application when it is opened through a URL.
///
/// Returns whether the URL completed a pending redirect. URLs that belong to
/// no pending redirect are left alone and return `false`.
pub fn application_did_open(url: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => GLOBAL_REGISTRY.application_did_open(&url),
        Err(error) => {
            debug!(%error, "ignoring unparseable return URL");
            false
        }
    }
}

/// Tags the merchant's return URL with the flow it belongs to.
pub fn correlated_return_url(return_url: &Url, flow_id: FlowId) -> Url {
    let mut url = return_url.clone();
    url.query_pairs_mut()
        .append_pair(FLOW_ID_PARAM, &flow_id.to_string());
    url
}

struct PendingEntry {
    registration: u64,
    return_url: Url,
    sender: oneshot::Sender<Url>,
}

/// Redirects waiting for the shopper to come back to the application.
#[derive(Default)]
pub struct RedirectRegistry {
    pending: Mutex<HashMap<FlowId, PendingEntry>>,
    registrations: AtomicU64,
    removed: Notify,
}

impl RedirectRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The registry behind [`application_did_open`].
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Registers a redirect for `flow_id`; the returned guard unregisters it on drop.
    pub fn register(self: &Arc<Self>, flow_id: FlowId, return_url: Url) -> PendingRedirect {
        let registration = self.registrations.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let entry = PendingEntry {
            registration,
            return_url,
            sender,
        };
        if self.lock().insert(flow_id, entry).is_some() {
            warn!(%flow_id, "replacing a pending redirect for the same flow");
        }

        PendingRedirect {
            flow_id,
            registration,
            registry: Arc::clone(self),
            receiver,
        }
    }

    /// Hands `url` to the pending redirect it belongs to.
    pub fn application_did_open(&self, url: &Url) -> bool {
        let mut pending = self.lock();
        let Some(flow_id) = claimant(&pending, url) else {
            debug!("return URL does not match any pending redirect");
            return false;
        };
        let claimed = match pending.remove(&flow_id) {
            Some(entry) => entry.sender.send(url.clone()).is_ok(),
            None => false,
        };
        drop(pending);
        self.removed.notify_waiters();
        claimed
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Resolves once no redirect is pending.
    pub async fn idle(&self) {
        loop {
            let removed = self.removed.notified();
            tokio::pin!(removed);
            removed.as_mut().enable();
            if self.pending_count() == 0 {
                return;
            }
            removed.await;
        }
    }

    fn unregister(&self, flow_id: FlowId, registration: u64) {
        let mut pending = self.lock();
        if pending
            .get(&flow_id)
            .is_some_and(|entry| entry.registration == registration)
        {
            pending.remove(&flow_id);
            drop(pending);
            self.removed.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FlowId, PendingEntry>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Picks the flow an inbound URL belongs to.
///
/// A URL tagged with a flow id only matches that flow. An untagged URL matches
/// when exactly one pending redirect shares its target.
fn claimant(pending: &HashMap<FlowId, PendingEntry>, url: &Url) -> Option<FlowId> {
    let tagged = url
        .query_pairs()
        .find(|(key, _)| key == FLOW_ID_PARAM)
        .map(|(_, value)| FlowId::parse(&value));

    match tagged {
        Some(Some(flow_id)) => pending
            .get(&flow_id)
            .filter(|entry| same_target(&entry.return_url, url))
            .map(|_| flow_id),
        Some(None) => None,
        None => {
            let mut matching = pending
                .iter()
                .filter(|(_, entry)| same_target(&entry.return_url, url))
                .map(|(flow_id, _)| *flow_id);
            match (matching.next(), matching.next()) {
                (Some(flow_id), None) => Some(flow_id),
                _ => None,
            }
        }
    }
}

fn same_target(expected: &Url, actual: &Url) -> bool {
    expected.scheme() == actual.scheme()
        && expected.host_str() == actual.host_str()
        && expected.port() == actual.port()
        && expected.path().trim_end_matches('/') == actual.path().trim_end_matches('/')
}

/// A registered redirect waiting for its return URL.
pub struct PendingRedirect {
    flow_id: FlowId,
    registration: u64,
    registry: Arc<RedirectRegistry>,
    receiver: oneshot::Receiver<Url>,
}

impl PendingRedirect {
    /// Waits for the return URL. `None` if the registration was superseded.
    pub async fn returned(&mut self) -> Option<Url> {
        (&mut self.receiver).await.ok()
    }
}

impl Drop for PendingRedirect {
    fn drop(&mut self) {
        self.registry.unregister(self.flow_id, self.registration);
    }
}
