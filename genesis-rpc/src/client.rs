//! Generic correlated RPC client: one pending-call table shared by a single
//! background reply-dispatch task, using a `tokio::spawn` + `mpsc` split to
//! decouple that long-running task from its caller, with many concurrent
//! outstanding calls disambiguated by `correlation_id`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use genesis_transport::{Participant, Sample, Topic};
use genesis_types::{Correlated, CorrelationId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::RpcError;

type PendingTable<Rep> = Arc<Mutex<HashMap<CorrelationId, oneshot::Sender<Rep>>>>;

/// Client half of one correlated request/reply channel. Owns a writer on
/// the request topic and a long-lived reader on the reply topic; replies
/// are routed to the caller awaiting that `correlation_id`.
pub struct RpcClient<Req, Rep> {
    request_writer: genesis_transport::Writer<Req>,
    pending: PendingTable<Rep>,
    /// Replies that arrived after their caller had already timed out or
    /// cancelled.
    pub late_reply_count: Arc<AtomicU64>,
    _dispatch_task: JoinHandle<()>,
}

impl<Req, Rep> RpcClient<Req, Rep>
where
    Req: Serialize + Send + 'static,
    Rep: DeserializeOwned + Correlated + Send + Sync + 'static,
{
    pub fn new(participant: &Participant, request_topic: &Topic, reply_topic: &Topic) -> Self {
        let request_writer = participant.create_writer(request_topic);
        let pending: PendingTable<Rep> = Arc::new(Mutex::new(HashMap::new()));
        let late_reply_count = Arc::new(AtomicU64::new(0));

        let mut reply_reader: genesis_transport::Reader<Rep> = participant.create_reader(reply_topic);
        let dispatch_pending = pending.clone();
        let dispatch_late = late_reply_count.clone();
        let _dispatch_task = tokio::spawn(async move {
            loop {
                let sample = match reply_reader.recv().await {
                    Ok(sample) => sample,
                    Err(e) => {
                        tracing::warn!(error = %e, "rpc reply reader closed");
                        return;
                    }
                };
                if let Sample::Alive { value, .. } = sample {
                    let id = value.correlation_id();
                    let sender = dispatch_pending.lock().unwrap().remove(&id);
                    match sender {
                        Some(tx) => {
                            let _ = tx.send(value);
                        }
                        None => {
                            dispatch_late.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }
        });

        Self {
            request_writer,
            pending,
            late_reply_count,
            _dispatch_task,
        }
    }

    /// Sends `request` (which must already carry a unique `correlation_id`)
    /// keyed by `target_endpoint_id`, and awaits the matching reply up to
    /// `timeout`. On timeout the pending entry is removed so a late reply
    /// is silently dropped (counted in [`Self::late_reply_count`]) rather
    /// than delivered to a new caller.
    pub async fn call(
        &self,
        target_endpoint_id: &str,
        correlation_id: CorrelationId,
        request: &Req,
        timeout: Duration,
    ) -> Result<Rep, RpcError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(correlation_id, tx);

        if let Err(e) = self.request_writer.publish(Some(target_endpoint_id), request) {
            self.pending.lock().unwrap().remove(&correlation_id);
            return Err(e.into());
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(RpcError::RpcShuttingDown),
            Err(_) => {
                self.cancel(&correlation_id);
                Err(RpcError::RpcTimeout)
            }
        }
    }

    /// Cancels a pending call: removes its table entry so any reply that
    /// arrives afterward is treated as late and discarded.
    pub fn cancel(&self, correlation_id: &CorrelationId) {
        self.pending.lock().unwrap().remove(correlation_id);
    }
}
