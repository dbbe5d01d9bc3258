//! Event loop tying the network client to the UI state.
//!
//! Fetches run in spawned tasks that only report back over a channel; all
//! state changes happen in [`MapSession::next_update`] on the task that owns
//! the session. Superseded work is aborted, and anything it managed to send
//! before the abort is dropped by tag.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use outletmap_client::{ClientError, OutletClient};
use outletmap_core::{CatchmentPoint, Outlet, OutletId};

use crate::chat::{ChatEvent, ChatFailure, ChatRequest, RequestTag};
use crate::host::MapHost;
use crate::map::CatchmentRequest;

#[derive(Debug)]
enum SessionEvent {
    Outlets {
        mount: u64,
        result: Result<Vec<Outlet>, ClientError>,
    },
    Catchments {
        request: CatchmentRequest,
        result: Result<Vec<CatchmentPoint>, ClientError>,
    },
    Chat(ChatEvent),
}

/// A visible change produced by [`MapSession::next_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    OutletsLoaded { markers: usize, skipped: usize },
    /// The outlet list could not be fetched; the map shows no markers.
    OutletsFailed,
    CatchmentsLoaded { outlet_id: OutletId, count: usize },
    /// The catchment fetch failed; the selection stays, with no overlays.
    CatchmentsFailed { outlet_id: OutletId },
    /// The answer region was re-rendered with this markup.
    ChatRendered { markup: String },
    ChatFinished,
    ChatFailed { message: &'static str },
}

pub struct MapSession {
    host: MapHost,
    client: OutletClient,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    outlets_task: Option<JoinHandle<()>>,
    catchment_task: Option<JoinHandle<()>>,
    chat_task: Option<(RequestTag, JoinHandle<()>)>,
    /// Bumped on every mount; outlet lists fetched for an earlier mount are dropped.
    mount_generation: u64,
}

impl MapSession {
    #[must_use]
    pub fn new(client: OutletClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            host: MapHost::new(),
            client,
            tx,
            rx,
            outlets_task: None,
            catchment_task: None,
            chat_task: None,
            mount_generation: 0,
        }
    }

    #[must_use]
    pub fn host(&self) -> &MapHost {
        &self.host
    }

    /// Mounts the map and starts loading outlets. Returns `false` (and does
    /// nothing) if already mounted.
    pub fn mount(&mut self) -> bool {
        if !self.host.mount() {
            return false;
        }

        self.mount_generation += 1;
        let mount = self.mount_generation;
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.outlets_task = Some(tokio::spawn(async move {
            let result = client.fetch_outlets().await;
            let _ = tx.send(SessionEvent::Outlets { mount, result });
        }));
        true
    }

    /// Tears the map down, aborting every outstanding transfer.
    pub fn unmount(&mut self) {
        self.abort_all();
        if let Some(tag) = self.host.unmount() {
            tracing::debug!(%tag, "chat request abandoned on unmount");
        }
        while self.rx.try_recv().is_ok() {}
    }

    /// Handles a marker click. Returns `false` if the outlet is unknown or
    /// has no marker.
    pub fn select_outlet(&mut self, outlet_id: &OutletId) -> bool {
        let Some(request) = self.host.map_mut().select_outlet(outlet_id) else {
            tracing::debug!(%outlet_id, "ignoring selection of unplottable outlet");
            return false;
        };

        if let Some(previous) = self.catchment_task.take() {
            previous.abort();
        }

        let client = self.client.clone();
        let tx = self.tx.clone();
        self.catchment_task = Some(tokio::spawn(async move {
            let result = client.fetch_catchments(&request.outlet_id).await;
            let _ = tx.send(SessionEvent::Catchments { request, result });
        }));
        true
    }

    /// Submits a chat question. Returns `false` if nothing was sent (blank
    /// input or unmounted map).
    pub fn ask(&mut self, question: &str) -> bool {
        let Some(chat) = self.host.chat_mut() else {
            return false;
        };
        chat.set_input(question);
        let Some(request) = chat.submit() else {
            return false;
        };

        if let Some((old_tag, handle)) = self.chat_task.take() {
            tracing::info!(%old_tag, new_tag = %request.tag, "cancelling previous chat request");
            handle.abort();
        }

        let tag = request.tag;
        let client = self.client.clone();
        let tx = self.tx.clone();
        let handle = tokio::spawn(stream_chat(client, request, tx));
        self.chat_task = Some((tag, handle));
        true
    }

    /// Waits for the next visible change.
    ///
    /// Returns `None` once no transfer is outstanding and every queued event
    /// has been applied.
    pub async fn next_update(&mut self) -> Option<Update> {
        loop {
            // Check for live work before polling the queue: a finished task has
            // already enqueued everything it will ever send.
            let event = if self.has_pending_work() {
                self.rx.recv().await?
            } else {
                self.rx.try_recv().ok()?
            };

            if let Some(update) = self.apply(event) {
                return Some(update);
            }
        }
    }

    fn has_pending_work(&self) -> bool {
        let live = |h: &JoinHandle<()>| !h.is_finished();
        self.outlets_task.as_ref().is_some_and(live)
            || self.catchment_task.as_ref().is_some_and(live)
            || self.chat_task.as_ref().is_some_and(|(_, h)| live(h))
    }

    fn apply(&mut self, event: SessionEvent) -> Option<Update> {
        match event {
            SessionEvent::Outlets { mount, result } => {
                if !self.host.is_mounted() || mount != self.mount_generation {
                    tracing::debug!(
                        mount,
                        current = self.mount_generation,
                        "dropping stale outlet list"
                    );
                    return None;
                }
                let map = self.host.map_mut();
                match result {
                    Ok(outlets) => {
                        let total = outlets.len();
                        map.set_outlets(outlets);
                        let markers = map.markers().len();
                        tracing::info!(total, markers, "outlets loaded");
                        Some(Update::OutletsLoaded {
                            markers,
                            skipped: total - markers,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to fetch outlets");
                        map.set_outlets(Vec::new());
                        Some(Update::OutletsFailed)
                    }
                }
            }
            SessionEvent::Catchments { request, result } => {
                let map = self.host.map_mut();
                match result {
                    Ok(points) => {
                        let count = points.len();
                        map.apply_catchments(&request, points)
                            .then(|| Update::CatchmentsLoaded {
                                outlet_id: request.outlet_id,
                                count,
                            })
                    }
                    Err(e) => {
                        if !map.fail_catchments(&request) {
                            return None;
                        }
                        tracing::warn!(
                            outlet_id = %request.outlet_id,
                            error = %e,
                            "failed to fetch catchments"
                        );
                        Some(Update::CatchmentsFailed {
                            outlet_id: request.outlet_id,
                        })
                    }
                }
            }
            SessionEvent::Chat(event) => {
                let chat = self.host.chat_mut()?;
                let update = match &event {
                    ChatEvent::Chunk { .. } => None,
                    ChatEvent::Finished { .. } => Some(Update::ChatFinished),
                    ChatEvent::Failed { failure, .. } => Some(Update::ChatFailed {
                        message: failure.message(),
                    }),
                };
                if !chat.apply(event) {
                    return None;
                }
                if chat.active_request().is_none() {
                    self.chat_task = None;
                }
                update.or_else(|| {
                    Some(Update::ChatRendered {
                        markup: chat.rendered_answer(),
                    })
                })
            }
        }
    }

    fn abort_all(&mut self) {
        if let Some(h) = self.outlets_task.take() {
            h.abort();
        }
        if let Some(h) = self.catchment_task.take() {
            h.abort();
        }
        if let Some((_, h)) = self.chat_task.take() {
            h.abort();
        }
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.abort_all();
    }
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("host", &self.host)
            .field("base_url", &self.client.base_url())
            .field("pending_work", &self.has_pending_work())
            .finish_non_exhaustive()
    }
}

/// Sends one chat question and forwards the answer chunk by chunk.
async fn stream_chat(
    client: OutletClient,
    request: ChatRequest,
    tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let tag = request.tag;
    let send = |event: ChatEvent| tx.send(SessionEvent::Chat(event)).is_ok();

    let mut stream = match client.open_chat(&request.message).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(%tag, error = %e, "chat request failed");
            send(ChatEvent::Failed {
                tag,
                failure: ChatFailure::from(&e),
            });
            return;
        }
    };

    loop {
        match stream.next_text().await {
            Ok(Some(text)) => {
                if !send(ChatEvent::Chunk { tag, text }) {
                    return;
                }
            }
            Ok(None) => {
                tracing::debug!(%tag, "chat stream complete");
                send(ChatEvent::Finished { tag });
                return;
            }
            Err(e) => {
                tracing::warn!(%tag, error = %e, "chat stream broke off");
                send(ChatEvent::Failed {
                    tag,
                    failure: ChatFailure::Stream,
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(id: i64) -> Outlet {
        Outlet {
            id: OutletId::from(id),
            name: format!("Outlet {id}"),
            address: format!("{id} Jalan Test"),
            latitude: Some(3.1),
            longitude: Some(101.6),
            services: Vec::new(),
        }
    }

    fn unreachable_session() -> MapSession {
        let client = OutletClient::new("http://127.0.0.1:9", 1, 1, "outletmap-test")
            .expect("client should build");
        MapSession::new(client)
    }

    #[tokio::test]
    async fn outlet_list_from_earlier_mount_is_dropped() {
        let mut session = unreachable_session();
        assert!(session.mount());
        let first = session.mount_generation;
        session.unmount();
        assert!(session.mount());

        let late = SessionEvent::Outlets {
            mount: first,
            result: Ok(vec![outlet(1), outlet(2)]),
        };
        assert_eq!(session.apply(late), None);
        assert!(session.host().map().outlets().is_empty());

        let current = SessionEvent::Outlets {
            mount: session.mount_generation,
            result: Ok(vec![outlet(3)]),
        };
        assert_eq!(
            session.apply(current),
            Some(Update::OutletsLoaded {
                markers: 1,
                skipped: 0
            })
        );
    }

    #[tokio::test]
    async fn outlet_list_after_unmount_is_dropped() {
        let mut session = unreachable_session();
        assert!(session.mount());
        let mount = session.mount_generation;
        session.unmount();

        let late = SessionEvent::Outlets {
            mount,
            result: Ok(vec![outlet(1)]),
        };
        assert_eq!(session.apply(late), None);
        assert!(session.host().map().outlets().is_empty());
    }
}
