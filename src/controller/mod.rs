// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Composition root for one review view.
//!
//! The controller owns the derived state the surrounding UI renders from:
//! the stacked position map and the per-comment live response map. It
//! re-triggers the position scheduler whenever comments, the active tab,
//! the document, or a bubble height change, and it drives the stream
//! subscription lifecycle for the review's backing planning session.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::anchor::ContainerMeasure;
use crate::model::comment::{Comment, DocumentSection};
use crate::model::ids::{CommentId, SessionId};
use crate::render::{estimate_bubble_height, DEFAULT_BUBBLE_WIDTH};
use crate::schedule::{PositionMap, PositionRequest, PositionScheduler};
use crate::stream::{
    CommentQueueStatus, CorrelationSnapshot, ResponseStreamRouter, RouteOutcome,
    SessionUpdateEvent,
};

/// Streamed response text for one comment, published while the agent is
/// still answering. Cleared once the response is durably stored and a
/// refresh signal has been emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveResponse {
    text: String,
    streaming: bool,
}

impl LiveResponse {
    pub(crate) fn new(text: impl Into<String>, streaming: bool) -> Self {
        Self {
            text: text.into(),
            streaming,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}

pub type LiveResponseMap = BTreeMap<CommentId, LiveResponse>;

#[derive(Debug)]
struct ControllerState {
    comments: Vec<Comment>,
    active_section: DocumentSection,
    queue_status: Option<CommentQueueStatus>,
    heights: BTreeMap<CommentId, f64>,
    router: ResponseStreamRouter,
}

#[derive(Debug)]
struct Subscription {
    session_id: SessionId,
    handle: JoinHandle<()>,
}

/// Owns the comment-derived state for the active document view.
///
/// One instance per review view; all derived maps belong exclusively to
/// that instance. The comment list itself is owned by the surrounding data
/// layer and passed in on every change.
pub struct AnnotationController {
    container: Arc<dyn ContainerMeasure + Send + Sync>,
    state: Arc<Mutex<ControllerState>>,
    scheduler: PositionScheduler,
    live_tx: watch::Sender<LiveResponseMap>,
    refresh_tx: mpsc::UnboundedSender<CommentId>,
    refresh_rx: Option<mpsc::UnboundedReceiver<CommentId>>,
    subscription: Option<Subscription>,
}

impl AnnotationController {
    pub fn new(container: Arc<dyn ContainerMeasure + Send + Sync>) -> Self {
        let (live_tx, _) = watch::channel(LiveResponseMap::new());
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        Self {
            container,
            state: Arc::new(Mutex::new(ControllerState {
                comments: Vec::new(),
                active_section: DocumentSection::Requirements,
                queue_status: None,
                heights: BTreeMap::new(),
                router: ResponseStreamRouter::new(),
            })),
            scheduler: PositionScheduler::new(),
            live_tx,
            refresh_tx,
            refresh_rx: Some(refresh_rx),
            subscription: None,
        }
    }

    /// Stacked bubble positions for the active tab.
    pub fn positions(&self) -> watch::Receiver<PositionMap> {
        self.scheduler.subscribe()
    }

    /// Live (still streaming) response text per comment.
    pub fn live_responses(&self) -> watch::Receiver<LiveResponseMap> {
        self.live_tx.subscribe()
    }

    /// Receiver for "a response completed, reload comments from the store"
    /// signals. Can be taken once, by the view that owns the comment list.
    pub fn take_refresh_signals(&mut self) -> Option<mpsc::UnboundedReceiver<CommentId>> {
        self.refresh_rx.take()
    }

    /// The session the controller currently consumes events for.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.subscription.as_ref().map(|s| &s.session_id)
    }

    /// Replace the comment list (after CRUD or a refresh). Cancels the
    /// pending position pass and starts a new one; tears the subscription
    /// down once nothing awaits a response anymore.
    pub async fn set_comments(&mut self, comments: Vec<Comment>) {
        let awaiting = comments.iter().any(Comment::is_awaiting_response);
        {
            let mut state = self.state.lock().await;
            state.comments = comments;
        }
        if !awaiting {
            self.detach_session().await;
        }
        self.reschedule().await;
    }

    /// Switch the active document tab.
    pub async fn set_active_section(&mut self, section: DocumentSection) {
        {
            let mut state = self.state.lock().await;
            if state.active_section == section {
                return;
            }
            state.active_section = section;
        }
        self.reschedule().await;
    }

    /// The rendered document's content changed; anchors must be recomputed.
    pub async fn document_changed(&mut self) {
        self.reschedule().await;
    }

    /// A bubble reported its rendered height; later passes use it instead
    /// of the line-derived estimate.
    pub async fn register_height(&mut self, comment_id: CommentId, height: f64) {
        {
            let mut state = self.state.lock().await;
            if state.heights.get(&comment_id) == Some(&height) {
                return;
            }
            state.heights.insert(comment_id, height);
        }
        self.reschedule().await;
    }

    /// A bubble unmounted; fall back to the height estimate for it.
    pub async fn unregister_height(&mut self, comment_id: &CommentId) {
        {
            let mut state = self.state.lock().await;
            if state.heights.remove(comment_id).is_none() {
                return;
            }
        }
        self.reschedule().await;
    }

    /// Latest queue status from the queue collaborator; its
    /// `current_comment_id` is the primary stream-attribution signal.
    pub async fn set_queue_status(&mut self, queue_status: Option<CommentQueueStatus>) {
        let mut state = self.state.lock().await;
        state.queue_status = queue_status;
    }

    /// Start consuming raw events for the review's backing session. The
    /// transport reconnects on its own and keeps feeding the same channel;
    /// attaching a different session replaces (and stops) the previous
    /// consume task.
    pub async fn attach_session(
        &mut self,
        session_id: SessionId,
        mut events_rx: mpsc::UnboundedReceiver<String>,
    ) {
        self.detach_session().await;

        let state = Arc::clone(&self.state);
        let live_tx = self.live_tx.clone();
        let refresh_tx = self.refresh_tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(raw) = events_rx.recv().await {
                // Malformed payloads are dropped; the subscription lives on.
                let Ok(event) = ResponseStreamRouter::decode_event(&raw) else {
                    continue;
                };
                let mut state = state.lock().await;
                route_locked(&mut state, &live_tx, &refresh_tx, &event);
            }
        });

        self.subscription = Some(Subscription { session_id, handle });
    }

    /// Stop consuming events and drop all in-flight response state.
    pub async fn detach_session(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };
        subscription.handle.abort();

        let mut state = self.state.lock().await;
        state.router.reset();
        self.live_tx.send_replace(LiveResponseMap::new());
    }

    /// Route one already-decoded event. The consume task uses the same
    /// path; this front door exists for transports the view drives itself.
    pub async fn ingest_event(&self, event: &SessionUpdateEvent) -> RouteOutcome {
        let mut state = self.state.lock().await;
        route_locked(&mut state, &self.live_tx, &self.refresh_tx, event)
    }

    async fn reschedule(&mut self) {
        let request = {
            let state = self.state.lock().await;
            let mut quotes = Vec::new();
            let mut heights = state.heights.clone();
            for comment in state.comments.iter().filter(|comment| {
                comment.section() == state.active_section && comment.has_anchor_quote()
            }) {
                let quote = comment.quoted_text().unwrap_or_default().to_owned();
                // Bubbles that have not mounted yet get a line-derived
                // estimate until they report a measured height.
                heights
                    .entry(comment.comment_id().clone())
                    .or_insert_with(|| estimate_bubble_height(comment, DEFAULT_BUBBLE_WIDTH));
                quotes.push((comment.comment_id().clone(), quote));
            }
            PositionRequest::new(quotes, heights)
        };
        self.scheduler.trigger(Arc::clone(&self.container), request);
    }
}

impl Drop for AnnotationController {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.handle.abort();
        }
    }
}

fn route_locked(
    state: &mut ControllerState,
    live_tx: &watch::Sender<LiveResponseMap>,
    refresh_tx: &mpsc::UnboundedSender<CommentId>,
    event: &SessionUpdateEvent,
) -> RouteOutcome {
    let ControllerState {
        comments,
        queue_status,
        router,
        ..
    } = state;
    let correlation = CorrelationSnapshot {
        queue: queue_status.as_ref(),
        comments: comments.as_slice(),
    };
    let outcome = router.route(event, &correlation);

    match &outcome {
        RouteOutcome::Updated { comment_id, text } => {
            live_tx.send_modify(|live| {
                live.insert(comment_id.clone(), LiveResponse::new(text.clone(), true));
            });
        }
        RouteOutcome::Completed { comment_id, .. } => {
            live_tx.send_modify(|live| {
                live.remove(comment_id);
            });
            // The full response is persisted server-side now.
            let _ = refresh_tx.send(comment_id.clone());
        }
        RouteOutcome::Unchanged { .. } | RouteOutcome::Dropped { .. } => {}
    }

    outcome
}
