// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Retrying position passes.
//!
//! Anchoring depends on layout the renderer may not have committed yet, so a
//! single pass can transiently fail to resolve anchors. The scheduler runs
//! the locate-then-stack computation with exponential backoff until every
//! anchor resolves, the retry budget is exhausted (publish what resolved,
//! drop the rest silently), or a newer trigger supersedes the pass. A
//! superseded pass is cancelled and its result is discarded, never
//! published, so out-of-order resolution cannot flicker stale positions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::anchor::{locate_quote, ContainerMeasure};
use crate::layout::stack::{resolve_overlaps, StackEntry, StackedPosition};
use crate::model::ids::CommentId;

/// Upper bound on computation attempts per trigger. This governs layout
/// readiness only; it is not a timeout on agent responses.
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay before the first retry; doubles per subsequent attempt.
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Height reserved for a bubble the request carries no measured or
/// estimated height for.
pub const FALLBACK_BUBBLE_HEIGHT: f64 = 160.0;

pub type PositionMap = BTreeMap<CommentId, StackedPosition>;

/// Cancellation handle for one scheduled position pass. Cancelling marks the
/// pass as superseded; a cancelled pass never publishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Everything one position pass works on: the unresolved quoted comments of
/// the active tab plus the bubble heights measured so far.
#[derive(Debug, Clone)]
pub struct PositionRequest {
    quotes: Vec<(CommentId, String)>,
    heights: BTreeMap<CommentId, f64>,
}

impl PositionRequest {
    pub fn new(quotes: Vec<(CommentId, String)>, heights: BTreeMap<CommentId, f64>) -> Self {
        Self { quotes, heights }
    }

    pub fn quotes(&self) -> &[(CommentId, String)] {
        &self.quotes
    }

    fn height_for(&self, comment_id: &CommentId) -> f64 {
        self.heights
            .get(comment_id)
            .copied()
            .unwrap_or(FALLBACK_BUBBLE_HEIGHT)
    }
}

/// Result of a single computation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    positions: PositionMap,
    unresolved: Vec<CommentId>,
}

impl PassOutcome {
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn unresolved(&self) -> &[CommentId] {
        &self.unresolved
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn into_positions(self) -> PositionMap {
        self.positions
    }
}

/// One locate-then-stack pass over the current render. Pure over the passed
/// in container state.
pub fn compute_positions(
    container: &dyn ContainerMeasure,
    request: &PositionRequest,
) -> PassOutcome {
    let mut anchored = Vec::<(CommentId, f64)>::new();
    let mut unresolved = Vec::new();

    for (comment_id, quote) in request.quotes() {
        match locate_quote(container, quote) {
            Some(offset) => anchored.push((comment_id.clone(), offset)),
            None => unresolved.push(comment_id.clone()),
        }
    }

    // Stack in document order: by natural offset, id as a deterministic tie
    // break (NaN cannot occur; offsets come from measurements).
    anchored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let entries = anchored
        .into_iter()
        .map(|(comment_id, offset)| {
            let height = request.height_for(&comment_id);
            StackEntry::new(comment_id, offset, height)
        })
        .collect::<Vec<_>>();

    PassOutcome {
        positions: resolve_overlaps(&entries),
        unresolved,
    }
}

#[derive(Debug)]
struct PendingPass {
    token: CancelToken,
    handle: JoinHandle<()>,
}

/// Debouncing retry scheduler. At most one pass is pending per scheduler; a
/// new trigger cancels the previous pass before scheduling its own, so only
/// the latest trigger's computation can ever publish.
#[derive(Debug)]
pub struct PositionScheduler {
    base_delay: Duration,
    max_attempts: u32,
    positions_tx: watch::Sender<PositionMap>,
    pending: Option<PendingPass>,
}

impl Default for PositionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionScheduler {
    pub fn new() -> Self {
        Self::with_timing(BASE_RETRY_DELAY, MAX_ATTEMPTS)
    }

    pub fn with_timing(base_delay: Duration, max_attempts: u32) -> Self {
        let (positions_tx, _) = watch::channel(PositionMap::new());
        Self {
            base_delay,
            max_attempts: max_attempts.max(1),
            positions_tx,
            pending: None,
        }
    }

    /// Watch the published position map. The receiver sees only settled
    /// results: either a full pass or the partial map after retry
    /// exhaustion, never an intermediate attempt.
    pub fn subscribe(&self) -> watch::Receiver<PositionMap> {
        self.positions_tx.subscribe()
    }

    pub fn positions(&self) -> PositionMap {
        self.positions_tx.borrow().clone()
    }

    /// Cancel any pending pass and start a fresh settle-and-resolve cycle at
    /// attempt zero. Returns the new pass's cancellation token.
    pub fn trigger(
        &mut self,
        container: Arc<dyn ContainerMeasure + Send + Sync>,
        request: PositionRequest,
    ) -> CancelToken {
        self.cancel_pending();

        let token = CancelToken::new();
        let task_token = token.clone();
        let positions_tx = self.positions_tx.clone();
        let base_delay = self.base_delay;
        let max_attempts = self.max_attempts;

        let handle = tokio::spawn(async move {
            run_pass(
                container,
                request,
                task_token,
                positions_tx,
                base_delay,
                max_attempts,
            )
            .await;
        });

        self.pending = Some(PendingPass {
            token: token.clone(),
            handle,
        });
        token
    }

    /// Cancel the pending pass, if any, without scheduling a new one.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            pending.handle.abort();
        }
    }
}

impl Drop for PositionScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

async fn run_pass(
    container: Arc<dyn ContainerMeasure + Send + Sync>,
    request: PositionRequest,
    token: CancelToken,
    positions_tx: watch::Sender<PositionMap>,
    base_delay: Duration,
    max_attempts: u32,
) {
    let mut attempt: u32 = 0;
    loop {
        if attempt > 0 {
            let delay = base_delay * 2u32.saturating_pow(attempt - 1);
            tokio::time::sleep(delay).await;
        }
        if token.is_cancelled() {
            return;
        }

        let outcome = compute_positions(container.as_ref(), &request);
        if outcome.is_complete() || attempt + 1 >= max_attempts {
            if token.is_cancelled() {
                return;
            }
            let _ = positions_tx.send(outcome.into_positions());
            return;
        }

        attempt += 1;
    }
}
