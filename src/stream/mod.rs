// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Response-stream routing: attribute incrementally streamed agent responses
//! to the comment they answer.
//!
//! The transport does not always carry an explicit comment id, so routing
//! combines explicit correlation state (the queue's `current_comment_id`)
//! with heuristic fallbacks over the active comment list. The correlation
//! snapshot is assembled fresh by the caller before every dispatch; the
//! router never holds references into the comment list between events.

use std::fmt;

use crate::model::comment::Comment;
use crate::model::ids::CommentId;

pub mod types;

pub use types::{
    CommentQueueStatus, Interaction, InteractionState, SessionEnvelope, SessionUpdateEvent,
    SESSION_UPDATE_KIND,
};

/// Correlation state for one dispatch, assembled by the caller immediately
/// before routing an event.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationSnapshot<'a> {
    /// Latest known queue status, when the queue collaborator has one.
    pub queue: Option<&'a CommentQueueStatus>,
    /// The active document tab's comment list, in storage order.
    pub comments: &'a [Comment],
}

/// Why an event produced no routed update. These are surfaced to the caller
/// (which may log them) instead of interrupting the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Not a `session_update` event.
    OtherEventKind,
    /// `session_update` without a session payload.
    MissingSession,
    /// Session payload without interactions.
    NoInteractions,
    /// No attribution signal matched any comment.
    NoTarget,
    /// A completion was already emitted for this comment's response.
    AlreadyCompleted,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OtherEventKind => f.write_str("not a session_update event"),
            Self::MissingSession => f.write_str("session_update without session payload"),
            Self::NoInteractions => f.write_str("session payload has no interactions"),
            Self::NoTarget => f.write_str("no comment is awaiting this response"),
            Self::AlreadyCompleted => f.write_str("completion already emitted for this comment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The targeted comment's live text advanced.
    Updated { comment_id: CommentId, text: String },
    /// The event re-delivered already-applied state; nothing visible changes.
    Unchanged { comment_id: CommentId },
    /// The response finished. The durable store now holds the full text, so
    /// the caller should refresh its comment list and clear live state.
    Completed { comment_id: CommentId, text: String },
    /// The event was dropped; the subscription continues.
    Dropped { reason: DropReason },
}

#[derive(Debug)]
pub struct DecodeEventError {
    source: serde_json::Error,
}

impl fmt::Display for DecodeEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed session event: {}", self.source)
    }
}

impl std::error::Error for DecodeEventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Routes session-update events to the comment currently awaiting a reply.
///
/// Holds only the in-flight accumulator (target comment + partial text) and
/// the last finished run; everything else arrives via the per-event
/// [`CorrelationSnapshot`].
#[derive(Debug, Default)]
pub struct ResponseStreamRouter {
    target: Option<CommentId>,
    accumulated: String,
    completed: Option<CompletedRun>,
}

/// The last response that finished, kept so a reconnect that replays frames
/// of the finished run stays silent instead of re-completing it.
#[derive(Debug)]
struct CompletedRun {
    comment_id: CommentId,
    text: String,
}

impl ResponseStreamRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode_event(raw: &str) -> Result<SessionUpdateEvent, DecodeEventError> {
        serde_json::from_str(raw).map_err(|source| DecodeEventError { source })
    }

    /// The comment currently receiving a streamed response, if any.
    pub fn target(&self) -> Option<&CommentId> {
        self.target.as_ref()
    }

    /// The partial response accumulated for the current target.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Drop all in-flight state (view closed or session changed).
    pub fn reset(&mut self) {
        self.target = None;
        self.accumulated.clear();
        self.completed = None;
    }

    pub fn route(
        &mut self,
        event: &SessionUpdateEvent,
        correlation: &CorrelationSnapshot<'_>,
    ) -> RouteOutcome {
        if event.kind != SESSION_UPDATE_KIND {
            return RouteOutcome::Dropped {
                reason: DropReason::OtherEventKind,
            };
        }
        let Some(session) = event.session.as_ref() else {
            return RouteOutcome::Dropped {
                reason: DropReason::MissingSession,
            };
        };
        let Some(interaction) = session.interactions.last() else {
            return RouteOutcome::Dropped {
                reason: DropReason::NoInteractions,
            };
        };
        let Some(target) = attribute_target(correlation) else {
            return RouteOutcome::Dropped {
                reason: DropReason::NoTarget,
            };
        };

        if self.target.as_ref() != Some(&target) {
            // Target switch: whatever was accumulated belongs to a previous
            // response run.
            if self.target.is_some() {
                self.accumulated.clear();
            }
            let completed_here = self
                .completed
                .as_ref()
                .is_some_and(|run| run.comment_id == target);
            if self.target.is_some() || !completed_here {
                self.completed = None;
            }
        }

        if self.target.is_none() {
            if let Some(run) = self.completed.as_ref() {
                if run.comment_id == target {
                    // A reconnect can replay any frame of the finished run,
                    // not just the final one. Frames whose text does not go
                    // past the completed response are echoes, not a new run.
                    let echoed = interaction.state == InteractionState::Complete
                        || interaction
                            .response_message
                            .as_deref()
                            .map_or(true, |message| run.text.starts_with(message));
                    if echoed {
                        return RouteOutcome::Dropped {
                            reason: DropReason::AlreadyCompleted,
                        };
                    }
                    self.completed = None;
                }
            }
        }

        if interaction.state == InteractionState::Complete {
            let text = match interaction.response_message.as_ref() {
                Some(message) => message.clone(),
                None => std::mem::take(&mut self.accumulated),
            };
            self.target = None;
            self.accumulated.clear();
            self.completed = Some(CompletedRun {
                comment_id: target.clone(),
                text: text.clone(),
            });
            return RouteOutcome::Completed {
                comment_id: target,
                text,
            };
        }

        self.target = Some(target.clone());

        let Some(message) = interaction.response_message.as_ref() else {
            return RouteOutcome::Unchanged { comment_id: target };
        };
        if *message == self.accumulated {
            return RouteOutcome::Unchanged { comment_id: target };
        }

        // Messages carry the full accumulated text, so replacing (not
        // appending) keeps replays and gaps harmless.
        self.accumulated.clear();
        self.accumulated.push_str(message);
        self.completed = None;
        RouteOutcome::Updated {
            comment_id: target,
            text: message.clone(),
        }
    }
}

/// Attribution, in priority order: the queue's explicit `current_comment_id`
/// when available; otherwise the most recently created comment with a
/// pending correlation request id and no response; otherwise the most
/// recently created comment with neither response nor resolved flag.
///
/// The fallbacks are best-effort: with two comments outstanding at once and
/// no explicit id, the newest eligible comment wins and the stream can be
/// misattributed until the next comment-list refresh reconciles state.
fn attribute_target(correlation: &CorrelationSnapshot<'_>) -> Option<CommentId> {
    if let Some(raw) = correlation
        .queue
        .and_then(|queue| queue.current_comment_id.as_deref())
        .filter(|raw| !raw.is_empty())
    {
        if let Ok(comment_id) = CommentId::new(raw) {
            return Some(comment_id);
        }
    }

    if let Some(comment) = newest_by_creation(
        correlation
            .comments
            .iter()
            .filter(|comment| comment.is_awaiting_response()),
    ) {
        return Some(comment.comment_id().clone());
    }

    newest_by_creation(
        correlation
            .comments
            .iter()
            .filter(|comment| comment.response_text().is_none() && !comment.resolved()),
    )
    .map(|comment| comment.comment_id().clone())
}

fn newest_by_creation<'a>(comments: impl Iterator<Item = &'a Comment>) -> Option<&'a Comment> {
    comments.max_by(|a, b| {
        a.created_at_ms()
            .cmp(&b.created_at_ms())
            .then_with(|| a.comment_id().cmp(b.comment_id()))
    })
}
