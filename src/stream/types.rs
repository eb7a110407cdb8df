// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scholia-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scholia and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Event type carried by messages this engine consumes; everything else on
/// the session subject is dropped.
pub const SESSION_UPDATE_KIND: &str = "session_update";

/// One message from the session-scoped event transport.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionUpdateEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// The last interaction of the envelope carries the response being streamed
/// for the currently processed comment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Interaction {
    /// Full response text so far (accumulated, not a delta).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    #[serde(default)]
    pub state: InteractionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    InProgress,
    Complete,
    /// States this engine does not act on (queued, error, ...); kept so an
    /// unknown state never fails decoding.
    #[serde(other)]
    Other,
}

/// Queue status for the review's backing planning session, polled from the
/// queue collaborator. `current_comment_id` is the primary attribution
/// signal for incoming response streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CommentQueueStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_comment_id: Option<String>,
    #[serde(default)]
    pub queued_comment_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_session_id: Option<String>,
}
